use std::error::Error;
use vpc_blueprint::config::config_from_env;
use vpc_blueprint::output::{print_summary, route_print, write_template};
use vpc_blueprint::synthesize;

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    log4rs::init_file("log4rs.yml", Default::default())?;
    dotenv::dotenv().ok();
    log::info!("#Start main()");

    let config = config_from_env()?;
    let topology = synthesize(&config)?;

    print_summary(&topology);
    route_print(&topology);
    let template_file = std::env::var("TOPOLOGY_TEMPLATE").ok();
    write_template(&topology, template_file.as_deref())?;

    Ok(())
}
