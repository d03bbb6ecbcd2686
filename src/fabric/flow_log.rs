//! Flow-log attachment and log retention.
//!
//! Each network ships its traffic metadata to its own log sink. Attachments
//! are independent of each other: one failing network is reported and the
//! rest carry on.

use crate::config::{retention_days, retention_retry};
use crate::models::{
    FlowLogCapture, LogRetention, LogRetentionPolicy, LogSink, NetworkSpace, ServiceIdentity,
    TopologyError, TrafficType,
};
use std::collections::HashSet;
use std::time::Duration;

pub const FLOW_LOG_PRINCIPAL: &str = "vpc-flow-logs.amazonaws.com";
pub const RETENTION_PRINCIPAL: &str = "lambda.amazonaws.com";

/// Identity shared by every flow-log capture rule.
pub fn flow_log_identity() -> ServiceIdentity {
    ServiceIdentity::new("vpcLogGroupRole", FLOW_LOG_PRINCIPAL)
}

/// Identity the retention helper runs under.
pub fn retention_identity() -> ServiceIdentity {
    ServiceIdentity::new("retentionRole", RETENTION_PRINCIPAL).with_action("logs:CreateLogGroup")
}

/// Sink plus capture rule for one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowLogAttachment {
    pub sink: LogSink,
    pub capture: FlowLogCapture,
}

/// Attach one flow log per network. Returns one result per network, in
/// input order.
pub fn attach_flow_logs(
    networks: &[NetworkSpace],
    identity: &ServiceIdentity,
) -> Vec<Result<FlowLogAttachment, TopologyError>> {
    let mut sink_ids = HashSet::new();
    networks
        .iter()
        .map(|network| {
            let sink_id = format!("{}VpcLogGroup", network.tier);
            if !sink_ids.insert(sink_id.clone()) {
                log::warn!("Flow log for '{}': sink {sink_id} already exists", network.name);
                return Err(TopologyError::DuplicateResource(sink_id));
            }
            log::debug!("Flow log for '{}' -> {sink_id}", network.name);
            Ok(FlowLogAttachment {
                capture: FlowLogCapture {
                    id: format!("{}FlowLog", network.tier),
                    network: network.tier,
                    sink_id: sink_id.clone(),
                    identity_id: identity.id.clone(),
                    traffic_type: TrafficType::All,
                },
                sink: LogSink {
                    id: sink_id,
                    network: network.tier,
                },
            })
        })
        .collect()
}

/// Retention setting for every sink, using the tier's retention period.
pub fn configure_retention(sinks: &[LogSink], identity: &ServiceIdentity) -> Vec<LogRetention> {
    sinks
        .iter()
        .map(|sink| LogRetention {
            id: format!("{}LogRetention", sink.network),
            sink_id: sink.id.clone(),
            identity_id: identity.id.clone(),
            policy: LogRetentionPolicy {
                tier: sink.network,
                retention_days: retention_days(sink.network),
                retry: retention_retry(),
            },
        })
        .collect()
}

/// Apply a retention setting through its retry policy.
///
/// `set_retention` is the eventually consistent operation; it receives the
/// retention and the attempt number. Exhausting the retries fails this
/// retention only.
pub fn apply_retention<E, F, S>(
    retention: &LogRetention,
    mut set_retention: F,
    sleep: S,
) -> Result<(), TopologyError>
where
    E: std::fmt::Display,
    F: FnMut(&LogRetention, u32) -> Result<(), E>,
    S: FnMut(Duration),
{
    retention
        .policy
        .retry
        .run(&retention.id, |attempt| set_retention(retention, attempt), sleep)?;
    log::info!(
        "{}: {} days on {}",
        retention.id,
        retention.policy.retention_days,
        retention.sink_id
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use crate::fabric::build_network;
    use crate::models::NetworkTier;

    fn networks() -> Vec<NetworkSpace> {
        NetworkTier::ALL
            .iter()
            .map(|t| build_network(&NetworkConfig::for_tier(*t), "us-east-1").unwrap())
            .collect()
    }

    #[test]
    fn test_attach_flow_logs() {
        let identity = flow_log_identity();
        let attached = attach_flow_logs(&networks(), &identity);
        assert_eq!(attached.len(), 3);
        let ids: Vec<String> = attached
            .iter()
            .map(|a| a.as_ref().unwrap().sink.id.clone())
            .collect();
        assert_eq!(
            ids,
            vec!["ProductionVpcLogGroup", "DevelopmentVpcLogGroup", "ManagementVpcLogGroup"]
        );
        // single shared identity
        assert!(attached
            .iter()
            .all(|a| a.as_ref().unwrap().capture.identity_id == "vpcLogGroupRole"));
    }

    #[test]
    fn test_flow_log_failure_is_isolated() {
        let mut nets = networks();
        let duplicate = nets[0].clone();
        nets.insert(1, duplicate);
        let attached = attach_flow_logs(&nets, &flow_log_identity());
        assert_eq!(attached.len(), 4);
        assert!(attached[0].is_ok());
        assert_eq!(
            attached[1],
            Err(TopologyError::DuplicateResource("ProductionVpcLogGroup".to_string()))
        );
        assert!(attached[2].is_ok());
        assert!(attached[3].is_ok());
    }

    #[test]
    fn test_configure_retention() {
        let sinks: Vec<LogSink> = attach_flow_logs(&networks(), &flow_log_identity())
            .into_iter()
            .map(|a| a.unwrap().sink)
            .collect();
        let retentions = configure_retention(&sinks, &retention_identity());
        let days: Vec<(String, u32)> = retentions
            .iter()
            .map(|r| (r.id.clone(), r.policy.retention_days))
            .collect();
        assert_eq!(
            days,
            vec![
                ("ProductionLogRetention".to_string(), 30),
                ("DevelopmentLogRetention".to_string(), 3),
                ("ManagementLogRetention".to_string(), 14),
            ]
        );
        for r in &retentions {
            assert_eq!(r.policy.retry.base_delay, Duration::from_secs(30 * 60));
            assert_eq!(r.policy.retry.max_attempts, 3);
            assert_eq!(r.identity_id, "retentionRole");
        }
    }

    #[test]
    fn test_apply_retention_retries() {
        let sink = LogSink {
            id: "ManagementVpcLogGroup".to_string(),
            network: NetworkTier::Management,
        };
        let retention = configure_retention(&[sink], &retention_identity()).remove(0);

        let mut waited = Duration::ZERO;
        let ok = apply_retention(
            &retention,
            |r, attempt| {
                assert_eq!(r.policy.retention_days, 14);
                if attempt == 1 {
                    Err("log group not yet visible")
                } else {
                    Ok(())
                }
            },
            |d| waited += d,
        );
        assert!(ok.is_ok());
        assert_eq!(waited, Duration::from_secs(1800));

        let failed = apply_retention(&retention, |_, _| Err("denied"), |_| {});
        assert!(matches!(
            failed,
            Err(TopologyError::RetryExhausted { attempts: 3, .. })
        ));
    }
}
