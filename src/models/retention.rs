//! Flow-log sinks, service identities and log retention.

use super::{NetworkTier, TopologyError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Role assumed by a managed service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentity {
    pub id: String,
    /// Service principal allowed to assume the role.
    pub principal: String,
    /// Extra actions granted on all resources.
    pub actions: Vec<String>,
}

impl ServiceIdentity {
    pub fn new(id: &str, principal: &str) -> Self {
        ServiceIdentity {
            id: id.to_string(),
            principal: principal.to_string(),
            actions: vec![],
        }
    }

    pub fn with_action(mut self, action: &str) -> Self {
        self.actions.push(action.to_string());
        self
    }
}

/// Log group receiving a network's flow records.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LogSink {
    pub id: String,
    pub network: NetworkTier,
}

/// Which traffic a capture rule records.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrafficType {
    All,
    Accept,
    Reject,
}

/// Capture rule shipping a network's traffic metadata to its sink.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FlowLogCapture {
    pub id: String,
    pub network: NetworkTier,
    pub sink_id: String,
    pub identity_id: String,
    pub traffic_type: TrafficType,
}

/// Bounded retry with a fixed delay between attempts.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// Run `op` until it succeeds or the attempt budget is spent, calling
    /// `sleep` with the base delay between attempts.
    ///
    /// `op` receives the 1-based attempt number.
    pub fn run<T, E, F, S>(
        &self,
        resource: &str,
        mut op: F,
        mut sleep: S,
    ) -> Result<T, TopologyError>
    where
        E: std::fmt::Display,
        F: FnMut(u32) -> Result<T, E>,
        S: FnMut(Duration),
    {
        let attempts = self.max_attempts.max(1);
        let mut last_error = String::new();
        for attempt in 1..=attempts {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    log::warn!("{resource}: attempt {attempt}/{attempts} failed: {e}");
                    last_error = e.to_string();
                    if attempt < attempts {
                        sleep(self.base_delay);
                    }
                }
            }
        }
        Err(TopologyError::RetryExhausted {
            resource: resource.to_string(),
            attempts,
            last_error,
        })
    }
}

/// How long a network tier keeps its flow logs.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct LogRetentionPolicy {
    pub tier: NetworkTier,
    pub retention_days: u32,
    pub retry: RetryPolicy,
}

/// Retention setting bound to a sink.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LogRetention {
    pub id: String,
    pub sink_id: String,
    pub identity_id: String,
    pub policy: LogRetentionPolicy,
}
