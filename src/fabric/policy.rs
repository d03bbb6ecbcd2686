//! Topology policy: which networks may peer and which subnet tiers get
//! routes across each link.
//!
//! The table is written out rather than computed because the topology is
//! asymmetric on purpose. Anything not granted is refused by the route
//! fabric builder.

use crate::models::{NetworkTier, SubnetTier, TopologyError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission for one subnet tier of `source` to route to all of `destination`.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RouteGrant {
    pub source: NetworkTier,
    pub tier: SubnetTier,
    pub destination: NetworkTier,
}

impl RouteGrant {
    pub const fn new(source: NetworkTier, tier: SubnetTier, destination: NetworkTier) -> Self {
        RouteGrant {
            source,
            tier,
            destination,
        }
    }

    /// Route name such as `mgmtPublicToDev`.
    pub fn route_name(&self) -> String {
        let dest = self.destination.short_name();
        let mut chars = dest.chars();
        let dest = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        format!("{}{}To{}", self.source.short_name(), self.tier, dest)
    }
}

impl fmt::Display for RouteGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.source, self.tier, self.destination)
    }
}

/// A grant that is deliberately withheld.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RouteDenial {
    pub grant: RouteGrant,
    pub reason: String,
}

/// Isolated production data-tier hosts get no route to management.
/// Isolated development hosts do.
pub const PRODUCTION_ISOLATED_TO_MANAGEMENT: RouteGrant = RouteGrant::new(
    NetworkTier::Production,
    SubnetTier::Isolated,
    NetworkTier::Management,
);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TopologyPolicy {
    /// Unordered network pairs allowed to peer.
    pub peerings: Vec<(NetworkTier, NetworkTier)>,
    /// Route grants, applied in order.
    pub grants: Vec<RouteGrant>,
    pub denials: Vec<RouteDenial>,
}

impl Default for TopologyPolicy {
    fn default() -> Self {
        use NetworkTier::{Development as Dev, Management as Mgmt, Production as Prod};
        use SubnetTier::{Isolated, Private, Public};

        TopologyPolicy {
            peerings: vec![(Mgmt, Prod), (Mgmt, Dev)],
            grants: vec![
                // Management <-> Development
                RouteGrant::new(Mgmt, Public, Dev),
                RouteGrant::new(Mgmt, Private, Dev),
                RouteGrant::new(Dev, Public, Mgmt),
                RouteGrant::new(Dev, Private, Mgmt),
                RouteGrant::new(Dev, Isolated, Mgmt),
                // Management <-> Production
                RouteGrant::new(Mgmt, Public, Prod),
                RouteGrant::new(Mgmt, Private, Prod),
                RouteGrant::new(Prod, Public, Mgmt),
                RouteGrant::new(Prod, Private, Mgmt),
            ],
            denials: vec![RouteDenial {
                grant: PRODUCTION_ISOLATED_TO_MANAGEMENT,
                reason: "production data tier stays unreachable from management".to_string(),
            }],
        }
    }
}

/// Production and Development are never linked, whatever the table says.
pub fn is_cross_pair(a: NetworkTier, b: NetworkTier) -> bool {
    matches!(
        (a, b),
        (NetworkTier::Production, NetworkTier::Development)
            | (NetworkTier::Development, NetworkTier::Production)
    )
}

impl TopologyPolicy {
    pub fn allows_peering(&self, a: NetworkTier, b: NetworkTier) -> bool {
        a != b
            && !is_cross_pair(a, b)
            && self
                .peerings
                .iter()
                .any(|(x, y)| (*x == a && *y == b) || (*x == b && *y == a))
    }

    pub fn is_denied(&self, grant: &RouteGrant) -> bool {
        self.denials.iter().any(|d| d.grant == *grant)
    }

    pub fn allows_route(&self, grant: &RouteGrant) -> bool {
        self.allows_peering(grant.source, grant.destination)
            && self.grants.contains(grant)
            && !self.is_denied(grant)
    }

    /// Check the table is self-consistent: no peering or grant pairs
    /// Production with Development, every grant crosses an allowed peering,
    /// and nothing is both granted and denied.
    pub fn validate(&self) -> Result<(), TopologyError> {
        if let Some((a, b)) = self.peerings.iter().find(|(a, b)| is_cross_pair(*a, *b)) {
            return Err(TopologyError::PeeringNotPermitted {
                first: a.to_string(),
                second: b.to_string(),
            });
        }
        for grant in &self.grants {
            if !self.allows_peering(grant.source, grant.destination) || self.is_denied(grant) {
                return Err(TopologyError::RouteNotPermitted {
                    name: grant.route_name(),
                    from: grant.source.to_string(),
                    to: grant.destination.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_valid() {
        let policy = TopologyPolicy::default();
        assert!(policy.validate().is_ok());
        assert_eq!(policy.grants.len(), 9);
    }

    #[test]
    fn test_route_names() {
        let names: Vec<String> = TopologyPolicy::default()
            .grants
            .iter()
            .map(|g| g.route_name())
            .collect();
        assert_eq!(
            names,
            vec![
                "mgmtPublicToDev",
                "mgmtPrivateToDev",
                "devPublicToMgmt",
                "devPrivateToMgmt",
                "devIsolatedToMgmt",
                "mgmtPublicToProd",
                "mgmtPrivateToProd",
                "prodPublicToMgmt",
                "prodPrivateToMgmt",
            ]
        );
    }

    #[test]
    fn test_production_development_never_peer() {
        let policy = TopologyPolicy::default();
        assert!(!policy.allows_peering(NetworkTier::Production, NetworkTier::Development));
        assert!(!policy.allows_peering(NetworkTier::Development, NetworkTier::Production));
        assert!(policy.allows_peering(NetworkTier::Production, NetworkTier::Management));
        assert!(!policy.allows_peering(NetworkTier::Management, NetworkTier::Management));
        for tier in SubnetTier::ALL {
            assert!(!policy.allows_route(&RouteGrant::new(
                NetworkTier::Production,
                tier,
                NetworkTier::Development
            )));
        }
    }

    #[test]
    fn test_production_isolated_denied() {
        let policy = TopologyPolicy::default();
        assert!(policy.is_denied(&PRODUCTION_ISOLATED_TO_MANAGEMENT));
        assert!(!policy.allows_route(&PRODUCTION_ISOLATED_TO_MANAGEMENT));
        // the development counterpart is granted
        assert!(policy.allows_route(&RouteGrant::new(
            NetworkTier::Development,
            SubnetTier::Isolated,
            NetworkTier::Management
        )));
    }

    #[test]
    fn test_validate_rejects_grant_without_peering() {
        let mut policy = TopologyPolicy::default();
        policy.grants.push(RouteGrant::new(
            NetworkTier::Production,
            SubnetTier::Private,
            NetworkTier::Development,
        ));
        assert!(matches!(
            policy.validate(),
            Err(TopologyError::RouteNotPermitted { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_production_development_peering() {
        let mut policy = TopologyPolicy::default();
        policy
            .peerings
            .push((NetworkTier::Production, NetworkTier::Development));
        assert!(!policy.allows_peering(NetworkTier::Production, NetworkTier::Development));
        assert!(matches!(
            policy.validate(),
            Err(TopologyError::PeeringNotPermitted { .. })
        ));

        // a grant across the pair is refused even with the peering listed
        let grant = RouteGrant::new(
            NetworkTier::Production,
            SubnetTier::Public,
            NetworkTier::Development,
        );
        policy.grants.push(grant);
        assert!(!policy.allows_route(&grant));
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_is_cross_pair() {
        assert!(is_cross_pair(NetworkTier::Production, NetworkTier::Development));
        assert!(is_cross_pair(NetworkTier::Development, NetworkTier::Production));
        assert!(!is_cross_pair(NetworkTier::Production, NetworkTier::Management));
        assert!(!is_cross_pair(NetworkTier::Development, NetworkTier::Management));
    }

    #[test]
    fn test_validate_rejects_granted_denial() {
        let mut policy = TopologyPolicy::default();
        policy.grants.push(PRODUCTION_ISOLATED_TO_MANAGEMENT);
        assert!(policy.validate().is_err());
    }
}
