use ipnet::Ipv4Net;
use serde::Serialize;

use crate::RouterId;
use crate::error::TopologyError;

/// Reference bandwidth in bits per second (Cisco default, 100 Mbps).
pub const REFERENCE_BANDWIDTH: f64 = 1e8;

/// Interface cost for a link of the given bandwidth in bps.
pub fn calculate_cost(bandwidth: f64) -> f64 {
    REFERENCE_BANDWIDTH / bandwidth
}

/// Directed adjacency from the owning router towards `target`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub target: RouterId,
    bandwidth: f64, // bits per second, always > 0
    pub network: Option<Ipv4Net>,
}

impl Link {
    pub fn new(
        target: impl Into<RouterId>,
        bandwidth: f64,
        network: Option<Ipv4Net>,
    ) -> Result<Self, TopologyError> {
        let target = target.into();
        if !bandwidth.is_finite() || bandwidth <= 0.0 {
            return Err(TopologyError::invalid_bandwidth(target, bandwidth));
        }

        Ok(Self {
            target,
            bandwidth,
            network,
        })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn cost(&self) -> f64 {
        calculate_cost(self.bandwidth)
    }
}
