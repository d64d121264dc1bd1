//! Error types for topology construction and path computation.

use thiserror::Error;

use crate::{AreaId, RouterId};

/// Precondition violations detected while building or querying a topology.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    /// Link bandwidth must be a positive, finite number of bits per second.
    #[error("invalid bandwidth {bandwidth} on link to {target}")]
    InvalidBandwidth { target: RouterId, bandwidth: f64 },

    #[error("router {0} cannot link to itself")]
    SelfLink(RouterId),

    /// The router has no usable ID (no ID configured and no addresses).
    #[error("router '{0}' has no resolved router ID")]
    UnresolvedIdentity(String),

    #[error("router {0} already exists")]
    DuplicateRouter(RouterId),

    #[error("unknown router {0}")]
    UnknownRouter(RouterId),

    #[error("unknown area {0}")]
    UnknownArea(AreaId),

    #[error("router {router} is not a member of area {area}")]
    NotInArea { router: RouterId, area: AreaId },

    #[error("invalid address '{0}'")]
    InvalidAddress(String),
}

impl TopologyError {
    pub fn invalid_bandwidth(target: impl Into<RouterId>, bandwidth: f64) -> Self {
        Self::InvalidBandwidth {
            target: target.into(),
            bandwidth,
        }
    }

    pub fn not_in_area(router: impl Into<RouterId>, area: impl Into<AreaId>) -> Self {
        Self::NotInArea {
            router: router.into(),
            area: area.into(),
        }
    }
}
