pub mod algorithms;
pub mod config;
pub mod error;
pub mod network;
pub mod protocol;

pub use algorithms::dijkstra::{CostMap, MultiPathResult, dijkstra, dijkstra_with_multi_path};
pub use error::TopologyError;
pub use network::{Area, Link, Network, Router};
pub use protocol::{Lsa, LsaKey, RoutingTable};

pub type RouterId = String;
pub type AreaId = String;

/// Area used when a router is configured without one.
pub const BACKBONE_AREA: &str = "0";
