use std::collections::HashMap;
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

use anyhow::{Context, Result, bail};
use ipnet::Ipv4Net;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::TopologyError;
use crate::network::{DEFAULT_PRIORITY, Network, Router};
use crate::protocol::identity::parse_address;
use crate::{AreaId, BACKBONE_AREA, RouterId};

/// JSON description of a simulated topology.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub routers: Vec<RouterConfig>,
    #[serde(default)]
    pub links: Vec<LinkConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    pub name: String,
    /// Pinned router ID; derived from the addresses when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_id: Option<RouterId>,
    #[serde(default)]
    pub loopbacks: Vec<Ipv4Addr>,
    #[serde(default)]
    pub interfaces: Vec<Ipv4Addr>,
    #[serde(default = "default_area")]
    pub area: AreaId,
    #[serde(default = "default_priority")]
    pub priority: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Router name (or router ID) at each end.
    pub from: String,
    pub to: String,
    pub bandwidth: f64, // bits per second
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Ipv4Net>,
    #[serde(default = "default_bidirectional")]
    pub bidirectional: bool,
}

fn default_area() -> AreaId {
    BACKBONE_AREA.to_string()
}

fn default_priority() -> u8 {
    DEFAULT_PRIORITY
}

fn default_bidirectional() -> bool {
    true
}

impl RouterConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            router_id: None,
            loopbacks: Vec::new(),
            interfaces: Vec::new(),
            area: default_area(),
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn to_router(&self) -> Result<Router, TopologyError> {
        let router = Router::new(self.name.clone())
            .with_loopbacks(self.loopbacks.iter().copied())
            .with_interfaces(self.interfaces.iter().copied())
            .with_area(self.area.clone())
            .with_priority(self.priority);

        let router = match &self.router_id {
            Some(id) => router.with_id(parse_address(id)?.to_string()),
            None => router.resolve_id(),
        };

        if !router.has_id() {
            return Err(TopologyError::UnresolvedIdentity(self.name.clone()));
        }
        Ok(router)
    }
}

impl LinkConfig {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        bandwidth: f64,
        network: Option<Ipv4Net>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            bandwidth,
            network,
            bidirectional: true,
        }
    }
}

impl TopologyConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading topology {}", path.display()))?;
        let config: TopologyConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing topology {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("writing topology {}", path.display()))?;
        Ok(())
    }

    /// Three routers in one area: A pinned to 1.1.1.1, B identified by its
    /// loopback, C by its highest interface. Links of 100, 10 and 1 Mbps
    /// form a triangle.
    pub fn sample() -> Self {
        let subnet = |c: u8| Some(Ipv4Net::new_assert(Ipv4Addr::new(10, 1, c, 0), 24));

        let mut a = RouterConfig::new("A");
        a.router_id = Some("1.1.1.1".to_string());
        a.loopbacks = vec![Ipv4Addr::new(192, 168, 0, 1)];
        a.interfaces = vec![Ipv4Addr::new(10, 1, 1, 1), Ipv4Addr::new(172, 16, 1, 1)];
        a.priority = 10;

        let mut b = RouterConfig::new("B");
        b.loopbacks = vec![Ipv4Addr::new(192, 168, 0, 2)];
        b.interfaces = vec![Ipv4Addr::new(10, 1, 1, 2)];
        b.priority = 5;

        let mut c = RouterConfig::new("C");
        c.interfaces = vec![Ipv4Addr::new(10, 1, 1, 3), Ipv4Addr::new(172, 16, 1, 3)];
        c.priority = 1;

        Self {
            routers: vec![a, b, c],
            links: vec![
                LinkConfig::new("A", "B", 100e6, subnet(1)),
                LinkConfig::new("B", "C", 10e6, subnet(2)),
                LinkConfig::new("A", "C", 1e6, subnet(3)),
            ],
        }
    }

    /// Resolves router IDs and builds the network with every link.
    pub fn build_network(&self) -> Result<Network> {
        let mut network = Network::new();
        let mut ids: HashMap<&str, RouterId> = HashMap::new();

        for config in &self.routers {
            if ids.contains_key(config.name.as_str()) {
                bail!("duplicate router name '{}'", config.name);
            }
            let router = config
                .to_router()
                .with_context(|| format!("router '{}'", config.name))?;
            ids.insert(&config.name, router.id().to_string());
            network
                .add_router(router)
                .with_context(|| format!("router '{}'", config.name))?;
        }

        for link in &self.links {
            let from = resolve_end(&ids, &network, &link.from)?;
            let to = resolve_end(&ids, &network, &link.to)?;
            let result = if link.bidirectional {
                network.connect(&from, &to, link.bandwidth, link.network)
            } else {
                network.add_link(&from, &to, link.bandwidth, link.network)
            };
            result.with_context(|| format!("link {} -> {}", link.from, link.to))?;
        }

        info!(
            "Built network with {} routers in {} areas",
            network.router_count(),
            network.areas().count()
        );
        Ok(network)
    }
}

/// A link end names a configured router, or gives its router ID directly.
fn resolve_end(ids: &HashMap<&str, RouterId>, network: &Network, end: &str) -> Result<RouterId> {
    match ids.get(end) {
        Some(id) => Ok(id.clone()),
        None if network.router(end).is_some() => Ok(end.to_string()),
        None => Err(TopologyError::UnknownRouter(end.to_string()).into()),
    }
}
