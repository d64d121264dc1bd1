use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use log::debug;

use crate::error::TopologyError;
use crate::network::Link;
use crate::protocol::identity::determine_router_id;
use crate::protocol::{Lsa, LsaKey};
use crate::{AreaId, BACKBONE_AREA, RouterId};

/// Default OSPF router priority.
pub const DEFAULT_PRIORITY: u8 = 1;

/// A simulated router. ID and area are fixed by the builder methods; once the
/// router is in a [`Network`](crate::Network) both are index keys and cannot
/// be changed from outside the crate.
///
/// ```compile_fail
/// use ospf_sim::{Network, Router};
///
/// let mut network = Network::new();
/// network.add_router(Router::new("r1").with_id("1.1.1.1")).unwrap();
/// network.router_mut("1.1.1.1").unwrap().area = "7".to_string();
/// ```
#[derive(Debug, Clone)]
pub struct Router {
    id: RouterId,
    pub name: String,
    pub loopbacks: Vec<Ipv4Addr>,
    pub interfaces: Vec<Ipv4Addr>,
    area: AreaId,
    pub priority: u8,
    links: BTreeMap<RouterId, Link>,
    lsdb: BTreeMap<LsaKey, Lsa>,
}

impl Router {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RouterId::new(),
            name: name.into(),
            loopbacks: Vec::new(),
            interfaces: Vec::new(),
            area: BACKBONE_AREA.to_string(),
            priority: DEFAULT_PRIORITY,
            links: BTreeMap::new(),
            lsdb: BTreeMap::new(),
        }
    }

    pub fn with_loopbacks(mut self, loopbacks: impl IntoIterator<Item = Ipv4Addr>) -> Self {
        self.loopbacks = loopbacks.into_iter().collect();
        self
    }

    pub fn with_interfaces(mut self, interfaces: impl IntoIterator<Item = Ipv4Addr>) -> Self {
        self.interfaces = interfaces.into_iter().collect();
        self
    }

    pub fn with_area(mut self, area: impl Into<AreaId>) -> Self {
        self.area = area.into();
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Pins the router ID instead of deriving it from addresses.
    pub fn with_id(mut self, id: impl Into<RouterId>) -> Self {
        self.id = id.into();
        self
    }

    /// Derives the router ID from the configured addresses. Leaves the ID
    /// empty when the router has no address at all.
    pub fn resolve_id(mut self) -> Self {
        self.id = determine_router_id(&self.loopbacks, &self.interfaces);
        debug!("Router {} resolved ID '{}'", self.name, self.id);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn area(&self) -> &str {
        &self.area
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// Adds or replaces the adjacency towards `link.target`.
    pub fn add_link(&mut self, link: Link) -> Result<Option<Link>, TopologyError> {
        if link.target == self.id {
            return Err(TopologyError::SelfLink(self.id.clone()));
        }
        Ok(self.links.insert(link.target.clone(), link))
    }

    pub fn link(&self, neighbor: &str) -> Option<&Link> {
        self.links.get(neighbor)
    }

    pub fn links(&self) -> &BTreeMap<RouterId, Link> {
        &self.links
    }

    pub fn lsdb(&self) -> &BTreeMap<LsaKey, Lsa> {
        &self.lsdb
    }

    pub(crate) fn replace_lsdb(&mut self, lsdb: BTreeMap<LsaKey, Lsa>) {
        self.lsdb = lsdb;
    }

    pub(crate) fn install_lsa(&mut self, lsa: Lsa) -> Option<Lsa> {
        self.lsdb.insert(lsa.key(), lsa)
    }
}
