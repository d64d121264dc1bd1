mod link;
mod router;

pub use link::{Link, REFERENCE_BANDWIDTH, calculate_cost};
pub use router::{DEFAULT_PRIORITY, Router};

use std::collections::{BTreeMap, BTreeSet};

use ipnet::Ipv4Net;
use log::debug;

use crate::error::TopologyError;
use crate::{AreaId, RouterId};

/// A partition of routers scoping flooding and multi-path SPF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    pub id: AreaId,
    routers: BTreeSet<RouterId>,
}

impl Area {
    pub fn new(id: impl Into<AreaId>) -> Self {
        Self {
            id: id.into(),
            routers: BTreeSet::new(),
        }
    }

    pub fn contains(&self, router_id: &str) -> bool {
        self.routers.contains(router_id)
    }

    /// Member router IDs in ascending order.
    pub fn router_ids(&self) -> impl Iterator<Item = &RouterId> {
        self.routers.iter()
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }
}

/// Every router of the simulation, plus the area partition over them.
#[derive(Debug, Clone, Default)]
pub struct Network {
    routers: BTreeMap<RouterId, Router>,
    areas: BTreeMap<AreaId, Area>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a router and registers it in its area, creating the area on
    /// first use. The router ID must already be resolved.
    pub fn add_router(&mut self, router: Router) -> Result<(), TopologyError> {
        if !router.has_id() {
            return Err(TopologyError::UnresolvedIdentity(router.name.clone()));
        }
        if self.routers.contains_key(router.id()) {
            return Err(TopologyError::DuplicateRouter(router.id().to_string()));
        }

        debug!(
            "Adding router {} ({}) to area {}",
            router.id(),
            router.name,
            router.area()
        );
        self.areas
            .entry(router.area().to_string())
            .or_insert_with(|| Area::new(router.area()))
            .routers
            .insert(router.id().to_string());
        self.routers.insert(router.id().to_string(), router);
        Ok(())
    }

    /// Adds a one-way link `from -> to`.
    pub fn add_link(
        &mut self,
        from: &str,
        to: &str,
        bandwidth: f64,
        network: Option<Ipv4Net>,
    ) -> Result<(), TopologyError> {
        if !self.routers.contains_key(to) {
            return Err(TopologyError::UnknownRouter(to.to_string()));
        }
        let link = Link::new(to, bandwidth, network)?;
        self.router_mut(from)?.add_link(link)?;
        Ok(())
    }

    /// Adds the link in both directions with the same bandwidth and subnet.
    pub fn connect(
        &mut self,
        a: &str,
        b: &str,
        bandwidth: f64,
        network: Option<Ipv4Net>,
    ) -> Result<(), TopologyError> {
        self.add_link(a, b, bandwidth, network)?;
        self.add_link(b, a, bandwidth, network)
    }

    pub fn router(&self, id: &str) -> Option<&Router> {
        self.routers.get(id)
    }

    pub(crate) fn router_mut(&mut self, id: &str) -> Result<&mut Router, TopologyError> {
        self.routers
            .get_mut(id)
            .ok_or_else(|| TopologyError::UnknownRouter(id.to_string()))
    }

    pub fn router_by_name(&self, name: &str) -> Option<&Router> {
        self.routers.values().find(|router| router.name == name)
    }

    /// Routers in ascending ID order.
    pub fn routers(&self) -> impl Iterator<Item = &Router> {
        self.routers.values()
    }

    pub(crate) fn routers_mut(&mut self) -> impl Iterator<Item = &mut Router> {
        self.routers.values_mut()
    }

    pub fn router_count(&self) -> usize {
        self.routers.len()
    }

    pub fn area(&self, id: &str) -> Result<&Area, TopologyError> {
        self.areas
            .get(id)
            .ok_or_else(|| TopologyError::UnknownArea(id.to_string()))
    }

    pub fn areas(&self) -> impl Iterator<Item = &Area> {
        self.areas.values()
    }

    /// Member routers of an area in ascending ID order.
    pub fn area_routers(&self, area_id: &str) -> Result<Vec<&Router>, TopologyError> {
        let area = self.area(area_id)?;
        Ok(area
            .router_ids()
            .filter_map(|id| self.routers.get(id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network_with(ids: &[(&str, &str)]) -> Network {
        let mut network = Network::new();
        for (id, area) in ids {
            network
                .add_router(Router::new(*id).with_id(*id).with_area(*area))
                .unwrap();
        }
        network
    }

    #[test]
    fn test_add_router_registers_area() {
        let network = network_with(&[("1.1.1.1", "0"), ("2.2.2.2", "0"), ("3.3.3.3", "1")]);
        assert_eq!(network.router_count(), 3);
        assert_eq!(network.area("0").unwrap().len(), 2);
        assert!(network.area("1").unwrap().contains("3.3.3.3"));
        assert_eq!(network.area("2"), Err(TopologyError::UnknownArea("2".into())));
    }

    #[test]
    fn test_add_router_rejects_unresolved_and_duplicate() {
        let mut network = network_with(&[("1.1.1.1", "0")]);
        assert_eq!(
            network.add_router(Router::new("nameless")),
            Err(TopologyError::UnresolvedIdentity("nameless".into()))
        );
        assert_eq!(
            network.add_router(Router::new("again").with_id("1.1.1.1")),
            Err(TopologyError::DuplicateRouter("1.1.1.1".into()))
        );
    }

    #[test]
    fn test_connect_adds_both_directions() {
        let mut network = network_with(&[("1.1.1.1", "0"), ("2.2.2.2", "0")]);
        let subnet: Ipv4Net = "10.1.1.0/24".parse().unwrap();
        network.connect("1.1.1.1", "2.2.2.2", 100e6, Some(subnet)).unwrap();

        let forward = network.router("1.1.1.1").unwrap().link("2.2.2.2").unwrap();
        let reverse = network.router("2.2.2.2").unwrap().link("1.1.1.1").unwrap();
        assert_eq!(forward.network, Some(subnet));
        assert_eq!(reverse.cost(), 1.0);
    }

    #[test]
    fn test_add_link_validates_endpoints() {
        let mut network = network_with(&[("1.1.1.1", "0")]);
        assert_eq!(
            network.add_link("1.1.1.1", "9.9.9.9", 1e6, None),
            Err(TopologyError::UnknownRouter("9.9.9.9".into()))
        );
        assert_eq!(
            network.add_link("9.9.9.9", "1.1.1.1", 1e6, None),
            Err(TopologyError::UnknownRouter("9.9.9.9".into()))
        );
        assert!(matches!(
            network.add_link("1.1.1.1", "1.1.1.1", 0.0, None),
            Err(TopologyError::InvalidBandwidth { .. })
        ));
    }

    #[test]
    fn test_area_routers_sorted() {
        let network = network_with(&[("3.3.3.3", "0"), ("1.1.1.1", "0"), ("2.2.2.2", "0")]);
        let ids: Vec<_> = network
            .area_routers("0")
            .unwrap()
            .into_iter()
            .map(|r| r.id())
            .collect();
        assert_eq!(ids, ["1.1.1.1", "2.2.2.2", "3.3.3.3"]);
    }
}
