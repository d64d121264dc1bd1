use std::collections::BTreeMap;

use ipnet::Ipv4Net;
use serde::Serialize;

use crate::RouterId;
use crate::algorithms::dijkstra::MultiPathResult;
use crate::network::Network;

#[derive(Debug, Clone, Serialize)]
pub struct RoutingTable {
    pub source: RouterId,
    entries: BTreeMap<RouterId, RoutingEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingEntry {
    pub destination: RouterId,
    pub cost: f64,
    pub next_hops: Vec<RouterId>,
    /// Subnets of the source's links towards each next hop.
    pub networks: Vec<Ipv4Net>,
    pub route_type: RouteType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RouteType {
    /// Destination is itself one of the next hops.
    Direct,
    Internal,
}

impl RoutingTable {
    pub fn new(source: impl Into<RouterId>) -> Self {
        Self {
            source: source.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Builds the table of the SPF source: one entry per reachable router.
    pub fn from_spf(network: &Network, spf: &MultiPathResult) -> Self {
        let mut table = Self::new(spf.source.clone());
        let source = network.router(&spf.source);

        for (destination, &cost) in &spf.costs {
            if *destination == spf.source || !cost.is_finite() {
                continue;
            }

            let next_hops = spf.next_hops(destination);
            let networks = next_hops
                .iter()
                .filter_map(|hop| source.and_then(|r| r.link(hop)))
                .filter_map(|link| link.network)
                .collect();
            let route_type = if next_hops.contains(destination) {
                RouteType::Direct
            } else {
                RouteType::Internal
            };

            table.add_route(RoutingEntry {
                destination: destination.clone(),
                cost,
                next_hops,
                networks,
                route_type,
            });
        }

        table
    }

    pub fn add_route(&mut self, entry: RoutingEntry) {
        self.entries.insert(entry.destination.clone(), entry);
    }

    pub fn get_route(&self, destination: &str) -> Option<&RoutingEntry> {
        self.entries.get(destination)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in destination order.
    pub fn iter(&self) -> impl Iterator<Item = &RoutingEntry> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::algorithms::dijkstra::dijkstra_with_multi_path;
    use crate::network::Router;
    use crate::protocol::lsa::{flood_area, generate_all};

    fn net(text: &str) -> Option<Ipv4Net> {
        Some(text.parse().unwrap())
    }

    #[test]
    fn test_routes_from_triangle() {
        let mut network = Network::new();
        for id in ["1.1.1.1", "2.2.2.2", "3.3.3.3", "4.4.4.4"] {
            network.add_router(Router::new(id).with_id(id)).unwrap();
        }
        network.connect("1.1.1.1", "2.2.2.2", 100e6, net("10.1.1.0/24")).unwrap();
        network.connect("2.2.2.2", "3.3.3.3", 10e6, net("10.1.2.0/24")).unwrap();
        network.connect("1.1.1.1", "3.3.3.3", 1e6, net("10.1.3.0/24")).unwrap();
        generate_all(&mut network);
        flood_area(&mut network, "0").unwrap();

        let spf = dijkstra_with_multi_path(&network, "1.1.1.1", "0").unwrap();
        let table = RoutingTable::from_spf(&network, &spf);

        // 4.4.4.4 is isolated and the source has no route to itself.
        assert_eq!(table.len(), 2);
        assert!(table.get_route("4.4.4.4").is_none());

        let to_b = table.get_route("2.2.2.2").unwrap();
        assert_eq!(to_b.route_type, RouteType::Direct);
        assert_eq!(to_b.networks, vec!["10.1.1.0/24".parse::<Ipv4Net>().unwrap()]);

        let to_c = table.get_route("3.3.3.3").unwrap();
        assert_eq!(to_c.route_type, RouteType::Internal);
        assert_eq!(to_c.next_hops, ["2.2.2.2".to_string()]);
        assert_eq!(to_c.networks, to_b.networks);
        assert!((to_c.cost - 11.0).abs() < 1e-9);

        let order: Vec<_> = table.iter().map(|e| e.destination.as_str()).collect();
        assert_eq!(order, ["2.2.2.2", "3.3.3.3"]);
    }
}
