//! Link-state advertisements: origination from local links and flooding
//! through an area.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::Serialize;

use crate::error::TopologyError;
use crate::network::{Network, Router};
use crate::{AreaId, RouterId};

/// Identifies one advertisement inside an LSDB.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LsaKey {
    pub advertising_router: RouterId,
    pub link_id: RouterId,
}

/// One link as advertised by its originating router.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lsa {
    pub link_id: RouterId,
    pub advertising_router: RouterId,
    pub cost: f64,
    pub area_id: AreaId,
}

impl Lsa {
    pub fn key(&self) -> LsaKey {
        LsaKey {
            advertising_router: self.advertising_router.clone(),
            link_id: self.link_id.clone(),
        }
    }
}

/// Rebuilds the router's LSDB from its own links, one LSA per neighbor.
/// Anything previously learned is discarded.
pub fn generate_lsas(router: &mut Router) -> usize {
    let lsdb: BTreeMap<LsaKey, Lsa> = router
        .links()
        .iter()
        .map(|(neighbor, link)| Lsa {
            link_id: neighbor.clone(),
            advertising_router: router.id().to_string(),
            cost: link.cost(),
            area_id: router.area().to_string(),
        })
        .map(|lsa| (lsa.key(), lsa))
        .collect();

    let count = lsdb.len();
    debug!("Router {} originated {} LSAs", router.id(), count);
    router.replace_lsdb(lsdb);
    count
}

/// Runs [`generate_lsas`] on every router of the network.
pub fn generate_all(network: &mut Network) -> usize {
    network.routers_mut().map(generate_lsas).sum()
}

/// Copies every LSA of the area held by any member into every other member's
/// LSDB. The originator keeps its own copy untouched.
///
/// This is one synchronous sweep: all members must have generated their LSAs
/// beforehand, otherwise the result is a partial view. Returns the number of
/// LSDB entries that were added or changed.
pub fn flood_area(network: &mut Network, area_id: &str) -> Result<usize, TopologyError> {
    let members: Vec<RouterId> = network.area(area_id)?.router_ids().cloned().collect();

    let mut advertised: BTreeMap<LsaKey, Lsa> = BTreeMap::new();
    for router in members.iter().filter_map(|id| network.router(id)) {
        for lsa in router.lsdb().values().filter(|lsa| lsa.area_id == area_id) {
            if lsa.advertising_router == router.id() {
                // The originator's copy supersedes whatever others relayed.
                advertised.insert(lsa.key(), lsa.clone());
            } else {
                advertised.entry(lsa.key()).or_insert_with(|| lsa.clone());
            }
        }
    }

    let mut installed = 0;
    for id in &members {
        let router = network.router_mut(id)?;
        for lsa in advertised.values() {
            if lsa.advertising_router == router.id() {
                continue;
            }
            if router.install_lsa(lsa.clone()).as_ref() != Some(lsa) {
                installed += 1;
            }
        }
    }

    info!(
        "Flooded {} LSAs through area {} ({} routers, {} entries updated)",
        advertised.len(),
        area_id,
        members.len(),
        installed
    );
    Ok(installed)
}

/// True when every member of the area holds the same set of area LSAs.
pub fn is_converged(network: &Network, area_id: &str) -> Result<bool, TopologyError> {
    let views: Vec<Vec<&Lsa>> = network
        .area_routers(area_id)?
        .into_iter()
        .map(|router| {
            router
                .lsdb()
                .values()
                .filter(|lsa| lsa.area_id == area_id)
                .collect()
        })
        .collect();

    Ok(views.windows(2).all(|pair| pair[0] == pair[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A - B - C in a line plus D in another area linked to C.
    fn line_network() -> Network {
        let mut network = Network::new();
        for id in ["1.1.1.1", "2.2.2.2", "3.3.3.3"] {
            network.add_router(Router::new(id).with_id(id)).unwrap();
        }
        network
            .add_router(Router::new("d").with_id("4.4.4.4").with_area("1"))
            .unwrap();
        network.connect("1.1.1.1", "2.2.2.2", 100e6, None).unwrap();
        network.connect("2.2.2.2", "3.3.3.3", 10e6, None).unwrap();
        network.connect("3.3.3.3", "4.4.4.4", 1e6, None).unwrap();
        network
    }

    #[test]
    fn test_generate_one_lsa_per_link() {
        let mut network = line_network();
        let router = network.router_mut("2.2.2.2").unwrap();
        assert_eq!(generate_lsas(router), 2);

        let lsas: Vec<_> = router.lsdb().values().collect();
        assert_eq!(lsas[0].link_id, "1.1.1.1");
        assert_eq!(lsas[0].cost, 1.0);
        assert_eq!(lsas[1].link_id, "3.3.3.3");
        assert_eq!(lsas[1].cost, 10.0);
        assert!(lsas.iter().all(|lsa| lsa.advertising_router == "2.2.2.2"));
        assert!(lsas.iter().all(|lsa| lsa.area_id == "0"));
    }

    #[test]
    fn test_generate_is_idempotent() {
        let mut network = line_network();
        let router = network.router_mut("1.1.1.1").unwrap();
        generate_lsas(router);
        let first = router.lsdb().clone();
        generate_lsas(router);
        assert_eq!(&first, router.lsdb());
    }

    #[test]
    fn test_generate_discards_learned_entries() {
        let mut network = line_network();
        generate_all(&mut network);
        flood_area(&mut network, "0").unwrap();
        let router = network.router_mut("1.1.1.1").unwrap();
        assert!(router.lsdb().len() > 1);

        generate_lsas(router);
        assert_eq!(router.lsdb().len(), 1);
    }

    #[test]
    fn test_flood_converges_area() {
        let mut network = line_network();
        assert_eq!(generate_all(&mut network), 6);
        assert!(!is_converged(&network, "0").unwrap());

        flood_area(&mut network, "0").unwrap();
        assert!(is_converged(&network, "0").unwrap());

        // Every link originated in area 0 is known everywhere in area 0.
        for router in network.area_routers("0").unwrap() {
            let keys: Vec<_> = router
                .lsdb()
                .keys()
                .map(|k| (k.advertising_router.as_str(), k.link_id.as_str()))
                .collect();
            assert_eq!(
                keys,
                [
                    ("1.1.1.1", "2.2.2.2"),
                    ("2.2.2.2", "1.1.1.1"),
                    ("2.2.2.2", "3.3.3.3"),
                    ("3.3.3.3", "2.2.2.2"),
                    ("3.3.3.3", "4.4.4.4"),
                ]
            );
        }
    }

    #[test]
    fn test_flood_stays_inside_area() {
        let mut network = line_network();
        generate_all(&mut network);
        flood_area(&mut network, "0").unwrap();

        let outsider = network.router("4.4.4.4").unwrap();
        assert_eq!(outsider.lsdb().len(), 1);
        assert!(outsider.lsdb().values().all(|lsa| lsa.area_id == "1"));
    }

    #[test]
    fn test_second_flood_changes_nothing() {
        let mut network = line_network();
        generate_all(&mut network);
        assert!(flood_area(&mut network, "0").unwrap() > 0);
        assert_eq!(flood_area(&mut network, "0").unwrap(), 0);
    }

    #[test]
    fn test_partial_generation_gives_partial_view() {
        let mut network = line_network();
        generate_lsas(network.router_mut("1.1.1.1").unwrap());
        flood_area(&mut network, "0").unwrap();

        let far = network.router("3.3.3.3").unwrap();
        assert_eq!(far.lsdb().len(), 1);
        assert!(far.lsdb().contains_key(&LsaKey {
            advertising_router: "1.1.1.1".into(),
            link_id: "2.2.2.2".into(),
        }));
    }

    #[test]
    fn test_regenerated_lsa_replaces_relayed_copy() {
        let mut network = line_network();
        generate_all(&mut network);
        flood_area(&mut network, "0").unwrap();

        network.connect("1.1.1.1", "2.2.2.2", 1e9, None).unwrap();
        generate_lsas(network.router_mut("1.1.1.1").unwrap());
        flood_area(&mut network, "0").unwrap();

        let key = LsaKey {
            advertising_router: "1.1.1.1".into(),
            link_id: "2.2.2.2".into(),
        };
        for router in network.area_routers("0").unwrap() {
            let cost = router.lsdb().get(&key).map(|lsa| lsa.cost);
            assert!(cost.is_some_and(|c| (c - 0.1).abs() < 1e-12));
        }
    }

    #[test]
    fn test_flood_unknown_area() {
        let mut network = line_network();
        assert_eq!(
            flood_area(&mut network, "9"),
            Err(TopologyError::UnknownArea("9".into()))
        );
    }
}
