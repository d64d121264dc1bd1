use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashSet};

use log::{debug, warn};
use serde::Serialize;

use crate::RouterId;
use crate::error::TopologyError;
use crate::network::Network;
use crate::protocol::identity::compare_router_ids;

/// Router ID to cumulative path cost. Unreachable routers hold `f64::INFINITY`.
pub type CostMap = BTreeMap<RouterId, f64>;

/// Relative tolerance under which two path costs count as equal.
pub const COST_EPSILON: f64 = 1e-9;

fn same_cost(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    a.is_finite() && b.is_finite() && (a - b).abs() <= COST_EPSILON * a.abs().max(b.abs())
}

#[derive(Debug)]
struct State {
    cost: f64,
    router: RouterId,
}

impl Eq for State {}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap, lowest router ID first on ties
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| compare_router_ids(&other.router, &self.router))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Costs and minimum-cost predecessors produced by one SPF run.
struct Spf {
    costs: CostMap,
    predecessors: BTreeMap<RouterId, Vec<RouterId>>,
}

/// Label-setting shortest path over the routers in `scope`. Edges leading
/// outside the scope are ignored. Equal-cost predecessors are accumulated.
fn run_spf<'s, F>(
    scope: impl IntoIterator<Item = &'s RouterId>,
    source: &str,
    mut neighbors: F,
) -> Spf
where
    F: FnMut(&str) -> Vec<(RouterId, f64)>,
{
    let mut costs: CostMap = scope
        .into_iter()
        .map(|id| (id.clone(), f64::INFINITY))
        .collect();
    let mut predecessors: BTreeMap<RouterId, Vec<RouterId>> = BTreeMap::new();
    let mut visited: HashSet<RouterId> = HashSet::new();
    let mut heap = BinaryHeap::new();

    costs.insert(source.to_string(), 0.0);
    heap.push(State {
        cost: 0.0,
        router: source.to_string(),
    });

    while let Some(State { cost, router }) = heap.pop() {
        // Stale heap entry, the router was settled through a cheaper path
        if !visited.insert(router.clone()) {
            continue;
        }

        for (neighbor, link_cost) in neighbors(&router) {
            if visited.contains(&neighbor) {
                continue;
            }
            let Some(current) = costs.get_mut(&neighbor) else {
                continue;
            };

            let new_cost = cost + link_cost;
            if same_cost(new_cost, *current) {
                let preds = predecessors.entry(neighbor).or_default();
                if !preds.contains(&router) {
                    preds.push(router.clone());
                }
            } else if new_cost < *current {
                *current = new_cost;
                predecessors.insert(neighbor.clone(), vec![router.clone()]);
                heap.push(State {
                    cost: new_cost,
                    router: neighbor,
                });
            }
        }
    }

    let unreachable = costs.values().filter(|c| c.is_infinite()).count();
    if unreachable > 0 {
        warn!("{} router(s) unreachable from {}", unreachable, source);
    }

    Spf {
        costs,
        predecessors,
    }
}

/// Shortest path costs from `start` over every router's local links across
/// the whole network.
pub fn dijkstra(network: &Network, start: &str) -> Result<CostMap, TopologyError> {
    if network.router(start).is_none() {
        return Err(TopologyError::UnknownRouter(start.to_string()));
    }

    let ids: Vec<RouterId> = network.routers().map(|r| r.id().to_string()).collect();
    let spf = run_spf(&ids, start, |id| {
        network
            .router(id)
            .map(|router| {
                router
                    .links()
                    .iter()
                    .map(|(neighbor, link)| (neighbor.clone(), link.cost()))
                    .collect()
            })
            .unwrap_or_default()
    });

    debug!("SPF from {} over {} routers (local links)", start, ids.len());
    Ok(spf.costs)
}

/// Shortest paths inside one area computed from the start router's LSDB,
/// keeping every predecessor that reaches a destination at minimum cost.
///
/// The start router's LSDB is the topology: it only sees what has been
/// flooded to it.
pub fn dijkstra_with_multi_path(
    network: &Network,
    start: &str,
    area_id: &str,
) -> Result<MultiPathResult, TopologyError> {
    let area = network.area(area_id)?;
    let source = network
        .router(start)
        .ok_or_else(|| TopologyError::UnknownRouter(start.to_string()))?;
    if !area.contains(start) {
        return Err(TopologyError::not_in_area(start, area_id));
    }

    let mut adjacency: BTreeMap<&str, Vec<(RouterId, f64)>> = BTreeMap::new();
    for lsa in source.lsdb().values().filter(|lsa| lsa.area_id == area_id) {
        adjacency
            .entry(lsa.advertising_router.as_str())
            .or_default()
            .push((lsa.link_id.clone(), lsa.cost));
    }

    let spf = run_spf(area.router_ids(), start, |id| {
        adjacency.get(id).cloned().unwrap_or_default()
    });

    debug!(
        "SPF from {} in area {} over {} advertising routers",
        start,
        area_id,
        adjacency.len()
    );
    Ok(MultiPathResult {
        source: start.to_string(),
        area_id: area_id.to_string(),
        costs: spf.costs,
        predecessors: spf.predecessors,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiPathResult {
    pub source: RouterId,
    pub area_id: String,
    pub costs: CostMap,
    pub predecessors: BTreeMap<RouterId, Vec<RouterId>>,
}

impl MultiPathResult {
    pub fn cost(&self, destination: &str) -> f64 {
        self.costs.get(destination).copied().unwrap_or(f64::INFINITY)
    }

    pub fn is_reachable(&self, destination: &str) -> bool {
        self.cost(destination).is_finite()
    }

    /// Immediate predecessors achieving the minimum cost, empty when the
    /// destination is the source or unreachable.
    pub fn predecessors(&self, destination: &str) -> &[RouterId] {
        self.predecessors
            .get(destination)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First hops out of the source on every minimum-cost path.
    pub fn next_hops(&self, destination: &str) -> Vec<RouterId> {
        let mut hops = BTreeSet::new();
        let mut seen = HashSet::new();
        let mut pending = vec![destination.to_string()];

        while let Some(router) = pending.pop() {
            if router == self.source || !seen.insert(router.clone()) {
                continue;
            }
            for pred in self.predecessors(&router) {
                if *pred == self.source {
                    hops.insert(router.clone());
                } else {
                    pending.push(pred.clone());
                }
            }
        }

        let mut hops: Vec<RouterId> = hops.into_iter().collect();
        hops.sort_by(|a, b| compare_router_ids(a, b));
        hops
    }

    /// Every minimum-cost path from the source to `destination`, each listed
    /// source first.
    pub fn paths(&self, destination: &str) -> Vec<Vec<RouterId>> {
        if destination == self.source {
            return vec![vec![self.source.clone()]];
        }

        let mut paths = Vec::new();
        for pred in self.predecessors(destination) {
            for mut path in self.paths(pred) {
                path.push(destination.to_string());
                paths.push(path);
            }
        }
        paths
    }
}
