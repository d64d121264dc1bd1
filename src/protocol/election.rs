//! Designated Router / Backup Designated Router election.

use std::cmp::Ordering;

use log::debug;

use crate::error::TopologyError;
use crate::network::{Network, Router};
use crate::protocol::identity::compare_router_ids;

/// Outcome of a DR/BDR election. Either role is empty when too few routers
/// took part.
#[derive(Debug, Clone, Copy, Default)]
pub struct Election<'a> {
    pub designated: Option<&'a Router>,
    pub backup: Option<&'a Router>,
}

impl<'a> Election<'a> {
    pub fn designated_id(&self) -> Option<&'a str> {
        self.designated.map(Router::id)
    }

    pub fn backup_id(&self) -> Option<&'a str> {
        self.backup.map(Router::id)
    }
}

/// Running election state: the current DR and BDR holders together with the
/// two highest priorities seen so far.
#[derive(Debug, Default)]
struct Ballot<'a> {
    dr: Option<&'a Router>,
    bdr: Option<&'a Router>,
    highest: Option<u8>,
    second: Option<u8>,
}

fn outranks(candidate: &Router, holder: &Router) -> bool {
    compare_router_ids(candidate.id(), holder.id()) == Ordering::Greater
}

impl<'a> Ballot<'a> {
    fn offer(&mut self, candidate: &'a Router) {
        let priority = Some(candidate.priority);
        let current = self.dr;

        match current {
            // Higher priority takes DR, the previous DR becomes backup.
            _ if priority > self.highest => {
                self.bdr = self.dr;
                self.dr = Some(candidate);
                self.second = self.highest;
                self.highest = priority;
            }
            // Same priority as the DR: router ID decides.
            Some(dr) if priority == self.highest => {
                if outranks(candidate, dr) {
                    self.bdr = Some(dr);
                    self.dr = Some(candidate);
                    self.second = priority;
                } else if self.bdr.is_none_or(|bdr| outranks(candidate, bdr)) {
                    self.bdr = Some(candidate);
                    self.second = priority;
                }
            }
            _ if priority > self.second => {
                self.bdr = Some(candidate);
                self.second = priority;
            }
            // Same priority as the BDR: router ID decides.
            _ if priority == self.second => {
                if self.bdr.is_some_and(|bdr| outranks(candidate, bdr)) {
                    self.bdr = Some(candidate);
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> Election<'a> {
        Election {
            designated: self.dr,
            backup: self.bdr,
        }
    }
}

/// Elects DR and BDR from `routers` in a single pass. Does not touch the
/// routers; running it twice on the same input gives the same result.
pub fn elect_dr_and_bdr<'a, I>(routers: I) -> Election<'a>
where
    I: IntoIterator<Item = &'a Router>,
{
    let mut ballot = Ballot::default();
    for router in routers {
        ballot.offer(router);
    }
    ballot.finish()
}

/// Runs the election over an area's members in router-ID order.
pub fn elect_area<'a>(network: &'a Network, area_id: &str) -> Result<Election<'a>, TopologyError> {
    let election = elect_dr_and_bdr(network.area_routers(area_id)?);
    debug!(
        "Area {} elected DR {:?} BDR {:?}",
        area_id,
        election.designated_id(),
        election.backup_id()
    );
    Ok(election)
}
