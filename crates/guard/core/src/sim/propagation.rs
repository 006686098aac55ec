//! Cross-agent escalation requests queued by states and flushed by the simulation.

use glam::Vec3;

use super::Simulation;
use crate::agent::machine;
use crate::common::{AgentId, ZoneId};
use crate::env::Oracles;
use crate::zone::{Escalation, within_propagation_range};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Request {
    /// Escalates zone members within propagation range of `origin`.
    Radius {
        zone: ZoneId,
        origin: Vec3,
        focus: Option<Vec3>,
        level: Escalation,
        source: Option<AgentId>,
    },
    /// Escalates every member of the zone.
    Force {
        zone: ZoneId,
        focus: Option<Vec3>,
        level: Escalation,
        source: Option<AgentId>,
    },
}

impl Simulation {
    /// Applies queued requests until the queue drains or the cap is reached.
    ///
    /// Escalated agents may queue further requests of their own; those are
    /// processed in the same flush. Returns the number of requests dropped.
    pub(super) fn flush_requests(&mut self, oracles: Oracles<'_>) -> usize {
        let limit = self.config.zone.propagation_limit;
        let mut processed = 0;
        while let Some(request) = self.requests.pop_front() {
            if processed >= limit {
                let dropped = self.requests.len() + 1;
                self.requests.clear();
                tracing::warn!(dropped, limit, "propagation flush reached its cap");
                return dropped;
            }
            processed += 1;
            self.apply_request(request, oracles);
        }
        0
    }

    fn apply_request(&mut self, request: Request, oracles: Oracles<'_>) {
        let (zone, focus, level, targets) = match request {
            Request::Radius {
                zone,
                origin,
                focus,
                level,
                source,
            } => (zone, focus, level, self.radius_targets(zone, origin, source)),
            Request::Force {
                zone,
                focus,
                level,
                source,
            } => (zone, focus, level, self.zone_targets(zone, source)),
        };

        if level == Escalation::Aggression {
            if let Some(zone) = self.world.zones.get_mut(zone) {
                zone.raise_alarm();
            }
        }

        tracing::debug!(%zone, ?level, targets = targets.len(), "zone escalation");
        for target in targets {
            self.with_agent(target, oracles, |ctx| machine::escalate(ctx, level, focus));
        }
    }

    fn zone_targets(&self, zone: ZoneId, source: Option<AgentId>) -> Vec<AgentId> {
        let Some(zone) = self.world.zones.get(zone) else {
            return Vec::new();
        };
        zone.roster()
            .iter()
            .copied()
            .filter(|id| Some(*id) != source)
            .filter(|id| self.agents.get(id).is_some_and(|agent| agent.is_active()))
            .collect()
    }

    fn radius_targets(&self, zone: ZoneId, origin: Vec3, source: Option<AgentId>) -> Vec<AgentId> {
        self.zone_targets(zone, source)
            .into_iter()
            .filter(|id| {
                self.agents.get(id).is_some_and(|agent| {
                    within_propagation_range(
                        agent.body.position.distance(origin),
                        agent.config.hearing_radius,
                    )
                })
            })
            .collect()
    }
}
