use std::collections::{BTreeMap, VecDeque};
use std::f32::consts::TAU;

use glam::Vec3;

use super::{Agent, AgentFlags};
use crate::command::{AgentCommand, Outbox, SimEvent};
use crate::common::{AgentId, Countdown, MarkerId, planar_distance};
use crate::env::{Oracles, compute_seed};
use crate::schedule::{ActionQueue, DelayedAction};
use crate::sensors::{PlayerView, VisionResult};
use crate::sim::{Request, World};
use crate::zone::Escalation;

/// Everything a state may touch while handling one agent.
///
/// The agent is checked out of the arena for the duration, so `others` holds
/// every other agent read-only while `agent` and `world` are writable.
/// Cross-agent effects are queued as requests and applied after the agent
/// returns to the arena.
pub(crate) struct StateContext<'s> {
    pub agent: &'s mut Agent,
    pub world: &'s mut World,
    pub others: &'s BTreeMap<AgentId, Agent>,
    pub oracles: Oracles<'s>,
    outbox: &'s mut Outbox,
    requests: &'s mut VecDeque<Request>,
    actions: &'s mut ActionQueue,
    seed: u64,
    rolls: u32,
}

impl<'s> StateContext<'s> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        agent: &'s mut Agent,
        world: &'s mut World,
        others: &'s BTreeMap<AgentId, Agent>,
        oracles: Oracles<'s>,
        outbox: &'s mut Outbox,
        requests: &'s mut VecDeque<Request>,
        actions: &'s mut ActionQueue,
        seed: u64,
    ) -> Self {
        Self {
            agent,
            world,
            others,
            oracles,
            outbox,
            requests,
            actions,
            seed,
            rolls: 0,
        }
    }

    // ===== clock & perception =====

    pub fn dt(&self) -> f32 {
        self.world.clock.dt
    }

    pub fn now(&self) -> f32 {
        self.world.clock.time
    }

    pub fn player(&self) -> PlayerView {
        self.world.player
    }

    pub fn vision(&self) -> VisionResult {
        self.agent.vision
    }

    // ===== randomness =====

    pub fn next_seed(&mut self) -> u64 {
        self.rolls += 1;
        compute_seed(self.seed, self.world.clock.frame, self.agent.id.0, self.rolls)
    }

    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        let seed = self.next_seed();
        self.oracles.rng.range_f32(seed, min, max)
    }

    pub fn chance(&mut self, percent: u32) -> bool {
        let seed = self.next_seed();
        self.oracles.rng.chance(seed, percent)
    }

    // ===== outbox =====

    pub fn command(&mut self, command: AgentCommand) {
        self.outbox.command(command);
    }

    pub fn emit(&mut self, event: SimEvent) {
        self.outbox.event(event);
    }

    pub fn schedule(&mut self, delay: f32, action: DelayedAction) {
        let due = self.now() + delay;
        self.actions.schedule(due, action);
    }

    // ===== movement =====

    /// Issues a move after validating it against the zone's spacing claims.
    ///
    /// Returns false, issuing nothing, when another agent already claimed a
    /// target too close to `point`.
    pub fn move_to(&mut self, point: Vec3, face: Option<Vec3>) -> bool {
        let id = self.agent.id;
        let spacing = self.agent.config.move_spacing;
        if let Some(zone) = self.agent.zone.and_then(|zone| self.world.zones.get_mut(zone)) {
            if !zone.validate_move(id, point, spacing) {
                tracing::trace!(agent = %id, "move rejected by zone spacing");
                return false;
            }
            zone.add_move(id, point);
        }
        self.agent.destination = Some(point);
        self.command(AgentCommand::MoveTo {
            agent: id,
            point,
            face,
        });
        true
    }

    /// Issues a move that bypasses spacing validation but still registers the claim.
    pub fn force_move_to(&mut self, point: Vec3, face: Option<Vec3>) {
        let id = self.agent.id;
        if let Some(zone) = self.agent.zone.and_then(|zone| self.world.zones.get_mut(zone)) {
            zone.add_move(id, point);
        }
        self.agent.destination = Some(point);
        self.command(AgentCommand::ForceMoveTo {
            agent: id,
            point,
            face,
        });
    }

    pub fn stop(&mut self) {
        let id = self.agent.id;
        if let Some(zone) = self.agent.zone.and_then(|zone| self.world.zones.get_mut(zone)) {
            zone.clear_move(id);
        }
        if self.agent.destination.take().is_some() {
            self.command(AgentCommand::Stop { agent: id });
        }
    }

    pub fn rotate_to(&mut self, direction: Vec3) {
        let flat = Vec3::new(direction.x, 0.0, direction.z);
        if flat.length_squared() > f32::EPSILON {
            self.command(AgentCommand::RotateTo {
                agent: self.agent.id,
                direction: flat.normalize(),
            });
        }
    }

    pub fn face_point(&mut self, point: Vec3) {
        self.rotate_to(point - self.agent.body.position);
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.command(AgentCommand::SetSpeed {
            agent: self.agent.id,
            speed,
        });
    }

    /// True when there is no destination or it lies within stopping distance.
    pub fn has_reached(&self) -> bool {
        self.agent.destination.is_none_or(|destination| {
            planar_distance(self.agent.body.position, destination)
                <= self.agent.config.stopping_distance
        })
    }

    /// Heads for `point`, re-issuing the move only when the target drifted.
    ///
    /// Falls back to a nearby wander point when the spacing check rejects
    /// the exact target.
    pub fn steer_toward(&mut self, point: Vec3) -> bool {
        let repath = self.agent.config.repath_distance;
        if self
            .agent
            .destination
            .is_some_and(|destination| destination.distance(point) <= repath)
        {
            return true;
        }
        self.move_to(point, None) || self.wander_near(point)
    }

    /// Moves to a random navigable point around `center`.
    pub fn wander_near(&mut self, center: Vec3) -> bool {
        let radius = self.agent.config.wander_radius;
        for _ in 0..self.agent.config.wander_attempts {
            let angle = self.random_range(0.0, TAU);
            let distance = self.random_range(0.0, radius);
            let candidate = center + Vec3::new(angle.cos(), 0.0, angle.sin()) * distance;
            if self.oracles.navigation.is_navigable(candidate) && self.move_to(candidate, None) {
                return true;
            }
        }
        false
    }

    // ===== combat =====

    /// Fires at `target` if the manager grants permission and the weapon is ready.
    pub fn try_fire(&mut self, target: Vec3) -> bool {
        let id = self.agent.id;
        if !self.agent.flags.contains(AgentFlags::CAN_ATTACK)
            || !self.agent.body.weapon_ready
            || !self.world.manager.can_fire(id)
        {
            return false;
        }
        self.command(AgentCommand::Fire { agent: id, target });
        true
    }

    /// Starts the fear countdown and halts.
    ///
    /// A marker that already scared the agent is ignored until it has left
    /// the agent's view.
    pub fn start_fear(&mut self, marker: MarkerId) {
        if self.agent.fear.is_some() || self.agent.fear_source == Some(marker) {
            return;
        }
        tracing::debug!(agent = %self.agent.id, %marker, "fear marker sighted");
        self.agent.fear_source = Some(marker);
        self.agent.fear = Some(Countdown::new(self.agent.config.fear_time));
        self.stop();
    }

    // ===== coordination =====

    /// Escalates zone members around this agent (half-distance rule).
    ///
    /// Attention also spills into overlapping zones when the home zone
    /// allows crossing attention.
    pub fn alert_nearby(&mut self, level: Escalation, focus: Option<Vec3>) {
        let Some(home) = self.agent.zone else {
            return;
        };
        let origin = self.agent.body.position;
        let source = Some(self.agent.id);
        self.requests.push_back(Request::Radius {
            zone: home,
            origin,
            focus,
            level,
            source,
        });

        let crossing = self
            .world
            .zones
            .get(home)
            .is_some_and(|zone| zone.crossing_attention);
        if crossing && level == Escalation::Attention {
            let neighbours: Vec<_> = self
                .world
                .zones
                .containing(origin)
                .filter(|zone| *zone != home)
                .collect();
            for zone in neighbours {
                self.requests.push_back(Request::Radius {
                    zone,
                    origin,
                    focus,
                    level,
                    source,
                });
            }
        }
    }

    /// Escalates every member of this agent's zone.
    pub fn force_zone(&mut self, level: Escalation, focus: Option<Vec3>) {
        if let Some(zone) = self.agent.zone {
            self.requests.push_back(Request::Force {
                zone,
                focus,
                level,
                source: Some(self.agent.id),
            });
        }
    }

    pub fn raise_zone_alarm(&mut self) {
        if let Some(zone) = self.agent.zone.and_then(|zone| self.world.zones.get_mut(zone)) {
            zone.raise_alarm();
        }
    }
}
