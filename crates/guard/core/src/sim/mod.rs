//! The simulation context: agent arena, shared world and the per-frame tick.
//!
//! Everything that used to be global (the manager, the zone registry) lives
//! here, so several independent simulations can coexist.
mod damage;
mod persistence;
mod propagation;

use std::collections::{BTreeMap, VecDeque};

use glam::Vec3;

use crate::agent::{Agent, AgentFlags, AgentSpawn, AgentState, StateContext, StateKind, machine};
use crate::command::{AgentCommand, Outbox, SimEvent};
use crate::common::{AgentId, Clock, CoverId, MarkerId, PathId, ZoneId, planar_distance};
use crate::config::SimConfig;
use crate::cover::CoverSlots;
use crate::env::{Oracles, SimEnv, compute_seed};
use crate::error::SimulationError;
use crate::manager::{AiStatus, Manager};
use crate::markers::{MarkerKind, Markers};
use crate::patrol::{PathNode, PatrolPaths, WrapMode};
use crate::schedule::{ActionQueue, DelayedAction};
use crate::sensors::{PlayerView, SoundStimulus};
use crate::zone::{Escalation, Zone, ZoneBounds, ZoneRegistry};

pub use damage::{Damage, DamageKind, DamageOutcome};
pub use persistence::{AgentRecord, SimSnapshot};
pub(crate) use propagation::Request;

/// Shared state every agent reads and some of it writes during a tick.
#[derive(Clone, Debug)]
pub struct World {
    pub clock: Clock,
    pub player: PlayerView,
    pub zones: ZoneRegistry,
    pub covers: CoverSlots,
    pub paths: PatrolPaths,
    pub markers: Markers,
    pub manager: Manager,
}

impl World {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            clock: Clock::default(),
            player: PlayerView::default(),
            zones: ZoneRegistry::new(),
            covers: CoverSlots::new(),
            paths: PatrolPaths::new(),
            markers: Markers::new(),
            manager: Manager::new(config.manager.clone()),
        }
    }
}

/// Summary of one [`Simulation::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    pub frame: u64,
    pub time: f32,
    /// Agents whose state machine ran this tick.
    pub updated: usize,
    /// Cross-agent requests discarded because a flush hit its cap.
    pub dropped_requests: usize,
    pub status: AiStatus,
}

pub struct Simulation {
    config: SimConfig,
    world: World,
    agents: BTreeMap<AgentId, Agent>,
    next_agent: u32,
    actions: ActionQueue,
    outbox: Outbox,
    requests: VecDeque<Request>,
    /// Contexts opened this frame; salts per-context random streams.
    contexts: u32,
}

impl Simulation {
    const CONTEXT_SUBJECT: u32 = u32::MAX - 1;

    pub fn new(config: SimConfig) -> Self {
        Self {
            world: World::new(&config),
            config,
            agents: BTreeMap::new(),
            next_agent: 0,
            actions: ActionQueue::new(),
            outbox: Outbox::default(),
            requests: VecDeque::new(),
            contexts: 0,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn clock(&self) -> Clock {
        self.world.clock
    }

    // ===== level setup =====

    pub fn add_zone(&mut self, name: impl Into<String>, bounds: ZoneBounds) -> ZoneId {
        self.world.zones.add(name, bounds)
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.world.zones.get(id)
    }

    pub fn zone_mut(&mut self, id: ZoneId) -> Option<&mut Zone> {
        self.world.zones.get_mut(id)
    }

    pub fn add_cover(&mut self, position: Vec3, group: u32, stay_range: (f32, f32)) -> CoverId {
        self.world.covers.add(position, group, stay_range)
    }

    pub fn add_path(
        &mut self,
        name: impl Into<String>,
        nodes: Vec<PathNode>,
        wrap: WrapMode,
    ) -> PathId {
        self.world.paths.add(name, nodes, wrap)
    }

    pub fn add_marker(
        &mut self,
        kind: MarkerKind,
        position: Vec3,
        owner: Option<AgentId>,
    ) -> MarkerId {
        self.world.markers.add(kind, position, owner)
    }

    pub fn set_marker_active(&mut self, id: MarkerId, active: bool) -> Result<(), SimulationError> {
        let marker = self
            .world
            .markers
            .get_mut(id)
            .ok_or(SimulationError::UnknownMarker(id))?;
        marker.active = active;
        Ok(())
    }

    // ===== agents =====

    /// Registers a new agent with the manager and its zone.
    ///
    /// The zone is the one named by the spawn, or else the first zone whose
    /// bounds contain the spawn point.
    pub fn spawn_agent(&mut self, spawn: AgentSpawn) -> Result<AgentId, SimulationError> {
        if let Some(zone) = spawn.zone {
            if !self.world.zones.contains_id(zone) {
                return Err(SimulationError::UnknownZone(zone));
            }
        }
        if let Some(path) = spawn.patrol {
            if !self.world.paths.contains(path) {
                return Err(SimulationError::UnknownPath(path));
            }
        }

        let id = AgentId(self.next_agent);
        self.next_agent += 1;

        let config = spawn
            .config
            .clone()
            .unwrap_or_else(|| self.config.agent.clone());
        let mut agent = Agent::new(id, &spawn, config);
        agent.zone = spawn
            .zone
            .or_else(|| self.world.zones.containing(spawn.position).next());
        if let Some(zone) = agent.zone.and_then(|zone| self.world.zones.get_mut(zone)) {
            zone.add_ai(id);
        }
        self.world.manager.register(id);
        self.world.manager.request_attack_order();

        tracing::info!(agent = %id, zone = ?agent.zone, "agent spawned");
        self.agents.insert(id, agent);
        Ok(id)
    }

    /// Removes an agent entirely, releasing everything it held.
    pub fn despawn_agent(&mut self, id: AgentId) -> Result<Agent, SimulationError> {
        let agent = self
            .agents
            .remove(&id)
            .ok_or(SimulationError::UnknownAgent(id))?;
        if let Some(zone) = agent.zone.and_then(|zone| self.world.zones.get_mut(zone)) {
            zone.remove_ai(id);
        }
        if let AgentState::Cover(cover) = agent.state {
            if !cover.is_released() {
                self.world.covers.free(cover.slot());
            }
        }
        self.world.manager.unregister(id);
        self.actions.cancel_agent(id);
        tracing::info!(agent = %id, "agent despawned");
        Ok(agent)
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// Mutable access for the host to mirror body feedback.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    fn agent_entry(&mut self, id: AgentId) -> Result<&mut Agent, SimulationError> {
        self.agents
            .get_mut(&id)
            .ok_or(SimulationError::UnknownAgent(id))
    }

    pub fn set_ragdoll(&mut self, id: AgentId, ragdoll: bool) -> Result<(), SimulationError> {
        let agent = self.agent_entry(id)?;
        agent.flags.set(AgentFlags::RAGDOLL, ragdoll);
        Ok(())
    }

    pub fn set_enabled(&mut self, id: AgentId, enabled: bool) -> Result<(), SimulationError> {
        let agent = self.agent_entry(id)?;
        agent.flags.set(AgentFlags::ENABLED, enabled);
        self.world.manager.request_attack_order();
        Ok(())
    }

    /// Gives an agent a new patrol path (or none), restarting that path.
    pub fn assign_path(&mut self, id: AgentId, path: Option<PathId>) -> Result<(), SimulationError> {
        if !self.agents.contains_key(&id) {
            return Err(SimulationError::UnknownAgent(id));
        }
        if let Some(path) = path {
            self.world
                .paths
                .get_mut(path)
                .ok_or(SimulationError::UnknownPath(path))?
                .reset_path();
        }
        let agent = self.agent_entry(id)?;
        agent.patrol = path;
        if let AgentState::Idle(idle) = &mut agent.state {
            idle.clear_waypoint();
        }
        Ok(())
    }

    pub fn set_player(&mut self, player: PlayerView) {
        self.world.player = player;
    }

    pub fn player(&self) -> PlayerView {
        self.world.player
    }

    // ===== per-frame =====

    /// Checks an agent out of the arena and runs `f` with a context over it.
    fn with_agent<T>(
        &mut self,
        id: AgentId,
        oracles: Oracles<'_>,
        f: impl FnOnce(&mut StateContext<'_>) -> T,
    ) -> Option<T> {
        let mut agent = self.agents.remove(&id)?;
        self.contexts = self.contexts.wrapping_add(1);
        let seed = compute_seed(
            self.config.seed,
            self.world.clock.frame,
            Self::CONTEXT_SUBJECT,
            self.contexts,
        );
        let output = {
            let mut ctx = StateContext::new(
                &mut agent,
                &mut self.world,
                &self.agents,
                oracles,
                &mut self.outbox,
                &mut self.requests,
                &mut self.actions,
                seed,
            );
            f(&mut ctx)
        };
        self.agents.insert(id, agent);
        Some(output)
    }

    fn is_updatable(&self, id: AgentId) -> bool {
        self.agents
            .get(&id)
            .is_some_and(|agent| agent.is_active() && !agent.is_ragdoll())
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Order: clock, manager (grenades, attack order, closest agent), zone
    /// alarm decay, due delayed actions, then every active agent in id order
    /// with cross-agent requests flushed after each one.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Oracle`] when `env` lacks an oracle.
    pub fn tick(&mut self, env: &SimEnv<'_>, dt: f32) -> Result<TickReport, SimulationError> {
        let oracles = env.resolve()?;
        self.world.clock.advance(dt);
        self.contexts = 0;

        self.world.manager.tick(
            &self.world.clock,
            &self.agents,
            &self.world.player,
            oracles.sight,
            oracles.rng,
            self.config.seed,
        );
        self.world
            .zones
            .decay_all(dt, self.config.zone.alarm_cooldown);
        self.fire_due_actions();

        let ids: Vec<AgentId> = self.agents.keys().copied().collect();
        let mut updated = 0;
        let mut dropped_requests = 0;
        for id in ids {
            if !self.is_updatable(id) {
                continue;
            }
            self.with_agent(id, oracles, machine::update);
            updated += 1;
            dropped_requests += self.flush_requests(oracles);
        }

        Ok(TickReport {
            frame: self.world.clock.frame,
            time: self.world.clock.time,
            updated,
            dropped_requests,
            status: self.ai_status(),
        })
    }

    fn fire_due_actions(&mut self) {
        let now = self.world.clock.time;
        for action in self.actions.drain_due(now) {
            match action {
                DelayedAction::Melee {
                    agent,
                    reach,
                    damage,
                } => {
                    let target = self.world.player.position;
                    let lands = self.agents.get(&agent).is_some_and(|attacker| {
                        attacker.is_active()
                            && !attacker.is_ragdoll()
                            && attacker.state_kind() != StateKind::Sleep
                            && planar_distance(attacker.body.position, target) <= reach
                    });
                    if lands {
                        tracing::debug!(agent = %agent, damage, "melee strike landed");
                        self.outbox.command(AgentCommand::Melee { agent, target });
                        self.outbox.event(SimEvent::PlayerStruck { agent, damage });
                    }
                }
            }
        }
    }

    /// Dispatches a sound to every agent of every zone containing it.
    ///
    /// Agents without a zone always listen.
    pub fn emit_sound(
        &mut self,
        env: &SimEnv<'_>,
        stimulus: SoundStimulus,
    ) -> Result<(), SimulationError> {
        let oracles = env.resolve()?;
        let zones: Vec<ZoneId> = self.world.zones.containing(stimulus.position).collect();
        let listeners: Vec<AgentId> = self
            .agents
            .values()
            .filter(|agent| agent.is_active() && !agent.is_ragdoll())
            .filter(|agent| agent.zone.is_none_or(|zone| zones.contains(&zone)))
            .map(|agent| agent.id)
            .collect();

        tracing::trace!(listeners = listeners.len(), loud = stimulus.loud, "sound emitted");
        for id in listeners {
            self.with_agent(id, oracles, |ctx| machine::hear(ctx, &stimulus));
            self.flush_requests(oracles);
        }
        Ok(())
    }

    pub fn drain_commands(&mut self) -> Vec<AgentCommand> {
        self.outbox.drain_commands()
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.outbox.drain_events()
    }

    // ===== queries =====

    pub fn ai_status(&self) -> AiStatus {
        self.world.manager.ai_status(&self.agents, &self.world.zones)
    }

    pub fn closest_agent(&self) -> Option<AgentId> {
        self.world.manager.closest()
    }

    pub fn can_fire(&self, id: AgentId) -> bool {
        self.world.manager.can_fire(id)
    }

    pub fn can_throw(&self) -> bool {
        self.world.manager.can_throw()
    }

    // ===== zone coordination =====

    /// Escalates zone members within propagation range of `position` to Aggression.
    pub fn zone_aggression(
        &mut self,
        env: &SimEnv<'_>,
        zone: ZoneId,
        position: Vec3,
    ) -> Result<(), SimulationError> {
        self.zone_escalation(env, zone, position, Escalation::Aggression)
    }

    /// Escalates zone members within propagation range of `position` to Attention.
    pub fn zone_attention(
        &mut self,
        env: &SimEnv<'_>,
        zone: ZoneId,
        position: Vec3,
    ) -> Result<(), SimulationError> {
        self.zone_escalation(env, zone, position, Escalation::Attention)
    }

    fn zone_escalation(
        &mut self,
        env: &SimEnv<'_>,
        zone: ZoneId,
        position: Vec3,
        level: Escalation,
    ) -> Result<(), SimulationError> {
        let oracles = env.resolve()?;
        if !self.world.zones.contains_id(zone) {
            return Err(SimulationError::UnknownZone(zone));
        }
        self.requests.push_back(Request::Radius {
            zone,
            origin: position,
            focus: Some(position),
            level,
            source: None,
        });
        self.flush_requests(oracles);
        Ok(())
    }

    pub fn force_zone_aggression(
        &mut self,
        env: &SimEnv<'_>,
        zone: ZoneId,
    ) -> Result<(), SimulationError> {
        self.force_zone(env, zone, Escalation::Aggression)
    }

    pub fn force_zone_attention(
        &mut self,
        env: &SimEnv<'_>,
        zone: ZoneId,
    ) -> Result<(), SimulationError> {
        self.force_zone(env, zone, Escalation::Attention)
    }

    fn force_zone(
        &mut self,
        env: &SimEnv<'_>,
        zone: ZoneId,
        level: Escalation,
    ) -> Result<(), SimulationError> {
        let oracles = env.resolve()?;
        if !self.world.zones.contains_id(zone) {
            return Err(SimulationError::UnknownZone(zone));
        }
        self.requests.push_back(Request::Force {
            zone,
            focus: None,
            level,
            source: None,
        });
        self.flush_requests(oracles);
        Ok(())
    }

    /// Overwrites every roster member's last seen player position.
    pub fn propagate_player_position(
        &mut self,
        zone: ZoneId,
        position: Vec3,
    ) -> Result<(), SimulationError> {
        let roster = self
            .world
            .zones
            .get(zone)
            .ok_or(SimulationError::UnknownZone(zone))?
            .roster()
            .to_vec();
        for id in roster {
            if let Some(agent) = self.agents.get_mut(&id) {
                agent.last_seen_player = Some(position);
            }
        }
        Ok(())
    }
}
