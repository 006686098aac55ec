//! Save records for a running simulation.
//!
//! A snapshot captures runtime state only. Static level data (zone bounds,
//! cover positions, path nodes, markers) is rebuilt from the level layout,
//! then [`Simulation::restore`] overlays the snapshot on top.

use std::collections::BTreeSet;

use glam::Vec3;

use super::Simulation;
use crate::agent::{Agent, AgentBody, AgentFlags, AgentState, IdleState, SpawnPoint};
use crate::command::AgentCommand;
use crate::common::{AgentId, Clock, CoverId, Countdown, MarkerId, PathId, ZoneId};
use crate::config::AiConfig;
use crate::error::RestoreError;
use crate::manager::ManagerRecord;
use crate::patrol::PatrolCursor;
use crate::schedule::ScheduledAction;
use crate::sensors::{PlayerView, Sensors, VisionResult};

/// Everything needed to rebuild one agent exactly.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentRecord {
    pub id: AgentId,
    pub body: AgentBody,
    pub flags: AgentFlags,
    pub health: f32,
    /// Missing states restore as Idle.
    pub state: Option<AgentState>,
    pub zone: Option<ZoneId>,
    pub patrol: Option<PathId>,
    pub cover_group: u32,
    pub spawn: SpawnPoint,
    pub last_seen_player: Option<Vec3>,
    pub fear: Option<Countdown>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub fear_source: Option<MarkerId>,
    pub destination: Option<Vec3>,
    /// Perception memory (last sighting, debounced noise level).
    pub sensors: Sensors,
    pub config: AiConfig,
}

impl AgentRecord {
    fn capture(agent: &Agent) -> Self {
        Self {
            id: agent.id,
            body: agent.body,
            flags: agent.flags,
            health: agent.health,
            state: Some(agent.state),
            zone: agent.zone,
            patrol: agent.patrol,
            cover_group: agent.cover_group,
            spawn: agent.spawn,
            last_seen_player: agent.last_seen_player,
            fear: agent.fear,
            fear_source: agent.fear_source,
            destination: agent.destination,
            sensors: agent.sensors,
            config: agent.config.clone(),
        }
    }

    fn rebuild(self) -> Agent {
        let state = self.state.unwrap_or_else(|| {
            tracing::warn!(agent = %self.id, "save record has no state, restoring as idle");
            AgentState::Idle(IdleState::new(&self.config))
        });
        Agent {
            id: self.id,
            body: self.body,
            config: self.config,
            health: self.health,
            flags: self.flags,
            state,
            zone: self.zone,
            patrol: self.patrol,
            cover_group: self.cover_group,
            spawn: self.spawn,
            last_seen_player: self.last_seen_player,
            fear: self.fear,
            fear_source: self.fear_source,
            sensors: self.sensors,
            vision: VisionResult::default(),
            destination: self.destination,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimSnapshot {
    pub clock: Clock,
    pub next_agent: u32,
    pub player: PlayerView,
    pub agents: Vec<AgentRecord>,
    pub zone_alarms: Vec<(ZoneId, f32)>,
    pub covers_taken: Vec<CoverId>,
    pub inactive_markers: Vec<MarkerId>,
    pub path_cursors: Vec<(PathId, PatrolCursor)>,
    /// Fire permissions, periodic check timers and grenade cooldowns.
    pub manager: ManagerRecord,
    pub actions: Vec<ScheduledAction>,
}

impl Simulation {
    pub fn snapshot(&self) -> SimSnapshot {
        let world = &self.world;
        SimSnapshot {
            clock: world.clock,
            next_agent: self.next_agent,
            player: world.player,
            agents: self.agents.values().map(AgentRecord::capture).collect(),
            zone_alarms: world
                .zones
                .iter()
                .filter(|zone| zone.alarm() > 0.0)
                .map(|zone| (zone.id, zone.alarm()))
                .collect(),
            covers_taken: world
                .covers
                .iter()
                .filter(|slot| slot.is_taken())
                .map(|slot| slot.id)
                .collect(),
            inactive_markers: world
                .markers
                .iter()
                .filter(|marker| !marker.active)
                .map(|marker| marker.id)
                .collect(),
            path_cursors: world
                .paths
                .iter()
                .map(|path| (path.id, path.cursor()))
                .collect(),
            manager: world.manager.record(),
            actions: self.actions.pending().to_vec(),
        }
    }

    /// Replaces all runtime state with `snapshot`.
    ///
    /// Every handle is validated first; on error nothing has changed.
    pub fn restore(&mut self, snapshot: SimSnapshot) -> Result<(), RestoreError> {
        self.validate(&snapshot)?;

        let world = &mut self.world;
        for zone in world.zones.iter_mut() {
            zone.reset_runtime();
        }
        world.covers.free_all();
        let markers: Vec<MarkerId> = world.markers.iter().map(|marker| marker.id).collect();
        for id in markers {
            if let Some(marker) = world.markers.get_mut(id) {
                marker.active = !snapshot.inactive_markers.contains(&id);
            }
        }

        self.agents.clear();
        for record in snapshot.agents {
            let agent = record.rebuild();
            let id = agent.id;
            if agent.is_alive() {
                if let Some(zone) = agent.zone.and_then(|zone| world.zones.get_mut(zone)) {
                    zone.add_ai(id);
                    if let Some(destination) = agent.destination {
                        zone.add_move(id, destination);
                    }
                }
            }
            self.agents.insert(id, agent);
        }

        for cover in snapshot.covers_taken {
            world.covers.take(cover);
        }
        for (zone, alarm) in snapshot.zone_alarms {
            if let Some(zone) = world.zones.get_mut(zone) {
                zone.set_alarm(alarm);
            }
        }
        for (path, cursor) in snapshot.path_cursors {
            if let Some(path) = world.paths.get_mut(path) {
                path.set_cursor(cursor);
            }
        }
        world.manager.restore_record(snapshot.manager, &self.agents);
        world.clock = snapshot.clock;
        world.player = snapshot.player;

        self.next_agent = snapshot.next_agent;
        self.actions.restore(snapshot.actions);
        self.outbox.clear();
        self.requests.clear();
        self.resync_bodies();

        tracing::info!(
            agents = self.agents.len(),
            frame = self.world.clock.frame,
            "simulation restored"
        );
        Ok(())
    }

    /// Asks the host to put every live body back where the save left it and
    /// to resume any walk that was in progress.
    fn resync_bodies(&mut self) {
        for agent in self.agents.values().filter(|agent| agent.is_alive()) {
            self.outbox.command(AgentCommand::Warp {
                agent: agent.id,
                point: agent.body.position,
            });
            if let Some(point) = agent.destination {
                self.outbox.command(AgentCommand::ForceMoveTo {
                    agent: agent.id,
                    point,
                    face: None,
                });
            }
        }
    }

    fn validate(&self, snapshot: &SimSnapshot) -> Result<(), RestoreError> {
        let world = &self.world;
        let mut seen = BTreeSet::new();
        for record in &snapshot.agents {
            if !seen.insert(record.id) {
                return Err(RestoreError::DuplicateAgent(record.id));
            }
            if let Some(zone) = record.zone {
                if !world.zones.contains_id(zone) {
                    return Err(RestoreError::UnknownZone(zone));
                }
            }
            if let Some(path) = record.patrol {
                if !world.paths.contains(path) {
                    return Err(RestoreError::UnknownPath(path));
                }
            }
            if let Some(AgentState::Cover(cover)) = record.state {
                if !world.covers.contains(cover.slot()) {
                    return Err(RestoreError::UnknownCover(cover.slot()));
                }
            }
        }
        if let Some((zone, _)) = snapshot
            .zone_alarms
            .iter()
            .find(|(zone, _)| !world.zones.contains_id(*zone))
        {
            return Err(RestoreError::UnknownZone(*zone));
        }
        if let Some(cover) = snapshot
            .covers_taken
            .iter()
            .find(|cover| !world.covers.contains(**cover))
        {
            return Err(RestoreError::UnknownCover(*cover));
        }
        if let Some(marker) = snapshot
            .inactive_markers
            .iter()
            .find(|marker| world.markers.get(**marker).is_none())
        {
            return Err(RestoreError::UnknownMarker(*marker));
        }
        if let Some((path, _)) = snapshot
            .path_cursors
            .iter()
            .find(|(path, _)| !world.paths.contains(*path))
        {
            return Err(RestoreError::UnknownPath(*path));
        }
        Ok(())
    }
}
