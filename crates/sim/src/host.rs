//! A minimal kinematic host: walks agents in straight lines toward their
//! movement targets and moves the player along a scripted route.

use std::collections::BTreeMap;

use glam::Vec3;
use guard_core::{AgentCommand, AgentId, PlayerView, Simulation};

/// Walking speed used until the core sends a `SetSpeed`.
const DEFAULT_SPEED: f32 = 1.5;
const ARRIVAL_EPSILON: f32 = 0.01;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CombatTally {
    pub shots: u32,
    pub grenades: u32,
    pub strikes: u32,
}

#[derive(Debug, Default)]
pub struct KinematicHost {
    targets: BTreeMap<AgentId, Vec3>,
    tally: CombatTally,
}

impl KinematicHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tally(&self) -> CombatTally {
        self.tally
    }

    /// Applies drained commands to agent bodies.
    pub fn apply(&mut self, sim: &mut Simulation, commands: &[AgentCommand]) {
        for command in commands {
            let id = command.agent();
            match *command {
                AgentCommand::MoveTo { point, .. } | AgentCommand::ForceMoveTo { point, .. } => {
                    self.targets.insert(id, point);
                }
                AgentCommand::Stop { .. } => {
                    self.targets.remove(&id);
                }
                AgentCommand::Warp { point, .. } => {
                    self.targets.remove(&id);
                    if let Some(agent) = sim.agent_mut(id) {
                        agent.body.position = point;
                    }
                }
                AgentCommand::RotateTo { direction, .. } => {
                    if let Some(agent) = sim.agent_mut(id) {
                        agent.body.forward = direction.normalize_or(agent.body.forward);
                    }
                }
                AgentCommand::SetSpeed { speed, .. } => {
                    if let Some(agent) = sim.agent_mut(id) {
                        agent.body.speed = speed;
                    }
                }
                AgentCommand::Fire { target, .. } => {
                    self.tally.shots += 1;
                    tracing::debug!(agent = %id, ?target, "fire");
                }
                AgentCommand::ThrowGrenade { target, .. } => {
                    self.tally.grenades += 1;
                    tracing::debug!(agent = %id, ?target, "grenade thrown");
                }
                AgentCommand::Melee { .. } => {
                    self.tally.strikes += 1;
                }
            }
        }
    }

    /// Advances every walking agent by `dt` seconds.
    pub fn step(&mut self, sim: &mut Simulation, dt: f32) {
        self.targets.retain(|id, target| {
            let Some(agent) = sim.agent_mut(*id) else {
                return false;
            };
            if !agent.is_active() {
                return false;
            }
            let offset = *target - agent.body.position;
            let distance = offset.length();
            if distance <= ARRIVAL_EPSILON {
                agent.body.position = *target;
                return false;
            }
            let speed = if agent.body.speed > 0.0 {
                agent.body.speed
            } else {
                DEFAULT_SPEED
            };
            let direction = offset / distance;
            agent.body.position += direction * (speed * dt).min(distance);
            agent.body.forward = direction;
            true
        });
    }
}

/// The player walking a looped route at constant speed.
#[derive(Debug, Clone)]
pub struct ScriptedPlayer {
    route: Vec<Vec3>,
    next: usize,
    speed: f32,
    /// Length of one full loop.
    lap: f32,
    view: PlayerView,
}

impl ScriptedPlayer {
    pub fn new(route: Vec<Vec3>, speed: f32) -> Self {
        let start = route.first().copied().unwrap_or(Vec3::ZERO);
        let lap = route
            .iter()
            .zip(route.iter().cycle().skip(1))
            .map(|(from, to)| from.distance(*to))
            .sum();
        Self {
            next: usize::from(route.len() > 1),
            lap,
            route,
            speed,
            view: PlayerView::standing(start),
        }
    }

    pub fn view(&self) -> PlayerView {
        self.view
    }

    pub fn step(&mut self, dt: f32) -> PlayerView {
        if self.lap <= f32::EPSILON {
            return self.view;
        }
        let mut budget = self.speed * dt;
        while budget > 0.0 {
            let target = self.route[self.next];
            let offset = target - self.view.position;
            let distance = offset.length();
            if distance <= budget {
                self.view.position = target;
                budget -= distance;
                self.next = (self.next + 1) % self.route.len();
            } else {
                self.view.position += offset / distance * budget;
                budget = 0.0;
            }
        }
        self.view
    }
}
