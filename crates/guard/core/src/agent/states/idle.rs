//! Idle: patrol or hold the spawn point while watching for the player.

use glam::Vec3;

use crate::agent::context::StateContext;
use crate::agent::state::{AgentState, StateBehavior, Transition};
use crate::command::SimEvent;
use crate::common::{Countdown, planar_distance};
use crate::config::AiConfig;
use crate::patrol::{PathNode, PatrolPath};
use crate::sensors::SoundStimulus;

use super::{AttentionState, SleepState};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdleState {
    /// Drains while the player is visible, refills while not.
    spot: Countdown,
    /// Natural nap; absent when the agent never dozes off.
    sleep: Option<Countdown>,
    waypoint: Option<PathNode>,
    dwell: Option<Countdown>,
    /// Standing at the spawn point facing the spawn direction.
    settled: bool,
}

impl IdleState {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            spot: Countdown::new(config.player_spot_wait_time),
            sleep: config.sleep_wait_time.map(Countdown::new),
            waypoint: None,
            dwell: None,
            settled: false,
        }
    }

    pub fn waypoint(&self) -> Option<&PathNode> {
        self.waypoint.as_ref()
    }

    /// Forgets the current patrol target, e.g. after a path reassignment.
    pub fn clear_waypoint(&mut self) {
        self.waypoint = None;
        self.dwell = None;
    }

    fn patrol(&mut self, ctx: &mut StateContext<'_>) {
        let Some(path) = ctx.agent.patrol else {
            self.hold_spawn(ctx);
            return;
        };

        if self.waypoint.is_none() {
            match ctx.world.paths.next(path) {
                Some(step) => {
                    if step.switched_from(path) {
                        ctx.agent.patrol = Some(step.path);
                    }
                    self.waypoint = Some(step.node);
                    self.dwell = None;
                    self.settled = false;
                }
                None => {
                    // An exhausted path keeps the agent on the node it ended at.
                    let last = ctx.world.paths.get(path).and_then(PatrolPath::current).copied();
                    match last {
                        Some(node) => self.hold(ctx, node.position, node.direction),
                        None => self.hold_spawn(ctx),
                    }
                    return;
                }
            }
        }

        let Some(node) = self.waypoint else {
            return;
        };
        let stopping = ctx.agent.config.stopping_distance;
        if planar_distance(ctx.agent.body.position, node.position) > stopping {
            ctx.steer_toward(node.position);
            return;
        }

        let dt = ctx.dt();
        match &mut self.dwell {
            None => {
                ctx.stop();
                ctx.rotate_to(node.direction);
                self.dwell = Some(Countdown::new(node.wait_time));
            }
            Some(dwell) => {
                if dwell.tick(dt) {
                    self.clear_waypoint();
                }
            }
        }
    }

    fn hold_spawn(&mut self, ctx: &mut StateContext<'_>) {
        let spawn = ctx.agent.spawn;
        self.hold(ctx, spawn.position, spawn.direction);
    }

    /// Walks back to `position` if pushed off it, then stands facing `direction`.
    fn hold(&mut self, ctx: &mut StateContext<'_>, position: Vec3, direction: Vec3) {
        if planar_distance(ctx.agent.body.position, position) > ctx.agent.config.stopping_distance {
            self.settled = false;
            ctx.steer_toward(position);
        } else if !self.settled {
            ctx.stop();
            ctx.rotate_to(direction);
            self.settled = true;
        }
    }
}

impl StateBehavior for IdleState {
    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        *self = Self::new(&ctx.agent.config);
        ctx.set_speed(ctx.agent.config.walk_speed);
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) -> Transition {
        let dt = ctx.dt();
        let vision = ctx.vision();

        if let Some(marker) = vision.attention_point {
            if ctx.world.markers.deactivate(marker) {
                let focus = ctx.world.markers.get(marker).map(|marker| marker.position);
                ctx.emit(SimEvent::MarkerConsumed {
                    agent: ctx.agent.id,
                    marker,
                });
                // Entering Attention propagates the alert to nearby agents.
                ctx.agent.last_seen_player = focus;
                return Transition::Switch(AgentState::Attention(AttentionState::new()));
            }
        }

        if let Some(marker) = vision.fear_point {
            ctx.start_fear(marker);
        }

        if vision.player_visible {
            if self.spot.tick(dt) {
                ctx.agent.last_seen_player = Some(ctx.player().position);
                return Transition::Switch(AgentState::Attention(AttentionState::new()));
            }
        } else {
            self.spot.recover(dt);
        }

        if let Some(sleep) = &mut self.sleep {
            if sleep.tick(dt) {
                return Transition::Switch(AgentState::Sleep(SleepState::new(1.0)));
            }
        }

        if !ctx.agent.in_fear() {
            self.patrol(ctx);
        }
        Transition::Stay
    }

    fn on_sound(&mut self, ctx: &mut StateContext<'_>, stimulus: &SoundStimulus) -> Transition {
        ctx.agent.last_seen_player = Some(stimulus.position);
        Transition::Switch(AgentState::Attention(AttentionState::new()))
    }
}
