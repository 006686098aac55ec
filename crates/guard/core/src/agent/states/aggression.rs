//! Aggression: chase, strafe and shoot; fall back to searching when the
//! player is lost.

use glam::Vec3;

use crate::agent::AgentFlags;
use crate::agent::context::StateContext;
use crate::agent::state::{AgentState, StateBehavior, Transition};
use crate::command::AgentCommand;
use crate::common::{Countdown, planar_distance};
use crate::schedule::DelayedAction;
use crate::sensors::SoundStimulus;

use super::{CoverState, IdleState};

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggressionState {
    /// Time left searching before relaxing back to Idle.
    relax: Countdown,
    strafe: Countdown,
    melee: Countdown,
    /// +1 or -1: side of the next strafe step.
    strafe_side: f32,
    /// Rolled on entry; resolved on the first update.
    cover_pending: bool,
}

impl Default for AggressionState {
    fn default() -> Self {
        Self {
            relax: Countdown::default(),
            strafe: Countdown::default(),
            melee: Countdown::default(),
            strafe_side: 1.0,
            cover_pending: false,
        }
    }
}

impl AggressionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wants_cover(&self) -> bool {
        self.cover_pending
    }

    fn seek_cover(&mut self, ctx: &mut StateContext<'_>) -> Option<CoverState> {
        self.cover_pending = false;
        let target = ctx.agent.last_seen_player?;
        let slot = ctx.world.covers.get_cover(
            ctx.agent.body.position,
            target,
            ctx.agent.config.cover_search_distance,
            ctx.agent.cover_group,
            ctx.oracles.navigation,
        )?;
        Some(CoverState::new(slot))
    }

    fn strafe(&mut self, ctx: &mut StateContext<'_>, target: Vec3) {
        if !self.strafe.tick(ctx.dt()) {
            return;
        }
        self.strafe.reset();

        let position = ctx.agent.body.position;
        let toward = Vec3::new(target.x - position.x, 0.0, target.z - position.z).normalize_or_zero();
        let lateral = toward.cross(Vec3::Y) * ctx.agent.config.strafe_distance * self.strafe_side;
        self.strafe_side = -self.strafe_side;
        ctx.move_to(position + lateral, Some(target));
    }

    fn maybe_throw(&mut self, ctx: &mut StateContext<'_>, target: Vec3, distance: f32) {
        let config = &ctx.agent.config;
        if !ctx.agent.flags.contains(AgentFlags::CAN_THROW_GRENADES)
            || distance < config.grenade_min_distance
            || !ctx.world.manager.can_throw()
        {
            return;
        }
        let percent = config.grenade_chance;
        if ctx.chance(percent) && ctx.world.manager.throw() {
            tracing::debug!(agent = %ctx.agent.id, "grenade thrown");
            ctx.command(AgentCommand::ThrowGrenade {
                agent: ctx.agent.id,
                target,
            });
        }
    }
}

impl StateBehavior for AggressionState {
    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        let config = &ctx.agent.config;
        self.relax = Countdown::new(config.aggression_wait_time);
        self.strafe = Countdown::new(config.strafe_interval);
        self.melee = Countdown::expired(config.melee_cooldown);
        let cover_chance = config.cover_chance;
        let run_speed = config.run_speed;

        self.cover_pending = ctx.chance(cover_chance);
        ctx.raise_zone_alarm();
        ctx.set_speed(run_speed);
        if let Some(focus) = ctx.agent.last_seen_player {
            ctx.steer_toward(focus);
        }
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) -> Transition {
        let dt = ctx.dt();
        let vision = ctx.vision();

        if let Some(marker) = vision.fear_point {
            ctx.start_fear(marker);
        }
        if ctx.agent.in_fear() {
            return Transition::Stay;
        }

        if self.cover_pending {
            if let Some(cover) = self.seek_cover(ctx) {
                return Transition::Switch(AgentState::Cover(cover));
            }
        }

        self.melee.tick(dt);

        if vision.player_visible {
            let player = ctx.player();
            let target = player.position;
            ctx.agent.last_seen_player = Some(target);
            self.relax.reset();
            ctx.raise_zone_alarm();
            ctx.face_point(target);

            let config = &ctx.agent.config;
            let (optimal, melee_range, melee_delay, melee_damage) = (
                config.optimal_shooting_distance,
                config.melee_range,
                config.melee_delay,
                config.melee_damage,
            );
            let distance = planar_distance(ctx.agent.body.position, target);
            if distance > optimal {
                ctx.steer_toward(target);
            } else {
                self.strafe(ctx, target);
            }

            if distance <= melee_range {
                if self.melee.is_finished() {
                    ctx.schedule(
                        melee_delay,
                        DelayedAction::Melee {
                            agent: ctx.agent.id,
                            reach: melee_range,
                            damage: melee_damage,
                        },
                    );
                    self.melee.reset();
                }
            } else {
                ctx.try_fire(player.point(vision.point));
                self.maybe_throw(ctx, target, distance);
            }
            return Transition::Stay;
        }

        if self.relax.tick(dt) {
            return Transition::Switch(AgentState::Idle(IdleState::new(&ctx.agent.config)));
        }
        if ctx.has_reached() {
            if let Some(focus) = ctx.agent.last_seen_player {
                ctx.wander_near(focus);
            }
        }
        Transition::Stay
    }

    fn on_sound(&mut self, ctx: &mut StateContext<'_>, stimulus: &SoundStimulus) -> Transition {
        if !ctx.vision().player_visible {
            ctx.agent.last_seen_player = Some(stimulus.position);
            self.relax.reset();
            ctx.steer_toward(stimulus.position);
        }
        Transition::Stay
    }

    fn cooldown_ratio(&self) -> Option<f32> {
        Some(self.relax.ratio())
    }
}
