//! Sleep: knocked out by a tranquilizer or dozing off on duty.
//!
//! Sounds do not wake a sleeper; only the timer or another agent bumping
//! into it does.

use crate::agent::StateKind;
use crate::agent::context::StateContext;
use crate::agent::state::{AgentState, StateBehavior, Transition};
use crate::command::SimEvent;
use crate::common::Countdown;
use crate::zone::Escalation;

use super::IdleState;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SleepState {
    /// Scales the rolled duration (e.g. doubled for a headshot).
    multiplier: f32,
    duration: Countdown,
    near_check: Countdown,
}

impl SleepState {
    pub fn new(multiplier: f32) -> Self {
        Self {
            multiplier,
            duration: Countdown::default(),
            near_check: Countdown::default(),
        }
    }

    pub fn remaining(&self) -> f32 {
        self.duration.remaining()
    }

    fn someone_near(ctx: &StateContext<'_>) -> bool {
        let me = &*ctx.agent;
        let radius = me.config.wake_radius;
        ctx.others.values().any(|other| {
            other.is_active()
                && !other.is_ragdoll()
                && other.state_kind() != StateKind::Sleep
                && (me.zone.is_none() || other.zone == me.zone)
                && other.body.position.distance(me.body.position) <= radius
        })
    }

    fn wake(ctx: &mut StateContext<'_>) -> Transition {
        tracing::debug!(agent = %ctx.agent.id, "woke up");
        ctx.emit(SimEvent::WokeUp {
            agent: ctx.agent.id,
        });
        if ctx.agent.config.wake_alerts_zone {
            let position = ctx.agent.body.position;
            ctx.force_zone(Escalation::Attention, Some(position));
        }
        Transition::Switch(AgentState::Idle(IdleState::new(&ctx.agent.config)))
    }
}

impl StateBehavior for SleepState {
    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        ctx.stop();
        ctx.agent.sensors.blind();

        let (min, max) = ctx.agent.config.sleep_duration;
        let rolled = ctx.random_range(min, max) * self.multiplier;
        self.duration = Countdown::new(rolled);
        self.near_check = Countdown::new(ctx.agent.config.near_check_interval);
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) -> Transition {
        let dt = ctx.dt();
        if self.duration.tick(dt) {
            return Self::wake(ctx);
        }
        if self.near_check.tick(dt) {
            self.near_check.reset();
            if Self::someone_near(ctx) {
                return Self::wake(ctx);
            }
        }
        Transition::Stay
    }
}
