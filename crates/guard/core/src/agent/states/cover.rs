//! Cover: hold a claimed slot for a while, shooting from it.

use crate::agent::context::StateContext;
use crate::agent::state::{AgentState, StateBehavior, Transition};
use crate::common::{CoverId, Countdown, planar_distance};

use super::{AggressionState, AttentionState};

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverState {
    slot: CoverId,
    in_cover: bool,
    stay: Countdown,
    /// Set once the slot was freed; exit may run more than once.
    released: bool,
}

impl CoverState {
    /// Wraps a slot the allocator already claimed.
    pub fn new(slot: CoverId) -> Self {
        Self {
            slot,
            in_cover: false,
            stay: Countdown::default(),
            released: false,
        }
    }

    pub fn slot(&self) -> CoverId {
        self.slot
    }

    pub fn in_cover(&self) -> bool {
        self.in_cover
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl StateBehavior for CoverState {
    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        ctx.set_speed(ctx.agent.config.run_speed);
        if let Some(slot) = ctx.world.covers.get(self.slot).copied() {
            let face = ctx.agent.last_seen_player;
            ctx.force_move_to(slot.position, face);
        }
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) -> Transition {
        let Some(slot) = ctx.world.covers.get(self.slot).copied() else {
            return Transition::Switch(AgentState::Aggression(AggressionState::new()));
        };
        let vision = ctx.vision();

        if !self.in_cover {
            let distance = planar_distance(ctx.agent.body.position, slot.position);
            if distance <= ctx.agent.config.cover_proximity {
                self.in_cover = true;
                ctx.stop();
                let (min, max) = slot.stay_range;
                self.stay = Countdown::new(ctx.random_range(min, max));
                tracing::debug!(agent = %ctx.agent.id, cover = %self.slot, "in cover");
            } else if ctx.agent.destination.is_none() {
                let face = ctx.agent.last_seen_player;
                ctx.force_move_to(slot.position, face);
            }
            return Transition::Stay;
        }

        if vision.player_visible {
            let player = ctx.player();
            ctx.agent.last_seen_player = Some(player.position);
            ctx.try_fire(player.point(vision.point));
        }
        if let Some(focus) = ctx.agent.last_seen_player {
            ctx.face_point(focus);
        }

        if self.stay.tick(ctx.dt()) {
            let next = if vision.player_visible {
                AgentState::Aggression(AggressionState::new())
            } else {
                AgentState::Attention(AttentionState::new())
            };
            return Transition::Switch(next);
        }
        Transition::Stay
    }

    fn exit(&mut self, ctx: &mut StateContext<'_>) {
        if !self.released {
            ctx.world.covers.free(self.slot);
            self.released = true;
        }
    }

    fn cooldown_ratio(&self) -> Option<f32> {
        Some(if self.in_cover { self.stay.ratio() } else { 1.0 })
    }
}
