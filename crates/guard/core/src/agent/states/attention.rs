//! Attention: investigate the last known player position.

use crate::agent::context::StateContext;
use crate::agent::state::{AgentState, StateBehavior, Transition};
use crate::common::Countdown;
use crate::sensors::{SensorBand, SoundStimulus};
use crate::zone::Escalation;

use super::{AggressionState, IdleState};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttentionState {
    /// Without a sighting or sound for this long, the agent relaxes.
    timeout: Countdown,
    /// Inner-band dwell needed before escalating.
    escalation: Countdown,
}

impl AttentionState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateBehavior for AttentionState {
    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        self.timeout = Countdown::new(ctx.agent.config.attention_wait_time);
        self.escalation = Countdown::new(ctx.agent.config.escalation_time);
        ctx.set_speed(ctx.agent.config.walk_speed);

        let focus = ctx.agent.last_seen_player;
        if let Some(focus) = focus {
            ctx.steer_toward(focus);
        }
        ctx.alert_nearby(Escalation::Attention, focus);
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) -> Transition {
        let dt = ctx.dt();
        let vision = ctx.vision();

        if vision.player_visible {
            let player = ctx.player().position;
            ctx.agent.last_seen_player = Some(player);
            self.timeout.reset();

            match vision.band {
                SensorBand::Inner => {
                    if self.escalation.tick(dt) {
                        ctx.force_zone(Escalation::Aggression, Some(player));
                        return Transition::Switch(AgentState::Aggression(AggressionState::new()));
                    }
                }
                SensorBand::Outer => self.escalation.reset(),
            }

            ctx.face_point(player);
            ctx.steer_toward(player);
            return Transition::Stay;
        }

        self.escalation.reset();
        if self.timeout.tick(dt) {
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
            self.timeout.reset();
            ctx.steer_toward(stimulus.position);
        }
        Transition::Stay
    }

    fn cooldown_ratio(&self) -> Option<f32> {
        Some(self.timeout.ratio())
    }
}
