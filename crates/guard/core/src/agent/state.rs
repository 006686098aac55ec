use glam::Vec3;

use super::context::StateContext;
use super::states::{
    AggressionState, AttentionState, ClimbState, CoverState, IdleState, SleepState,
};
use crate::command::SimEvent;
use crate::config::AiConfig;
use crate::manager::AlertLevel;
use crate::sensors::SoundStimulus;

/// Discriminant of [`AgentState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum StateKind {
    Idle,
    Attention,
    Aggression,
    Cover,
    Sleep,
    Climb,
}

impl StateKind {
    pub fn alert_level(self) -> AlertLevel {
        match self {
            Self::Idle | Self::Sleep | Self::Climb => AlertLevel::Idle,
            Self::Attention => AlertLevel::Attention,
            Self::Aggression | Self::Cover => AlertLevel::Aggression,
        }
    }
}

/// What a state asks the machine to do after an update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transition {
    Stay,
    Switch(AgentState),
    /// Leave a transitional state, re-entering `next` and optionally walking on.
    Resume {
        next: StateKind,
        move_to: Option<Vec3>,
    },
}

/// Hooks every behaviour state implements.
///
/// States never switch themselves: `update` and `on_sound` return a
/// [`Transition`] and the machine performs the exit/enter sequence.
pub(crate) trait StateBehavior {
    fn enter(&mut self, _ctx: &mut StateContext<'_>) {}

    fn update(&mut self, ctx: &mut StateContext<'_>) -> Transition;

    fn exit(&mut self, _ctx: &mut StateContext<'_>) {}

    /// Called when the sensors report a sound worth reacting to.
    fn on_sound(&mut self, _ctx: &mut StateContext<'_>, _stimulus: &SoundStimulus) -> Transition {
        Transition::Stay
    }

    /// Remaining fraction of the state's relax timer, for status displays.
    fn cooldown_ratio(&self) -> Option<f32> {
        None
    }
}

/// The active behaviour of an agent, payload included.
///
/// Each variant carries its own timers so a restored snapshot resumes exactly
/// where it left off.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentState {
    Idle(IdleState),
    Attention(AttentionState),
    Aggression(AggressionState),
    Cover(CoverState),
    Sleep(SleepState),
    Climb(ClimbState),
}

macro_rules! dispatch_state {
    ($state:expr, $inner:ident => $body:expr) => {
        match $state {
            AgentState::Idle($inner) => $body,
            AgentState::Attention($inner) => $body,
            AgentState::Aggression($inner) => $body,
            AgentState::Cover($inner) => $body,
            AgentState::Sleep($inner) => $body,
            AgentState::Climb($inner) => $body,
        }
    };
}

impl AgentState {
    pub fn kind(&self) -> StateKind {
        match self {
            Self::Idle(_) => StateKind::Idle,
            Self::Attention(_) => StateKind::Attention,
            Self::Aggression(_) => StateKind::Aggression,
            Self::Cover(_) => StateKind::Cover,
            Self::Sleep(_) => StateKind::Sleep,
            Self::Climb(_) => StateKind::Climb,
        }
    }

    /// A fresh state of `kind`, used when resuming after a climb and when a
    /// saved record lacks its payload. Cover resumes as Aggression because
    /// its slot was released on the way out.
    pub fn resume(kind: StateKind, config: &AiConfig) -> Self {
        match kind {
            StateKind::Idle | StateKind::Climb => Self::Idle(IdleState::new(config)),
            StateKind::Attention => Self::Attention(AttentionState::new()),
            StateKind::Aggression | StateKind::Cover => Self::Aggression(AggressionState::new()),
            StateKind::Sleep => Self::Sleep(SleepState::new(1.0)),
        }
    }

    /// Severity reported to the manager; a climb reports what it interrupted.
    pub fn alert_level(&self) -> AlertLevel {
        match self {
            Self::Climb(climb) => climb.resume_kind().alert_level(),
            other => other.kind().alert_level(),
        }
    }

    pub fn cooldown_ratio(&self) -> Option<f32> {
        dispatch_state!(self, state => state.cooldown_ratio())
    }

    /// Event announcing entry into this state, if it has one.
    pub(crate) fn notification(&self, ctx: &StateContext<'_>) -> Option<SimEvent> {
        let agent = ctx.agent.id;
        match self {
            Self::Idle(_) => None,
            Self::Attention(_) => Some(SimEvent::AttentionRaised {
                agent,
                focus: ctx.agent.last_seen_player,
            }),
            Self::Aggression(_) => Some(SimEvent::AggressionRaised {
                agent,
                zone: ctx.agent.zone,
            }),
            Self::Cover(cover) => Some(SimEvent::CoverTaken {
                agent,
                cover: cover.slot(),
            }),
            Self::Sleep(_) => Some(SimEvent::FellAsleep { agent }),
            Self::Climb(_) => Some(SimEvent::RopeStarted { agent }),
        }
    }

    pub(crate) fn enter(&mut self, ctx: &mut StateContext<'_>) {
        dispatch_state!(self, state => state.enter(ctx))
    }

    pub(crate) fn update(&mut self, ctx: &mut StateContext<'_>) -> Transition {
        dispatch_state!(self, state => state.update(ctx))
    }

    pub(crate) fn exit(&mut self, ctx: &mut StateContext<'_>) {
        dispatch_state!(self, state => state.exit(ctx))
    }

    pub(crate) fn on_sound(
        &mut self,
        ctx: &mut StateContext<'_>,
        stimulus: &SoundStimulus,
    ) -> Transition {
        dispatch_state!(self, state => state.on_sound(ctx, stimulus))
    }
}
