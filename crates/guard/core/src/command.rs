//! Intents the core writes for the host, and the events it reports.
//!
//! The core never moves bodies or plays animations. It records what each
//! agent wants in an [`Outbox`]; the host drains commands, applies them to its
//! movement and combat systems, and feeds the results back through
//! [`crate::AgentBody`].

use glam::Vec3;

use crate::agent::StateKind;
use crate::common::{AgentId, CoverId, MarkerId, ZoneId};

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentCommand {
    /// Walk to a point validated against zone spacing.
    MoveTo {
        agent: AgentId,
        point: Vec3,
        face: Option<Vec3>,
    },
    /// Walk to a point without spacing validation.
    ForceMoveTo {
        agent: AgentId,
        point: Vec3,
        face: Option<Vec3>,
    },
    Stop {
        agent: AgentId,
    },
    Warp {
        agent: AgentId,
        point: Vec3,
    },
    RotateTo {
        agent: AgentId,
        direction: Vec3,
    },
    SetSpeed {
        agent: AgentId,
        speed: f32,
    },
    Fire {
        agent: AgentId,
        target: Vec3,
    },
    ThrowGrenade {
        agent: AgentId,
        target: Vec3,
    },
    Melee {
        agent: AgentId,
        target: Vec3,
    },
}

impl AgentCommand {
    pub fn agent(&self) -> AgentId {
        match self {
            Self::MoveTo { agent, .. }
            | Self::ForceMoveTo { agent, .. }
            | Self::Stop { agent }
            | Self::Warp { agent, .. }
            | Self::RotateTo { agent, .. }
            | Self::SetSpeed { agent, .. }
            | Self::Fire { agent, .. }
            | Self::ThrowGrenade { agent, .. }
            | Self::Melee { agent, .. } => *agent,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SimEvent {
    StateExited {
        agent: AgentId,
        state: StateKind,
    },
    StateEntered {
        agent: AgentId,
        state: StateKind,
    },
    AttentionRaised {
        agent: AgentId,
        focus: Option<Vec3>,
    },
    AggressionRaised {
        agent: AgentId,
        zone: Option<ZoneId>,
    },
    CoverTaken {
        agent: AgentId,
        cover: CoverId,
    },
    RopeStarted {
        agent: AgentId,
    },
    FellAsleep {
        agent: AgentId,
    },
    WokeUp {
        agent: AgentId,
    },
    MarkerConsumed {
        agent: AgentId,
        marker: MarkerId,
    },
    Died {
        agent: AgentId,
    },
    PlayerStruck {
        agent: AgentId,
        damage: f32,
    },
}

impl SimEvent {
    pub fn agent(&self) -> AgentId {
        match self {
            Self::StateExited { agent, .. }
            | Self::StateEntered { agent, .. }
            | Self::AttentionRaised { agent, .. }
            | Self::AggressionRaised { agent, .. }
            | Self::CoverTaken { agent, .. }
            | Self::RopeStarted { agent }
            | Self::FellAsleep { agent }
            | Self::WokeUp { agent }
            | Self::MarkerConsumed { agent, .. }
            | Self::Died { agent }
            | Self::PlayerStruck { agent, .. } => *agent,
        }
    }
}

/// Commands and events accumulated until the host drains them.
#[derive(Clone, Debug, Default)]
pub struct Outbox {
    commands: Vec<AgentCommand>,
    events: Vec<SimEvent>,
}

impl Outbox {
    pub fn command(&mut self, command: AgentCommand) {
        self.commands.push(command);
    }

    pub fn event(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn commands(&self) -> &[AgentCommand] {
        &self.commands
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn drain_commands(&mut self) -> Vec<AgentCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.events.clear();
    }
}
