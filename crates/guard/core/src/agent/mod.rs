//! Agents: a body mirrored from the host plus a behaviour state machine.
mod context;
pub(crate) mod machine;
mod state;
mod states;

use bitflags::bitflags;
use glam::Vec3;

use crate::common::{AgentId, Countdown, MarkerId, PathId, ZoneId};
use crate::config::AiConfig;
use crate::sensors::{Sensors, VisionResult};

pub(crate) use context::StateContext;
pub use state::{AgentState, StateKind, Transition};
pub use states::{AggressionState, AttentionState, ClimbState, CoverState, IdleState, SleepState};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct AgentFlags: u8 {
        const ENABLED = 1 << 0;
        const DEAD = 1 << 1;
        /// Knocked down; physics owns the body and state switches are suppressed.
        const RAGDOLL = 1 << 2;
        const CAN_ATTACK = 1 << 3;
        /// Fire permission is granted regardless of the attack order.
        const IGNORE_ATTACK_ORDER = 1 << 4;
        const CAN_THROW_GRENADES = 1 << 5;
    }
}

impl Default for AgentFlags {
    fn default() -> Self {
        Self::ENABLED | Self::CAN_ATTACK
    }
}

/// Kind of off-mesh connection the host is moving the agent across.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum LinkKind {
    Rope,
    Jump,
    Door,
}

/// Host feedback about an off-mesh link in progress.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkTraversal {
    pub kind: LinkKind,
    pub climb_speed: f32,
    /// Where the agent should walk once off the link.
    pub exit: Option<Vec3>,
    pub finished: bool,
}

impl LinkTraversal {
    pub fn rope(climb_speed: f32, exit: Option<Vec3>) -> Self {
        Self {
            kind: LinkKind::Rope,
            climb_speed,
            exit,
            finished: false,
        }
    }
}

/// Physical state owned by the host; the core reads it and writes commands.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentBody {
    /// Feet position.
    pub position: Vec3,
    pub forward: Vec3,
    pub speed: f32,
    pub weapon_ready: bool,
    pub link: Option<LinkTraversal>,
}

impl AgentBody {
    pub fn new(position: Vec3, forward: Vec3, speed: f32) -> Self {
        Self {
            position,
            forward,
            speed,
            weapon_ready: true,
            link: None,
        }
    }
}

/// Where the agent returns to when it has no patrol.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpawnPoint {
    pub position: Vec3,
    pub direction: Vec3,
}

/// Everything needed to place a new agent.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentSpawn {
    pub position: Vec3,
    pub direction: Vec3,
    /// Assigned zone; when absent the first zone containing `position` is used.
    pub zone: Option<ZoneId>,
    pub patrol: Option<PathId>,
    pub cover_group: u32,
    /// Overrides the simulation-wide agent config.
    pub config: Option<AiConfig>,
    pub health: f32,
    pub can_attack: bool,
    pub ignore_attack_order: bool,
    pub throws_grenades: bool,
}

impl AgentSpawn {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn facing(mut self, direction: Vec3) -> Self {
        self.direction = direction;
        self
    }

    pub fn in_zone(mut self, zone: ZoneId) -> Self {
        self.zone = Some(zone);
        self
    }

    pub fn patrolling(mut self, path: PathId) -> Self {
        self.patrol = Some(path);
        self
    }

    pub fn with_config(mut self, config: AiConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn flags(&self) -> AgentFlags {
        let mut flags = AgentFlags::ENABLED;
        flags.set(AgentFlags::CAN_ATTACK, self.can_attack);
        flags.set(AgentFlags::IGNORE_ATTACK_ORDER, self.ignore_attack_order);
        flags.set(AgentFlags::CAN_THROW_GRENADES, self.throws_grenades);
        flags
    }
}

impl Default for AgentSpawn {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::Z,
            zone: None,
            patrol: None,
            cover_group: 0,
            config: None,
            health: 1.0,
            can_attack: true,
            ignore_attack_order: false,
            throws_grenades: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Agent {
    pub id: AgentId,
    pub body: AgentBody,
    pub config: AiConfig,
    /// Remaining health in `[0, 1]`.
    pub health: f32,
    pub flags: AgentFlags,
    pub(crate) state: AgentState,
    pub zone: Option<ZoneId>,
    pub patrol: Option<PathId>,
    pub cover_group: u32,
    pub spawn: SpawnPoint,
    pub last_seen_player: Option<Vec3>,
    /// Running fear countdown; patrol and chase are suppressed while set.
    pub fear: Option<Countdown>,
    /// Fear marker that last scared the agent.
    pub fear_source: Option<MarkerId>,
    pub(crate) sensors: Sensors,
    pub(crate) vision: VisionResult,
    /// Last issued movement target.
    pub(crate) destination: Option<Vec3>,
}

impl Agent {
    pub fn new(id: AgentId, spawn: &AgentSpawn, config: AiConfig) -> Self {
        let direction = spawn.direction.normalize_or(Vec3::Z);
        Self {
            id,
            body: AgentBody::new(spawn.position, direction, config.walk_speed),
            state: AgentState::Idle(IdleState::new(&config)),
            config,
            health: spawn.health,
            flags: spawn.flags(),
            zone: spawn.zone,
            patrol: spawn.patrol,
            cover_group: spawn.cover_group,
            spawn: SpawnPoint {
                position: spawn.position,
                direction,
            },
            last_seen_player: None,
            fear: None,
            fear_source: None,
            sensors: Sensors::default(),
            vision: VisionResult::default(),
            destination: None,
        }
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn state_kind(&self) -> StateKind {
        self.state.kind()
    }

    pub fn vision(&self) -> &VisionResult {
        &self.vision
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    pub fn eye(&self) -> Vec3 {
        self.body.position + Vec3::Y * self.config.eye_height
    }

    pub fn is_enabled(&self) -> bool {
        self.flags.contains(AgentFlags::ENABLED)
    }

    pub fn is_alive(&self) -> bool {
        !self.flags.contains(AgentFlags::DEAD)
    }

    pub fn is_ragdoll(&self) -> bool {
        self.flags.contains(AgentFlags::RAGDOLL)
    }

    /// Enabled and alive: takes part in updates, propagation and scheduling.
    pub fn is_active(&self) -> bool {
        self.is_enabled() && self.is_alive()
    }

    pub fn in_fear(&self) -> bool {
        self.fear.is_some()
    }
}
