//! Guard AI simulation for stealth games.
//!
//! `guard-core` owns the perception, patrol and decision logic of hostile
//! agents and the coordination between them (zones, cover slots, fire
//! permissions). It performs no I/O: the host supplies sight, navigation and
//! randomness through [`env::Env`] oracles, mirrors physical feedback into
//! [`AgentBody`], and applies the [`AgentCommand`]s drained after each
//! [`Simulation::tick`].
pub mod agent;
pub mod command;
pub mod common;
pub mod config;
pub mod cover;
pub mod env;
pub mod error;
pub mod level;
pub mod manager;
pub mod markers;
pub mod patrol;
pub mod schedule;
pub mod sensors;
pub mod sim;
pub mod zone;

pub use agent::{
    Agent, AgentBody, AgentFlags, AgentSpawn, AgentState, AggressionState, AttentionState,
    ClimbState, CoverState, IdleState, LinkKind, LinkTraversal, SleepState, SpawnPoint, StateKind,
    Transition,
};
pub use command::{AgentCommand, Outbox, SimEvent};
pub use common::{AgentId, Clock, Countdown, CoverId, MarkerId, PathId, ZoneId};
pub use config::{AiConfig, ManagerConfig, RectSize, SimConfig, ZoneConfig};
pub use cover::{CoverSlot, CoverSlots};
pub use env::{
    Env, LineOfSight, NavigationOracle, OpenField, OracleError, PathQuery, PathStatus, PcgRng,
    RngOracle, SightOracle, SimEnv,
};
pub use error::{ErrorSeverity, GuardError, RestoreError, SimulationError};
pub use level::{CoverSpec, LevelLayout, MarkerSpec, PathSpec, ZoneSpec};
pub use manager::{AiStatus, AlertLevel, Manager, ManagerRecord};
pub use markers::{Marker, MarkerKind, Markers};
pub use patrol::{PathNode, PatrolCursor, PatrolPath, PatrolPaths, PatrolStep, WrapMode};
pub use schedule::{ActionQueue, DelayedAction, ScheduledAction};
pub use sensors::{PlayerView, SensorBand, Sensors, SoundStimulus, VisionPoint, VisionResult};
pub use sim::{
    AgentRecord, Damage, DamageKind, DamageOutcome, SimSnapshot, Simulation, TickReport, World,
};
pub use zone::{Escalation, Zone, ZoneBounds, ZoneRegistry, within_propagation_range};
