//! Common error infrastructure for guard-core.
//!
//! Behavioural failures (no cover found, exhausted patrol path, switching to
//! the state already active) are not errors: they surface as `None` or a
//! no-op and the agent simply does nothing special that tick. The types here
//! cover API misuse and missing collaborators only.

use crate::common::{AgentId, CoverId, MarkerId, PathId, ZoneId};
use crate::env::OracleError;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: Temporary conditions that may succeed on retry
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
/// - **Fatal**: The simulation cannot proceed with the given environment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all guard-core errors.
///
/// - All error enums implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GuardError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Static identifier for this error variant, useful for metrics and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors returned by [`crate::Simulation`] operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    #[error("agent {0} is not registered")]
    UnknownAgent(AgentId),

    #[error("zone {0} does not exist")]
    UnknownZone(ZoneId),

    #[error("patrol path {0} does not exist")]
    UnknownPath(PathId),

    #[error("cover slot {0} does not exist")]
    UnknownCover(CoverId),

    #[error("marker {0} does not exist")]
    UnknownMarker(MarkerId),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl GuardError for SimulationError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownAgent(_)
            | Self::UnknownZone(_)
            | Self::UnknownPath(_)
            | Self::UnknownCover(_)
            | Self::UnknownMarker(_) => ErrorSeverity::Validation,
            Self::Oracle(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownAgent(_) => "SIM_UNKNOWN_AGENT",
            Self::UnknownZone(_) => "SIM_UNKNOWN_ZONE",
            Self::UnknownPath(_) => "SIM_UNKNOWN_PATH",
            Self::UnknownCover(_) => "SIM_UNKNOWN_COVER",
            Self::UnknownMarker(_) => "SIM_UNKNOWN_MARKER",
            Self::Oracle(error) => error.error_code(),
        }
    }
}

/// Errors raised while applying a [`crate::SimSnapshot`].
///
/// Restore validates every handle before touching the simulation, so a failed
/// restore leaves the previous state intact.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RestoreError {
    #[error("snapshot lists agent {0} twice")]
    DuplicateAgent(AgentId),

    #[error("snapshot references unknown zone {0}")]
    UnknownZone(ZoneId),

    #[error("snapshot references unknown patrol path {0}")]
    UnknownPath(PathId),

    #[error("snapshot references unknown cover slot {0}")]
    UnknownCover(CoverId),

    #[error("snapshot references unknown marker {0}")]
    UnknownMarker(MarkerId),
}

impl GuardError for RestoreError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateAgent(_) => "RESTORE_DUPLICATE_AGENT",
            Self::UnknownZone(_) => "RESTORE_UNKNOWN_ZONE",
            Self::UnknownPath(_) => "RESTORE_UNKNOWN_PATH",
            Self::UnknownCover(_) => "RESTORE_UNKNOWN_COVER",
            Self::UnknownMarker(_) => "RESTORE_UNKNOWN_MARKER",
        }
    }
}
