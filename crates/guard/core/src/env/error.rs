//! Oracle access errors.

use crate::error::{ErrorSeverity, GuardError};

/// Errors that occur when resolving oracles from an [`super::Env`].
///
/// A simulation cannot tick without sight, navigation and randomness, so a
/// missing oracle is fatal for the call that needed it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    /// SightOracle is not available in the environment.
    #[error("SightOracle not available")]
    SightNotAvailable,

    /// NavigationOracle is not available in the environment.
    #[error("NavigationOracle not available")]
    NavigationNotAvailable,

    /// RngOracle is not available in the environment.
    #[error("RngOracle not available")]
    RngNotAvailable,
}

impl GuardError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            SightNotAvailable => "ORACLE_SIGHT_NOT_AVAILABLE",
            NavigationNotAvailable => "ORACLE_NAVIGATION_NOT_AVAILABLE",
            RngNotAvailable => "ORACLE_RNG_NOT_AVAILABLE",
        }
    }
}
