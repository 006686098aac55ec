//! Traits describing the external collaborators the core consults.
//!
//! Oracles answer line-of-sight, navigation and randomness queries. The
//! [`Env`] aggregate bundles them so the simulation can reach everything it
//! needs without hard coupling to concrete implementations.
mod error;
mod navigation;
mod open;
mod rng;
mod sight;

pub use error::OracleError;
pub use navigation::{NavigationOracle, PathQuery, PathStatus};
pub use open::OpenField;
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use sight::{LineOfSight, SightOracle};

/// Aggregates read-only oracles required by the simulation.
#[derive(Clone, Copy, Debug)]
pub struct Env<'a, S, N, R>
where
    S: SightOracle + ?Sized,
    N: NavigationOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    sight: Option<&'a S>,
    navigation: Option<&'a N>,
    rng: Option<&'a R>,
}

pub type SimEnv<'a> =
    Env<'a, dyn SightOracle + 'a, dyn NavigationOracle + 'a, dyn RngOracle + 'a>;

impl<'a, S, N, R> Env<'a, S, N, R>
where
    S: SightOracle + ?Sized,
    N: NavigationOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    pub fn new(sight: Option<&'a S>, navigation: Option<&'a N>, rng: Option<&'a R>) -> Self {
        Self {
            sight,
            navigation,
            rng,
        }
    }

    pub fn with_all(sight: &'a S, navigation: &'a N, rng: &'a R) -> Self {
        Self::new(Some(sight), Some(navigation), Some(rng))
    }

    pub fn empty() -> Self {
        Self {
            sight: None,
            navigation: None,
            rng: None,
        }
    }

    /// Returns the SightOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::SightNotAvailable` if no sight oracle was provided.
    pub fn sight(&self) -> Result<&'a S, OracleError> {
        self.sight.ok_or(OracleError::SightNotAvailable)
    }

    /// Returns the NavigationOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::NavigationNotAvailable` if no navigation oracle was provided.
    pub fn navigation(&self) -> Result<&'a N, OracleError> {
        self.navigation.ok_or(OracleError::NavigationNotAvailable)
    }

    /// Returns the RngOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::RngNotAvailable` if no rng oracle was provided.
    pub fn rng(&self) -> Result<&'a R, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }
}

impl<'a, S, N, R> Env<'a, S, N, R>
where
    S: SightOracle + 'a,
    N: NavigationOracle + 'a,
    R: RngOracle + 'a,
{
    /// Converts this environment into a trait-object based `SimEnv`.
    pub fn as_sim_env(&self) -> SimEnv<'a> {
        let sight: Option<&'a dyn SightOracle> = self.sight.map(|sight| sight as _);
        let navigation: Option<&'a dyn NavigationOracle> =
            self.navigation.map(|navigation| navigation as _);
        let rng: Option<&'a dyn RngOracle> = self.rng.map(|rng| rng as _);
        Env::new(sight, navigation, rng)
    }
}

impl<'a> SimEnv<'a> {
    /// Resolves every oracle at once; a tick needs all of them.
    pub fn resolve(&self) -> Result<Oracles<'a>, OracleError> {
        Ok(Oracles {
            sight: self.sight()?,
            navigation: self.navigation()?,
            rng: self.rng()?,
        })
    }
}

/// Resolved oracles handed to agent logic for the duration of one call.
#[derive(Clone, Copy)]
pub struct Oracles<'a> {
    pub sight: &'a dyn SightOracle,
    pub navigation: &'a dyn NavigationOracle,
    pub rng: &'a dyn RngOracle,
}
