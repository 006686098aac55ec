//! Concrete behaviour states.
mod aggression;
mod attention;
mod climb;
mod cover;
mod idle;
mod sleep;

pub use aggression::AggressionState;
pub use attention::AttentionState;
pub use climb::ClimbState;
pub use cover::CoverState;
pub use idle::IdleState;
pub use sleep::SleepState;
