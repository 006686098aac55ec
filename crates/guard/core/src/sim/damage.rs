use glam::Vec3;

use super::Simulation;
use crate::agent::{AggressionState, AgentState, SleepState, StateKind, machine};
use crate::common::AgentId;
use crate::env::SimEnv;
use crate::error::SimulationError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum DamageKind {
    Bullet,
    Melee,
    Explosion,
    /// Puts the agent to sleep instead of hurting it.
    Tranquilizer,
}

/// A hit delivered by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Damage {
    /// Health removed, on the same `[0, 1]` scale as [`crate::Agent::health`].
    pub amount: f32,
    pub kind: DamageKind,
    pub headshot: bool,
    /// Where the hit came from, if known.
    pub source: Option<Vec3>,
}

impl Damage {
    pub fn bullet(amount: f32, source: Vec3) -> Self {
        Self {
            amount,
            kind: DamageKind::Bullet,
            headshot: false,
            source: Some(source),
        }
    }

    pub fn tranquilizer(source: Vec3) -> Self {
        Self {
            amount: 0.0,
            kind: DamageKind::Tranquilizer,
            headshot: false,
            source: Some(source),
        }
    }

    pub fn headshot(mut self) -> Self {
        self.headshot = true;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DamageOutcome {
    /// Nothing changed: the agent was dead, disabled, or could not be put to
    /// sleep (ragdolled or already asleep).
    Ignored,
    /// Health was reduced. The agent turns toward the source unless it is
    /// ragdolled or already fighting.
    Wounded,
    Slept,
    Killed,
}

impl Simulation {
    /// Applies a hit to an agent.
    ///
    /// Lethal damage retires the agent, releasing its cover and zone claims.
    /// A survivable hit on an agent that was not yet fighting turns it toward
    /// the source. Tranquilizers switch to Sleep, longer for a headshot.
    pub fn apply_damage(
        &mut self,
        env: &SimEnv<'_>,
        id: AgentId,
        damage: Damage,
    ) -> Result<DamageOutcome, SimulationError> {
        let oracles = env.resolve()?;
        let agent = self
            .agents
            .get(&id)
            .ok_or(SimulationError::UnknownAgent(id))?;
        if !agent.is_active() {
            return Ok(DamageOutcome::Ignored);
        }
        let health = (agent.health - damage.amount).max(0.0);
        let sleep_multiplier = if damage.headshot {
            agent.config.headshot_sleep_multiplier
        } else {
            1.0
        };

        let outcome = if damage.kind == DamageKind::Tranquilizer {
            let slept = self
                .with_agent(id, oracles, |ctx| {
                    machine::switch_state(ctx, AgentState::Sleep(SleepState::new(sleep_multiplier)))
                })
                .unwrap_or(false);
            if slept {
                DamageOutcome::Slept
            } else {
                DamageOutcome::Ignored
            }
        } else if health <= 0.0 {
            self.with_agent(id, oracles, |ctx| {
                ctx.agent.health = 0.0;
                machine::retire(ctx);
            });
            self.actions.cancel_agent(id);
            self.world.manager.request_attack_order();
            DamageOutcome::Killed
        } else {
            self.with_agent(id, oracles, |ctx| {
                ctx.agent.health = health;
                let kind = ctx.agent.state.kind();
                if matches!(kind, StateKind::Idle | StateKind::Attention | StateKind::Sleep) {
                    ctx.agent.last_seen_player =
                        Some(damage.source.unwrap_or(ctx.agent.body.position));
                    machine::switch_state(ctx, AgentState::Aggression(AggressionState::new()));
                }
            });
            DamageOutcome::Wounded
        };

        tracing::debug!(agent = %id, kind = %damage.kind, %outcome, "damage applied");
        self.flush_requests(oracles);
        Ok(outcome)
    }
}
