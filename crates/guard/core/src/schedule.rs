//! Delayed actions keyed by simulation time.
//!
//! Wind-ups such as a melee swing are queued with a due time and fired by
//! the simulation once the clock passes it.

use crate::common::AgentId;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DelayedAction {
    /// Melee strike that lands if the attacker is still able and in reach.
    Melee {
        agent: AgentId,
        reach: f32,
        damage: f32,
    },
}

impl DelayedAction {
    pub fn agent(&self) -> AgentId {
        match self {
            Self::Melee { agent, .. } => *agent,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduledAction {
    pub due: f32,
    /// Insertion order; breaks ties between equal due times.
    pub sequence: u64,
    pub action: DelayedAction,
}

#[derive(Clone, Debug, Default)]
pub struct ActionQueue {
    pending: Vec<ScheduledAction>,
    next_sequence: u64,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: f32, action: DelayedAction) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.pending.push(ScheduledAction {
            due,
            sequence,
            action,
        });
    }

    /// Removes and returns every action due at or before `now`, earliest first.
    pub fn drain_due(&mut self, now: f32) -> Vec<DelayedAction> {
        let mut due: Vec<ScheduledAction> = Vec::new();
        self.pending.retain(|scheduled| {
            if scheduled.due <= now {
                due.push(*scheduled);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.sequence.cmp(&b.sequence)));
        due.into_iter().map(|scheduled| scheduled.action).collect()
    }

    /// Drops every pending action of `agent`.
    pub fn cancel_agent(&mut self, agent: AgentId) {
        self.pending.retain(|scheduled| scheduled.action.agent() != agent);
    }

    pub fn pending(&self) -> &[ScheduledAction] {
        &self.pending
    }

    pub(crate) fn restore(&mut self, pending: Vec<ScheduledAction>) {
        self.next_sequence = pending
            .iter()
            .map(|scheduled| scheduled.sequence + 1)
            .max()
            .unwrap_or(0);
        self.pending = pending;
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
