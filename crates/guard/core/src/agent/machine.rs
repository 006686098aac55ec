//! Drives one agent through perception, state update and transitions.

use glam::Vec3;

use super::context::StateContext;
use super::state::{AgentState, Transition};
use super::states::{AggressionState, AttentionState, ClimbState};
use super::{AgentFlags, LinkKind, StateKind};
use crate::command::SimEvent;
use crate::sensors::{SoundStimulus, VisionProbe, VisionResult};
use crate::zone::Escalation;

/// One per-frame update of the checked-out agent.
pub(crate) fn update(ctx: &mut StateContext<'_>) {
    perceive(ctx);
    tick_fear(ctx);
    if enter_climb(ctx) {
        return;
    }

    let mut state = ctx.agent.state;
    let transition = state.update(ctx);
    ctx.agent.state = state;
    apply(ctx, transition);
}

fn perceive(ctx: &mut StateContext<'_>) {
    let agent = &mut *ctx.agent;
    let kind = agent.state.kind();
    if kind == StateKind::Sleep {
        agent.vision = VisionResult::default();
        return;
    }

    let probe = VisionProbe {
        observer: agent.id,
        eye: agent.eye(),
        forward: agent.body.forward,
        state: kind,
    };
    agent.vision = agent.sensors.poll(
        &probe,
        &agent.config,
        &ctx.world.player,
        &ctx.world.markers,
        ctx.oracles.sight,
    );
    if agent.vision.player_visible {
        tracing::trace!(
            agent = %agent.id,
            band = %agent.vision.band,
            point = %agent.vision.point,
            distance = agent.vision.distance,
            "player visible"
        );
    }
}

fn tick_fear(ctx: &mut StateContext<'_>) {
    let dt = ctx.dt();
    let agent = &mut *ctx.agent;
    if let Some(fear) = &mut agent.fear {
        if fear.tick(dt) {
            agent.fear = None;
            tracing::debug!(agent = %agent.id, "fear expired");
        }
    }
    // Once calm and out of view, the marker may scare the agent again.
    if agent.fear.is_none() && agent.vision.fear_point != agent.fear_source {
        agent.fear_source = None;
    }
}

/// Interrupts the current state when the host starts moving the agent along a rope.
fn enter_climb(ctx: &mut StateContext<'_>) -> bool {
    let Some(link) = ctx.agent.body.link else {
        return false;
    };
    let kind = ctx.agent.state.kind();
    if link.kind != LinkKind::Rope
        || link.finished
        || matches!(kind, StateKind::Climb | StateKind::Sleep)
    {
        return false;
    }
    let climb = ClimbState::new(kind, ctx.agent.body.speed, link.exit);
    switch_state(ctx, AgentState::Climb(climb))
}

pub(crate) fn apply(ctx: &mut StateContext<'_>, transition: Transition) {
    match transition {
        Transition::Stay => {}
        Transition::Switch(next) => {
            if !switch_state(ctx, next) {
                // A rejected switch must not strand a slot the allocator claimed.
                if let AgentState::Cover(cover) = next {
                    ctx.world.covers.free(cover.slot());
                }
            }
        }
        Transition::Resume { next, move_to } => {
            let state = AgentState::resume(next, &ctx.agent.config);
            switch_state(ctx, state);
            if let Some(point) = move_to {
                ctx.force_move_to(point, None);
            }
        }
    }
}

/// Exits the current state, announces the new one and enters it.
///
/// No-op while ragdolled and when `next` has the same kind as the current
/// state. Returns whether the switch happened.
pub(crate) fn switch_state(ctx: &mut StateContext<'_>, next: AgentState) -> bool {
    if ctx.agent.flags.contains(AgentFlags::RAGDOLL) {
        tracing::trace!(agent = %ctx.agent.id, "state switch suppressed by ragdoll");
        return false;
    }
    let from = ctx.agent.state.kind();
    let to = next.kind();
    if from == to {
        return false;
    }

    let mut outgoing = ctx.agent.state;
    outgoing.exit(ctx);
    ctx.emit(SimEvent::StateExited {
        agent: ctx.agent.id,
        state: from,
    });

    if let Some(event) = next.notification(ctx) {
        ctx.emit(event);
    }

    let mut incoming = next;
    ctx.agent.state = incoming;
    incoming.enter(ctx);
    ctx.agent.state = incoming;
    ctx.emit(SimEvent::StateEntered {
        agent: ctx.agent.id,
        state: to,
    });

    tracing::debug!(agent = %ctx.agent.id, %from, %to, "state switched");
    true
}

/// Routes a sound through the sensors and, if heard, to the active state.
pub(crate) fn hear(ctx: &mut StateContext<'_>, stimulus: &SoundStimulus) {
    let now = ctx.now();
    let agent = &mut *ctx.agent;
    let alerted = agent.state.kind() != StateKind::Idle;
    if !agent
        .sensors
        .hear(&agent.config, agent.body.position, alerted, stimulus, now)
    {
        return;
    }
    tracing::debug!(agent = %agent.id, state = %agent.state.kind(), "sound heard");

    let mut state = ctx.agent.state;
    let transition = state.on_sound(ctx, stimulus);
    ctx.agent.state = state;
    apply(ctx, transition);
}

/// Applies a zone escalation to this agent.
///
/// Attention only reaches Idle agents; Aggression reaches Idle and Attention.
/// Cover already fights at Aggression severity and keeps its slot. Sleeping
/// and climbing agents are never escalated by propagation.
pub(crate) fn escalate(
    ctx: &mut StateContext<'_>,
    level: Escalation,
    focus: Option<Vec3>,
) -> bool {
    let kind = ctx.agent.state.kind();
    let eligible = match level {
        Escalation::Attention => kind == StateKind::Idle,
        Escalation::Aggression => matches!(kind, StateKind::Idle | StateKind::Attention),
    };
    if !eligible {
        return false;
    }

    if focus.is_some() {
        ctx.agent.last_seen_player = focus;
    }
    let next = match level {
        Escalation::Attention => AgentState::Attention(AttentionState::new()),
        Escalation::Aggression => AgentState::Aggression(AggressionState::new()),
    };
    switch_state(ctx, next)
}

/// Ends the agent: runs the exit hook, halts it and leaves its zone.
pub(crate) fn retire(ctx: &mut StateContext<'_>) {
    let mut state = ctx.agent.state;
    state.exit(ctx);
    ctx.agent.state = state;
    ctx.stop();

    let id = ctx.agent.id;
    if let Some(zone) = ctx.agent.zone.and_then(|zone| ctx.world.zones.get_mut(zone)) {
        zone.remove_ai(id);
    }
    ctx.agent.flags.insert(AgentFlags::DEAD);
    ctx.agent.flags.remove(AgentFlags::ENABLED);
    ctx.agent.fear = None;
    ctx.agent.fear_source = None;
    ctx.emit(SimEvent::Died { agent: id });
    tracing::info!(agent = %id, "agent died");
}
