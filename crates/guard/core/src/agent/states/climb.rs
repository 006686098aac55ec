//! Climb: transitional state while the host moves the agent along a rope.

use glam::Vec3;

use crate::agent::StateKind;
use crate::agent::context::StateContext;
use crate::agent::state::{StateBehavior, Transition};

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClimbState {
    /// State interrupted by the climb.
    resume: StateKind,
    previous_speed: f32,
    exit: Option<Vec3>,
}

impl ClimbState {
    /// Half extents of the standing box checked at the exit point.
    const EXIT_CLEARANCE: Vec3 = Vec3::new(0.3, 0.9, 0.3);

    pub fn new(resume: StateKind, previous_speed: f32, exit: Option<Vec3>) -> Self {
        Self {
            resume,
            previous_speed,
            exit,
        }
    }

    pub fn resume_kind(&self) -> StateKind {
        self.resume
    }

    /// The exit point, unless blocking geometry leaves no room to stand there.
    fn clear_exit(&self, ctx: &StateContext<'_>) -> Option<Vec3> {
        self.exit.filter(|exit| {
            let center = *exit + Vec3::Y * Self::EXIT_CLEARANCE.y;
            !ctx.oracles.sight.overlap_box(center, Self::EXIT_CLEARANCE)
        })
    }
}

impl StateBehavior for ClimbState {
    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        ctx.agent.destination = None;
        if let Some(link) = ctx.agent.body.link {
            ctx.set_speed(link.climb_speed);
        }
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) -> Transition {
        match ctx.agent.body.link {
            Some(link) if !link.finished => {
                if link.exit.is_some() {
                    self.exit = link.exit;
                }
                Transition::Stay
            }
            _ => Transition::Resume {
                next: self.resume,
                move_to: self.clear_exit(ctx),
            },
        }
    }

    fn exit(&mut self, ctx: &mut StateContext<'_>) {
        ctx.set_speed(self.previous_speed);
    }
}
