//! Patrol paths: directed waypoint sequences with a wrap policy.

use glam::Vec3;

use crate::common::PathId;

/// One waypoint of a patrol path.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathNode {
    pub position: Vec3,
    /// Facing to adopt while dwelling at this node.
    #[cfg_attr(feature = "serde", serde(default = "default_direction"))]
    pub direction: Vec3,
    /// Seconds to dwell before moving on.
    #[cfg_attr(feature = "serde", serde(default))]
    pub wait_time: f32,
}

#[cfg(feature = "serde")]
fn default_direction() -> Vec3 {
    Vec3::Z
}

impl PathNode {
    pub fn new(position: Vec3, direction: Vec3, wait_time: f32) -> Self {
        Self {
            position,
            direction,
            wait_time,
        }
    }
}

/// What happens when the cursor runs off either end of the path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WrapMode {
    #[default]
    Loop,
    PingPong,
    /// Stays exhausted once the last node was handed out.
    Stop,
    /// Continues on another path; the caller adopts it.
    SwitchTo(PathId),
}

/// Traversal position within a path. Persisted across saves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatrolCursor {
    pub index: Option<usize>,
    /// +1 forward, -1 backward (ping-pong only).
    pub step: i8,
    pub exhausted: bool,
}

impl Default for PatrolCursor {
    fn default() -> Self {
        Self {
            index: None,
            step: 1,
            exhausted: false,
        }
    }
}

enum Advance {
    Node(usize),
    Switch(PathId),
    Halted,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PatrolPath {
    pub id: PathId,
    pub name: String,
    pub nodes: Vec<PathNode>,
    pub wrap: WrapMode,
    /// A disabled path (deactivated in the world) hands out nothing.
    pub enabled: bool,
    cursor: PatrolCursor,
}

impl PatrolPath {
    pub fn new(id: PathId, name: impl Into<String>, nodes: Vec<PathNode>, wrap: WrapMode) -> Self {
        Self {
            id,
            name: name.into(),
            nodes,
            wrap,
            enabled: true,
            cursor: PatrolCursor::default(),
        }
    }

    pub fn cursor(&self) -> PatrolCursor {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: PatrolCursor) {
        self.cursor = cursor;
    }

    /// Clears traversal state so a newly assigned agent starts from node 0.
    pub fn reset_path(&mut self) {
        self.cursor = PatrolCursor::default();
    }

    pub fn current(&self) -> Option<&PathNode> {
        self.cursor.index.and_then(|index| self.nodes.get(index))
    }

    fn advance(&mut self) -> Advance {
        if !self.enabled || self.nodes.is_empty() || self.cursor.exhausted {
            return Advance::Halted;
        }

        let len = self.nodes.len() as isize;
        let candidate = match self.cursor.index {
            None => {
                self.cursor.step = 1;
                0
            }
            Some(index) => index as isize + self.cursor.step as isize,
        };

        if (0..len).contains(&candidate) {
            self.cursor.index = Some(candidate as usize);
            return Advance::Node(candidate as usize);
        }

        match self.wrap {
            WrapMode::Loop => {
                self.cursor.index = Some(0);
                Advance::Node(0)
            }
            WrapMode::PingPong => {
                self.cursor.step = -self.cursor.step;
                let last = self.cursor.index.unwrap_or(0) as isize;
                let reflected = (last + self.cursor.step as isize).clamp(0, len - 1) as usize;
                self.cursor.index = Some(reflected);
                Advance::Node(reflected)
            }
            WrapMode::Stop => {
                self.cursor.exhausted = true;
                Advance::Halted
            }
            WrapMode::SwitchTo(next) => {
                self.reset_path();
                Advance::Switch(next)
            }
        }
    }
}

/// Result of [`PatrolPaths::next`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatrolStep {
    pub node: PathNode,
    /// Path that produced the node; differs from the queried path after a switch.
    pub path: PathId,
}

impl PatrolStep {
    pub fn switched_from(&self, queried: PathId) -> bool {
        self.path != queried
    }
}

#[derive(Clone, Debug, Default)]
pub struct PatrolPaths {
    paths: Vec<PatrolPath>,
}

impl PatrolPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, nodes: Vec<PathNode>, wrap: WrapMode) -> PathId {
        let id = PathId(self.paths.len() as u32);
        self.paths.push(PatrolPath::new(id, name, nodes, wrap));
        id
    }

    pub fn get(&self, id: PathId) -> Option<&PatrolPath> {
        self.paths.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: PathId) -> Option<&mut PatrolPath> {
        self.paths.get_mut(id.0 as usize)
    }

    pub fn contains(&self, id: PathId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatrolPath> {
        self.paths.iter()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Advances the cursor of `id` and returns the next node.
    ///
    /// Follows `SwitchTo` chains, returning the node of the path that was
    /// switched to. Returns `None` for unknown, disabled, empty or exhausted
    /// paths, and for switch chains that never yield a node.
    pub fn next(&mut self, id: PathId) -> Option<PatrolStep> {
        let mut current = id;
        for _ in 0..=self.paths.len() {
            let path = self.get_mut(current)?;
            match path.advance() {
                Advance::Node(index) => {
                    let node = path.nodes[index];
                    return Some(PatrolStep {
                        node,
                        path: current,
                    });
                }
                Advance::Switch(next) => {
                    tracing::debug!(from = %current, to = %next, "patrol path switched");
                    current = next;
                }
                Advance::Halted => return None,
            }
        }
        tracing::warn!(path = %id, "patrol switch chain never yields a node");
        None
    }
}
