//! Attention and fear markers placed in the scene.
//!
//! Sighting an attention marker (a body, an open door) forces investigation;
//! sighting a fear marker (a live grenade, fire) makes the agent freeze for a
//! while. Markers parented to an agent are invisible to that agent.

use glam::Vec3;

use crate::common::{AgentId, MarkerId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum MarkerKind {
    Attention,
    Fear,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub kind: MarkerKind,
    pub position: Vec3,
    /// Agent this marker is attached to, if any.
    pub owner: Option<AgentId>,
    pub active: bool,
}

impl Marker {
    /// Whether `observer` may notice this marker at all.
    pub fn is_observable_by(&self, observer: AgentId) -> bool {
        self.active && self.owner != Some(observer)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Markers {
    markers: Vec<Marker>,
}

impl Markers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: MarkerKind, position: Vec3, owner: Option<AgentId>) -> MarkerId {
        let id = MarkerId(self.markers.len() as u32);
        self.markers.push(Marker {
            id,
            kind,
            position,
            owner,
            active: true,
        });
        id
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: MarkerId) -> Option<&mut Marker> {
        self.markers.get_mut(id.0 as usize)
    }

    /// Deactivates a marker; returns false when it was unknown or already inactive.
    pub fn deactivate(&mut self, id: MarkerId) -> bool {
        match self.get_mut(id) {
            Some(marker) if marker.active => {
                marker.active = false;
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
