//! Static cover slots and the allocator that hands them out.

use glam::Vec3;

use crate::common::{CoverId, planar};
use crate::env::{NavigationOracle, PathStatus};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverSlot {
    pub id: CoverId,
    pub position: Vec3,
    /// Only slots of the requester's group are candidates.
    pub group: u32,
    /// Seconds an occupant stays, rolled uniformly in this range.
    pub stay_range: (f32, f32),
    taken: bool,
}

impl CoverSlot {
    pub fn is_taken(&self) -> bool {
        self.taken
    }
}

#[derive(Clone, Debug, Default)]
pub struct CoverSlots {
    slots: Vec<CoverSlot>,
}

impl CoverSlots {
    /// A partial path still counts when it ends this close to the slot.
    pub const PARTIAL_PATH_TOLERANCE: f32 = 3.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, position: Vec3, group: u32, stay_range: (f32, f32)) -> CoverId {
        let id = CoverId(self.slots.len() as u32);
        self.slots.push(CoverSlot {
            id,
            position,
            group,
            stay_range,
            taken: false,
        });
        id
    }

    pub fn get(&self, id: CoverId) -> Option<&CoverSlot> {
        self.slots.get(id.0 as usize)
    }

    pub fn contains(&self, id: CoverId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CoverSlot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Marks a free slot taken. Returns false if it was already taken or unknown.
    pub fn take(&mut self, id: CoverId) -> bool {
        match self.slots.get_mut(id.0 as usize) {
            Some(slot) if !slot.taken => {
                slot.taken = true;
                true
            }
            _ => false,
        }
    }

    /// Releases a slot. Returns false if it was not taken.
    pub fn free(&mut self, id: CoverId) -> bool {
        match self.slots.get_mut(id.0 as usize) {
            Some(slot) if slot.taken => {
                slot.taken = false;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn free_all(&mut self) {
        for slot in &mut self.slots {
            slot.taken = false;
        }
    }

    /// Picks and claims the nearest free, reachable slot that outflanks `target`.
    ///
    /// Slots on the requester's side of the target are rejected: the vector
    /// from the target to the slot must not point the same way as the vector
    /// from the target to the requester.
    pub fn get_cover(
        &mut self,
        requester: Vec3,
        target: Vec3,
        max_dist: f32,
        group: u32,
        navigation: &dyn NavigationOracle,
    ) -> Option<CoverId> {
        let toward_requester = planar(requester - target);

        let mut candidates: Vec<(f32, CoverId)> = self
            .slots
            .iter()
            .filter(|slot| !slot.taken && slot.group == group)
            .filter(|slot| planar(slot.position - target).dot(toward_requester) <= 0.0)
            .filter(|slot| navigation.is_navigable(slot.position))
            .map(|slot| (slot.position.distance(requester), slot.id))
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        for (_, id) in candidates {
            let Some(slot) = self.get(id) else {
                continue;
            };
            let path = navigation.path(requester, slot.position);
            let reachable = match path.status {
                PathStatus::Complete => path.length <= max_dist,
                PathStatus::Partial => {
                    path.length <= max_dist
                        && path.end.distance(slot.position) <= Self::PARTIAL_PATH_TOLERANCE
                }
                PathStatus::Invalid => false,
            };
            if reachable && self.take(id) {
                tracing::debug!(cover = %id, "cover slot claimed");
                return Some(id);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{OpenField, PathQuery};

    struct ShortWalls;

    impl NavigationOracle for ShortWalls {
        fn is_navigable(&self, point: Vec3) -> bool {
            point.x > -100.0
        }

        fn path(&self, from: Vec3, to: Vec3) -> PathQuery {
            // Stops two units short of every destination.
            let full = from.distance(to);
            let end = from + (to - from).normalize_or_zero() * (full - 2.0).max(0.0);
            PathQuery::partial(full - 2.0, end)
        }
    }

    #[test]
    fn never_returns_taken_slot() {
        let mut covers = CoverSlots::new();
        let only = covers.add(Vec3::new(0.0, 0.0, -5.0), 0, (2.0, 4.0));
        let requester = Vec3::new(0.0, 0.0, 5.0);
        let target = Vec3::ZERO;

        assert_eq!(covers.get_cover(requester, target, 50.0, 0, &OpenField), Some(only));
        assert_eq!(covers.get_cover(requester, target, 50.0, 0, &OpenField), None);
        assert!(covers.free(only));
        assert_eq!(covers.get_cover(requester, target, 50.0, 0, &OpenField), Some(only));
    }

    #[test]
    fn never_returns_slot_on_requester_side() {
        let mut covers = CoverSlots::new();
        covers.add(Vec3::new(1.0, 0.0, 3.0), 0, (2.0, 4.0));
        covers.add(Vec3::new(-1.0, 0.0, 2.0), 0, (2.0, 4.0));
        let far_side = covers.add(Vec3::new(0.0, 0.0, -3.0), 0, (2.0, 4.0));

        let picked = covers.get_cover(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 50.0, 0, &OpenField);
        assert_eq!(picked, Some(far_side));
        assert_eq!(
            covers.get_cover(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 50.0, 0, &OpenField),
            None
        );
    }

    #[test]
    fn prefers_nearest_and_respects_group() {
        let mut covers = CoverSlots::new();
        let other_group = covers.add(Vec3::new(0.0, 0.0, -1.0), 7, (2.0, 4.0));
        let far = covers.add(Vec3::new(0.0, 0.0, -9.0), 0, (2.0, 4.0));
        let near = covers.add(Vec3::new(2.0, 0.0, -2.0), 0, (2.0, 4.0));

        let requester = Vec3::new(0.0, 0.0, 5.0);
        assert_eq!(covers.get_cover(requester, Vec3::ZERO, 50.0, 0, &OpenField), Some(near));
        assert_eq!(covers.get_cover(requester, Vec3::ZERO, 50.0, 0, &OpenField), Some(far));
        assert!(!covers.get(other_group).unwrap().is_taken());
    }

    #[test]
    fn path_length_limits_choice() {
        let mut covers = CoverSlots::new();
        covers.add(Vec3::new(0.0, 0.0, -20.0), 0, (2.0, 4.0));
        assert_eq!(
            covers.get_cover(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 10.0, 0, &OpenField),
            None
        );
    }

    #[test]
    fn partial_path_close_enough_is_accepted() {
        let mut covers = CoverSlots::new();
        let slot = covers.add(Vec3::new(0.0, 0.0, -5.0), 0, (2.0, 4.0));
        assert_eq!(
            covers.get_cover(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 50.0, 0, &ShortWalls),
            Some(slot)
        );
    }
}
