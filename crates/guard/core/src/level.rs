//! Static level description: zones, cover slots, patrol paths, markers and spawns.
//!
//! Handles in a layout are positional: the n-th zone becomes `ZoneId(n)`,
//! the n-th path `PathId(n)`, so spawns and `WrapMode::SwitchTo` can refer to
//! them before the simulation exists.

use glam::{Vec2, Vec3};

use crate::agent::AgentSpawn;
use crate::config::SimConfig;
use crate::error::SimulationError;
use crate::markers::MarkerKind;
use crate::patrol::{PathNode, WrapMode};
use crate::sim::Simulation;
use crate::zone::ZoneBounds;

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LevelLayout {
    pub name: String,
    pub zones: Vec<ZoneSpec>,
    pub covers: Vec<CoverSpec>,
    pub paths: Vec<PathSpec>,
    pub markers: Vec<MarkerSpec>,
    pub agents: Vec<AgentSpawn>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneSpec {
    pub name: String,
    pub outline: Vec<Vec2>,
    pub floor: f32,
    pub ceiling: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub crossing_attention: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverSpec {
    pub position: Vec3,
    #[cfg_attr(feature = "serde", serde(default))]
    pub group: u32,
    /// Min and max seconds an occupant stays.
    pub stay: (f32, f32),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathSpec {
    pub name: String,
    pub nodes: Vec<PathNode>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub wrap: WrapMode,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkerSpec {
    pub kind: MarkerKind,
    pub position: Vec3,
}

impl Simulation {
    /// Builds a simulation and populates it from `layout`.
    ///
    /// # Errors
    ///
    /// Fails when a spawn or path switch references a zone or path the
    /// layout does not define.
    pub fn from_layout(config: SimConfig, layout: &LevelLayout) -> Result<Self, SimulationError> {
        let mut sim = Self::new(config);

        for spec in &layout.zones {
            let bounds = ZoneBounds::new(spec.outline.clone(), spec.floor, spec.ceiling);
            let id = sim.add_zone(spec.name.clone(), bounds);
            if let Some(zone) = sim.zone_mut(id) {
                zone.crossing_attention = spec.crossing_attention;
            }
        }
        for spec in &layout.covers {
            sim.add_cover(spec.position, spec.group, spec.stay);
        }
        for spec in &layout.paths {
            sim.add_path(spec.name.clone(), spec.nodes.clone(), spec.wrap);
        }
        for spec in &layout.paths {
            if let WrapMode::SwitchTo(target) = spec.wrap {
                if !sim.world().paths.contains(target) {
                    return Err(SimulationError::UnknownPath(target));
                }
            }
        }
        for spec in &layout.markers {
            sim.add_marker(spec.kind, spec.position, None);
        }
        for spawn in &layout.agents {
            sim.spawn_agent(spawn.clone())?;
        }

        tracing::info!(
            level = %layout.name,
            zones = layout.zones.len(),
            covers = layout.covers.len(),
            paths = layout.paths.len(),
            agents = layout.agents.len(),
            "level loaded"
        );
        Ok(sim)
    }
}
