//! Level layout loader.
//!
//! A level file describes static content only: zone prisms, cover slots,
//! patrol paths, scene markers and agent spawns. Runtime state comes from
//! save files instead.

use std::path::Path;

use guard_core::{LevelLayout, WrapMode};

use crate::loaders::{LoadResult, read_file};

/// Loader for level layouts from RON files.
pub struct LevelLoader;

impl LevelLoader {
    /// Load a level layout from a RON file.
    pub fn load(path: &Path) -> LoadResult<LevelLayout> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse a level layout and check that its internal references resolve.
    pub fn parse(content: &str) -> LoadResult<LevelLayout> {
        let layout: LevelLayout = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse level RON: {}", e))?;
        Self::validate(&layout)?;
        Ok(layout)
    }

    fn validate(layout: &LevelLayout) -> LoadResult<()> {
        for (index, zone) in layout.zones.iter().enumerate() {
            if zone.outline.len() < 3 {
                anyhow::bail!(
                    "zone {} ({}) needs at least 3 outline points, found {}",
                    index,
                    zone.name,
                    zone.outline.len()
                );
            }
            if zone.ceiling < zone.floor {
                anyhow::bail!("zone {} ({}) has its ceiling below its floor", index, zone.name);
            }
        }

        for path in &layout.paths {
            if path.nodes.is_empty() {
                tracing::warn!(path = %path.name, "patrol path has no nodes");
            }
            if let WrapMode::SwitchTo(target) = path.wrap {
                if target.0 as usize >= layout.paths.len() {
                    anyhow::bail!("path {} switches to missing {}", path.name, target);
                }
            }
        }

        for (index, spawn) in layout.agents.iter().enumerate() {
            if let Some(zone) = spawn.zone {
                if zone.0 as usize >= layout.zones.len() {
                    anyhow::bail!("agent spawn {} references missing {}", index, zone);
                }
            }
            if let Some(path) = spawn.patrol {
                if path.0 as usize >= layout.paths.len() {
                    anyhow::bail!("agent spawn {} references missing {}", index, path);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use glam::{Vec2, Vec3};
    use guard_core::{MarkerKind, PathId, ZoneId};

    use super::*;

    const DOCK: &str = r#"(
    name: "dock",
    zones: [
        (
            name: "pier",
            outline: [(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (0.0, 20.0)],
            floor: -1.0,
            ceiling: 4.0,
            crossing_attention: true,
        ),
    ],
    covers: [
        (position: (5.0, 0.0, 12.0), stay: (2.0, 4.0)),
    ],
    paths: [
        (
            name: "rounds",
            nodes: [
                (position: (2.0, 0.0, 2.0), wait_time: 1.5),
                (position: (18.0, 0.0, 2.0), direction: (1.0, 0.0, 0.0)),
            ],
            wrap: PingPong,
        ),
    ],
    markers: [
        (kind: Fear, position: (10.0, 0.0, 10.0)),
    ],
    agents: [
        (position: (2.0, 0.0, 2.0), zone: Some(ZoneId(0)), patrol: Some(PathId(0))),
        (position: (15.0, 0.0, 15.0), throws_grenades: true),
    ],
)"#;

    #[test]
    fn parses_full_layout() {
        let layout = LevelLoader::parse(DOCK).unwrap();

        assert_eq!(layout.name, "dock");
        assert_eq!(layout.zones[0].outline[2], Vec2::new(20.0, 20.0));
        assert!(layout.zones[0].crossing_attention);
        assert_eq!(layout.covers[0].group, 0);
        assert_eq!(layout.paths[0].wrap, WrapMode::PingPong);
        assert_eq!(layout.paths[0].nodes[0].direction, Vec3::Z);
        assert_eq!(layout.paths[0].nodes[1].wait_time, 0.0);
        assert_eq!(layout.markers[0].kind, MarkerKind::Fear);

        let first = &layout.agents[0];
        assert_eq!(first.zone, Some(ZoneId(0)));
        assert_eq!(first.patrol, Some(PathId(0)));
        assert_eq!(first.health, 1.0);
        assert!(layout.agents[1].throws_grenades);
        assert_eq!(layout.agents[1].direction, Vec3::Z);
    }

    #[test]
    fn rejects_dangling_spawn_zone() {
        let content = r#"(
    name: "broken",
    agents: [(position: (0.0, 0.0, 0.0), zone: Some(ZoneId(2)))],
)"#;
        let error = LevelLoader::parse(content).unwrap_err();
        assert!(error.to_string().contains("references missing zone:2"));
    }

    #[test]
    fn rejects_degenerate_zone() {
        let content = r#"(
    zones: [(name: "line", outline: [(0.0, 0.0), (1.0, 0.0)], floor: 0.0, ceiling: 2.0)],
)"#;
        assert!(LevelLoader::parse(content).is_err());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", DOCK).unwrap();
        let layout = LevelLoader::load(file.path()).unwrap();
        assert_eq!(layout.agents.len(), 2);
    }
}
