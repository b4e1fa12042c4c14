//! # Persistence Module
//!
//! JSON snapshot codecs for the world and the scene. Import is strictly
//! validate-then-apply: the whole file is parsed and every coordinate, tag,
//! and id checked before a single store is touched, so a malformed snapshot
//! is rejected in its entirety and existing state survives unchanged.
//!
//! World imports tolerate a *missing* top-level section by leaving the
//! corresponding store untouched; a section that is present but malformed
//! still rejects the import wholesale.

use std::collections::{HashMap, HashSet};
use std::fmt;

use cgmath::{InnerSpace, Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::camera_state::camera::OrbitCamera;
use super::camera_state::OrbitController;
use super::scene::object::{ObjectProperties, SceneObject};
use super::scene::{ObjectId, ObjectKind, SceneRegistry};
use super::world::block_type::BlockType;
use super::world::player::{GameMode, Player};
use super::world::statistics::WorldStatistics;
use super::world::VoxelWorld;

/// Version string stamped into scene snapshot metadata.
const SCENE_FORMAT_VERSION: &str = "1.0";

/// Snapshot decode/validation failure.
///
/// Never fatal to the running session: the import is aborted with no
/// partial state change and the failure is reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SnapshotError {
    /// The file failed to parse or failed shape/content validation.
    Malformed(String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Malformed(reason) => write!(f, "malformed snapshot: {}", reason),
        }
    }
}

impl std::error::Error for SnapshotError {}

#[derive(Debug, Serialize, Deserialize)]
struct WorldSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    world: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    player: Option<PlayerSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    statistics: Option<StatisticsSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerSnapshot {
    inventory: HashMap<String, u32>,
    position: [f32; 3],
    selected_slot: String,
    game_mode: GameMode,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatisticsSnapshot {
    total_blocks_placed: u64,
    total_blocks_mined: u64,
    unique_block_types: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SceneSnapshot {
    objects: Vec<ObjectSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    camera: Option<CameraSnapshot>,
    metadata: SceneMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
struct ObjectSnapshot {
    id: u64,
    #[serde(rename = "type")]
    kind: ObjectKind,
    position: [f32; 3],
    rotation: [f32; 3],
    scale: [f32; 3],
    properties: ObjectProperties,
}

#[derive(Debug, Serialize, Deserialize)]
struct CameraSnapshot {
    position: [f32; 3],
    target: [f32; 3],
}

#[derive(Debug, Serialize, Deserialize)]
struct SceneMetadata {
    name: String,
    created: String,
    version: String,
}

fn format_coordinate(coord: Point3<i32>) -> String {
    format!("{},{},{}", coord.x, coord.y, coord.z)
}

fn parse_coordinate(key: &str) -> Result<Point3<i32>, SnapshotError> {
    let mut parts = key.split(',');
    let mut next = |axis: &str| -> Result<i32, SnapshotError> {
        parts
            .next()
            .and_then(|part| part.trim().parse().ok())
            .ok_or_else(|| SnapshotError::Malformed(format!("bad {} in coordinate '{}'", axis, key)))
    };
    let x = next("x")?;
    let y = next("y")?;
    let z = next("z")?;
    if parts.next().is_some() {
        return Err(SnapshotError::Malformed(format!(
            "trailing data in coordinate '{}'",
            key
        )));
    }
    Ok(Point3::new(x, y, z))
}

fn parse_block_tag(tag: &str) -> Result<BlockType, SnapshotError> {
    BlockType::from_tag(tag)
        .ok_or_else(|| SnapshotError::Malformed(format!("unknown block type '{}'", tag)))
}

/// Serializes the world, player, and statistics to the snapshot format.
pub fn export_world(world: &VoxelWorld, player: &Player, stats: &WorldStatistics) -> String {
    let world_map: HashMap<String, String> = world
        .iter()
        .map(|(coord, block)| (format_coordinate(coord), block.tag().to_string()))
        .collect();

    let inventory: HashMap<String, u32> = player
        .inventory
        .iter()
        .map(|(block, count)| (block.tag().to_string(), count))
        .collect();

    let snapshot = WorldSnapshot {
        world: Some(world_map),
        player: Some(PlayerSnapshot {
            inventory,
            position: player.position.into(),
            selected_slot: player.selected_block.tag().to_string(),
            game_mode: player.game_mode,
        }),
        statistics: Some(StatisticsSnapshot {
            total_blocks_placed: stats.total_placed,
            total_blocks_mined: stats.total_mined,
            unique_block_types: stats
                .touched_types
                .iter()
                .map(|block| block.tag().to_string())
                .collect(),
        }),
    };

    serde_json::to_string_pretty(&snapshot).expect("world snapshot serialization cannot fail")
}

/// Applies a world snapshot file.
///
/// Every section is decoded and validated before anything mutates. Missing
/// top-level sections leave the corresponding store untouched; present
/// sections replace their store wholesale.
///
/// # Errors
/// * `Malformed` on any parse or validation failure; no state changes.
pub fn import_world(
    json: &str,
    world: &mut VoxelWorld,
    player: &mut Player,
    stats: &mut WorldStatistics,
) -> Result<(), SnapshotError> {
    let snapshot: WorldSnapshot = serde_json::from_str(json)
        .map_err(|err| SnapshotError::Malformed(err.to_string()))?;

    // Decode everything up front; nothing mutates until all sections pass.
    let decoded_world = match &snapshot.world {
        Some(entries) => {
            let mut decoded = HashMap::with_capacity(entries.len());
            for (key, tag) in entries {
                decoded.insert(parse_coordinate(key)?, parse_block_tag(tag)?);
            }
            Some(decoded)
        }
        None => None,
    };

    let decoded_player = match &snapshot.player {
        Some(section) => {
            let mut inventory = HashMap::with_capacity(section.inventory.len());
            for (tag, count) in &section.inventory {
                inventory.insert(parse_block_tag(tag)?, *count);
            }
            let selected = parse_block_tag(&section.selected_slot)?;
            Some((inventory, section.position, selected, section.game_mode))
        }
        None => None,
    };

    let decoded_stats = match &snapshot.statistics {
        Some(section) => {
            let mut touched = HashSet::with_capacity(section.unique_block_types.len());
            for tag in &section.unique_block_types {
                touched.insert(parse_block_tag(tag)?);
            }
            Some((section.total_blocks_placed, section.total_blocks_mined, touched))
        }
        None => None,
    };

    if let Some(decoded) = decoded_world {
        world.restore(decoded);
    }
    if let Some((inventory, position, selected, game_mode)) = decoded_player {
        player.inventory.replace(inventory);
        player.position = Point3::new(position[0], position[1], position[2]);
        player.selected_block = selected;
        player.game_mode = game_mode;
    }
    if let Some((placed, mined, touched)) = decoded_stats {
        stats.total_placed = placed;
        stats.total_mined = mined;
        stats.touched_types = touched;
    }
    Ok(())
}

/// Serializes the scene registry and camera to the snapshot format.
///
/// # Arguments
/// * `registry` - The scene objects to export
/// * `camera` - The orbit camera pose recorded alongside them
/// * `name` - Scene name for the metadata block
/// * `created` - ISO-8601 creation timestamp supplied by the caller
pub fn export_scene(
    registry: &SceneRegistry,
    camera: &OrbitCamera,
    name: &str,
    created: &str,
) -> String {
    let objects = registry
        .iter()
        .map(|object| ObjectSnapshot {
            id: object.id.0,
            kind: object.kind,
            position: object.position.into(),
            rotation: object.rotation.into(),
            scale: object.scale.into(),
            properties: object.properties.clone(),
        })
        .collect();

    let snapshot = SceneSnapshot {
        objects,
        camera: Some(CameraSnapshot {
            position: camera.position().into(),
            target: camera.target.into(),
        }),
        metadata: SceneMetadata {
            name: name.to_string(),
            created: created.to_string(),
            version: SCENE_FORMAT_VERSION.to_string(),
        },
    };

    serde_json::to_string_pretty(&snapshot).expect("scene snapshot serialization cannot fail")
}

/// Applies a scene snapshot file.
///
/// The registry is cleared wholesale before repopulating; the camera, when
/// a pose was recorded, is moved to the stored target with its spherical
/// coordinates derived from the stored eye position.
///
/// # Errors
/// * `Malformed` on any parse or validation failure (including duplicate
///   object ids); no state changes.
pub fn import_scene(
    json: &str,
    registry: &mut SceneRegistry,
    controller: &mut OrbitController,
) -> Result<(), SnapshotError> {
    let snapshot: SceneSnapshot = serde_json::from_str(json)
        .map_err(|err| SnapshotError::Malformed(err.to_string()))?;

    let mut seen = HashSet::new();
    for object in &snapshot.objects {
        if !seen.insert(object.id) {
            return Err(SnapshotError::Malformed(format!(
                "duplicate object id {}",
                object.id
            )));
        }
        for axis in object.scale {
            if !axis.is_finite() {
                return Err(SnapshotError::Malformed(format!(
                    "non-finite scale on object {}",
                    object.id
                )));
            }
        }
    }

    registry.clear();
    for object in snapshot.objects {
        registry.restore_object(SceneObject {
            id: ObjectId(object.id),
            kind: object.kind,
            position: Point3::from(object.position),
            rotation: Vector3::from(object.rotation),
            scale: Vector3::from(object.scale),
            properties: object.properties,
        });
    }

    if let Some(pose) = snapshot.camera {
        let target = Point3::from(pose.target);
        let offset = Point3::from(pose.position) - target;
        let radius = offset.magnitude();
        controller.camera.target = target;
        if radius > f32::EPSILON {
            controller.camera.set_radius(radius);
            controller.camera.phi =
                (offset.y / radius).clamp(-1.0, 1.0).acos().clamp(
                    super::camera_state::camera::PHI_MIN,
                    super::camera_state::camera::PHI_MAX,
                );
            controller.camera.theta = offset.x.atan2(offset.z);
        }
    }
    Ok(())
}

/// Formats a Unix timestamp (seconds) as an ISO-8601 UTC string.
///
/// Days-to-civil conversion per the standard proleptic Gregorian
/// arithmetic.
pub fn iso8601_from_unix(seconds: u64) -> String {
    let days = seconds / 86_400;
    let secs_of_day = seconds % 86_400;

    let mut era_day = days as i64 + 719_468;
    let era = era_day.div_euclid(146_097);
    era_day = era_day.rem_euclid(146_097);
    let year_of_era = (era_day - era_day / 1460 + era_day / 36_524 - era_day / 146_096) / 365;
    let day_of_year = era_day - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let month_index = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * month_index + 2) / 5 + 1;
    let month = if month_index < 10 {
        month_index + 3
    } else {
        month_index - 9
    };
    let year = year_of_era + era * 400 + i64::from(month <= 2);

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year,
        month,
        day,
        secs_of_day / 3600,
        (secs_of_day % 3600) / 60,
        secs_of_day % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_strings_round_trip() {
        let coord = Point3::new(-3, 0, 17);
        assert_eq!(parse_coordinate(&format_coordinate(coord)).unwrap(), coord);
    }

    #[test]
    fn bad_coordinates_are_rejected() {
        assert!(parse_coordinate("1,2").is_err());
        assert!(parse_coordinate("1,2,3,4").is_err());
        assert!(parse_coordinate("a,b,c").is_err());
    }

    #[test]
    fn iso8601_formats_the_epoch() {
        assert_eq!(iso8601_from_unix(0), "1970-01-01T00:00:00Z");
        assert_eq!(iso8601_from_unix(86_400 + 3_661), "1970-01-02T01:01:01Z");
    }
}
