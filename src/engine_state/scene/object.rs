//! # Scene Object Module
//!
//! Defines the free-standing objects that can be placed in the editor
//! independently of the voxel grid: primitive solids and small composite
//! models. Objects carry a transform and display properties and are owned
//! exclusively by the `SceneRegistry`; the 3D renderer refers to them by id
//! only.

use cgmath::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Unique identifier for a scene object.
///
/// Ids are generation-stamped from a monotonic session counter and never
/// collide within a session. Undo re-inserts deleted objects under their
/// original id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "obj-{}", self.0)
    }
}

/// The closed set of placeable object kinds.
///
/// Primitives map to a single geometry; the remaining kinds are composite
/// models assembled from primitives by the renderer's model table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Unit cube primitive.
    Cube,
    /// Sphere primitive.
    Sphere,
    /// Cylinder primitive.
    Cylinder,
    /// Cone primitive.
    Cone,
    /// Composite: trunk cylinder topped by a leaf sphere.
    Tree,
    /// Composite: scaled cube base with a cone roof.
    House,
    /// Composite: five stacked cylinder segments.
    Tower,
    /// Translucent water plane.
    Water,
}

impl ObjectKind {
    /// The lowercase tag used in scene snapshot files.
    pub fn tag(&self) -> &'static str {
        match self {
            ObjectKind::Cube => "cube",
            ObjectKind::Sphere => "sphere",
            ObjectKind::Cylinder => "cylinder",
            ObjectKind::Cone => "cone",
            ObjectKind::Tree => "tree",
            ObjectKind::House => "house",
            ObjectKind::Tower => "tower",
            ObjectKind::Water => "water",
        }
    }

    /// The human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ObjectKind::Cube => "Cube",
            ObjectKind::Sphere => "Sphere",
            ObjectKind::Cylinder => "Cylinder",
            ObjectKind::Cone => "Cone",
            ObjectKind::Tree => "Tree",
            ObjectKind::House => "House",
            ObjectKind::Tower => "Tower",
            ObjectKind::Water => "Water",
        }
    }
}

/// Display properties carried by every scene object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectProperties {
    /// Editor-facing name.
    pub name: String,
    /// Material tag consumed by the renderer's material registry.
    pub material: String,
    /// Whether the object is rendered at all.
    pub visible: bool,
}

/// A free-standing placed object.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneObject {
    /// Unique, generation-stamped identifier.
    pub id: ObjectId,
    /// Which primitive or composite model this object is.
    pub kind: ObjectKind,
    /// World-space position.
    pub position: Point3<f32>,
    /// Euler rotation in radians.
    pub rotation: Vector3<f32>,
    /// Per-axis scale factors.
    pub scale: Vector3<f32>,
    /// Display properties.
    pub properties: ObjectProperties,
}

impl SceneObject {
    /// Creates an object of `kind` at `position` with the default transform:
    /// rotation (0, 0, 0) and scale (1, 1, 1).
    pub fn new(id: ObjectId, kind: ObjectKind, position: Point3<f32>) -> Self {
        Self {
            id,
            kind,
            position,
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            properties: ObjectProperties {
                name: format!("{} {}", kind.display_name(), id.0),
                material: "default".to_string(),
                visible: true,
            },
        }
    }
}

/// A partial update merged into an existing object by
/// `SceneRegistry::update_properties`.
///
/// Only the fields present are applied; everything else is left unchanged.
#[derive(Clone, Debug, Default)]
pub struct ObjectUpdate {
    /// New world-space position.
    pub position: Option<Point3<f32>>,
    /// New Euler rotation in radians.
    pub rotation: Option<Vector3<f32>>,
    /// New per-axis scale.
    pub scale: Option<Vector3<f32>>,
    /// New editor-facing name.
    pub name: Option<String>,
    /// New material tag.
    pub material: Option<String>,
    /// New visibility flag.
    pub visible: Option<bool>,
}
