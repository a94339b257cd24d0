//! Value types passed from the bridge to downstream consumers.
//!
//! Everything here is owned data: by the time a consumer sees a value, the
//! guest pointer it was decoded from is already out of the picture.

use std::fmt;

/// Integer handle assigned by the compiled module to a scene object or
/// hierarchy item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub i32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<i32> for ObjectId {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

/// World-space position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Linear RGB color, components nominally in `0.0..=1.0`.
///
/// Values are forwarded as the guest sent them; no clamping happens here.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// A spawned renderable entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObject {
    pub id: ObjectId,
    pub position: Vec3,
    pub color: Color,
}

/// One row of the hierarchy view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyItem {
    pub name: String,
    pub id: ObjectId,
}

/// A decoded bridge call, queued for consumers that cannot handle it inline.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    Log(String),
    HierarchyInsert(HierarchyItem),
    Spawn(SceneObject),
    Move { id: ObjectId, position: Vec3 },
}
