//! Downstream capability traits.
//!
//! The bridge decodes each guest call and forwards it to one of these.
//! Implementations receive owned or borrowed host data only, never a guest
//! pointer, and must return without blocking: the guest is suspended inside
//! its call instruction until they do. A consumer that needs slow or
//! asynchronous work should queue the data (see [`ChannelSink`]) and return.
//!
//! Bookkeeping of which handles exist lives in the bridge, so these methods
//! are notifications and cannot fail.
//!
//! [`ChannelSink`]: crate::ChannelSink

use crate::types::{Color, ObjectId, Vec3};

/// Receives text from the guest's `LogOutput` calls.
pub trait LogSink: Send {
    /// Append one log entry. Each call is a separate entry, even when the
    /// text repeats.
    fn write(&mut self, text: &str);
}

/// Receives hierarchy rows from `AddHierarchyItem`.
pub trait HierarchyView: Send {
    /// Append `(name, id)`. Duplicate pairs are forwarded as-is; whether to
    /// collapse them is the view's decision.
    fn insert(&mut self, name: &str, id: ObjectId);
}

/// Receives entity lifecycle calls from `Spawn3DObject` / `UpdateObject`.
pub trait Scene: Send {
    /// Create the entity `id`, or replace it if the bridge allows respawns.
    fn spawn(&mut self, id: ObjectId, position: Vec3, color: Color);

    /// Move an entity the bridge has already seen spawned.
    fn move_object(&mut self, id: ObjectId, position: Vec3);
}
