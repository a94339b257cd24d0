//! Queueing sink for consumers that do their work off the guest's call path.
//!
//! `ChannelSink` copies each decoded call into an owned [`BridgeEvent`] and
//! sends it down an mpsc channel. Sending never blocks, so the guest resumes
//! immediately; the receiver drains events whenever it gets to them.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::traits::{HierarchyView, LogSink, Scene};
use crate::types::{BridgeEvent, Color, HierarchyItem, ObjectId, SceneObject, Vec3};

/// Implements every capability trait by queueing events.
///
/// Clone it to hand the same queue to all three sink slots.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<BridgeEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver that drains it.
    pub fn new() -> (Self, Receiver<BridgeEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: BridgeEvent) {
        // A dropped receiver means nobody is listening anymore.
        if self.tx.send(event).is_err() {
            tracing::trace!(target: "lunx::bridge", "event receiver dropped");
        }
    }
}

impl LogSink for ChannelSink {
    fn write(&mut self, text: &str) {
        self.send(BridgeEvent::Log(text.to_owned()));
    }
}

impl HierarchyView for ChannelSink {
    fn insert(&mut self, name: &str, id: ObjectId) {
        self.send(BridgeEvent::HierarchyInsert(HierarchyItem {
            name: name.to_owned(),
            id,
        }));
    }
}

impl Scene for ChannelSink {
    fn spawn(&mut self, id: ObjectId, position: Vec3, color: Color) {
        self.send(BridgeEvent::Spawn(SceneObject { id, position, color }));
    }

    fn move_object(&mut self, id: ObjectId, position: Vec3) {
        self.send(BridgeEvent::Move { id, position });
    }
}
