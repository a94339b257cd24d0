//! Per-instance host state held in the Wasmtime Store.
//!
//! `HostState` owns the downstream sinks, the registry of spawned handles,
//! and the record of calls the bridge had to absorb. The linker decodes raw
//! arguments and then calls the handler methods here with owned values.

use std::collections::BTreeMap;
use std::sync::mpsc::Receiver;

use lunx_hostapi::{
    BridgeEvent, ChannelSink, Color, DecodeError, HierarchyView, HostError, LogSink, ObjectId,
    Scene, SceneObject, Vec3,
};
use wasmtime::{StoreLimits, StoreLimitsBuilder};

use crate::config::{BridgeConfig, SpawnPolicy};
use crate::exports::{ADD_HIERARCHY_ITEM, LOG_OUTPUT, SPAWN_3D_OBJECT, UPDATE_OBJECT};
use crate::memory::ScriptRegion;

/// The three downstream capabilities a session forwards to.
pub struct Sinks {
    pub log: Box<dyn LogSink>,
    pub hierarchy: Box<dyn HierarchyView>,
    pub scene: Box<dyn Scene>,
}

impl Sinks {
    pub fn new(
        log: impl LogSink + 'static,
        hierarchy: impl HierarchyView + 'static,
        scene: impl Scene + 'static,
    ) -> Self {
        Self {
            log: Box::new(log),
            hierarchy: Box::new(hierarchy),
            scene: Box::new(scene),
        }
    }

    /// Route everything into one queue.
    pub fn channel() -> (Self, Receiver<BridgeEvent>) {
        let (sink, rx) = ChannelSink::new();
        (Self::new(sink.clone(), sink.clone(), sink), rx)
    }
}

/// A call the bridge received but could not honor as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeFault {
    /// Bridge name of the export that was called.
    pub export: &'static str,
    pub error: HostError,
}

/// Per-instance mutable state held in the Wasmtime `Store`.
pub struct HostState {
    sinks: Sinks,
    /// Spawned handles with their current position and color.
    objects: BTreeMap<ObjectId, SceneObject>,
    faults: Vec<BridgeFault>,
    /// Total bridge calls received, including absorbed ones.
    pub calls: u64,
    pub spawn_policy: SpawnPolicy,
    pub decode_placeholder: String,
    pub max_string_len: usize,
    /// Region for host-written script buffers; created on first use.
    pub script_region: Option<ScriptRegion>,
    pub limits: StoreLimits,
}

impl HostState {
    pub fn new(sinks: Sinks, config: &BridgeConfig) -> Self {
        Self {
            sinks,
            objects: BTreeMap::new(),
            faults: Vec::new(),
            calls: 0,
            spawn_policy: config.spawn_policy,
            decode_placeholder: config.decode_placeholder.clone(),
            max_string_len: config.max_string_len,
            script_region: None,
            limits: StoreLimitsBuilder::new()
                .memory_size(config.max_memory_bytes())
                .instances(1)
                .build(),
        }
    }

    /// `LogOutput`: forward the decoded text, or the placeholder if decoding
    /// failed.
    pub fn log_output(&mut self, message: Result<String, DecodeError>) {
        self.calls += 1;
        let result = match message {
            Ok(text) => {
                self.sinks.log.write(&text);
                Ok(())
            }
            Err(e) => {
                self.sinks.log.write(&self.decode_placeholder);
                Err(e.into())
            }
        };
        self.absorb(LOG_OUTPUT.name, result);
    }

    /// `AddHierarchyItem`: append `(name, id)` without deduplication.
    pub fn add_hierarchy_item(&mut self, name: Result<String, DecodeError>, id: ObjectId) {
        self.calls += 1;
        let result = match name {
            Ok(name) => {
                self.sinks.hierarchy.insert(&name, id);
                Ok(())
            }
            Err(e) => {
                self.sinks.hierarchy.insert(&self.decode_placeholder, id);
                Err(e.into())
            }
        };
        self.absorb(ADD_HIERARCHY_ITEM.name, result);
    }

    /// `Spawn3DObject`: register the handle and notify the scene.
    pub fn spawn_object(&mut self, id: ObjectId, position: Vec3, color: Color) {
        self.calls += 1;
        let result = self.try_spawn(id, position, color);
        self.absorb(SPAWN_3D_OBJECT.name, result);
    }

    /// `UpdateObject`: move a spawned handle, keeping its color.
    pub fn update_object(&mut self, id: ObjectId, position: Vec3) {
        self.calls += 1;
        let result = self.try_move(id, position);
        self.absorb(UPDATE_OBJECT.name, result);
    }

    fn try_spawn(&mut self, id: ObjectId, position: Vec3, color: Color) -> Result<(), HostError> {
        if self.objects.contains_key(&id) && self.spawn_policy == SpawnPolicy::Reject {
            return Err(HostError::DuplicateHandle(id));
        }
        self.objects.insert(id, SceneObject { id, position, color });
        self.sinks.scene.spawn(id, position, color);
        Ok(())
    }

    fn try_move(&mut self, id: ObjectId, position: Vec3) -> Result<(), HostError> {
        let object = self
            .objects
            .get_mut(&id)
            .ok_or(HostError::UnknownHandle(id))?;
        object.position = position;
        self.sinks.scene.move_object(id, position);
        Ok(())
    }

    /// Log and record a failed call. The guest has no return channel, so
    /// this is where bridge errors end.
    fn absorb(&mut self, export: &'static str, result: Result<(), HostError>) {
        if let Err(error) = result {
            tracing::warn!(target: "lunx::bridge", export, %error, "bridge call dropped");
            self.faults.push(BridgeFault { export, error });
        }
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Spawned objects ordered by handle.
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    pub fn faults(&self) -> &[BridgeFault] {
        &self.faults
    }

    /// Hand the sinks back, e.g. to reuse them for another session.
    pub fn into_sinks(self) -> Sinks {
        self.sinks
    }
}
