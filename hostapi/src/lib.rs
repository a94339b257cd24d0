//! `lunx-hostapi`: host capability traits and types for the LunX bridge.
//!
//! The bridge crate decodes calls coming out of a compiled engine module and
//! forwards them through the traits defined here. This crate provides:
//!
//! - `LogSink`, `HierarchyView`, `Scene`: downstream capabilities
//! - `ObjectId`, `Vec3`, `Color`, `SceneObject`, `HierarchyItem`: owned call data
//! - `HostError` / `DecodeError`: handler failures the bridge absorbs
//! - `MemLog`, `MemHierarchy`, `MemScene`: in-memory sinks for tests and tools
//! - `TracingLog`: guest log output routed into `tracing`
//! - `ChannelSink`: queues `BridgeEvent`s for asynchronous consumers
//!
//! Nothing here touches guest memory.

pub mod error;
pub mod types;
pub mod traits;
pub mod mem_sinks;
pub mod tracing_sink;
pub mod channel;

// Re-export commonly used types at the crate root.
pub use error::{DecodeError, HostError};
pub use types::{BridgeEvent, Color, HierarchyItem, ObjectId, SceneObject, Vec3};
pub use traits::{HierarchyView, LogSink, Scene};
pub use mem_sinks::{MemHierarchy, MemLog, MemScene};
pub use tracing_sink::TracingLog;
pub use channel::ChannelSink;
