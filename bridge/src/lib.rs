//! `lunx-bridge`: Wasmtime host bridge for compiled LunX engine modules.
//!
//! The engine is C++ compiled to WebAssembly. It has no way to draw or log on
//! its own; instead it imports a small, fixed set of host functions and calls
//! them with scalar arguments and pointers into its linear memory. This crate
//! provides those functions and drives the module:
//!
//! - **Fixed ABI:** Four `env` imports, checked against the module at load time
//! - **Ephemeral pointers:** Strings are copied out during the call, never retained
//! - **Bounded decoding:** NUL scans stop at the memory extent and a length cap
//! - **No faults into the guest:** Bad calls are logged, recorded, and dropped
//! - **Fuel and memory limits:** Runaway scripts stop with an error on the host side
//!
//! The primary entry points are [`Bridge::new`] and [`Bridge::instantiate`].

pub mod error;
pub mod config;
pub mod backend;
pub mod exports;
pub mod memory;
pub mod host_impl;
pub mod validation;
pub mod linker;
pub mod runtime;

pub use error::BridgeError;
pub use config::{BridgeConfig, HostConfig, SpawnPolicy};
pub use backend::{Backend, BackendConfig};
pub use host_impl::{BridgeFault, HostState, Sinks};
pub use runtime::{Bridge, BridgeSession};
