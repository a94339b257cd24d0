//! Bridge and host configuration.
//!
//! `BridgeConfig` carries the runtime limits and the policies for calls the
//! guest can make but the bridge cannot honor as-is. `HostConfig` is the
//! on-disk TOML layout: a `[bridge]` table layered over defaults and an
//! optional `[backend]` table.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::backend::BackendConfig;
use crate::error::BridgeError;

/// What `Spawn3DObject` does with a handle that is already live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpawnPolicy {
    /// Overwrite position and color and notify the scene again.
    #[default]
    Replace,
    /// Drop the call and record a `DuplicateHandle` fault.
    Reject,
}

/// Configuration for the host bridge.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Maximum linear memory pages (1 page = 64 KiB).
    /// Default: 256 pages = 16 MiB.
    pub max_memory_pages: u32,

    /// Wasmtime fuel limit per session.
    pub fuel_limit: u64,

    /// Longest string, excluding the NUL, the bridge will decode.
    pub max_string_len: usize,

    /// Reused-handle behavior for `Spawn3DObject`.
    pub spawn_policy: SpawnPolicy,

    /// Text forwarded in place of a string that failed to decode.
    pub decode_placeholder: String,

    /// Link imports outside the bridge table as trapping stubs instead of
    /// rejecting the module.
    pub allow_unknown_imports: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_memory_pages: 256, // 16 MiB
            fuel_limit: 1_000_000_000,
            max_string_len: 64 * 1024,
            spawn_policy: SpawnPolicy::Replace,
            decode_placeholder: "<undecodable>".to_string(),
            allow_unknown_imports: false,
        }
    }
}

impl BridgeConfig {
    /// Linear memory cap in bytes.
    pub fn max_memory_bytes(&self) -> usize {
        (self.max_memory_pages as usize) * 65536
    }
}

/// Host process configuration as stored on disk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub bridge: BridgeConfig,
    pub backend: Option<BackendConfig>,
}

impl HostConfig {
    /// Parse a TOML document. Missing `[bridge]` keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, BridgeError> {
        toml::from_str(raw).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, BridgeError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("{}: {e}", path.display())))?;
        toml::from_str(&raw).map_err(|e| BridgeError::Config(format!("{}: {e}", path.display())))
    }
}
