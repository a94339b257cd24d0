//! Bridge error types.

/// Top-level error type for the bridge crate.
///
/// These surface to the host code driving a module, never to the guest.
/// Errors raised inside a bridge call are absorbed as faults instead.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Wasmtime engine, compilation, linking, or instantiation error.
    #[error("wasmtime error: {0}")]
    Wasmtime(#[from] anyhow::Error),

    /// Module validation failed (missing memory, bad import signature, etc.).
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration could not be read or is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// Memory operation failed (out-of-bounds, grow failure, null malloc).
    #[error("memory error: {0}")]
    Memory(String),

    /// The module does not export the requested function.
    #[error("module has no export '{0}'")]
    MissingExport(String),

    /// Fuel exhausted while the guest was running.
    #[error("fuel exhausted (instruction limit)")]
    FuelExhausted,

    /// WASM guest trapped.
    #[error("guest trapped: {0}")]
    GuestTrapped(String),
}
