//! Bridge runtime: Wasmtime engine, module loading, and sessions.
//!
//! `Bridge` compiles and validates a module once. Each call to
//! [`Bridge::instantiate`] creates a `BridgeSession`: a fresh instance with
//! its own store, host state and sinks. The session drives the module
//! through its exports; the module calls back into the bridge from inside
//! those calls.

use std::path::Path;

use wasmtime::{Config, Engine, Instance, Linker, Memory, Module, Store, Trap, TypedFunc};

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::host_impl::{BridgeFault, HostState, Sinks};
use crate::linker::register_host_functions;
use crate::memory::{self, ScriptRegion};
use crate::validation::{
    validate_module, ModuleExports, FREE_EXPORT, INIT_EXPORT, MALLOC_EXPORT, RUN_SCRIPT_EXPORT,
};

/// A compiled, validated engine module.
pub struct Bridge {
    engine: Engine,
    module: Module,
    exports: ModuleExports,
    digest: blake3::Hash,
    config: BridgeConfig,
}

impl Bridge {
    /// Create a bridge from WASM bytecode (binary or text format).
    pub fn new(wasm_bytes: &[u8], config: BridgeConfig) -> Result<Self, BridgeError> {
        let engine = create_engine()?;
        let module = Module::new(&engine, wasm_bytes)?;
        Self::with_module(engine, module, blake3::hash(wasm_bytes), config)
    }

    /// Load from a `.wasm` or `.wat` file path.
    pub fn from_file(path: &Path, config: BridgeConfig) -> Result<Self, BridgeError> {
        let bytes = std::fs::read(path)
            .map_err(|e| BridgeError::Validation(format!("{}: {e}", path.display())))?;
        Self::new(&bytes, config)
    }

    fn with_module(
        engine: Engine,
        module: Module,
        digest: blake3::Hash,
        config: BridgeConfig,
    ) -> Result<Self, BridgeError> {
        let exports = validate_module(&module, config.allow_unknown_imports)?;
        tracing::info!(
            digest = %digest.to_hex(),
            init = exports.initialize,
            run_script = exports.run_script,
            guest_alloc = exports.guest_alloc,
            "module loaded"
        );
        Ok(Self {
            engine,
            module,
            exports,
            digest,
            config,
        })
    }

    /// BLAKE3 hash of the module bytes the bridge was built from.
    pub fn module_digest(&self) -> blake3::Hash {
        self.digest
    }

    pub fn exports(&self) -> ModuleExports {
        self.exports
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Instantiate the module with a fresh host state forwarding to `sinks`.
    pub fn instantiate(&self, sinks: Sinks) -> Result<BridgeSession, BridgeError> {
        let mut store = Store::new(&self.engine, HostState::new(sinks, &self.config));
        store.limiter(|state| &mut state.limits);
        store.set_fuel(self.config.fuel_limit)?;

        let mut linker = Linker::new(&self.engine);
        register_host_functions(&mut linker)?;
        if self.config.allow_unknown_imports {
            linker.define_unknown_imports_as_traps(&self.module)?;
        }

        let instance = handle_trap(linker.instantiate(&mut store, &self.module))?;
        let memory = instance
            .get_memory(&mut store, "memory")
            .ok_or_else(|| BridgeError::Memory("no memory export".into()))?;

        let guest_alloc = if self.exports.guest_alloc {
            Some((
                instance.get_typed_func::<i32, i32>(&mut store, MALLOC_EXPORT)?,
                instance.get_typed_func::<i32, ()>(&mut store, FREE_EXPORT)?,
            ))
        } else {
            None
        };

        Ok(BridgeSession {
            store,
            instance,
            memory,
            exports: self.exports,
            guest_alloc,
        })
    }
}

/// One live instance of the module and its host state.
pub struct BridgeSession {
    store: Store<HostState>,
    instance: Instance,
    memory: Memory,
    exports: ModuleExports,
    guest_alloc: Option<(TypedFunc<i32, i32>, TypedFunc<i32, ()>)>,
}

impl BridgeSession {
    /// Run the module's engine start-up export.
    ///
    /// Returns `false` if the module has no such export.
    pub fn initialize(&mut self) -> Result<bool, BridgeError> {
        if !self.exports.initialize {
            return Ok(false);
        }
        self.call(INIT_EXPORT)?;
        Ok(true)
    }

    /// Pass `source` to the module's script entry point.
    ///
    /// The text is copied into guest memory with a NUL terminator and the
    /// buffer is released as soon as the call returns.
    pub fn run_script(&mut self, source: &str) -> Result<(), BridgeError> {
        if !self.exports.run_script {
            return Err(BridgeError::MissingExport(RUN_SCRIPT_EXPORT.into()));
        }
        let run = self
            .instance
            .get_typed_func::<i32, ()>(&mut self.store, RUN_SCRIPT_EXPORT)?;

        let mut bytes = Vec::with_capacity(source.len() + 1);
        bytes.extend_from_slice(source.as_bytes());
        bytes.push(0);

        match self.guest_alloc.clone() {
            Some((malloc, free)) => {
                let len = i32::try_from(bytes.len())
                    .map_err(|_| BridgeError::Memory("script too large".into()))?;
                let ptr = handle_trap(malloc.call(&mut self.store, len))?;
                if ptr <= 0 {
                    return Err(BridgeError::Memory(format!("malloc({len}) returned {ptr}")));
                }
                if !memory::write_bytes(self.memory.data_mut(&mut self.store), ptr as usize, &bytes)
                {
                    handle_trap(free.call(&mut self.store, ptr))?;
                    return Err(BridgeError::Memory(format!(
                        "malloc({len}) returned {ptr}, too close to the end of memory"
                    )));
                }
                let result = handle_trap(run.call(&mut self.store, ptr));
                // After a trap the guest heap can't be trusted; leave it alone.
                if result.is_ok() {
                    handle_trap(free.call(&mut self.store, ptr))?;
                }
                result
            }
            None => {
                let ptr = self.host_write(&bytes)?;
                let result = handle_trap(run.call(&mut self.store, ptr));
                if let Some(region) = self.store.data_mut().script_region.as_mut() {
                    region.reset();
                }
                result
            }
        }
    }

    /// Call a zero-argument export, e.g. a per-frame tick.
    pub fn call(&mut self, name: &str) -> Result<(), BridgeError> {
        if self.instance.get_func(&mut self.store, name).is_none() {
            return Err(BridgeError::MissingExport(name.to_string()));
        }
        let func = self.instance.get_typed_func::<(), ()>(&mut self.store, name)?;
        handle_trap(func.call(&mut self.store, ()))
    }

    pub fn state(&self) -> &HostState {
        self.store.data()
    }

    pub fn faults(&self) -> &[BridgeFault] {
        self.store.data().faults()
    }

    /// Current linear memory size in 64 KiB pages.
    pub fn memory_pages(&self) -> u64 {
        self.memory.size(&self.store)
    }

    /// Fuel left before the guest is stopped.
    pub fn fuel_remaining(&self) -> Result<u64, BridgeError> {
        Ok(self.store.get_fuel()?)
    }

    /// Tear down the instance and return its host state.
    pub fn finish(self) -> HostState {
        let state = self.store.into_data();
        tracing::debug!(calls = state.calls, faults = state.faults().len(), "session finished");
        state
    }

    /// Copy `data` into the host script region, growing memory as needed.
    fn host_write(&mut self, data: &[u8]) -> Result<i32, BridgeError> {
        let memory_len = self.memory.data_size(&self.store);
        let region = self
            .store
            .data()
            .script_region
            .unwrap_or_else(|| ScriptRegion::empty_at(memory_len));
        let placement = region.place(data.len(), memory_len);

        if placement.region.start() != region.start() {
            tracing::debug!(
                from = region.start(),
                to = placement.region.start(),
                "script region moved past guest memory"
            );
        }
        if placement.grow_pages > 0 {
            self.memory
                .grow(&mut self.store, placement.grow_pages)
                .map_err(|e| BridgeError::Memory(format!("script region grow: {e}")))?;
        }

        if !memory::write_bytes(self.memory.data_mut(&mut self.store), placement.ptr, data) {
            return Err(BridgeError::Memory(format!(
                "script region write at {:#x} out of bounds",
                placement.ptr
            )));
        }
        self.store.data_mut().script_region = Some(placement.region);

        i32::try_from(placement.ptr)
            .map_err(|_| BridgeError::Memory(format!("pointer {:#x} exceeds i32", placement.ptr)))
    }
}

/// Create a Wasmtime engine for single-threaded, fuel-metered execution.
fn create_engine() -> Result<Engine, BridgeError> {
    let mut wasm_config = Config::new();

    // Fuel bounds runaway scripts
    wasm_config.consume_fuel(true);

    // The bridge contract is single-threaded
    wasm_config.wasm_threads(false);
    wasm_config.wasm_multi_memory(false);

    Ok(Engine::new(&wasm_config)?)
}

/// Convert a guest call result, mapping traps to `BridgeError`.
///
/// Fuel exhaustion becomes `BridgeError::FuelExhausted`, any other trap
/// becomes `BridgeError::GuestTrapped`.
fn handle_trap<R>(result: Result<R, anyhow::Error>) -> Result<R, BridgeError> {
    match result {
        Ok(val) => Ok(val),
        Err(e) => {
            if e.downcast_ref::<Trap>() == Some(&Trap::OutOfFuel) {
                Err(BridgeError::FuelExhausted)
            } else {
                Err(BridgeError::GuestTrapped(format!("{e:#}")))
            }
        }
    }
}
