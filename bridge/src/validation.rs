//! WASM module validation: bridge ABI checks.
//!
//! Validates a compiled module before the bridge accepts it:
//!
//! 1. `memory` is exported
//! 2. Every bridge import matches its descriptor's signature exactly
//! 3. Imports outside the bridge table are rejected unless allowed
//! 4. Optional driver exports, when present, have the expected signatures
//!
//! The result records which optional exports the module has.

use wasmtime::{ExternType, FuncType, Module, ValType};

use crate::error::BridgeError;
use crate::exports::{find_by_symbol, ParamKind, IMPORT_MODULE};

/// Engine start-up export.
pub const INIT_EXPORT: &str = "InitializeLunXStudio";
/// Script entry point: takes a pointer to a NUL-terminated source string.
pub const RUN_SCRIPT_EXPORT: &str = "RunScript";
pub const MALLOC_EXPORT: &str = "malloc";
pub const FREE_EXPORT: &str = "free";

/// Optional exports: (name, params, results).
const OPTIONAL_EXPORTS: &[(&str, &[ParamKind], &[ParamKind])] = &[
    (INIT_EXPORT, &[], &[]),
    (RUN_SCRIPT_EXPORT, &[ParamKind::Pointer], &[]),
    (MALLOC_EXPORT, &[ParamKind::I32], &[ParamKind::Pointer]),
    (FREE_EXPORT, &[ParamKind::Pointer], &[]),
];

/// Which optional exports the module provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModuleExports {
    pub initialize: bool,
    pub run_script: bool,
    /// Both `malloc` and `free` are exported.
    pub guest_alloc: bool,
}

/// Validate that a WASM module can be linked against the bridge.
pub fn validate_module(
    module: &Module,
    allow_unknown_imports: bool,
) -> Result<ModuleExports, BridgeError> {
    let exports = validate_exports(module)?;
    validate_imports(module, allow_unknown_imports)?;
    Ok(exports)
}

fn kinds_match(actual: impl ExactSizeIterator<Item = ValType>, expected: &[ParamKind]) -> bool {
    actual.len() == expected.len() && actual.zip(expected).all(|(ty, kind)| kind.accepts(&ty))
}

fn describe(ty: &FuncType) -> String {
    let params: Vec<String> = ty.params().map(|p| p.to_string()).collect();
    let results: Vec<String> = ty.results().map(|r| r.to_string()).collect();
    format!("({}) -> ({})", params.join(", "), results.join(", "))
}

fn validate_exports(module: &Module) -> Result<ModuleExports, BridgeError> {
    let has_memory = module
        .exports()
        .any(|e| e.name() == "memory" && matches!(e.ty(), ExternType::Memory(_)));
    if !has_memory {
        return Err(BridgeError::Validation("module must export 'memory'".into()));
    }

    let mut found = [false; OPTIONAL_EXPORTS.len()];
    for (slot, &(name, params, results)) in found.iter_mut().zip(OPTIONAL_EXPORTS) {
        let Some(export) = module.exports().find(|e| e.name() == name) else {
            continue;
        };
        let func_ty = match export.ty() {
            ExternType::Func(ft) => ft,
            _ => {
                return Err(BridgeError::Validation(format!(
                    "export '{}' must be a function",
                    name
                )));
            }
        };
        if !kinds_match(func_ty.params(), params) || !kinds_match(func_ty.results(), results) {
            return Err(BridgeError::Validation(format!(
                "export '{}' has wrong signature {}",
                name,
                describe(&func_ty)
            )));
        }
        *slot = true;
    }

    Ok(ModuleExports {
        initialize: found[0],
        run_script: found[1],
        guest_alloc: found[2] && found[3],
    })
}

fn validate_imports(module: &Module, allow_unknown_imports: bool) -> Result<(), BridgeError> {
    for import in module.imports() {
        let module_name = import.module();
        let descriptor = if module_name == IMPORT_MODULE {
            find_by_symbol(import.name())
        } else {
            None
        };

        let Some(descriptor) = descriptor else {
            if allow_unknown_imports {
                tracing::debug!(
                    "import {}::{} is not a bridge function, linking as trap",
                    module_name,
                    import.name()
                );
                continue;
            }
            return Err(BridgeError::Validation(format!(
                "import {}::{} is not provided by the bridge",
                module_name,
                import.name()
            )));
        };

        let func_ty = match import.ty() {
            ExternType::Func(ft) => ft,
            _ => {
                return Err(BridgeError::Validation(format!(
                    "bridge import {} must be a function",
                    descriptor.symbol
                )));
            }
        };

        if !kinds_match(func_ty.params(), descriptor.params) || func_ty.results().len() != 0 {
            return Err(BridgeError::Validation(format!(
                "import {} ({}) declared as {}, expected {:?} -> ()",
                descriptor.symbol,
                descriptor.name,
                describe(&func_ty),
                descriptor.params
            )));
        }
    }

    Ok(())
}
