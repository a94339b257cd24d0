//! The bridge function table.
//!
//! One descriptor per host function the compiled module may import. The
//! module links against `symbol` under the `env` import namespace; `name` is
//! the bridge-level name used in logs and fault records. Arity and parameter
//! kinds are checked against the module's imports at load time, since nothing
//! checks them at call time.

use wasmtime::ValType;

/// Import namespace the compiled module uses for host library functions.
pub const IMPORT_MODULE: &str = "env";

/// Kind of one scalar parameter at the bridge boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Offset into the guest's linear memory (wasm `i32`).
    Pointer,
    /// 32-bit integer (wasm `i32`).
    I32,
    /// 32-bit float (wasm `f32`).
    F32,
}

impl ParamKind {
    /// Whether a wasm value type carries this kind.
    pub fn accepts(self, ty: &ValType) -> bool {
        match self {
            Self::Pointer | Self::I32 => matches!(ty, ValType::I32),
            Self::F32 => matches!(ty, ValType::F32),
        }
    }
}

/// Exported function descriptor. No bridge function returns a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportDescriptor {
    pub name: &'static str,
    pub symbol: &'static str,
    pub params: &'static [ParamKind],
}

use ParamKind::{F32, I32, Pointer};

pub const LOG_OUTPUT: ExportDescriptor = ExportDescriptor {
    name: "LogOutput",
    symbol: "JS_LogOutput",
    params: &[Pointer],
};

pub const ADD_HIERARCHY_ITEM: ExportDescriptor = ExportDescriptor {
    name: "AddHierarchyItem",
    symbol: "JS_AddHierarchyItem",
    params: &[Pointer, I32],
};

pub const SPAWN_3D_OBJECT: ExportDescriptor = ExportDescriptor {
    name: "Spawn3DObject",
    symbol: "JS_Spawn3DObject",
    params: &[I32, F32, F32, F32, F32, F32, F32],
};

pub const UPDATE_OBJECT: ExportDescriptor = ExportDescriptor {
    name: "UpdateObject",
    symbol: "JS_UpdateObject",
    params: &[I32, F32, F32, F32],
};

/// Every function the bridge provides.
pub const BRIDGE_EXPORTS: &[ExportDescriptor] =
    &[LOG_OUTPUT, ADD_HIERARCHY_ITEM, SPAWN_3D_OBJECT, UPDATE_OBJECT];

/// Look up a descriptor by the symbol the module imports.
pub fn find_by_symbol(symbol: &str) -> Option<&'static ExportDescriptor> {
    BRIDGE_EXPORTS.iter().find(|d| d.symbol == symbol)
}
