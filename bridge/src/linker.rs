//! Host function registration via Wasmtime linker.
//!
//! Registers every function in [`BRIDGE_EXPORTS`](crate::exports::BRIDGE_EXPORTS)
//! under the `env` import namespace. Each function:
//! 1. Borrows the guest's linear memory for any pointer argument
//! 2. Copies the string out with a bounded NUL scan
//! 3. Hands owned values to `HostState`, which forwards them downstream
//!
//! None of them return a value or trap: failures become faults.

use lunx_hostapi::{Color, DecodeError, ObjectId, Vec3};
use wasmtime::{Caller, Linker, Memory};

use crate::error::BridgeError;
use crate::exports::{ADD_HIERARCHY_ITEM, IMPORT_MODULE, LOG_OUTPUT, SPAWN_3D_OBJECT, UPDATE_OBJECT};
use crate::host_impl::HostState;
use crate::memory;

/// Get the guest's exported memory from a Caller.
fn get_memory(caller: &mut Caller<'_, HostState>) -> Option<Memory> {
    caller.get_export("memory").and_then(|e| e.into_memory())
}

/// Copy the string at `ptr` out of guest memory.
///
/// The memory view lives only inside this function.
fn decode_string(caller: &mut Caller<'_, HostState>, ptr: i32) -> Result<String, DecodeError> {
    let max_len = caller.data().max_string_len;
    let Some(mem) = get_memory(caller) else {
        return Err(DecodeError::OutOfBounds { ptr, memory_len: 0 });
    };
    memory::read_c_string(mem.data(&*caller), ptr, max_len)
}

/// Register all bridge functions with the linker.
pub fn register_host_functions(linker: &mut Linker<HostState>) -> Result<(), BridgeError> {
    register_log_output(linker)?;
    register_add_hierarchy_item(linker)?;
    register_spawn_3d_object(linker)?;
    register_update_object(linker)?;
    Ok(())
}

fn register_log_output(linker: &mut Linker<HostState>) -> Result<(), BridgeError> {
    linker.func_wrap(
        IMPORT_MODULE,
        LOG_OUTPUT.symbol,
        |mut caller: Caller<'_, HostState>, msg_ptr: i32| {
            let message = decode_string(&mut caller, msg_ptr);
            tracing::debug!(target: "lunx::bridge", msg_ptr, ok = message.is_ok(), "LogOutput");
            caller.data_mut().log_output(message);
        },
    )?;
    Ok(())
}

fn register_add_hierarchy_item(linker: &mut Linker<HostState>) -> Result<(), BridgeError> {
    linker.func_wrap(
        IMPORT_MODULE,
        ADD_HIERARCHY_ITEM.symbol,
        |mut caller: Caller<'_, HostState>, name_ptr: i32, id: i32| {
            let name = decode_string(&mut caller, name_ptr);
            tracing::debug!(target: "lunx::bridge", name_ptr, id, "AddHierarchyItem");
            caller.data_mut().add_hierarchy_item(name, ObjectId(id));
        },
    )?;
    Ok(())
}

fn register_spawn_3d_object(linker: &mut Linker<HostState>) -> Result<(), BridgeError> {
    linker.func_wrap(
        IMPORT_MODULE,
        SPAWN_3D_OBJECT.symbol,
        |mut caller: Caller<'_, HostState>,
         id: i32,
         x: f32,
         y: f32,
         z: f32,
         r: f32,
         g: f32,
         b: f32| {
            tracing::debug!(target: "lunx::bridge", id, x, y, z, "Spawn3DObject");
            caller
                .data_mut()
                .spawn_object(ObjectId(id), Vec3::new(x, y, z), Color::new(r, g, b));
        },
    )?;
    Ok(())
}

fn register_update_object(linker: &mut Linker<HostState>) -> Result<(), BridgeError> {
    linker.func_wrap(
        IMPORT_MODULE,
        UPDATE_OBJECT.symbol,
        |mut caller: Caller<'_, HostState>, id: i32, x: f32, y: f32, z: f32| {
            tracing::trace!(target: "lunx::bridge", id, x, y, z, "UpdateObject");
            caller.data_mut().update_object(ObjectId(id), Vec3::new(x, y, z));
        },
    )?;
    Ok(())
}
