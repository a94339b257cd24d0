//! Shared test helpers for integration tests.
//!
//! Provides small hand-written engine modules (WAT) that exercise the bridge
//! imports, and a session factory wired to in-memory sinks.

#![allow(dead_code)]

use lunx_bridge::{Bridge, BridgeConfig, BridgeSession, Sinks};
use lunx_hostapi::{MemHierarchy, MemLog, MemScene};

/// Module with one export per bridge scenario.
///
/// Memory layout: "Cube\0" at 16, "ready\0" at 32, and "abcd" with no
/// terminator in the last four bytes of the first page.
pub const SCENE_MODULE: &str = r#"
(module
    (import "env" "JS_LogOutput" (func $log (param i32)))
    (import "env" "JS_AddHierarchyItem" (func $add (param i32 i32)))
    (import "env" "JS_Spawn3DObject" (func $spawn (param i32 f32 f32 f32 f32 f32 f32)))
    (import "env" "JS_UpdateObject" (func $update (param i32 f32 f32 f32)))
    (memory (export "memory") 1)
    (data (i32.const 16) "Cube\00")
    (data (i32.const 32) "ready\00")
    (data (i32.const 65532) "abcd")

    (func (export "AddCube")
        (call $add (i32.const 16) (i32.const 7)))
    (func (export "LogReady")
        (call $log (i32.const 32)))
    (func (export "SpawnCube")
        (call $spawn (i32.const 7)
            (f32.const 1) (f32.const 2) (f32.const 3)
            (f32.const 0) (f32.const 1) (f32.const 0)))
    (func (export "RespawnCube")
        (call $spawn (i32.const 7)
            (f32.const 9) (f32.const 9) (f32.const 9)
            (f32.const 1) (f32.const 0) (f32.const 0)))
    (func (export "MoveCube")
        (call $update (i32.const 7) (f32.const 4) (f32.const 5) (f32.const 6)))
    (func (export "MoveGhost")
        (call $update (i32.const 99) (f32.const 0) (f32.const 0) (f32.const 0)))
    (func (export "LogUnterminated")
        (call $log (i32.const 65532)))
    (func (export "LogOutOfBounds")
        (call $log (i32.const 70000)))
    (func (export "LogNegative")
        (call $log (i32.const -1)))
    (func (export "AddUnterminated")
        (call $add (i32.const 65532) (i32.const 3)))
    ;; Reuses the "ready" buffer right after the first call returns.
    (func (export "LogThenOverwrite")
        (call $log (i32.const 32))
        (i32.store8 (i32.const 32) (i32.const 88))
        (call $log (i32.const 32)))
)
"#;

/// Script host without `malloc`: the bridge writes scripts into its own
/// region. `RunScript` echoes the script through `LogOutput`.
pub const SCRIPT_MODULE: &str = r#"
(module
    (import "env" "JS_LogOutput" (func $log (param i32)))
    (memory (export "memory") 1)
    (data (i32.const 0) "engine ready\00")
    (global $last (mut i32) (i32.const 0))

    (func (export "InitializeLunXStudio")
        (call $log (i32.const 0)))
    (func (export "RunScript") (param $src i32)
        (global.set $last (local.get $src))
        (call $log (local.get $src)))
    ;; Logs whatever the previous script pointer now holds.
    (func (export "LogLastScript")
        (call $log (global.get $last)))
)
"#;

/// Script host with a bump `malloc` and a `free` that logs "freed".
pub const MALLOC_SCRIPT_MODULE: &str = r#"
(module
    (import "env" "JS_LogOutput" (func $log (param i32)))
    (memory (export "memory") 1)
    (data (i32.const 0) "freed\00")
    (global $heap (mut i32) (i32.const 1024))

    (func (export "malloc") (param $n i32) (result i32)
        (local $p i32)
        (local.set $p (global.get $heap))
        (global.set $heap (i32.add (global.get $heap) (local.get $n)))
        (local.get $p))
    (func (export "free") (param $p i32)
        (call $log (i32.const 0)))
    (func (export "RunScript") (param $src i32)
        (call $log (local.get $src)))
)
"#;

/// Module whose `malloc` always fails.
pub const NULL_MALLOC_MODULE: &str = r#"
(module
    (import "env" "JS_LogOutput" (func $log (param i32)))
    (memory (export "memory") 1)
    (func (export "malloc") (param i32) (result i32) (i32.const 0))
    (func (export "free") (param i32))
    (func (export "RunScript") (param $src i32)
        (call $log (local.get $src)))
)
"#;

/// Module whose `malloc` hands out a pointer four bytes from the end of
/// memory, too short for most scripts. `free` logs "freed".
pub const SHORT_MALLOC_MODULE: &str = r#"
(module
    (import "env" "JS_LogOutput" (func $log (param i32)))
    (memory (export "memory") 1)
    (data (i32.const 0) "freed\00")
    (func (export "malloc") (param i32) (result i32) (i32.const 65532))
    (func (export "free") (param $p i32)
        (call $log (i32.const 0)))
    (func (export "RunScript") (param $src i32)
        (call $log (local.get $src)))
)
"#;

/// Script host without `malloc` that grows memory by one page on its first
/// `RunScript` and writes "ok" 100 bytes into that page. `LogSentinel`
/// logs it back.
pub const GROWING_SCRIPT_MODULE: &str = r#"
(module
    (import "env" "JS_LogOutput" (func $log (param i32)))
    (memory (export "memory") 1)
    (global $page (mut i32) (i32.const -1))

    (func $sentinel (result i32)
        (i32.add (i32.mul (global.get $page) (i32.const 65536)) (i32.const 100)))
    (func (export "RunScript") (param $src i32)
        (if (i32.lt_s (global.get $page) (i32.const 0))
            (then
                (global.set $page (memory.grow (i32.const 1)))
                (i32.store (call $sentinel) (i32.const 0x6b6f)))))
    (func (export "LogSentinel")
        (call $log (call $sentinel)))
)
"#;

/// Module with a non-terminating export.
pub const SPIN_MODULE: &str = r#"
(module
    (memory (export "memory") 1)
    (func (export "Spin") (loop $l (br $l)))
    (func (export "RunScript") (param i32) (loop $l (br $l)))
)
"#;

/// In-memory sinks plus read-back handles.
pub struct Readback {
    pub log: MemLog,
    pub hierarchy: MemHierarchy,
    pub scene: MemScene,
}

impl Readback {
    pub fn new() -> Self {
        Self {
            log: MemLog::new(),
            hierarchy: MemHierarchy::new(),
            scene: MemScene::new(),
        }
    }

    pub fn sinks(&self) -> Sinks {
        Sinks::new(self.log.clone(), self.hierarchy.clone(), self.scene.clone())
    }
}

/// Build a bridge from WAT text.
pub fn load_bridge(wat: &str, config: BridgeConfig) -> Bridge {
    Bridge::new(wat.as_bytes(), config).expect("failed to load module")
}

/// Instantiate `wat` with default config and in-memory sinks.
pub fn session(wat: &str) -> (BridgeSession, Readback) {
    session_with_config(wat, BridgeConfig::default())
}

pub fn session_with_config(wat: &str, config: BridgeConfig) -> (BridgeSession, Readback) {
    let bridge = load_bridge(wat, config);
    let readback = Readback::new();
    let session = bridge
        .instantiate(readback.sinks())
        .expect("failed to instantiate");
    (session, readback)
}
