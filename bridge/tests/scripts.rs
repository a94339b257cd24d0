//! Driving the module: start-up, scripts, and the two ways script text
//! reaches guest memory.

mod common;

use lunx_bridge::{BridgeConfig, BridgeError, Sinks};
use lunx_hostapi::BridgeEvent;

use common::*;

#[test]
fn test_initialize_runs_startup_export() {
    let (mut session, out) = session(SCRIPT_MODULE);
    assert!(session.initialize().unwrap());
    assert_eq!(out.log.entries(), vec!["engine ready".to_string()]);
}

#[test]
fn test_run_script_delivers_text() {
    let (mut session, out) = session(SCRIPT_MODULE);
    session.run_script("print(\"hello\")").unwrap();
    assert_eq!(out.log.entries(), vec!["print(\"hello\")".to_string()]);
}

#[test]
fn test_run_script_utf8_round_trip() {
    let (mut session, out) = session(SCRIPT_MODULE);
    session.run_script("-- çalıştır ✓").unwrap();
    assert_eq!(out.log.entries(), vec!["-- çalıştır ✓".to_string()]);
}

#[test]
fn test_host_region_reused_between_scripts() {
    let (mut session, out) = session(SCRIPT_MODULE);
    assert_eq!(session.memory_pages(), 1);

    session.run_script("first").unwrap();
    let pages = session.memory_pages();
    assert_eq!(pages, 2);

    session.run_script("2nd").unwrap();
    assert_eq!(session.memory_pages(), pages);

    // The second script landed on the same buffer as the first.
    session.call("LogLastScript").unwrap();
    assert_eq!(
        out.log.entries(),
        vec!["first".to_string(), "2nd".to_string(), "2nd".to_string()]
    );
}

#[test]
fn test_large_script_grows_host_region() {
    let config = BridgeConfig {
        max_string_len: 200_000,
        ..BridgeConfig::default()
    };
    let (mut session, out) = session_with_config(SCRIPT_MODULE, config);
    let source = "x".repeat(100_000);
    session.run_script(&source).unwrap();
    assert_eq!(out.log.entries()[0].len(), 100_000);
    assert!(session.memory_pages() >= 3);
}

#[test]
fn test_host_region_never_overlaps_guest_growth() {
    let (mut session, out) = session(GROWING_SCRIPT_MODULE);

    // Host region takes page 1, then the guest grows page 2 for itself.
    session.run_script("small").unwrap();
    assert_eq!(session.memory_pages(), 3);

    // Too big for the host's page: the region moves past the guest's page.
    session.run_script(&"x".repeat(70_000)).unwrap();
    assert_eq!(session.memory_pages(), 5);

    session.call("LogSentinel").unwrap();
    assert_eq!(out.log.entries(), vec!["ok".to_string()]);
}

#[test]
fn test_run_script_uses_guest_malloc() {
    let (mut session, out) = session(MALLOC_SCRIPT_MODULE);
    session.run_script("spawn()").unwrap();

    // Script echoed, then the buffer freed; memory never grown by the host.
    assert_eq!(out.log.entries(), vec!["spawn()".to_string(), "freed".to_string()]);
    assert_eq!(session.memory_pages(), 1);
}

#[test]
fn test_null_malloc_is_memory_error() {
    let (mut session, out) = session(NULL_MALLOC_MODULE);
    let err = session.run_script("spawn()").unwrap_err();
    assert!(matches!(err, BridgeError::Memory(_)));
    assert!(out.log.is_empty());
}

#[test]
fn test_short_malloc_buffer_is_freed() {
    let (mut session, out) = session(SHORT_MALLOC_MODULE);
    let err = session.run_script("spawn()").unwrap_err();
    assert!(matches!(err, BridgeError::Memory(_)));
    // The script never ran, but the guest got its buffer back.
    assert_eq!(out.log.entries(), vec!["freed".to_string()]);
}

#[test]
fn test_channel_sinks_receive_events() {
    let bridge = load_bridge(SCENE_MODULE, BridgeConfig::default());
    let (sinks, rx) = Sinks::channel();
    let mut session = bridge.instantiate(sinks).unwrap();
    session.call("AddCube").unwrap();
    session.call("SpawnCube").unwrap();
    session.call("MoveCube").unwrap();
    session.call("LogReady").unwrap();
    drop(session.finish());

    let events: Vec<BridgeEvent> = rx.iter().collect();
    assert_eq!(events.len(), 4);
    assert!(matches!(events[0], BridgeEvent::HierarchyInsert(_)));
    assert!(matches!(events[1], BridgeEvent::Spawn(_)));
    assert!(matches!(events[2], BridgeEvent::Move { .. }));
    assert_eq!(events[3], BridgeEvent::Log("ready".into()));
}

#[test]
fn test_sessions_are_isolated() {
    let bridge = load_bridge(SCENE_MODULE, BridgeConfig::default());
    let first = Readback::new();
    let second = Readback::new();

    let mut a = bridge.instantiate(first.sinks()).unwrap();
    a.call("SpawnCube").unwrap();

    let mut b = bridge.instantiate(second.sinks()).unwrap();
    b.call("MoveCube").unwrap();

    assert_eq!(first.scene.len(), 1);
    assert!(second.scene.is_empty());
    assert_eq!(b.faults().len(), 1);
    assert!(a.faults().is_empty());
}
