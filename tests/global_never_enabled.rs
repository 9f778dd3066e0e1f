//! Runs in its own process so the global instance is guaranteed untouched
//! when the test starts.

use tick_timing::{global, CallbackHandle, TickType, TimingError};

#[test]
fn test_global_lifecycle() {
    // Never enabled: hooks are no-ops, read-out is empty, clock still works
    assert!(global::instrumentation().is_none());
    assert!(!global::is_enabled());
    let ctx = global::tick_begin(TickType::TimerFired, CallbackHandle::RunDeferredCallbacks);
    assert!(!ctx.is_sampling());
    global::tick_end(ctx);
    assert!(global::samples().is_empty());
    assert_eq!(global::stats().ticks_seen, 0);
    global::disable();
    let t0 = global::now();
    assert!(global::now() >= t0);

    // A rejected enable does not create the instance
    let err = global::enable(10, 1.5).unwrap_err();
    assert!(matches!(err, TimingError::InvalidConfiguration { .. }));
    assert!(global::instrumentation().is_none());

    // Uninitialized → Enabled → Disabled → Enabled
    global::enable(2, 1.0).unwrap();
    for _ in 0..3 {
        let ctx = global::tick_begin(TickType::IoTriggered, CallbackHandle::RunDeferredCallbacks);
        global::tick_end(ctx);
    }
    assert_eq!(global::samples().len(), 2);

    global::disable();
    assert_eq!(global::samples().len(), 2);

    global::enable(2, 1.0).unwrap();
    assert!(global::samples().is_empty());
}
