//! Startup wiring between a data engine and the dispatcher.

use std::sync::Arc;

use recordhook_core::Operation;

use crate::{DispatchHook, Dispatcher, HookPoint, LifecycleHooks};

/// Tracing target for startup wiring.
const TRACING_TARGET: &str = "recordhook_dispatch::bootstrap";

/// Registers the dispatcher on the engine's after-commit hook points.
///
/// Call once at startup. Before-commit points are left untouched.
pub fn install<H>(hooks: &mut H, dispatcher: Dispatcher)
where
    H: LifecycleHooks + ?Sized,
{
    for op in Operation::ALL {
        let hook = Arc::new(DispatchHook::new(dispatcher.clone(), op));
        match op {
            Operation::Insert => hooks.on_after_create(hook),
            Operation::Update => hooks.on_after_update(hook),
            Operation::Delete => hooks.on_after_delete(hook),
        }

        tracing::debug!(
            target: TRACING_TARGET,
            point = %HookPoint::after(op),
            op = %op,
            "Registered dispatch hook"
        );
    }

    tracing::info!(
        target: TRACING_TARGET,
        "Record change dispatch installed"
    );
}
