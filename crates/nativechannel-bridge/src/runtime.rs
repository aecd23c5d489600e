// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Process-wide bridge state for the FFI entry points.
//
// One `AppLifecycle` and one in-process engine per app process, created at
// startup and torn down implicitly at exit.

use std::sync::{Arc, LazyLock, Mutex, OnceLock, PoisonError};

use crate::channel::{ChannelRegistry, MethodChannel};
use crate::lifecycle::AppLifecycle;
use crate::traits::EngineHost;

static LIFECYCLE: OnceLock<AppLifecycle> = OnceLock::new();
static ENGINE: LazyLock<Mutex<ChannelRegistry>> = LazyLock::new(|| Mutex::new(ChannelRegistry::new()));

/// Install the process lifecycle. A second install keeps the first one.
pub fn install(lifecycle: AppLifecycle) -> &'static AppLifecycle {
    let mut fresh = false;
    let installed = LIFECYCLE.get_or_init(|| {
        fresh = true;
        lifecycle
    });
    if !fresh {
        tracing::debug!("bridge lifecycle already installed");
    }
    installed
}

pub fn lifecycle() -> Option<&'static AppLifecycle> {
    LIFECYCLE.get()
}

/// Run `f` against the process engine.
pub fn with_engine<R>(f: impl FnOnce(&mut ChannelRegistry) -> R) -> R {
    let mut engine = ENGINE.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut engine)
}

/// The process engine as seen by lifecycle hooks. The engine lock is taken
/// only while a handler is registered, so SDK and link callbacks running
/// inside a hook can still query the channel.
pub struct ProcessEngine;

impl EngineHost for ProcessEngine {
    fn set_method_call_handler(&mut self, name: &str, channel: Arc<MethodChannel>) {
        with_engine(|engine| engine.set_method_call_handler(name, channel));
    }
}

/// Route one transport message. The engine lock is released before the
/// handler runs.
pub fn dispatch_json(channel: &str, method: &str, arguments_json: Option<&str>) -> String {
    match with_engine(|engine| engine.get(channel)) {
        Some(handler) => handler.handle_json(method, arguments_json),
        None => with_engine(|engine| engine.dispatch_json(channel, method, arguments_json)),
    }
}
