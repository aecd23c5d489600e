// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native channel bridge.
//
// This crate answers the application layer's method channel
// (`getPlatformInfo`, `hasGoogleMapsApiKey`), forwards OS deep links to the
// link collaborator, and configures the analytics SDK exactly once. The same
// contract is served by an Android host (JNI), an iOS host (objc2) and a
// simulated host for desktop/CI builds.

pub mod battery;
pub mod channel;
pub mod credential;
pub mod deeplink;
pub mod guard;
pub mod info;
pub mod lifecycle;
pub mod logging;
pub mod runtime;
pub mod traits;

#[cfg(target_os = "ios")]
pub mod ios;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(any(target_os = "ios", target_os = "android")))]
pub mod stub;

#[cfg(all(test, not(any(target_os = "ios", target_os = "android"))))]
mod conformance;

pub use channel::{ChannelRegistry, MethodChannel, MethodDispatcher};
pub use lifecycle::AppLifecycle;
pub use runtime::ProcessEngine;
