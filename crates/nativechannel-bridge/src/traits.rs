// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the host capabilities the channel
// reads, and for the external collaborators it drives.

use std::sync::Arc;

use nativechannel_core::error::Result;
use nativechannel_core::{BatteryLevel, Platform};

use crate::channel::MethodChannel;

/// Unified host that groups every native capability the channel reads.
///
/// One conforming implementation exists per target OS, plus the simulated
/// host used on desktop/CI.
pub trait PlatformHost: NativeDeviceInfo + NativeBattery + NativeManifest + Send + Sync {
    /// Build target this host answers for. Constant for the process lifetime.
    fn platform(&self) -> Platform;
}

/// Device identity. Each query returns `None` when the OS will not say.
pub trait NativeDeviceInfo {
    fn os_version(&self) -> Option<String>;
    fn manufacturer(&self) -> Option<String>;
    fn model(&self) -> Option<String>;
}

/// Current charge level.
pub trait NativeBattery {
    /// Never fails; every unreadable state is [`BatteryLevel::Absent`].
    fn battery_level(&self) -> BatteryLevel;
}

/// String values packaged into the app manifest / Info.plist at build time.
pub trait NativeManifest {
    /// Read a metadata string. `Ok(None)` means the entry is missing;
    /// `Err` means the manifest itself could not be read.
    fn manifest_string(&self, key: &str) -> Result<Option<String>>;
}

/// Analytics / crash-reporting SDK with a process-global configuration.
pub trait AnalyticsSdk: Send + Sync {
    /// Whether the SDK's own registry already holds a configured app.
    fn is_configured(&self) -> bool;

    /// Configure the SDK. Configuring twice crashes some SDKs, so callers go
    /// through [`crate::guard::SdkInitGuard`].
    fn configure(&self);
}

/// Map-provider SDK that takes its credential at launch.
pub trait MapsSdk: Send + Sync {
    fn provide_api_key(&self, key: &str);
}

/// Receives every URL the OS asked the app to open.
pub trait LinkHandler: Send + Sync {
    fn handle_link(&self, url: &str);
}

/// Registration point offered by the application engine.
pub trait EngineHost {
    /// Install `channel` as the handler for `name`, replacing any handler
    /// previously installed under the same name on this engine.
    fn set_method_call_handler(&mut self, name: &str, channel: Arc<MethodChannel>);
}
