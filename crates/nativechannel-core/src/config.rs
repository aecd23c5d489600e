// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::types::Platform;

/// Manifest `<meta-data>` name holding the Android map credential.
pub const ANDROID_MAPS_KEY_ENTRY: &str = "com.google.android.geo.API_KEY";
/// Template value shipped in the Android manifest.
pub const ANDROID_MAPS_KEY_PLACEHOLDER: &str = "YOUR_ANDROID_GOOGLE_MAPS_API_KEY";
/// Info.plist key holding the iOS map credential.
pub const IOS_MAPS_KEY_ENTRY: &str = "GMSApiKey";
/// Template value shipped in Info.plist.
pub const IOS_MAPS_KEY_PLACEHOLDER: &str = "YOUR_IOS_GOOGLE_MAPS_API_KEY";

/// Per-build settings for a platform bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Method channel name. Must match the application layer.
    pub channel_name: String,
    /// Manifest / Info.plist entry holding the map-provider credential.
    pub maps_key_entry: String,
    /// Literal template value that counts as "not configured".
    pub maps_key_placeholder: String,
    /// Default `tracing` filter directive (`RUST_LOG` overrides it).
    pub log_filter: String,
}

impl BridgeConfig {
    pub fn android() -> Self {
        Self {
            channel_name: crate::CHANNEL_NAME.into(),
            maps_key_entry: ANDROID_MAPS_KEY_ENTRY.into(),
            maps_key_placeholder: ANDROID_MAPS_KEY_PLACEHOLDER.into(),
            log_filter: "info".into(),
        }
    }

    pub fn ios() -> Self {
        Self {
            channel_name: crate::CHANNEL_NAME.into(),
            maps_key_entry: IOS_MAPS_KEY_ENTRY.into(),
            maps_key_placeholder: IOS_MAPS_KEY_PLACEHOLDER.into(),
            log_filter: "info".into(),
        }
    }

    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Android => Self::android(),
            Platform::Ios => Self::ios(),
        }
    }

    /// Parse a bundled JSON config. Fields left out keep the defaults of the
    /// platform this crate was built for.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a bundled JSON config from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    fn validate(&self) -> Result<()> {
        if self.channel_name.trim().is_empty() {
            return Err(BridgeError::Config("channel_name must not be empty".into()));
        }
        if self.maps_key_entry.trim().is_empty() {
            return Err(BridgeError::Config("maps_key_entry must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        if cfg!(target_os = "ios") {
            Self::ios()
        } else {
            Self::android()
        }
    }
}
