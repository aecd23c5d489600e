// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Simulated host for desktop/CI builds where native mobile APIs are
// unavailable.
//
// It can impersonate either platform: battery readings go through the same
// resolvers the real Android and iOS hosts use, so the conformance suite
// exercises identical logic.

use std::cell::Cell;
use std::collections::HashMap;

use nativechannel_core::error::{BridgeError, Result};
use nativechannel_core::{BatteryLevel, Platform};

use crate::battery::{BatteryMonitor, BatterySnapshot, resolve_capacity, sample_fraction};
use crate::traits::*;

/// Battery hardware as one of the two platform shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimulatedBattery {
    /// Android shape: live capacity property plus battery-changed snapshot.
    Capacity {
        primary: Option<i32>,
        snapshot: Option<BatterySnapshot>,
    },
    /// iOS shape: fraction readable only while monitoring is enabled.
    Fraction { fraction: f32 },
}

impl SimulatedBattery {
    pub fn capacity(primary: Option<i32>, snapshot: Option<BatterySnapshot>) -> Self {
        Self::Capacity { primary, snapshot }
    }

    pub fn fraction(fraction: f32) -> Self {
        Self::Fraction { fraction }
    }

    /// No battery readable at all.
    pub fn unavailable(platform: Platform) -> Self {
        match platform {
            Platform::Android => Self::capacity(None, None),
            Platform::Ios => Self::fraction(-1.0),
        }
    }
}

/// One-shot monitor for the iOS shape; starts disabled like `UIDevice`.
struct SimulatedMonitor {
    enabled: Cell<bool>,
    fraction: f32,
}

impl BatteryMonitor for SimulatedMonitor {
    fn is_monitoring_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn set_monitoring_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    fn battery_fraction(&self) -> f32 {
        if self.enabled.get() { self.fraction } else { -1.0 }
    }
}

/// Simulated host for desktop builds and the test suite.
#[derive(Debug, Clone)]
pub struct StubHost {
    platform: Platform,
    os_version: Option<String>,
    manufacturer: Option<String>,
    model: Option<String>,
    battery: SimulatedBattery,
    /// `None` simulates an unreadable manifest.
    manifest: Option<HashMap<String, String>>,
}

impl StubHost {
    /// A host that knows nothing about the device.
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            os_version: None,
            manufacturer: match platform {
                Platform::Ios => Some("Apple".into()),
                Platform::Android => None,
            },
            model: None,
            battery: SimulatedBattery::unavailable(platform),
            manifest: Some(HashMap::new()),
        }
    }

    pub fn with_device(
        mut self,
        os_version: impl Into<String>,
        manufacturer: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        self.os_version = Some(os_version.into());
        self.manufacturer = Some(manufacturer.into());
        self.model = Some(model.into());
        self
    }

    pub fn with_battery(mut self, battery: SimulatedBattery) -> Self {
        self.battery = battery;
        self
    }

    pub fn with_manifest_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.manifest
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_unreadable_manifest(mut self) -> Self {
        self.manifest = None;
        self
    }
}

impl PlatformHost for StubHost {
    fn platform(&self) -> Platform {
        self.platform
    }
}

impl NativeDeviceInfo for StubHost {
    fn os_version(&self) -> Option<String> {
        self.os_version.clone()
    }

    fn manufacturer(&self) -> Option<String> {
        self.manufacturer.clone()
    }

    fn model(&self) -> Option<String> {
        self.model.clone()
    }
}

impl NativeBattery for StubHost {
    fn battery_level(&self) -> BatteryLevel {
        match self.battery {
            SimulatedBattery::Capacity { primary, snapshot } => resolve_capacity(primary, || snapshot),
            SimulatedBattery::Fraction { fraction } => sample_fraction(&SimulatedMonitor {
                enabled: Cell::new(false),
                fraction,
            }),
        }
    }
}

impl NativeManifest for StubHost {
    fn manifest_string(&self, key: &str) -> Result<Option<String>> {
        match &self.manifest {
            Some(entries) => Ok(entries.get(key).cloned()),
            None => {
                tracing::warn!(key, "manifest read on stub host with no manifest");
                Err(BridgeError::PlatformUnavailable)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_device_has_absent_battery() {
        for platform in [Platform::Android, Platform::Ios] {
            let host = StubHost::new(platform);
            assert_eq!(host.platform(), platform);
            assert_eq!(host.battery_level(), BatteryLevel::Absent);
        }
    }

    #[test]
    fn unreadable_manifest_errors() {
        let host = StubHost::new(Platform::Android).with_unreadable_manifest();
        assert!(host.manifest_string("anything").is_err());
    }
}
