// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `getPlatformInfo` payload collection.

use nativechannel_core::{PlatformInfo, UNKNOWN};

use crate::traits::PlatformHost;

fn version_or_unknown(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_owned())
}

/// Snapshot the host's identity and battery. Never fails: a blank or missing
/// version is `"unknown"`, manufacturer and model are passed through as the
/// device reports them (`"unknown"` only when unreadable), and an unreadable
/// battery is absent.
pub fn collect_platform_info<H: PlatformHost + ?Sized>(host: &H) -> PlatformInfo {
    PlatformInfo {
        platform: host.platform(),
        version: version_or_unknown(host.os_version()),
        manufacturer: host.manufacturer().unwrap_or_else(|| UNKNOWN.to_owned()),
        model: host.model().unwrap_or_else(|| UNKNOWN.to_owned()),
        battery_level: host.battery_level(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::StubHost;
    use nativechannel_core::Platform;

    #[test]
    fn device_strings_pass_through_unchanged() {
        let host = StubHost::new(Platform::Android).with_device("  ", " Google ", "");
        let info = collect_platform_info(&host);
        assert_eq!(info.version, "unknown");
        assert_eq!(info.manufacturer, " Google ");
        assert_eq!(info.model, "");
    }

    #[test]
    fn unreadable_device_strings_are_unknown() {
        let info = collect_platform_info(&StubHost::new(Platform::Android));
        assert_eq!(info.manufacturer, "unknown");
        assert_eq!(info.model, "unknown");
    }
}
