// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Battery level resolution.
//
// Android exposes a live capacity property plus a sticky battery-changed
// broadcast carrying a raw level and a scale. iOS exposes one floating-point
// fraction that is only meaningful while battery monitoring is switched on.
// Both shapes reduce to a `BatteryLevel` here; nothing in this module fails.

use nativechannel_core::BatteryLevel;

/// Raw level / scale pair from the most recent battery-changed broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatterySnapshot {
    pub raw_level: i32,
    pub scale: i32,
}

impl BatterySnapshot {
    /// `floor(raw_level * 100 / scale)`, or absence if either value is unusable.
    pub fn percent(&self) -> BatteryLevel {
        if self.raw_level < 0 || self.scale <= 0 {
            return BatteryLevel::Absent;
        }
        BatteryLevel::from_percent(i64::from(self.raw_level) * 100 / i64::from(self.scale))
    }
}

/// Resolve from the capacity property, falling back to the broadcast snapshot.
///
/// `fallback` is only invoked when the primary reading is missing or negative
/// (the platform reports "unknown" as a negative sentinel).
pub fn resolve_capacity(
    primary: Option<i32>,
    fallback: impl FnOnce() -> Option<BatterySnapshot>,
) -> BatteryLevel {
    if let Some(level) = primary.filter(|l| *l >= 0) {
        return BatteryLevel::from_percent(i64::from(level));
    }

    tracing::debug!(?primary, "battery capacity unavailable, reading battery-changed snapshot");
    match fallback() {
        Some(snapshot) => {
            let level = snapshot.percent();
            if !level.is_present() {
                tracing::debug!(?snapshot, "battery snapshot unusable");
            }
            level
        }
        None => BatteryLevel::Absent,
    }
}

/// Convert a `0.0..=1.0` fraction. Negative (or NaN) means unknown.
pub fn resolve_fraction(fraction: f32) -> BatteryLevel {
    if fraction.is_nan() || fraction < 0.0 {
        return BatteryLevel::Absent;
    }
    BatteryLevel::from_percent((fraction * 100.0).round() as i64)
}

/// A battery whose level can only be read while monitoring is enabled.
pub trait BatteryMonitor {
    fn is_monitoring_enabled(&self) -> bool;
    fn set_monitoring_enabled(&self, enabled: bool);
    fn battery_fraction(&self) -> f32;
}

/// Puts the monitoring flag back the way it was found, even on unwind.
struct RestoreMonitoring<'a, M: BatteryMonitor + ?Sized> {
    monitor: &'a M,
    previous: bool,
}

impl<M: BatteryMonitor + ?Sized> Drop for RestoreMonitoring<'_, M> {
    fn drop(&mut self) {
        self.monitor.set_monitoring_enabled(self.previous);
    }
}

/// Enable monitoring, read the fraction, then restore the previous setting.
pub fn sample_fraction<M: BatteryMonitor + ?Sized>(monitor: &M) -> BatteryLevel {
    let previous = monitor.is_monitoring_enabled();
    let _restore = RestoreMonitoring { monitor, previous };
    monitor.set_monitoring_enabled(true);
    resolve_fraction(monitor.battery_fraction())
}
