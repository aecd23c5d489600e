// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Logging setup for the native entry points.
//
// Mobile processes discard stdout, so on Android and iOS `tracing` events go
// through the `log` facade (tracing's `log` feature, active while no tracing
// subscriber is installed) into logcat or os_log. Everywhere else a fmt
// subscriber writes to stdout.

/// Tag shown in logcat / subsystem shown in Console.app.
#[cfg(any(target_os = "android", target_os = "ios"))]
const LOG_TAG: &str = "nativechannel";

/// Install the fmt subscriber. `RUST_LOG` overrides `default_directive`.
///
/// Safe to call from every lifecycle hook: only the first call installs a
/// subscriber, later calls return `false`.
#[cfg(not(any(target_os = "android", target_os = "ios")))]
pub fn init_logging(default_directive: &str) -> bool {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(directive = default_directive, "logging initialised");
    }
    installed
}

/// Route events to logcat. Only the first call installs the logger.
#[cfg(target_os = "android")]
pub fn init_logging(default_directive: &str) -> bool {
    static INSTALL: std::sync::Once = std::sync::Once::new();
    let mut installed = false;
    INSTALL.call_once(|| {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(mobile_level(default_directive))
                .with_tag(LOG_TAG),
        );
        installed = true;
    });
    if installed {
        tracing::debug!(directive = default_directive, "logcat logging initialised");
    }
    installed
}

/// Route events to os_log. Only the first call installs the logger.
#[cfg(target_os = "ios")]
pub fn init_logging(default_directive: &str) -> bool {
    let installed = oslog::OsLogger::new(LOG_TAG)
        .level_filter(mobile_level(default_directive))
        .init()
        .is_ok();
    if installed {
        tracing::debug!(directive = default_directive, "os_log logging initialised");
    }
    installed
}

/// Global level from an `EnvFilter`-style directive: the first bare level
/// (`"debug"`, `"warn,hyper=off"`). Per-target parts are ignored.
#[cfg(any(target_os = "android", target_os = "ios", test))]
fn mobile_level(directive: &str) -> log::LevelFilter {
    directive
        .split(',')
        .filter(|part| !part.contains('='))
        .find_map(|part| part.trim().parse().ok())
        .unwrap_or(log::LevelFilter::Info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_harmless() {
        init_logging("debug");
        assert!(!init_logging("info"));
    }

    #[test]
    fn mobile_level_takes_the_bare_directive() {
        assert_eq!(mobile_level("debug"), log::LevelFilter::Debug);
        assert_eq!(mobile_level("nativechannel=trace,warn"), log::LevelFilter::Warn);
        assert_eq!(mobile_level("nativechannel=trace"), log::LevelFilter::Info);
        assert_eq!(mobile_level(""), log::LevelFilter::Info);
    }
}
