// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// iOS host via objc2.
//
// Requires compilation with the iOS SDK (Xcode). Device identity and battery
// come from `UIDevice`, the map credential from the main bundle's Info.plist.
// `UIDevice` is main-thread only: off-main queries resolve to absence rather
// than failing.
//
// ## Swift glue
//
// `AppDelegate` calls `nativechannel_ios_bootstrap` from
// `application(_:willFinishLaunchingWithOptions:)`, passing a callback that
// forwards to `AppLinks.shared.handleLink(url:)`, then
// `nativechannel_ios_did_finish_launching` with the launch-options URL. The
// `FlutterMethodChannel` handler calls `nativechannel_ios_dispatch` and frees
// the reply with `nativechannel_free_string`. `SceneDelegate` reports every
// URL it receives through `nativechannel_ios_handle_link`.

#![cfg(target_os = "ios")]

use std::ffi::{CStr, CString, c_char};
use std::sync::Arc;

use objc2::MainThreadMarker;
use objc2::rc::Retained;
use objc2::runtime::{AnyClass, AnyObject, Bool};
use objc2::msg_send;
use objc2_foundation::{NSBundle, NSString};
use objc2_ui_kit::UIDevice;

use nativechannel_core::error::{BridgeError, Result};
use nativechannel_core::{BatteryLevel, BridgeConfig, CHANNEL_NAME, DeepLinkEvent, LinkSource, Platform};

use crate::battery::{BatteryMonitor, sample_fraction};
use crate::deeplink::{LaunchContext, UserActivity};
use crate::lifecycle::AppLifecycle;
use crate::traits::*;
use crate::{logging, runtime};

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// iOS implementation of the channel host.
///
/// Zero-sized; all state lives in UIKit.
pub struct IosHost;

impl IosHost {
    /// The host is stateless; every query reads UIKit afresh.
    pub fn new() -> Self {
        Self
    }

    /// `UIDevice.currentDevice`, or `None` off the main thread.
    fn current_device() -> Option<Retained<UIDevice>> {
        let Some(mtm) = MainThreadMarker::new() else {
            tracing::debug!("iOS: UIDevice queried off the main thread");
            return None;
        };
        // SAFETY: `currentDevice` is a class property with no preconditions
        // beyond running on the main thread, which `mtm` proves.
        Some(unsafe { UIDevice::currentDevice(mtm) })
    }
}

impl Default for IosHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Always `Platform::Ios`.
impl PlatformHost for IosHost {
    fn platform(&self) -> Platform {
        Platform::Ios
    }
}

/// `systemVersion` and `model` from `UIDevice`; the manufacturer is fixed.
impl NativeDeviceInfo for IosHost {
    fn os_version(&self) -> Option<String> {
        let device = Self::current_device()?;
        // SAFETY: plain property read on the main thread.
        Some(unsafe { device.systemVersion() }.to_string())
    }

    fn manufacturer(&self) -> Option<String> {
        Some("Apple".to_owned())
    }

    fn model(&self) -> Option<String> {
        let device = Self::current_device()?;
        // SAFETY: plain property read on the main thread.
        Some(unsafe { device.model() }.to_string())
    }
}

/// `UIDevice` battery properties.
struct DeviceBattery<'a>(&'a UIDevice);

impl BatteryMonitor for DeviceBattery<'_> {
    fn is_monitoring_enabled(&self) -> bool {
        // SAFETY: property read; the device reference came from the main thread.
        unsafe { self.0.isBatteryMonitoringEnabled() }
    }

    fn set_monitoring_enabled(&self, enabled: bool) {
        // SAFETY: property write on the main thread.
        unsafe { self.0.setBatteryMonitoringEnabled(enabled) }
    }

    fn battery_fraction(&self) -> f32 {
        // SAFETY: property read; -1.0 while monitoring is off or state unknown.
        unsafe { self.0.batteryLevel() }
    }
}

/// `batteryLevel` sampled with monitoring enabled, then restored to its
/// previous state.
impl NativeBattery for IosHost {
    fn battery_level(&self) -> BatteryLevel {
        match Self::current_device() {
            Some(device) => sample_fraction(&DeviceBattery(&device)),
            None => BatteryLevel::Absent,
        }
    }
}

/// Info.plist lookup through the main bundle. A non-string value is a
/// metadata error.
impl NativeManifest for IosHost {
    fn manifest_string(&self, key: &str) -> Result<Option<String>> {
        let bundle = NSBundle::mainBundle();
        let ns_key = NSString::from_str(key);
        // SAFETY: Info.plist lookup; returns nil for a missing key.
        let value: Option<Retained<AnyObject>> = unsafe { bundle.objectForInfoDictionaryKey(&ns_key) };
        match value {
            None => Ok(None),
            Some(obj) => obj
                .downcast::<NSString>()
                .map(|s| Some(s.to_string()))
                .map_err(|_| BridgeError::Metadata(format!("Info.plist entry {key} is not a string"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// `FIRApp`, resolved at runtime so the bridge links without Firebase.
pub struct FirebaseApp;

impl FirebaseApp {
    fn class() -> Option<&'static AnyClass> {
        AnyClass::get(c"FIRApp")
    }
}

/// Configured means `+[FIRApp defaultApp]` is non-nil. Without the Firebase
/// framework linked the SDK is never configured.
impl AnalyticsSdk for FirebaseApp {
    fn is_configured(&self) -> bool {
        let Some(cls) = Self::class() else {
            return false;
        };
        // SAFETY: `+[FIRApp defaultApp]` takes no arguments and returns a
        // nullable object.
        let app: Option<Retained<AnyObject>> = unsafe { msg_send![cls, defaultApp] };
        app.is_some()
    }

    fn configure(&self) {
        match Self::class() {
            // SAFETY: `+[FIRApp configure]` takes no arguments and returns void.
            Some(cls) => unsafe {
                let _: () = msg_send![cls, configure];
            },
            None => tracing::warn!("iOS: FIRApp class not linked; analytics disabled"),
        }
    }
}

/// `GMSServices`, resolved at runtime.
pub struct GoogleMapsServices;

/// `+[GMSServices provideAPIKey:]`; a rejected key is logged.
impl MapsSdk for GoogleMapsServices {
    fn provide_api_key(&self, key: &str) {
        let Some(cls) = AnyClass::get(c"GMSServices") else {
            tracing::warn!("iOS: GMSServices class not linked");
            return;
        };
        let ns_key = NSString::from_str(key);
        // SAFETY: `+[GMSServices provideAPIKey:]` takes an NSString and
        // returns BOOL.
        let accepted: Bool = unsafe { msg_send![cls, provideAPIKey: &*ns_key] };
        if !accepted.as_bool() {
            tracing::warn!("iOS: GMSServices rejected the API key");
        }
    }
}

/// Swift callback receiving a NUL-terminated URL.
pub type LinkCallback = extern "C" fn(url: *const c_char);

/// Forwards links through the callback registered by the app delegate.
pub struct CallbackLinkHandler {
    callback: LinkCallback,
}

/// The URL is valid only for the duration of the callback.
impl LinkHandler for CallbackLinkHandler {
    fn handle_link(&self, url: &str) {
        match CString::new(url) {
            Ok(c_url) => (self.callback)(c_url.as_ptr()),
            Err(_) => tracing::warn!("iOS: deep link contains an interior NUL, not delivered"),
        }
    }
}

// ---------------------------------------------------------------------------
// C exports
// ---------------------------------------------------------------------------

/// # Safety
/// `ptr` must be null or a valid NUL-terminated string.
unsafe fn c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract.
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

fn link_source(code: u8) -> Option<LinkSource> {
    match code {
        1 => Some(LinkSource::OpenUrl),
        2 => Some(LinkSource::UserActivity),
        3 => Some(LinkSource::SceneConnection),
        4 => Some(LinkSource::SceneOpenUrl),
        5 => Some(LinkSource::SceneUserActivity),
        _ => None,
    }
}

/// Install the process lifecycle and run the pre-launch SDK trigger.
#[unsafe(no_mangle)]
pub extern "C" fn nativechannel_ios_bootstrap(link_callback: Option<LinkCallback>) -> bool {
    let config = BridgeConfig::ios();
    logging::init_logging(&config.log_filter);

    let Some(callback) = link_callback else {
        tracing::error!("iOS: bootstrap without a link callback");
        return false;
    };

    let lifecycle = runtime::install(
        AppLifecycle::new(
            config,
            Arc::new(IosHost::new()),
            Arc::new(CallbackLinkHandler { callback }),
            Arc::new(FirebaseApp),
        )
        .with_maps_sdk(Arc::new(GoogleMapsServices)),
    );
    lifecycle.will_finish_launching();
    true
}

/// Post-launch: provision maps, capture launch URLs, register the channel.
///
/// # Safety
/// Both pointers must be null or valid NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativechannel_ios_did_finish_launching(
    launch_url: *const c_char,
    launch_activity_url: *const c_char,
) {
    let Some(lifecycle) = runtime::lifecycle() else {
        tracing::error!("iOS: did_finish_launching before bootstrap");
        return;
    };
    // SAFETY: forwarded caller contract.
    let launch = unsafe {
        LaunchContext {
            url: c_str(launch_url).map(str::to_owned),
            user_activity: c_str(launch_activity_url).map(UserActivity::browsing),
        }
    };
    lifecycle.did_finish_launching(&launch, &mut runtime::ProcessEngine);
}

/// Implicit engine creation.
#[unsafe(no_mangle)]
pub extern "C" fn nativechannel_ios_engine_created() {
    match runtime::lifecycle() {
        Some(lifecycle) => lifecycle.engine_created(&mut runtime::ProcessEngine),
        None => tracing::error!("iOS: engine created before bootstrap"),
    }
}

/// Answer one method call. The returned string must be released with
/// [`nativechannel_free_string`].
///
/// # Safety
/// Both pointers must be null or valid NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativechannel_ios_dispatch(
    method: *const c_char,
    arguments_json: *const c_char,
) -> *mut c_char {
    // SAFETY: forwarded caller contract.
    let (method, arguments) = unsafe { (c_str(method).unwrap_or_default(), c_str(arguments_json)) };
    let reply = runtime::dispatch_json(CHANNEL_NAME, method, arguments);
    match CString::new(reply) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Report a URL delivered by an app- or scene-delegate callback.
/// `source`: 1 open URL, 2 user activity, 3 scene connection, 4 scene open
/// URL, 5 scene user activity.
///
/// # Safety
/// `url` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativechannel_ios_handle_link(source: u8, url: *const c_char) {
    // SAFETY: forwarded caller contract.
    let Some(url) = (unsafe { c_str(url) }) else {
        return;
    };
    let Some(source) = link_source(source) else {
        tracing::warn!(source, "iOS: unknown deep-link source code");
        return;
    };
    match runtime::lifecycle() {
        Some(lifecycle) => lifecycle.links().deliver(DeepLinkEvent::new(url, source)),
        None => tracing::error!("iOS: deep link before bootstrap"),
    }
}

/// Free a string returned by [`nativechannel_ios_dispatch`].
///
/// # Safety
/// `ptr` must be null or a pointer previously returned by this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativechannel_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        // SAFETY: allocated by `CString::into_raw` in this module.
        drop(unsafe { CString::from_raw(ptr) });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verify that the host reports the correct platform.
    #[test]
    fn platform() {
        assert_eq!(IosHost::new().platform(), Platform::Ios);
        assert_eq!(IosHost::new().manufacturer().as_deref(), Some("Apple"));
    }

    #[test]
    fn launch_options_code_is_not_a_runtime_source() {
        assert_eq!(link_source(0), None);
        assert_eq!(link_source(4), Some(LinkSource::SceneOpenUrl));
    }

    // UIDevice and Info.plist queries require a running iOS app; they are
    // exercised in the Xcode test target rather than via `cargo test`.
}
