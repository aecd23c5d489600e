// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Channel contract checks run against both platform shapes.

use std::sync::{Arc, Mutex};

use serde_json::Value;

use nativechannel_core::{
    BatteryLevel, BridgeConfig, MethodRequest, MethodResponse, Platform, PlatformInfo,
};

use crate::battery::BatterySnapshot;
use crate::channel::{ChannelRegistry, MethodChannel, MethodDispatcher};
use crate::deeplink::{DeepLinkForwarder, LaunchContext, UserActivity};
use crate::stub::{SimulatedBattery, StubHost};
use crate::traits::{LinkHandler, PlatformHost};

const PLATFORMS: [Platform; 2] = [Platform::Android, Platform::Ios];

fn channel_for(host: StubHost) -> MethodChannel {
    let config = BridgeConfig::for_platform(host.platform());
    MethodChannel::new(
        config.channel_name.clone(),
        MethodDispatcher::for_host(Arc::new(host), config),
    )
}

fn platform_info(channel: &MethodChannel) -> PlatformInfo {
    let reply = channel.invoke(&MethodRequest::new("getPlatformInfo"));
    serde_json::from_value(reply.result().cloned().unwrap()).unwrap()
}

fn has_key(channel: &MethodChannel) -> bool {
    match channel.invoke(&MethodRequest::new("hasGoogleMapsApiKey")) {
        MethodResponse::Success { result: Value::Bool(b) } => b,
        other => panic!("unexpected reply {other:?}"),
    }
}

fn key_entry(platform: Platform) -> String {
    BridgeConfig::for_platform(platform).maps_key_entry
}

#[test]
fn unknown_methods_are_not_implemented() {
    for platform in PLATFORMS {
        let channel = channel_for(StubHost::new(platform));
        for name in ["getBatteryLevel", "", "hasGoogleMapsApiKey2", "GetPlatformInfo"] {
            let reply = channel.invoke(&MethodRequest::new(name));
            assert_eq!(reply, MethodResponse::NotImplemented, "{platform}: {name}");
        }
    }
}

#[test]
fn platform_is_constant_per_target() {
    for platform in PLATFORMS {
        let channel = channel_for(StubHost::new(platform));
        for _ in 0..3 {
            assert_eq!(platform_info(&channel).platform, platform);
        }
    }
}

#[test]
fn undeterminable_fields_never_fail() {
    for platform in PLATFORMS {
        let info = platform_info(&channel_for(StubHost::new(platform)));
        assert_eq!(info.version, "unknown");
        assert_eq!(info.model, "unknown");
        assert_eq!(info.battery_level, BatteryLevel::Absent);
    }
    let ios = platform_info(&channel_for(StubHost::new(Platform::Ios)));
    assert_eq!(ios.manufacturer, "Apple");
}

#[test]
fn reported_device_fields_pass_through() {
    let host = StubHost::new(Platform::Android)
        .with_device("14", "Google", "Pixel 8")
        .with_battery(SimulatedBattery::capacity(Some(91), None));
    let info = platform_info(&channel_for(host));
    assert_eq!(info.version, "14");
    assert_eq!(info.manufacturer, "Google");
    assert_eq!(info.model, "Pixel 8");
    assert_eq!(info.battery_level, BatteryLevel::Present(91));
}

#[test]
fn battery_service_absent_uses_broadcast() {
    let host = StubHost::new(Platform::Android).with_battery(SimulatedBattery::capacity(
        None,
        Some(BatterySnapshot { raw_level: 77, scale: 100 }),
    ));
    assert_eq!(platform_info(&channel_for(host)).battery_level, BatteryLevel::Present(77));
}

#[test]
fn ios_fraction_is_rounded() {
    let host = StubHost::new(Platform::Ios).with_battery(SimulatedBattery::fraction(0.346));
    assert_eq!(platform_info(&channel_for(host)).battery_level, BatteryLevel::Present(35));
}

#[test]
fn credential_presence_rules() {
    for platform in PLATFORMS {
        let placeholder = BridgeConfig::for_platform(platform).maps_key_placeholder;
        let with = |value: &str| {
            channel_for(StubHost::new(platform).with_manifest_entry(key_entry(platform), value))
        };

        assert!(!has_key(&channel_for(StubHost::new(platform))), "{platform}: missing");
        assert!(!has_key(&with("")), "{platform}: empty");
        assert!(!has_key(&with("   \t")), "{platform}: whitespace");
        assert!(!has_key(&with(&placeholder)), "{platform}: placeholder");
        assert!(!has_key(&with(&format!("  {placeholder}  "))), "{platform}: padded placeholder");
        assert!(has_key(&with("AIzaExampleKey123")), "{platform}: real key");
        assert!(
            !has_key(&channel_for(StubHost::new(platform).with_unreadable_manifest())),
            "{platform}: unreadable manifest"
        );
    }
}

#[test]
fn android_padded_placeholder_scenario() {
    let host = StubHost::new(Platform::Android).with_manifest_entry(
        "com.google.android.geo.API_KEY",
        "  YOUR_ANDROID_GOOGLE_MAPS_API_KEY  ",
    );
    assert!(!has_key(&channel_for(host)));
}

#[test]
fn replies_encode_distinctly() {
    let mut engine = ChannelRegistry::new();
    let channel = Arc::new(channel_for(StubHost::new(Platform::Ios)));
    channel.attach(&mut engine);

    let unknown = engine.dispatch_json(channel.name(), "nope", None);
    let known = engine.dispatch_json(channel.name(), "hasGoogleMapsApiKey", None);
    assert_eq!(unknown, r#"{"status":"notImplemented"}"#);
    assert_eq!(known, r#"{"status":"success","result":false}"#);
}

#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

impl LinkHandler for Recorder {
    fn handle_link(&self, url: &str) {
        self.0.lock().unwrap().push(url.to_owned());
    }
}

#[test]
fn cold_start_link_without_runtime_events() {
    let recorder = Arc::new(Recorder::default());
    let links = DeepLinkForwarder::new(recorder.clone());
    links.capture_launch(&LaunchContext::with_url("myapp://open/42"));
    assert_eq!(*recorder.0.lock().unwrap(), vec!["myapp://open/42"]);
}

#[test]
fn k_events_give_k_calls_in_order() {
    for k in [0usize, 1, 5, 20] {
        let recorder = Arc::new(Recorder::default());
        let links = DeepLinkForwarder::new(recorder.clone());
        links.capture_launch(&LaunchContext::default());

        let mut expected = Vec::new();
        for i in 0..k {
            let url = format!("myapp://item/{i}");
            match i % 3 {
                0 => links.open_url(&url),
                1 => links.continue_user_activity(&UserActivity::browsing(url.clone())),
                _ => links.scene_open_urls(std::slice::from_ref(&url)),
            }
            expected.push(url);
        }
        assert_eq!(*recorder.0.lock().unwrap(), expected);
        assert_eq!(links.forwarded(), k as u64);
    }
}
