// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application lifecycle wiring.
//
// The host shell calls these hooks from its activity / app delegate / scene
// delegate. Every hook that can be the first to run also triggers the SDK
// guard, so the analytics SDK is configured before any channel traffic.

use std::sync::Arc;

use nativechannel_core::BridgeConfig;

use crate::channel::{MethodChannel, MethodDispatcher};
use crate::credential::{MapsProvisioning, provision_maps_sdk};
use crate::deeplink::{DeepLinkForwarder, LaunchContext, SceneConnectionOptions, UserActivity};
use crate::guard::{GuardOutcome, InitTrigger, SDK_GUARD, SdkInitGuard};
use crate::traits::{AnalyticsSdk, EngineHost, LinkHandler, MapsSdk, PlatformHost};

/// Everything one app process needs to serve the channel.
pub struct AppLifecycle {
    config: BridgeConfig,
    host: Arc<dyn PlatformHost>,
    channel: Arc<MethodChannel>,
    links: DeepLinkForwarder,
    analytics: Arc<dyn AnalyticsSdk>,
    maps: Option<Arc<dyn MapsSdk>>,
    guard: &'static SdkInitGuard,
}

impl AppLifecycle {
    pub fn new(
        config: BridgeConfig,
        host: Arc<dyn PlatformHost>,
        links: Arc<dyn LinkHandler>,
        analytics: Arc<dyn AnalyticsSdk>,
    ) -> Self {
        let dispatcher = MethodDispatcher::for_host(Arc::clone(&host), config.clone());
        let channel = Arc::new(MethodChannel::new(config.channel_name.clone(), dispatcher));
        Self {
            config,
            host,
            channel,
            links: DeepLinkForwarder::new(links),
            analytics,
            maps: None,
            guard: &SDK_GUARD,
        }
    }

    /// Hand the map credential to `maps` when launching finishes.
    pub fn with_maps_sdk(mut self, maps: Arc<dyn MapsSdk>) -> Self {
        self.maps = Some(maps);
        self
    }

    /// Use a guard other than the process-wide one.
    pub fn with_guard(mut self, guard: &'static SdkInitGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn channel(&self) -> Arc<MethodChannel> {
        Arc::clone(&self.channel)
    }

    pub fn links(&self) -> &DeepLinkForwarder {
        &self.links
    }

    fn ensure_sdk(&self, trigger: InitTrigger) -> GuardOutcome {
        self.guard.ensure_configured(self.analytics.as_ref(), trigger)
    }

    /// Pre-launch hook.
    pub fn will_finish_launching(&self) -> GuardOutcome {
        self.ensure_sdk(InitTrigger::WillFinishLaunching)
    }

    /// Post-launch hook: configure the SDK, provision the map SDK, register the
    /// channel on `engine`, then forward the launch URL.
    ///
    /// Runs again when the host activity is recreated in a live process; the
    /// new launch URL is forwarded after anything already delivered.
    pub fn did_finish_launching(
        &self,
        launch: &LaunchContext,
        engine: &mut dyn EngineHost,
    ) -> Option<MapsProvisioning> {
        self.ensure_sdk(InitTrigger::DidFinishLaunching);
        let maps = self
            .maps
            .as_ref()
            .map(|sdk| provision_maps_sdk(self.host.as_ref(), sdk.as_ref(), &self.config));
        self.channel.attach(engine);
        self.links.capture_launch(launch);
        maps
    }

    /// First (or implicit) engine creation.
    pub fn engine_created(&self, engine: &mut dyn EngineHost) {
        self.ensure_sdk(InitTrigger::EngineCreated);
        self.channel.attach(engine);
    }

    /// Explicit configure call from the application layer.
    pub fn configure(&self) -> GuardOutcome {
        self.ensure_sdk(InitTrigger::Explicit)
    }

    pub fn open_url(&self, url: &str) {
        self.links.open_url(url);
    }

    pub fn continue_user_activity(&self, activity: &UserActivity) {
        self.links.continue_user_activity(activity);
    }

    pub fn scene_will_connect(&self, options: &SceneConnectionOptions) {
        self.links.scene_will_connect(options);
    }

    pub fn scene_open_urls(&self, urls: &[String]) {
        self.links.scene_open_urls(urls);
    }

    pub fn scene_continue(&self, activity: &UserActivity) {
        self.links.scene_continue(activity);
    }
}
