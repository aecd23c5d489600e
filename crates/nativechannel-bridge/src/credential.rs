// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Map-provider credential: presence check and SDK provisioning.

use nativechannel_core::BridgeConfig;

use crate::traits::{MapsSdk, NativeManifest};

/// True iff `value` is non-empty after trimming and is not the template
/// placeholder.
pub fn is_usable_credential(value: Option<&str>, placeholder: &str) -> bool {
    match value.map(str::trim) {
        Some(trimmed) => !trimmed.is_empty() && trimmed != placeholder,
        None => false,
    }
}

/// Read the configured credential, trimmed. Unreadable manifests and blank
/// entries both come back as `None`.
pub fn configured_credential<H: NativeManifest + ?Sized>(
    host: &H,
    config: &BridgeConfig,
) -> Option<String> {
    match host.manifest_string(&config.maps_key_entry) {
        Ok(value) => value
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty()),
        Err(e) => {
            tracing::debug!(
                error = %e,
                entry = %config.maps_key_entry,
                "manifest unreadable, treating map credential as absent"
            );
            None
        }
    }
}

/// Answer for `hasGoogleMapsApiKey`. Never fails.
pub fn has_maps_api_key<H: NativeManifest + ?Sized>(host: &H, config: &BridgeConfig) -> bool {
    let credential = configured_credential(host, config);
    is_usable_credential(credential.as_deref(), &config.maps_key_placeholder)
}

/// What [`provision_maps_sdk`] did at launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapsProvisioning {
    /// A real key was handed to the SDK.
    Provided,
    /// The template placeholder was handed to the SDK; map tiles will not load.
    PlaceholderProvided,
    /// Nothing configured; the SDK was not called and the map page stays off.
    NotConfigured,
}

/// Hand the configured credential to the map SDK, if there is one.
pub fn provision_maps_sdk<H: NativeManifest + ?Sized>(
    host: &H,
    sdk: &dyn MapsSdk,
    config: &BridgeConfig,
) -> MapsProvisioning {
    let Some(key) = configured_credential(host, config) else {
        tracing::warn!("no Google Maps API key configured; the map sample page will remain disabled");
        return MapsProvisioning::NotConfigured;
    };

    sdk.provide_api_key(&key);

    if key == config.maps_key_placeholder {
        if cfg!(debug_assertions) {
            tracing::warn!(
                entry = %config.maps_key_entry,
                "Google Maps API key placeholder detected; replace the value before shipping"
            );
        }
        MapsProvisioning::PlaceholderProvided
    } else {
        tracing::info!("Google Maps API key provided to SDK");
        MapsProvisioning::Provided
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nativechannel_core::error::{BridgeError, Result};
    use std::sync::Mutex;

    struct Manifest(Result<Option<String>>);

    impl NativeManifest for Manifest {
        fn manifest_string(&self, _key: &str) -> Result<Option<String>> {
            match &self.0 {
                Ok(v) => Ok(v.clone()),
                Err(_) => Err(BridgeError::Metadata("metaData bundle is null".into())),
            }
        }
    }

    fn manifest(value: Option<&str>) -> Manifest {
        Manifest(Ok(value.map(str::to_owned)))
    }

    #[derive(Default)]
    struct RecordingMaps(Mutex<Vec<String>>);

    impl MapsSdk for RecordingMaps {
        fn provide_api_key(&self, key: &str) {
            self.0.lock().unwrap().push(key.to_owned());
        }
    }

    #[test]
    fn usable_credential_rules() {
        let placeholder = "YOUR_ANDROID_GOOGLE_MAPS_API_KEY";
        assert!(!is_usable_credential(None, placeholder));
        assert!(!is_usable_credential(Some(""), placeholder));
        assert!(!is_usable_credential(Some(" \t\n "), placeholder));
        assert!(!is_usable_credential(Some(placeholder), placeholder));
        assert!(!is_usable_credential(Some("  YOUR_ANDROID_GOOGLE_MAPS_API_KEY  "), placeholder));
        assert!(is_usable_credential(Some("AIzaExampleKey123"), placeholder));
        assert!(is_usable_credential(Some("  AIzaExampleKey123\n"), placeholder));
    }

    #[test]
    fn other_platform_placeholder_counts_as_a_key() {
        assert!(is_usable_credential(
            Some("YOUR_IOS_GOOGLE_MAPS_API_KEY"),
            "YOUR_ANDROID_GOOGLE_MAPS_API_KEY"
        ));
    }

    #[test]
    fn manifest_failure_is_false() {
        let config = BridgeConfig::android();
        let broken = Manifest(Err(BridgeError::PlatformUnavailable));
        assert!(!has_maps_api_key(&broken, &config));
        assert!(!has_maps_api_key(&manifest(None), &config));
        assert!(has_maps_api_key(&manifest(Some("AIzaExampleKey123")), &config));
    }

    #[test]
    fn provisioning_passes_trimmed_key() {
        let config = BridgeConfig::ios();
        let sdk = RecordingMaps::default();
        let outcome = provision_maps_sdk(&manifest(Some("  AIzaExampleKey123 ")), &sdk, &config);
        assert_eq!(outcome, MapsProvisioning::Provided);
        assert_eq!(*sdk.0.lock().unwrap(), vec!["AIzaExampleKey123".to_owned()]);
    }

    #[test]
    fn provisioning_skips_blank_key() {
        let config = BridgeConfig::ios();
        let sdk = RecordingMaps::default();
        let outcome = provision_maps_sdk(&manifest(Some("   ")), &sdk, &config);
        assert_eq!(outcome, MapsProvisioning::NotConfigured);
        assert!(sdk.0.lock().unwrap().is_empty());
    }

    #[test]
    fn provisioning_flags_placeholder() {
        let config = BridgeConfig::ios();
        let sdk = RecordingMaps::default();
        let outcome =
            provision_maps_sdk(&manifest(Some("YOUR_IOS_GOOGLE_MAPS_API_KEY")), &sdk, &config);
        assert_eq!(outcome, MapsProvisioning::PlaceholderProvided);
        assert_eq!(sdk.0.lock().unwrap().len(), 1);
    }
}
