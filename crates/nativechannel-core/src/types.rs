// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Channel contract types: requests, replies and the payloads they carry.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Placeholder reported for device strings the host cannot determine.
pub const UNKNOWN: &str = "unknown";

/// Host operating system a bridge was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    /// Wire name used in `PlatformInfo.platform`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current charge level, or absence when the host cannot measure it.
///
/// Serialized as a nullable integer so the application layer sees `null`
/// rather than a sentinel such as `-1` or `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<u8>", into = "Option<u8>")]
pub enum BatteryLevel {
    /// Percentage in `0..=100`.
    Present(u8),
    #[default]
    Absent,
}

impl BatteryLevel {
    /// Build from a raw percentage reading. Negative readings mean "unknown";
    /// readings above 100 are clamped.
    pub fn from_percent(percent: i64) -> Self {
        if percent < 0 {
            Self::Absent
        } else {
            Self::Present(percent.min(100) as u8)
        }
    }

    pub fn percent(&self) -> Option<u8> {
        match self {
            Self::Present(p) => Some(*p),
            Self::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }
}

impl From<Option<u8>> for BatteryLevel {
    fn from(value: Option<u8>) -> Self {
        match value {
            Some(p) => Self::Present(p.min(100)),
            None => Self::Absent,
        }
    }
}

impl From<BatteryLevel> for Option<u8> {
    fn from(level: BatteryLevel) -> Self {
        level.percent()
    }
}

/// Reply payload for `getPlatformInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformInfo {
    pub platform: Platform,
    /// OS version string, `"unknown"` if unavailable.
    pub version: String,
    /// Fixed `"Apple"` on iOS; device-reported on Android.
    pub manufacturer: String,
    pub model: String,
    #[serde(default)]
    pub battery_level: BatteryLevel,
}

/// The closed set of methods the channel answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GetPlatformInfo,
    HasGoogleMapsApiKey,
}

impl Method {
    pub const ALL: [Method; 2] = [Method::GetPlatformInfo, Method::HasGoogleMapsApiKey];

    /// Name as sent by the application layer.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetPlatformInfo => "getPlatformInfo",
            Self::HasGoogleMapsApiKey => "hasGoogleMapsApiKey",
        }
    }

    /// Look up a method by name. Unknown names yield `None`; that is an
    /// expected outcome, not an error.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// One inbound method call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodRequest {
    pub method: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

impl MethodRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: None,
        }
    }
}

/// The single reply to a [`MethodRequest`].
///
/// Encoded as a `status`-tagged envelope so that a successful `null` result,
/// an unknown method and an error stay distinguishable on the far side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodResponse {
    Success {
        result: Value,
    },
    NotImplemented,
    Error {
        code: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },
}

impl MethodResponse {
    /// Wrap a serializable payload. A payload that cannot be encoded becomes
    /// an `Error` reply instead of a panic.
    pub fn success<T: Serialize>(payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(result) => Self::Success { result },
            Err(e) => Self::Error {
                code: "encode_failed".into(),
                message: e.to_string(),
                details: None,
            },
        }
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented)
    }

    /// The result value of a successful reply.
    pub fn result(&self) -> Option<&Value> {
        match self {
            Self::Success { result } => Some(result),
            _ => None,
        }
    }

    /// Encode as the JSON envelope handed to the host transport.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// OS callback that delivered a deep link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkSource {
    /// Cold-start launch parameters (launch options / launch intent).
    LaunchOptions,
    /// Runtime "open URL" callback (or `onNewIntent` on Android).
    OpenUrl,
    /// Universal / app link delivered as a continued user activity.
    UserActivity,
    /// URL contexts or activities attached to a scene connection.
    SceneConnection,
    SceneOpenUrl,
    SceneUserActivity,
}

/// A URL the OS asked the app to open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepLinkEvent {
    pub url: String,
    pub source: LinkSource,
}

impl DeepLinkEvent {
    pub fn new(url: impl Into<String>, source: LinkSource) -> Self {
        Self {
            url: url.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_are_closed() {
        assert_eq!(Method::from_name("getPlatformInfo"), Some(Method::GetPlatformInfo));
        assert_eq!(
            Method::from_name("hasGoogleMapsApiKey"),
            Some(Method::HasGoogleMapsApiKey)
        );
        assert_eq!(Method::from_name("getplatforminfo"), None);
        assert_eq!(Method::from_name(""), None);
    }

    #[test]
    fn battery_level_from_percent() {
        assert_eq!(BatteryLevel::from_percent(-1), BatteryLevel::Absent);
        assert_eq!(BatteryLevel::from_percent(0), BatteryLevel::Present(0));
        assert_eq!(BatteryLevel::from_percent(100), BatteryLevel::Present(100));
        assert_eq!(BatteryLevel::from_percent(140), BatteryLevel::Present(100));
    }

    #[test]
    fn platform_info_uses_camel_case_and_null_battery() {
        let info = PlatformInfo {
            platform: Platform::Ios,
            version: "17.4".into(),
            manufacturer: "Apple".into(),
            model: "iPhone".into(),
            battery_level: BatteryLevel::Absent,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["platform"], "ios");
        assert!(json["batteryLevel"].is_null());

        let charged = PlatformInfo {
            battery_level: BatteryLevel::Present(55),
            ..info
        };
        let json = serde_json::to_value(&charged).unwrap();
        assert_eq!(json["batteryLevel"], 55);
    }

    #[test]
    fn null_success_is_not_not_implemented() {
        let null_reply = MethodResponse::Success { result: Value::Null };
        let encoded = null_reply.encode().unwrap();
        assert_eq!(encoded, r#"{"status":"success","result":null}"#);

        let unknown = MethodResponse::NotImplemented.encode().unwrap();
        assert_eq!(unknown, r#"{"status":"notImplemented"}"#);
        assert_ne!(encoded, unknown);
    }

    #[test]
    fn envelope_decodes_back() {
        let reply = MethodResponse::success(&true);
        let decoded: MethodResponse = serde_json::from_str(&reply.encode().unwrap()).unwrap();
        assert_eq!(decoded.result(), Some(&Value::Bool(true)));
    }

    #[test]
    fn request_without_arguments_decodes() {
        let request: MethodRequest = serde_json::from_str(r#"{"method":"getPlatformInfo"}"#).unwrap();
        assert_eq!(request, MethodRequest::new("getPlatformInfo"));
    }
}
