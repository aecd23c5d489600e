// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Method dispatch for the native channel.
//
// Handlers are registered once per method at startup and looked up by the
// closed `Method` set. Every call produces exactly one `MethodResponse`:
// unknown names (and known names with no handler installed) answer
// `NotImplemented`, which callers can tell apart from a `null` success.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use nativechannel_core::{BridgeConfig, Method, MethodRequest, MethodResponse};

use crate::credential::has_maps_api_key;
use crate::info::collect_platform_info;
use crate::traits::{EngineHost, PlatformHost};

type Handler = Box<dyn Fn(&MethodRequest) -> MethodResponse + Send + Sync>;

/// Envelope returned when even an error reply cannot be encoded.
const ENCODE_FAILURE: &str = r#"{"status":"error","code":"encode_failed","message":"reply could not be encoded"}"#;

/// Routes a request to exactly one handler.
#[derive(Default)]
pub struct MethodDispatcher {
    handlers: HashMap<Method, Handler>,
}

impl MethodDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher answering the full method set from `host`.
    pub fn for_host(host: Arc<dyn PlatformHost>, config: BridgeConfig) -> Self {
        let mut dispatcher = Self::new();

        let info_host = Arc::clone(&host);
        dispatcher.register(Method::GetPlatformInfo, move |_| {
            MethodResponse::success(&collect_platform_info(info_host.as_ref()))
        });

        dispatcher.register(Method::HasGoogleMapsApiKey, move |_| {
            MethodResponse::success(&has_maps_api_key(host.as_ref(), &config))
        });

        dispatcher
    }

    /// Install the handler for `method`, replacing any earlier one.
    pub fn register<F>(&mut self, method: Method, handler: F) -> &mut Self
    where
        F: Fn(&MethodRequest) -> MethodResponse + Send + Sync + 'static,
    {
        self.handlers.insert(method, Box::new(handler));
        self
    }

    pub fn dispatch(&self, request: &MethodRequest) -> MethodResponse {
        let Some(method) = Method::from_name(&request.method) else {
            tracing::debug!(method = %request.method, "method not implemented");
            return MethodResponse::NotImplemented;
        };
        match self.handlers.get(&method) {
            Some(handler) => {
                tracing::debug!(method = method.name(), "dispatching method call");
                handler(request)
            }
            None => {
                tracing::debug!(method = method.name(), "no handler registered");
                MethodResponse::NotImplemented
            }
        }
    }
}

/// A named channel bound to its dispatcher.
pub struct MethodChannel {
    name: String,
    dispatcher: MethodDispatcher,
}

impl MethodChannel {
    pub fn new(name: impl Into<String>, dispatcher: MethodDispatcher) -> Self {
        Self {
            name: name.into(),
            dispatcher,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn invoke(&self, request: &MethodRequest) -> MethodResponse {
        self.dispatcher.dispatch(request)
    }

    /// Transport entry: decode, dispatch, encode. Neither built-in method
    /// takes arguments, so malformed argument JSON is treated as `null`.
    pub fn handle_json(&self, method: &str, arguments_json: Option<&str>) -> String {
        let arguments = arguments_json.and_then(|raw| match serde_json::from_str::<Value>(raw) {
            Ok(Value::Null) => None,
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(method, error = %e, "ignoring malformed method arguments");
                None
            }
        });
        let request = MethodRequest {
            method: method.to_owned(),
            arguments,
        };
        encode_reply(&self.invoke(&request))
    }

    /// Register this channel on `engine` under its own name.
    pub fn attach(self: &Arc<Self>, engine: &mut dyn EngineHost) {
        tracing::info!(channel = %self.name, "registering method channel");
        engine.set_method_call_handler(&self.name, Arc::clone(self));
    }
}

/// Encode a reply for the host transport, never failing.
pub fn encode_reply(reply: &MethodResponse) -> String {
    reply.encode().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to encode method reply");
        ENCODE_FAILURE.to_owned()
    })
}

/// In-process engine: one handler per channel name.
#[derive(Default)]
pub struct ChannelRegistry {
    channels: HashMap<String, Arc<MethodChannel>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<MethodChannel>> {
        self.channels.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Route a transport message to the channel registered under `channel`.
    pub fn dispatch_json(&self, channel: &str, method: &str, arguments_json: Option<&str>) -> String {
        match self.channels.get(channel) {
            Some(handler) => handler.handle_json(method, arguments_json),
            None => {
                tracing::warn!(channel, method, "message for unregistered channel");
                encode_reply(&MethodResponse::Error {
                    code: "unregistered_channel".into(),
                    message: format!("no handler registered for channel {channel}"),
                    details: None,
                })
            }
        }
    }
}

impl EngineHost for ChannelRegistry {
    fn set_method_call_handler(&mut self, name: &str, channel: Arc<MethodChannel>) {
        if self.channels.insert(name.to_owned(), channel).is_some() {
            tracing::debug!(channel = name, "replaced existing method channel handler");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_channel() -> Arc<MethodChannel> {
        let mut dispatcher = MethodDispatcher::new();
        dispatcher.register(Method::GetPlatformInfo, |request| MethodResponse::Success {
            result: request.arguments.clone().unwrap_or(Value::Null),
        });
        Arc::new(MethodChannel::new("test/channel", dispatcher))
    }

    #[test]
    fn unknown_method_is_not_implemented() {
        let channel = echo_channel();
        for name in ["", "getBatteryLevel", "GETPLATFORMINFO", "getPlatformInfo "] {
            assert!(channel.invoke(&MethodRequest::new(name)).is_not_implemented());
        }
    }

    #[test]
    fn known_method_without_handler_is_not_implemented() {
        let channel = echo_channel();
        let reply = channel.invoke(&MethodRequest::new("hasGoogleMapsApiKey"));
        assert!(reply.is_not_implemented());
    }

    #[test]
    fn null_result_differs_from_not_implemented() {
        let channel = echo_channel();
        let reply = channel.handle_json("getPlatformInfo", None);
        assert_eq!(reply, r#"{"status":"success","result":null}"#);
        let reply = channel.handle_json("nope", None);
        assert_eq!(reply, r#"{"status":"notImplemented"}"#);
    }

    #[test]
    fn arguments_pass_through_and_malformed_become_null() {
        let channel = echo_channel();
        let reply: MethodResponse =
            serde_json::from_str(&channel.handle_json("getPlatformInfo", Some(r#"{"a":1}"#))).unwrap();
        assert_eq!(reply.result(), Some(&json!({"a": 1})));

        let reply: MethodResponse =
            serde_json::from_str(&channel.handle_json("getPlatformInfo", Some("{not json"))).unwrap();
        assert_eq!(reply.result(), Some(&Value::Null));
    }

    #[test]
    fn registry_holds_one_handler_per_channel() {
        let mut engine = ChannelRegistry::new();
        let channel = echo_channel();
        channel.attach(&mut engine);
        channel.attach(&mut engine);
        assert_eq!(engine.len(), 1);
        assert!(engine.get("test/channel").is_some());
    }

    #[test]
    fn unregistered_channel_is_an_error_reply() {
        let engine = ChannelRegistry::new();
        let reply: MethodResponse =
            serde_json::from_str(&engine.dispatch_json("missing", "getPlatformInfo", None)).unwrap();
        assert!(matches!(reply, MethodResponse::Error { ref code, .. } if code == "unregistered_channel"));
    }
}
