// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native channel: contract types, configuration and errors shared by every
// platform bridge and by the application layer.

pub mod config;
pub mod error;
pub mod types;

pub use config::BridgeConfig;
pub use error::BridgeError;
pub use types::*;

/// Name of the single method channel shared by both platform bridges and the
/// application layer.
pub const CHANNEL_NAME: &str = "com.example.flutter_bloc_app/native";
