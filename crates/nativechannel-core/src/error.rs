// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the native channel bridge.
//
// None of these ever cross the channel: the dispatcher collapses them into
// absence, `false` or a `notImplemented` reply before answering.

use thiserror::Error;

/// Top-level error type for all bridge-internal operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    // -- Host queries --
    #[error("manifest metadata unreadable: {0}")]
    Metadata(String),

    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,

    // -- Configuration --
    #[error("invalid bridge configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BridgeError>;
