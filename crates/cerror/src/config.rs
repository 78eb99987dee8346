//! Stack capture configuration.
//!
//! Library defaults with runtime environment overrides.
//!
//! # Configuration Priority (highest wins)
//!
//! 1. `config::configure(..)` called before the first capture
//! 2. Environment variables
//! 3. Library defaults
//!
//! # Example
//!
//! ```rust
//! use cerror::config::{self, StackConfig};
//!
//! let cfg = StackConfig::from_env().max_frames(32);
//! let _ = config::configure(cfg);
//! assert!(config::current().max_frames <= 64);
//! ```

use once_cell::sync::OnceCell;

use crate::env::{env_get, env_get_bool};

/// Library defaults.
pub mod defaults {
    /// Capture a stack for every fresh error node.
    pub const CAPTURE: bool = true;
    /// Frames kept per captured stack.
    pub const MAX_FRAMES: usize = 64;
}

/// How stacks are captured for new error nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackConfig {
    /// Capture stacks at all. When off, fresh nodes carry an empty stack.
    pub enabled: bool,
    /// Upper bound on frames kept per capture, after skipping.
    pub max_frames: usize,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl StackConfig {
    /// Create config from library defaults with environment overrides.
    ///
    /// Environment variables (all optional):
    /// - `CERROR_STACK` - Capture stacks (0/1)
    /// - `CERROR_MAX_FRAMES` - Frames kept per capture
    pub fn from_env() -> Self {
        Self {
            enabled: env_get_bool("CERROR_STACK", defaults::CAPTURE),
            max_frames: env_get("CERROR_MAX_FRAMES", defaults::MAX_FRAMES),
        }
    }

    /// Create config with explicit defaults (no env override).
    pub fn new() -> Self {
        Self {
            enabled: defaults::CAPTURE,
            max_frames: defaults::MAX_FRAMES,
        }
    }

    pub fn enabled(mut self, enable: bool) -> Self {
        self.enabled = enable;
        self
    }

    pub fn max_frames(mut self, n: usize) -> Self {
        self.max_frames = n;
        self
    }
}

static CONFIG: OnceCell<StackConfig> = OnceCell::new();

/// Install the process-wide stack configuration.
///
/// Only the first call wins. Returns the rejected config if one was
/// already installed (explicitly, or implicitly by a capture).
pub fn configure(config: StackConfig) -> Result<(), StackConfig> {
    CONFIG.set(config).map(|()| {
        tracing::debug!(config = ?current(), "stack capture configured");
    })
}

/// The active configuration, initialised from the environment on first use.
pub fn current() -> &'static StackConfig {
    CONFIG.get_or_init(StackConfig::from_env)
}
