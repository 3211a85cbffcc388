//! Transform options and their environment-driven defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::sync::OnceLock;

/// Detected build environment, read once per process.
static DETECTED_ENV: OnceLock<BuildEnv> = OnceLock::new();

/// Production/development distinction selecting default option values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildEnv {
    Development,
    Production,
}

impl BuildEnv {
    /// Detect the environment from `NODE_ENV`, caching the first answer for
    /// the process lifetime.
    pub fn detect() -> Self {
        *DETECTED_ENV.get_or_init(|| match env::var("NODE_ENV") {
            Ok(value) if value == "production" => Self::Production,
            _ => Self::Development,
        })
    }

    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Caller-supplied transform options, all optional.
///
/// Unset fields fall back to environment-driven defaults at
/// [`TransformOptions::resolve`]; explicit values always win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Emit source maps for the rewritten JS. Defaults to `true` in
    /// development, `false` in production.
    pub source_map: Option<bool>,

    /// Emit human-readable class display names. Same defaulting as
    /// `source_map`.
    pub display_name: Option<bool>,

    /// Preset transform plugins forwarded to the extraction step.
    #[serde(default = "defaults::presets")]
    pub presets: Vec<String>,
}

impl TransformOptions {
    /// Fill unset fields from the build environment.
    pub fn resolve(&self, env: BuildEnv) -> ResolvedTransformOptions {
        let dev = !env.is_production();
        ResolvedTransformOptions {
            source_map: self.source_map.unwrap_or(dev),
            display_name: self.display_name.unwrap_or(dev),
            presets: self.presets.clone(),
        }
    }
}

/// Fully-defaulted options handed to the extraction transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTransformOptions {
    pub source_map: bool,
    pub display_name: bool,
    pub presets: Vec<String>,
}

/// Default values for option fields, used by serde.
pub mod defaults {
    pub fn presets() -> Vec<String> {
        Vec::new()
    }
}
