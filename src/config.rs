//! Configuration of the standard channel pair.
//!
//! Every field has a default, so an empty JSON object is a valid config:
//!
//! ```
//! use steplog::{LogConfig, Mode};
//!
//! let config = LogConfig::from_json_str(r#"{"mode": "direct", "err_color": "bold magenta"}"#).unwrap();
//! assert_eq!(config.mode, Mode::Direct);
//! assert!(config.color_enabled);
//! ```

use std::env;

use serde::Deserialize;

use crate::color::LogColor;
use crate::destination::Mode;
use crate::error::Result;

/// Environment variable that selects the channel [`Mode`].
pub const MODE_ENV: &str = "STEPLOG_MODE";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub mode: Mode,
    pub color_enabled: bool,
    pub out_color: LogColor,
    pub err_color: LogColor,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Buffered,
            color_enabled: true,
            out_color: LogColor::info(),
            err_color: LogColor::error(),
        }
    }
}

impl LogConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Defaults adjusted from the environment.
    ///
    /// Color follows the usual `NO_COLOR` / `CLICOLOR` / `CLICOLOR_FORCE`
    /// conventions; [`MODE_ENV`] picks the mode.
    pub fn from_env() -> Result<Self> {
        let mut config = Self {
            color_enabled: colored::control::ShouldColorize::from_env().should_colorize(),
            ..Self::default()
        };
        if let Ok(mode) = env::var(MODE_ENV) {
            config.mode = mode.parse()?;
        }
        Ok(config)
    }
}
