use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::guard::RedirectOptions;

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Options applied to every redirect the binary installs.
    #[serde(default)]
    pub redirect: RedirectOptions,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Diagnostic output of the binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `STDIO_GUARD_LOG` is unset (default: "warn").
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Write logs here instead of stderr. Keeps diagnostics out of a
    /// redirected stderr.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_filter() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            log_file: None,
        }
    }
}
