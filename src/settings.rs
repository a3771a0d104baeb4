use crate::{Limits, ResolverConfig, TransferConfig};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Everything the command-line front-end can be configured with.
///
/// Sources, later ones winning: `teradl.toml` in the working directory (or
/// the file given to [`Settings::load`]), then `TERADL_*` variables with `__`
/// between nested keys, e.g. `TERADL_LIMITS__MAX_FILE_SIZE=1048576`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub limits: Limits,
    pub resolver: ResolverConfig,
    pub transfer: TransferConfig,
    pub output_dir: PathBuf,
    /// Raw `Cookie` header value, e.g. a session cookie.
    pub cookie: Option<String>,
    /// Netscape cookie jar.
    pub cookie_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            resolver: ResolverConfig::default(),
            transfer: TransferConfig::default(),
            output_dir: PathBuf::from("."),
            cookie: None,
            cookie_file: None,
        }
    }
}

impl Settings {
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name("teradl").required(false),
        };
        Config::builder()
            .add_source(file)
            .add_source(environment())
            .build()?
            .try_deserialize()
    }
}

/// `TERADL_` then `__` between nested keys.
fn environment() -> Environment {
    Environment::with_prefix("TERADL")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("limits.allowed_extensions")
        .ignore_empty(true)
}
