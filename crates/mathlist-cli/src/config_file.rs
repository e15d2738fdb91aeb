use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use mathlist::ParserConfig;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    #[serde(flatten)]
    pub parser: ParserConfig,
    /// Report every error instead of stopping at the first one.
    pub all_errors: bool,
}

/// A config file which could not be loaded.
#[derive(Debug)]
pub struct ConfigError {
    path: PathBuf,
    cause: Cause,
}

#[derive(Debug)]
enum Cause {
    Read(io::Error),
    Syntax(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.display();
        match &self.cause {
            Cause::Read(err) => write!(f, "cannot read '{path}': {err}"),
            Cause::Syntax(err) => write!(f, "invalid settings in '{path}': {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.cause {
            Cause::Read(err) => Some(err),
            Cause::Syntax(err) => Some(err),
        }
    }
}

/// Loads the parser configuration from a TOML file.
///
/// Keys that are missing from the file keep their default values.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let error = |cause| ConfigError {
        path: path.to_owned(),
        cause,
    };
    let content = fs::read_to_string(path).map_err(|err| error(Cause::Read(err)))?;
    let config = parse_config(&content).map_err(|err| error(Cause::Syntax(err)))?;
    log::debug!("loaded config file {}", path.display());
    Ok(config)
}

#[inline]
fn parse_config(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(s)
}
