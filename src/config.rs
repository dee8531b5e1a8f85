//! Settings from environment variables, with command line overrides.

use std::env::VarError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::memory_repository::MemoryRepository;
use crate::repository::{ContentRepository, RepositoryError};
use crate::supabase::SupabaseRepository;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_BUCKET: &str = "stories";
pub const DEFAULT_ASSET_BASE: &str = "/static/assets";
pub const DEFAULT_TIMEOUT_SECS: &str = "10";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing env var {0:?}")]
    Missing(String),
    #[error("{0:?} env var is not unicode")]
    NotUnicode(String),
    #[error("invalid value {value:?} for {name:?}: {reason}")]
    Invalid {
        name: String,
        value: String,
        reason: String,
    },
}

/// Get an env var as a String; decoding failures are reported as
/// errors.
pub fn getenv(name: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(name) {
        Ok(s) => Ok(Some(s)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(name.into())),
    }
}

pub fn getenv_or(name: &str, fallbackvalue: &str) -> Result<String, ConfigError> {
    Ok(getenv(name)?.unwrap_or_else(|| fallbackvalue.into()))
}

/// Where the content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Supabase {
        url: String,
        key: String,
        bucket: String,
        timeout: Duration,
    },
    /// A JSON file with stories and champions, for running without
    /// the hosted backend.
    Fixtures {
        path: PathBuf,
        asset_base: String,
    },
}

impl Backend {
    /// For messages; leaves out the key.
    pub fn describe(&self) -> String {
        match self {
            Backend::Supabase { url, bucket, .. } => format!("{url} (bucket {bucket})"),
            Backend::Fixtures { path, .. } => format!("fixtures {path:?}"),
        }
    }

    pub fn open(&self) -> Result<Arc<dyn ContentRepository>, RepositoryError> {
        let repo: Arc<dyn ContentRepository> = match self {
            Backend::Supabase { url, key, bucket, timeout } =>
                Arc::new(SupabaseRepository::new(url, key, bucket, *timeout)?),
            Backend::Fixtures { path, asset_base } =>
                Arc::new(MemoryRepository::open(path, asset_base)?),
        };
        Ok(repo)
    }
}

/// Command line settings that take precedence over the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub listen: Option<String>,
    pub fixtures: Option<PathBuf>,
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    pub listen: String,
    pub static_dir: PathBuf,
    pub backend: Backend,
}

impl ServeConfig {
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        Self::from_lookup(getenv, overrides)
    }

    /// `lookup` returns the value of an environment variable.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Result<Option<String>, ConfigError>,
        overrides: Overrides,
    ) -> Result<Self, ConfigError> {
        let get_or = |name: &str, fallback: &str| -> Result<String, ConfigError> {
            Ok(lookup(name)?.unwrap_or_else(|| fallback.into()))
        };
        let listen = match overrides.listen {
            Some(listen) => listen,
            None => get_or("LISTEN_HTTP", DEFAULT_LISTEN)?,
        };
        check_listen_addr(&listen)?;
        let static_dir = match overrides.static_dir {
            Some(dir) => dir,
            None => get_or("STATIC_DIR", DEFAULT_STATIC_DIR)?.into(),
        };
        let fixtures = match overrides.fixtures {
            Some(path) => Some(path),
            None => lookup("FIXTURES")?.map(PathBuf::from),
        };
        let backend = match fixtures {
            Some(path) => Backend::Fixtures {
                path,
                asset_base: get_or("ASSET_BASE", DEFAULT_ASSET_BASE)?,
            },
            None => {
                let xget = |name: &str| -> Result<String, ConfigError> {
                    lookup(name)?.ok_or_else(|| ConfigError::Missing(name.into()))
                };
                Backend::Supabase {
                    url: xget("SUPABASE_URL")?,
                    key: xget("SUPABASE_KEY")?,
                    bucket: get_or("STORAGE_BUCKET", DEFAULT_BUCKET)?,
                    timeout: parse_timeout(&get_or("HTTP_TIMEOUT_SECS",
                                                   DEFAULT_TIMEOUT_SECS)?)?,
                }
            }
        };
        Ok(ServeConfig { listen, static_dir, backend })
    }
}

fn check_listen_addr(listen: &str) -> Result<(), ConfigError> {
    match listen.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => Ok(()),
        _ => Err(ConfigError::Invalid {
            name: "LISTEN_HTTP".into(),
            value: listen.into(),
            reason: "expecting host:port".into(),
        }),
    }
}

fn parse_timeout(s: &str) -> Result<Duration, ConfigError> {
    s.parse::<u64>().map(Duration::from_secs).map_err(|e| ConfigError::Invalid {
        name: "HTTP_TIMEOUT_SECS".into(),
        value: s.into(),
        reason: e.to_string(),
    })
}
