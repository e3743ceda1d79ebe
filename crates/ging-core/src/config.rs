//! Configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults, `config.toml`,
//! `config.<env>.toml` and `GING_*` env vars (nested keys joined with `__`,
//! e.g. `GING_SEARCH__LIMIT=20`). Provides helpers to expand `~` and
//! `${VAR}` and to resolve relative paths against a known base directory.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub index: IndexSettings,
    pub search: SearchSettings,
    pub fetch: FetchSettings,
    pub queue: QueueSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSettings {
    pub path: String,
    pub writer_memory: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    pub limit: usize,
    pub link_base: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchSettings {
    pub local: bool,
    pub gopath: String,
    pub token_env: String,
    pub github_api: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSettings {
    pub capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            index: IndexSettings { path: "./docindex.tantivy".to_string(), writer_memory: 50_000_000 },
            search: SearchSettings { limit: 10, link_base: "http://godoc.org".to_string() },
            fetch: FetchSettings {
                local: false,
                gopath: "${GOPATH}".to_string(),
                token_env: "GING_GITHUB_ACCESSTOKEN".to_string(),
                github_api: "https://api.github.com".to_string(),
                timeout_secs: 30,
            },
            queue: QueueSettings { capacity: 16 },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("GING_").split("__"));

        let config = Self { figment };
        config.settings()?.validate()?;
        Ok(config)
    }

    /// Wraps an already assembled figment, mostly for tests and embedding.
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    pub fn settings(&self) -> Result<Settings> {
        self.figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.index.path.trim().is_empty() {
            return Err(Error::InvalidConfig("index.path must not be empty".to_string()));
        }
        if self.search.limit == 0 {
            return Err(Error::InvalidConfig("search.limit must be at least 1".to_string()));
        }
        if self.queue.capacity == 0 {
            return Err(Error::InvalidConfig("queue.capacity must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn index_path(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.index.path)
    }

    pub fn gopath(&self) -> PathBuf {
        expand_path(&self.fetch.gopath)
    }
}

/// `~` and `$VAR` expanded. An unset variable leaves the text as written;
/// nothing is canonicalised.
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
    }
}

pub fn resolve_with_base(base: &Path, raw: &str) -> PathBuf {
    let path = expand_path(raw);
    if path.is_absolute() {
        return path;
    }
    base.join(path)
}
