//! Fetch transports: where package source comes from.

mod github;
mod local;

pub use github::{split_github_path, GithubTransport};
pub use local::LocalTransport;

use ging_core::config::Settings;
use ging_core::traits::FetchTransport;
use ging_core::Result;

/// The transport the settings ask for: the local GOPATH in development
/// mode, GitHub otherwise.
pub fn from_settings(settings: &Settings) -> Result<Box<dyn FetchTransport>> {
    if settings.fetch.local {
        Ok(Box::new(LocalTransport::new(settings.gopath())))
    } else {
        Ok(Box::new(GithubTransport::from_settings(settings)?))
    }
}
