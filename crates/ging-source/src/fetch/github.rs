use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use ging_core::config::Settings;
use ging_core::traits::FetchTransport;
use ging_core::types::{SourceFile, SourceTree};
use ging_core::{Error, Result};

const GITHUB_HOST: &str = "github.com";

/// One entry of a contents API directory listing.
#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    download_url: Option<String>,
}

/// Splits `github.com/<owner>/<repo>[/<dir>]` into owner, repo and the
/// (possibly empty) directory inside the repository.
pub fn split_github_path(import_path: &str) -> Option<(&str, &str, &str)> {
    let rest = import_path.strip_prefix(GITHUB_HOST)?.strip_prefix('/')?;
    let mut parts = rest.splitn(3, '/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty())?;
    Some((owner, repo, parts.next().unwrap_or("").trim_end_matches('/')))
}

/// Lists and downloads package directories through the GitHub contents API.
pub struct GithubTransport {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GithubTransport {
    pub fn new(api_base: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self { client, api_base: api_base.into().trim_end_matches('/').to_string(), token })
    }

    /// Token comes from the variable named by `fetch.token_env`; unset means
    /// anonymous access.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let fetch = &settings.fetch;
        let token = std::env::var(&fetch.token_env).ok().filter(|t| !t.is_empty());
        if token.is_none() {
            warn!(var = %fetch.token_env, "no GitHub token set, using anonymous rate limits");
        }
        Self::new(&fetch.github_api, token, Duration::from_secs(fetch.timeout_secs))
    }

    fn request(&self, import_path: &str, url: &str) -> Result<reqwest::blocking::Response> {
        let mut req = self.client.get(url).header(USER_AGENT, "ging").header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let resp = req.send().map_err(|e| Error::fetch(import_path, e))?;
        match resp.status() {
            s if s.is_success() => Ok(resp),
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
                Err(Error::fetch(import_path, format!("rate limited by GitHub ({})", resp.status())))
            }
            s => Err(Error::fetch(import_path, format!("GET {url} returned {s}"))),
        }
    }
}

impl FetchTransport for GithubTransport {
    fn get(&self, import_path: &str) -> Result<SourceTree> {
        let (owner, repo, dir) = split_github_path(import_path)
            .ok_or_else(|| Error::fetch(import_path, "only github.com/<owner>/<repo> paths are supported"))?;
        let url = format!("{}/repos/{owner}/{repo}/contents/{dir}", self.api_base);
        debug!(import_path, %url, "listing directory");

        let entries: Vec<ContentEntry> = self.request(import_path, &url)?.json().map_err(|e| Error::fetch(import_path, e))?;
        let mut tree = SourceTree::new(import_path);
        for entry in entries.into_iter().filter(|e| e.kind == "file") {
            let Some(download) = entry.download_url else { continue };
            let data = self.request(import_path, &download)?.bytes().map_err(|e| Error::fetch(import_path, e))?;
            tree.files.push(SourceFile { name: entry.name, data: data.to_vec() });
        }
        tree.files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_owner_repo_and_directory() {
        assert_eq!(split_github_path("github.com/gorilla/mux"), Some(("gorilla", "mux", "")));
        assert_eq!(split_github_path("github.com/golang/net/html/atom"), Some(("golang", "net", "html/atom")));
        assert_eq!(split_github_path("github.com/gorilla"), None);
        assert_eq!(split_github_path("gopkg.in/yaml.v2"), None);
    }

    #[test]
    fn other_hosts_fail_before_any_request() {
        let transport = GithubTransport::new("http://127.0.0.1:9", None, Duration::from_secs(1)).expect("client");
        let err = transport.get("golang.org/x/net/html").expect_err("unsupported host");
        assert!(matches!(err, Error::Fetch { .. }));
    }
}
