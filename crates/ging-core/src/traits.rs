use crate::types::SourceTree;

/// Retrieves the raw files of one package directory.
///
/// Implementations come fully configured (auth, local redirection); the
/// pipeline never retries a failed fetch.
pub trait FetchTransport: Send + Sync {
    fn get(&self, import_path: &str) -> crate::Result<SourceTree>;
}
