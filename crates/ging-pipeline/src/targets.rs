//! Batch target lists.

use std::path::Path;

use serde::Deserialize;

use ging_core::{Error, Result};

#[derive(Debug, Deserialize)]
struct Target {
    path: String,
}

/// Parses a JSON array of `{"path": "..."}` objects. Blank paths are
/// skipped; order is kept.
pub fn parse_fetch_file(json: &str) -> Result<Vec<String>> {
    let targets: Vec<Target> =
        serde_json::from_str(json).map_err(|e| Error::InvalidConfig(format!("fetch file: {e}")))?;
    Ok(targets.into_iter().map(|t| t.path.trim().to_string()).filter(|p| !p.is_empty()).collect())
}

pub fn read_fetch_file(path: &Path) -> Result<Vec<String>> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| Error::InvalidConfig(format!("cannot read {}: {e}", path.display())))?;
    parse_fetch_file(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_paths_in_order() {
        let json = r#"[{"path": "github.com/gorilla/mux"}, {"path": " "}, {"path": "github.com/gorilla/websocket", "stars": 3}]"#;
        assert_eq!(parse_fetch_file(json).expect("parse"), vec!["github.com/gorilla/mux", "github.com/gorilla/websocket"]);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        assert!(matches!(parse_fetch_file(r#"{"path": "x"}"#), Err(Error::InvalidConfig(_))));
    }
}
