//! Best-effort package symbols for imports that are never actually resolved.
//!
//! Only the documentation of the target package matters, so an imported
//! package is represented by a name guessed from its path.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

use ging_core::{Error, Result};

/// Ordered name-guessing rules; the first capture of the first match wins.
/// The last rule takes the final non-empty segment, ignoring trailing slashes.
const PACKAGE_NAME_PATTERNS: &[&str] = &[
    r"/([^-./]+)[-.](?:git|svn|hg|bzr|v\d+)$",
    r"/([^-./]+)[-.]go$",
    r"/go[-.]([^-./]+)$",
    r"^code\.google\.com/p/google-api-go-client/([^/]+)/v[^/]+$",
    r"^code\.google\.com/p/biogo\.([^/]+)$",
    r"([^/]+)/*$",
];

static PACKAGE_NAME_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    PACKAGE_NAME_PATTERNS.iter().map(|p| Regex::new(p).expect("package name pattern compiles")).collect()
});

/// An imported package as seen by the merged declaration tree.
#[derive(Debug, PartialEq, Eq)]
pub struct PackageSymbol {
    pub import_path: String,
    pub name: String,
}

/// Shared handle; identity (`Arc::ptr_eq`) marks a cache hit.
pub type SymbolHandle = Arc<PackageSymbol>;

/// Handles created so far, keyed by import path.
pub type KnownSymbols = HashMap<String, SymbolHandle>;

/// Guesses the package name an import path declares, without I/O. Only the
/// empty path has no name; a path of slashes names itself.
pub fn guess_package_name(import_path: &str) -> Option<&str> {
    PACKAGE_NAME_RULES
        .iter()
        .find_map(|rule| rule.captures(import_path).and_then(|c| c.get(1)))
        .map(|m| m.as_str())
        .or_else(|| Some(import_path).filter(|p| !p.is_empty()))
}

/// Returns the cached handle for `import_path`, or creates and caches an
/// empty one named by [`guess_package_name`].
pub fn resolve_stub(known: &mut KnownSymbols, import_path: &str) -> Result<SymbolHandle> {
    if let Some(handle) = known.get(import_path) {
        return Ok(Arc::clone(handle));
    }
    let name = guess_package_name(import_path).ok_or_else(|| Error::UnresolvedSymbol(import_path.to_string()))?;
    let handle = Arc::new(PackageSymbol { import_path: import_path.to_string(), name: name.to_string() });
    known.insert(import_path.to_string(), Arc::clone(&handle));
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_apply_in_order() {
        assert_eq!(guess_package_name("github.com/user/repo.git"), Some("repo"));
        assert_eq!(guess_package_name("gopkg.in/yaml.v2"), Some("yaml"));
        assert_eq!(guess_package_name("github.com/nsf/termbox-go"), Some("termbox"));
        assert_eq!(guess_package_name("github.com/mattn/go-sqlite3"), Some("sqlite3"));
        assert_eq!(guess_package_name("code.google.com/p/google-api-go-client/drive/v2"), Some("drive"));
        assert_eq!(guess_package_name("code.google.com/p/biogo.store"), Some("store"));
        assert_eq!(guess_package_name("net/http"), Some("http"));
        assert_eq!(guess_package_name("fmt"), Some("fmt"));
    }

    #[test]
    fn every_non_empty_final_segment_resolves() {
        let mut known = KnownSymbols::new();
        for path in ["a", "a/b", "x.y/z-w", "github.com/gorilla/mux", "weird/..."] {
            assert!(resolve_stub(&mut known, path).is_ok(), "{path}");
        }
    }

    #[test]
    fn trailing_slashes_still_name_a_package() {
        let mut known = KnownSymbols::new();
        assert_eq!(resolve_stub(&mut known, "github.com/").expect("host only").name, "github.com");
        assert_eq!(resolve_stub(&mut known, "a/b/").expect("trailing slash").name, "b");
        assert_eq!(resolve_stub(&mut known, "a/b//").expect("double slash").name, "b");
        assert_eq!(resolve_stub(&mut known, "/").expect("bare slash").name, "/");
        assert_eq!(known.len(), 4);
    }

    #[test]
    fn only_the_empty_path_is_unresolved() {
        let mut known = KnownSymbols::new();
        assert!(matches!(resolve_stub(&mut known, ""), Err(Error::UnresolvedSymbol(_))));
        assert!(known.is_empty());
    }

    #[test]
    fn second_lookup_returns_the_cached_handle() {
        let mut known = KnownSymbols::new();
        let first = resolve_stub(&mut known, "golang.org/x/net/html").expect("first");
        let second = resolve_stub(&mut known, "golang.org/x/net/html").expect("second");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name, "html");
        assert_eq!(known.len(), 1);
    }
}
