use std::collections::HashMap;

use ging_core::traits::FetchTransport;
use ging_core::types::{DocKind, SourceTree};
use ging_core::{Error, ErrorKind, Result};
use ging_source::{build, resolve, resolve_tree, ImportRef};

/// Serves trees from memory, keyed by import path.
struct MemoryTransport {
    trees: HashMap<String, SourceTree>,
}

impl MemoryTransport {
    fn with(tree: SourceTree) -> Self {
        Self { trees: HashMap::from([(tree.import_path.clone(), tree)]) }
    }
}

impl FetchTransport for MemoryTransport {
    fn get(&self, import_path: &str) -> Result<SourceTree> {
        self.trees.get(import_path).cloned().ok_or_else(|| Error::fetch(import_path, "404 Not Found"))
    }
}

const MUX_GO: &str = r#"// Package mux implements a request router and dispatcher.
//
// Example:
//
//	r := mux.NewRouter()
//	r.HandleFunc("/", handler)
//
// The router matches incoming requests.
package mux

import (
	"net/http"
	"regexp"
)

// NewRouter returns a new router instance.
func NewRouter() *Router { return &Router{} }

// Router registers routes to be matched and dispatches a handler.
type Router struct{}

// ServeHTTP dispatches the handler registered in the matched route.
func (r *Router) ServeHTTP(w http.ResponseWriter, req *http.Request) {}

// Vars returns the route variables for the current request, if any.
func Vars(r *http.Request) map[string]string { return nil }

func cleanPath(p string) string { return p }

var validName = regexp.MustCompile(`^[a-z]+$`)
"#;

const MUX_ERRORS_GO: &str = r#"package mux

import "errors"

// Errors returned by route matching.
var (
	ErrMethodMismatch = errors.New("method is not allowed")
	ErrNotFound       = errors.New("no matching route was found")
	errInternal       = errors.New("internal")
)

// Matching strategies.
const (
	MatchAll, MatchAny = 1, 2
)
"#;

fn mux_tree() -> SourceTree {
    SourceTree::new("github.com/gorilla/mux")
        .with_file("mux.go", MUX_GO)
        .with_file("errors.go", MUX_ERRORS_GO)
        .with_file("mux_test.go", "package mux\n\nfunc TestX() {}\n")
        .with_file("doc_ignored.go", "// Package documentation is here.\npackage documentation\n")
        .with_file("README.md", "# mux\n")
}

#[test]
fn resolves_and_builds_a_package() {
    let transport = MemoryTransport::with(mux_tree());
    let tree = resolve(&transport, "github.com/gorilla/mux").expect("resolve");
    assert_eq!(tree.name, "mux");
    assert_eq!(tree.env.to_string(), "linux/amd64");
    assert_eq!(tree.files, vec!["errors.go", "mux.go"]);
    assert!(tree.imports.values().all(ImportRef::is_stub));
    assert_eq!(tree.imports["net/http"].name(), "http");

    let doc = build(&tree);
    assert_eq!(doc.name(), "mux");
    assert_eq!(doc.import_path(), "github.com/gorilla/mux");
    assert!(doc.doc().contains("implements a request router"));
    assert!(!doc.doc().contains("NewRouter()"));
    assert!(!doc.doc().contains("<pre>"));

    let funcs: Vec<_> = doc.funcs().iter().map(|d| d.name()).collect();
    assert_eq!(funcs, vec!["NewRouter", "Vars"]);
    let vars: Vec<_> = doc.vars().iter().map(|d| (d.name(), d.doc())).collect();
    assert_eq!(
        vars,
        vec![("ErrMethodMismatch", "Errors returned by route matching."), ("ErrNotFound", "Errors returned by route matching.")]
    );
    let consts: Vec<_> = doc.consts().iter().map(|d| d.name()).collect();
    assert_eq!(consts, vec!["MatchAll", "MatchAny"]);
    assert!(doc.children().all(|d| d.import_path() == "github.com/gorilla/mux"));
    assert_eq!(doc.documents().filter(|d| d.kind() == DocKind::Package).count(), 1);
}

#[test]
fn falls_back_to_the_first_environment_with_files() {
    let tree = SourceTree::new("example.com/winonly")
        .with_file("term_windows.go", "// Package winonly talks to the console.\npackage winonly\n\n// Size reports the console size.\nfunc Size() int { return 0 }\n");
    let decls = resolve_tree(tree).expect("resolve");
    assert_eq!(decls.env.to_string(), "windows/amd64");
    assert_eq!(build(&decls).funcs()[0].name(), "Size");
}

#[test]
fn constraint_headers_select_the_environment() {
    let tree = SourceTree::new("example.com/mac")
        .with_file("a.go", "//go:build darwin && !cgo\n\npackage mac\n")
        .with_file("b.go", "// +build darwin\n\npackage mac\n\n// Open opens.\nfunc Open() {}\n");
    let decls = resolve_tree(tree).expect("resolve");
    assert_eq!(decls.env.to_string(), "darwin/amd64");
    assert_eq!(decls.files, vec!["b.go"]);
}

#[test]
fn nothing_buildable_lists_every_environment_tried() {
    let tree = SourceTree::new("example.com/plan9")
        .with_file("x_plan9.go", "package x\n")
        .with_file("x_test.go", "package x\n");
    let err = resolve_tree(tree).expect_err("no env");
    assert_eq!(err.kind(), ErrorKind::NoBuildableSource);
    let Error::NoBuildableSource { tried, .. } = err else { unreachable!() };
    assert_eq!(tried, "linux/amd64, darwin/amd64, windows/amd64");
}

#[test]
fn a_broken_file_aborts_the_package() {
    let tree = SourceTree::new("example.com/broken")
        .with_file("ok.go", "package broken\n\n// Fine is fine.\nfunc Fine() {}\n")
        .with_file("bad.go", "package broken\n\nfunc Broken( {\n");
    let err = resolve_tree(tree).expect_err("parse error");
    assert!(matches!(err, Error::Parse { ref file, .. } if file == "bad.go"));
    assert!(!err.is_retryable());
}

#[test]
fn mixed_package_names_are_rejected() {
    let tree = SourceTree::new("example.com/mixed")
        .with_file("a.go", "package alpha\n")
        .with_file("b.go", "package beta\n");
    assert_eq!(resolve_tree(tree).expect_err("mixed").kind(), ErrorKind::Parse);
}

#[test]
fn longest_package_comment_wins() {
    let tree = SourceTree::new("example.com/docs")
        .with_file("a.go", "// Package docs is short.\npackage docs\n")
        .with_file("doc.go", "// Package docs has the long story.\n//\n// With a second paragraph.\npackage docs\n");
    let decls = resolve_tree(tree).expect("resolve");
    assert!(decls.doc.starts_with("Package docs has the long story."));
}

#[test]
fn aliased_imports_keep_their_alias() {
    let tree = SourceTree::new("example.com/alias")
        .with_file("a.go", "package alias\n\nimport yaml \"gopkg.in/yaml.v2\"\n")
        .with_file("b.go", "package alias\n\nimport (\n\t\"gopkg.in/yaml.v2\"\n\t\"github.com/mattn/go-sqlite3\"\n)\n");
    let decls = resolve_tree(tree).expect("resolve");
    let yaml = &decls.imports["gopkg.in/yaml.v2"];
    assert!(!yaml.is_stub());
    assert_eq!(yaml.name(), "yaml");
    assert_eq!(decls.imports["github.com/mattn/go-sqlite3"].name(), "sqlite3");
}

#[test]
fn unknown_paths_surface_the_transport_error() {
    let transport = MemoryTransport::with(mux_tree());
    let err = resolve(&transport, "github.com/nobody/nothing").expect_err("404");
    assert!(err.is_retryable());
}
