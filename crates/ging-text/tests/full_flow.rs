use ging_core::types::{DocKind, PackageDocument};
use ging_text::{search, DocIndex};

fn websocket() -> PackageDocument {
    let mut doc = PackageDocument::new(
        "websocket",
        "github.com/gorilla/websocket",
        "<p>\nPackage websocket implements the WebSocket protocol defined in RFC 6455.\n</p>",
    );
    doc.push_func("IsCloseError", "IsCloseError returns boolean indicating whether the error is a close error.");
    doc.push_consts(["TextMessage", "BinaryMessage"], "The message types are defined in RFC 6455, section 11.8.");
    doc
}

fn mux() -> PackageDocument {
    let mut doc = PackageDocument::new("mux", "github.com/gorilla/mux", "<p>\nPackage mux implements a request router.\n</p>");
    doc.push_func("NewRouter", "NewRouter returns a new router instance.");
    doc
}

#[test]
fn index_reopen_and_search() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("docindex.tantivy");
    {
        let index = DocIndex::open_or_create(&path, 50_000_000).expect("create");
        index.index_document(mux().import_path(), &mux()).expect("mux");
        index.index_document(websocket().import_path(), &websocket()).expect("websocket");
    }

    let index = DocIndex::open_or_create(&path, 50_000_000).expect("reopen");
    let page = search(&index, "implements", 10, "http://godoc.org").expect("search");
    let mut names: Vec<_> = page.results.iter().map(|r| (r.name.as_str(), r.kind)).collect();
    names.sort_by_key(|(name, _)| *name);
    assert_eq!(names, vec![("mux", DocKind::Package), ("websocket", DocKind::Package)]);
    for s0_s1 in page.results.windows(2) {
        assert!(s0_s1[0].score >= s0_s1[1].score);
    }

    let page = search(&index, "RFC 6455", 10, "http://godoc.org").expect("search");
    assert_eq!(page.total_hits, 3);
    let mut consts: Vec<_> = page.results.iter().filter(|r| r.kind == DocKind::Constant).map(|r| (r.name.as_str(), r.link.as_str())).collect();
    consts.sort();
    assert_eq!(
        consts,
        vec![
            ("BinaryMessage", "http://godoc.org/github.com/gorilla/websocket#pkg-constants"),
            ("TextMessage", "http://godoc.org/github.com/gorilla/websocket#pkg-constants"),
        ]
    );
}

#[test]
fn rebuild_starts_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("docindex.tantivy");
    {
        let index = DocIndex::open_or_create(&path, 50_000_000).expect("create");
        index.index_document(mux().import_path(), &mux()).expect("mux");
    }
    let index = DocIndex::recreate(&path, 50_000_000).expect("recreate");
    let page = search(&index, "implements", 10, "http://godoc.org").expect("search");
    assert_eq!(page.total_hits, 0);
    assert!(page.summary().starts_with("0 results in "));
}
