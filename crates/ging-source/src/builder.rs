//! Declaration tree to indexable document.

use ging_core::types::PackageDocument;

use crate::decl::DeclTree;
use crate::godoc::sanitized_html;

fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Builds the package document for `tree`. Only exported top-level names are
/// kept; each const/var declaration yields one child per exported name, all
/// sharing the declaration's doc.
pub fn build(tree: &DeclTree) -> PackageDocument {
    let mut doc = PackageDocument::new(&tree.name, &tree.import_path, sanitized_html(&tree.doc));

    for func in tree.funcs.iter().filter(|f| f.receiver.is_none() && is_exported(&f.name)) {
        doc.push_func(&func.name, &func.doc);
    }
    for decl in &tree.consts {
        doc.push_consts(decl.names.iter().filter(|n| is_exported(n)).map(String::as_str), &decl.doc);
    }
    for decl in &tree.vars {
        doc.push_vars(decl.names.iter().filter(|n| is_exported(n)).map(String::as_str), &decl.doc);
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{FuncDecl, ValueDecl};
    use crate::env::BUILD_ENVS;
    use ging_core::types::DocKind;
    use std::collections::BTreeMap;

    fn tree() -> DeclTree {
        DeclTree {
            name: "mux".into(),
            import_path: "github.com/gorilla/mux".into(),
            env: BUILD_ENVS[0],
            files: vec!["mux.go".into()],
            doc: "Package mux implements a request router.\n\n\tr := mux.NewRouter()".into(),
            imports: BTreeMap::new(),
            funcs: vec![
                FuncDecl { name: "NewRouter".into(), receiver: None, doc: "NewRouter returns a router.".into() },
                FuncDecl { name: "ServeHTTP".into(), receiver: Some("(r *Router)".into()), doc: String::new() },
                FuncDecl { name: "cleanPath".into(), receiver: None, doc: String::new() },
            ],
            consts: vec![
                ValueDecl { names: vec!["A".into(), "b".into(), "C".into()], doc: "Letters.".into() },
                ValueDecl { names: vec!["hidden".into()], doc: "Nothing.".into() },
            ],
            vars: vec![ValueDecl { names: vec!["ErrNotFound".into()], doc: "ErrNotFound is returned.".into() }],
        }
    }

    #[test]
    fn keeps_exported_top_level_names() {
        let doc = build(&tree());
        let funcs: Vec<_> = doc.funcs().iter().map(|d| d.name()).collect();
        assert_eq!(funcs, vec!["NewRouter"]);
        let consts: Vec<_> = doc.consts().iter().map(|d| (d.name(), d.doc())).collect();
        assert_eq!(consts, vec![("A", "Letters."), ("C", "Letters.")]);
        assert_eq!(doc.vars()[0].kind(), DocKind::Variable);
        assert!(doc.children().all(|c| c.import_path() == "github.com/gorilla/mux"));
    }

    #[test]
    fn package_doc_loses_code_blocks() {
        let doc = build(&tree());
        assert_eq!(doc.doc(), "<p>\nPackage mux implements a request router.\n</p>");
    }
}
