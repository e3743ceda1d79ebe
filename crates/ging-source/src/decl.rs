//! The merged, package-wide declaration tree.

use std::collections::BTreeMap;

use crate::env::BuildEnv;
use crate::stub::SymbolHandle;

/// How an imported package got its local name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportRef {
    /// The importing file named it (`import alias "path"`).
    Resolved(SymbolHandle),
    /// Guessed from the import path by the stub resolver.
    Stub(SymbolHandle),
}

impl ImportRef {
    pub fn handle(&self) -> &SymbolHandle {
        match self {
            Self::Resolved(h) | Self::Stub(h) => h,
        }
    }

    pub fn name(&self) -> &str {
        &self.handle().name
    }

    pub fn is_stub(&self) -> bool {
        matches!(self, Self::Stub(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: String,
    /// Receiver text for methods, e.g. `(r *Router)`.
    pub receiver: Option<String>,
    pub doc: String,
}

/// One `const` or `var` declaration; a parenthesised group is one decl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueDecl {
    pub names: Vec<String>,
    pub doc: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclTree {
    pub name: String,
    pub import_path: String,
    pub env: BuildEnv,
    /// Parsed files, in merge order.
    pub files: Vec<String>,
    /// Raw package doc comment text.
    pub doc: String,
    pub imports: BTreeMap<String, ImportRef>,
    pub funcs: Vec<FuncDecl>,
    pub consts: Vec<ValueDecl>,
    pub vars: Vec<ValueDecl>,
}
