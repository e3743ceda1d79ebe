//! Domain types shared by the resolver, the index and the search front.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Structural role of an indexed document.
///
/// All kinds live in one index; the stored code (see [`DocKind::code`])
/// tells them apart at search time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocKind {
    Package,
    Function,
    Constant,
    Variable,
}

impl DocKind {
    pub const ALL: [DocKind; 4] = [Self::Package, Self::Function, Self::Constant, Self::Variable];

    /// Single-letter code written to the `kind` field.
    pub fn code(self) -> &'static str {
        match self {
            Self::Package => "p",
            Self::Function => "f",
            Self::Constant => "c",
            Self::Variable => "v",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }
}

impl fmt::Display for DocKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Package => "package",
            Self::Function => "func",
            Self::Constant => "const",
            Self::Variable => "var",
        };
        f.write_str(name)
    }
}

/// One indexable unit: a package or one of its top-level declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    kind: DocKind,
    name: String,
    import_path: String,
    doc: String,
}

impl Document {
    pub fn kind(&self) -> DocKind { self.kind }
    pub fn name(&self) -> &str { &self.name }
    pub fn import_path(&self) -> &str { &self.import_path }
    pub fn doc(&self) -> &str { &self.doc }
}

/// A package document together with the declarations it owns.
///
/// Children inherit the package import path; there is no way to give a
/// child a different one. Children keep source declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDocument {
    package: Document,
    funcs: Vec<Document>,
    consts: Vec<Document>,
    vars: Vec<Document>,
}

impl PackageDocument {
    pub fn new(name: impl Into<String>, import_path: impl Into<String>, doc: impl Into<String>) -> Self {
        Self {
            package: Document { kind: DocKind::Package, name: name.into(), import_path: import_path.into(), doc: doc.into() },
            funcs: Vec::new(),
            consts: Vec::new(),
            vars: Vec::new(),
        }
    }

    pub fn push_func(&mut self, name: impl Into<String>, doc: impl Into<String>) {
        let entry = self.child(DocKind::Function, name.into(), doc.into());
        self.funcs.push(entry);
    }

    /// Expands one const declaration into a document per declared name, all
    /// sharing `doc`.
    pub fn push_consts<I, S>(&mut self, names: I, doc: &str)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = self.expand(DocKind::Constant, names, doc);
        self.consts.extend(entries);
    }

    /// Same as [`push_consts`](Self::push_consts) for a var declaration.
    pub fn push_vars<I, S>(&mut self, names: I, doc: &str)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = self.expand(DocKind::Variable, names, doc);
        self.vars.extend(entries);
    }

    fn expand<I, S>(&self, kind: DocKind, names: I, doc: &str) -> Vec<Document>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().map(|n| self.child(kind, n.into(), doc.to_string())).collect()
    }

    fn child(&self, kind: DocKind, name: String, doc: String) -> Document {
        Document { kind, name, import_path: self.package.import_path.clone(), doc }
    }

    pub fn package(&self) -> &Document { &self.package }
    pub fn name(&self) -> &str { &self.package.name }
    pub fn import_path(&self) -> &str { &self.package.import_path }
    pub fn doc(&self) -> &str { &self.package.doc }
    pub fn funcs(&self) -> &[Document] { &self.funcs }
    pub fn consts(&self) -> &[Document] { &self.consts }
    pub fn vars(&self) -> &[Document] { &self.vars }

    /// Children in kind order: functions, constants, variables.
    pub fn children(&self) -> impl Iterator<Item = &Document> {
        self.funcs.iter().chain(self.consts.iter()).chain(self.vars.iter())
    }

    /// The package document followed by every child.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        std::iter::once(&self.package).chain(self.children())
    }
}

/// A raw file as returned by a fetch transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// Every file of one package directory, unfiltered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTree {
    pub import_path: String,
    pub files: Vec<SourceFile>,
}

impl SourceTree {
    pub fn new(import_path: impl Into<String>) -> Self {
        Self { import_path: import_path.into(), files: Vec::new() }
    }

    pub fn with_file(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.files.push(SourceFile { name: name.into(), data: data.into() });
        self
    }
}

/// Highlighted markup for a hit; either side may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlights {
    pub name: String,
    pub doc: String,
}

/// A reconstructed search hit, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub name: String,
    pub kind: DocKind,
    pub link: String,
    pub highlights: Highlights,
    pub score: f32,
}

/// Hits in engine relevance order plus the engine's own totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    pub results: Vec<SearchResult>,
    pub total_hits: usize,
    pub elapsed: Duration,
}

impl SearchPage {
    pub fn empty() -> Self {
        Self { results: Vec::new(), total_hits: 0, elapsed: Duration::ZERO }
    }

    /// "N results in T", as shown above a result list.
    pub fn summary(&self) -> String {
        format!("{} results in {:?}", self.total_hits, self.elapsed)
    }
}
