//! Per-file Go parsing on top of tree-sitter.

use tree_sitter::{Node, Parser};

use ging_core::{Error, Result};

use crate::decl::{FuncDecl, ValueDecl};
use crate::godoc::comment_text;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub path: String,
    /// Local name, `_` or `.` when given explicitly.
    pub alias: Option<String>,
}

/// Everything the documentation needs from one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDecls {
    pub file: String,
    pub package: String,
    pub package_doc: String,
    pub imports: Vec<ImportSpec>,
    pub funcs: Vec<FuncDecl>,
    pub consts: Vec<ValueDecl>,
    pub vars: Vec<ValueDecl>,
}

/// Neutralises `//line` directives in place so positions stay those of the
/// fetched file. Same length, so offsets elsewhere are unaffected.
pub fn overwrite_line_comments(data: &mut [u8]) {
    const DIRECTIVE: &[u8] = b"//line ";
    let mut at_line_start = true;
    for i in 0..data.len() {
        if at_line_start && data[i..].starts_with(DIRECTIVE) {
            data[i + 2..i + 6].copy_from_slice(b"LINE");
        }
        at_line_start = data[i] == b'\n';
    }
}

/// Parses one Go file. Any syntax error fails the file.
pub fn parse_file(file: &str, data: &[u8]) -> Result<FileDecls> {
    let src = std::str::from_utf8(data).map_err(|e| Error::parse(file, format!("invalid UTF-8: {e}")))?;
    let mut parser = Parser::new();
    parser.set_language(tree_sitter_go::language()).map_err(|e| Error::parse(file, e))?;
    let tree = parser.parse(src, None).ok_or_else(|| Error::parse(file, "parser produced no tree"))?;
    let root = tree.root_node();
    if root.has_error() {
        let at = first_error(root).map_or(root.start_position(), |n| n.start_position());
        return Err(Error::parse(file, format!("syntax error at {}:{}", at.row + 1, at.column + 1)));
    }

    let mut decls = FileDecls {
        file: file.to_string(),
        package: String::new(),
        package_doc: String::new(),
        imports: Vec::new(),
        funcs: Vec::new(),
        consts: Vec::new(),
        vars: Vec::new(),
    };
    let mut cursor = root.walk();
    for node in root.named_children(&mut cursor) {
        match node.kind() {
            "package_clause" => {
                decls.package = first_named_of(node, "package_identifier").map(|n| text(n, src)).unwrap_or_default();
                decls.package_doc = doc_comment(node, src);
            }
            "import_declaration" => collect_imports(node, src, &mut decls.imports),
            "function_declaration" => decls.funcs.push(FuncDecl {
                name: field_text(node, "name", src),
                receiver: None,
                doc: doc_comment(node, src),
            }),
            "method_declaration" => decls.funcs.push(FuncDecl {
                name: field_text(node, "name", src),
                receiver: node.child_by_field_name("receiver").map(|r| text(r, src)),
                doc: doc_comment(node, src),
            }),
            "const_declaration" => decls.consts.push(value_decl(node, "const_spec", src)),
            "var_declaration" => decls.vars.push(value_decl(node, "var_spec", src)),
            _ => {}
        }
    }
    if decls.package.is_empty() {
        return Err(Error::parse(file, "missing package clause"));
    }
    Ok(decls)
}

fn text(node: Node<'_>, src: &str) -> String {
    node.utf8_text(src.as_bytes()).unwrap_or_default().to_string()
}

fn field_text(node: Node<'_>, field: &str, src: &str) -> String {
    node.child_by_field_name(field).map(|n| text(n, src)).unwrap_or_default()
}

fn first_named_of<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| c.kind() == kind);
    found
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().filter(|c| c.has_error()).find_map(first_error)
}

/// Children tagged with `field`; the field may repeat (`a, b = 1, 2`).
fn field_children<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    let mut out = Vec::new();
    if cursor.goto_first_child() {
        loop {
            if cursor.field_name() == Some(field) {
                out.push(cursor.node());
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
    out
}

/// The comment group ending on the line right above `node`. A comment
/// trailing the previous declaration on its own line is not part of it.
fn doc_comment(node: Node<'_>, src: &str) -> String {
    let mut group: Vec<String> = Vec::new();
    let mut next_row = node.start_position().row;
    let mut prev = node.prev_named_sibling();
    while let Some(comment) = prev.filter(|p| p.kind() == "comment") {
        if comment.end_position().row + 1 != next_row {
            break;
        }
        let before = comment.prev_named_sibling();
        if before.is_some_and(|b| b.kind() != "comment" && b.end_position().row == comment.start_position().row) {
            break;
        }
        group.push(text(comment, src));
        next_row = comment.start_position().row;
        prev = before;
    }
    group.reverse();
    comment_text(&group)
}

fn collect_imports(decl: Node<'_>, src: &str, out: &mut Vec<ImportSpec>) {
    let mut cursor = decl.walk();
    for child in decl.named_children(&mut cursor) {
        match child.kind() {
            "import_spec" => {
                let path = field_text(child, "path", src);
                let path = path.trim_matches(|c| c == '"' || c == '`').to_string();
                let alias = child.child_by_field_name("name").map(|n| text(n, src));
                out.push(ImportSpec { path, alias });
            }
            "import_spec_list" => collect_imports(child, src, out),
            _ => {}
        }
    }
}

/// Declared names of every spec in a const/var declaration, in order.
fn value_decl(decl: Node<'_>, spec_kind: &str, src: &str) -> ValueDecl {
    let mut specs = Vec::new();
    collect_specs(decl, spec_kind, &mut specs);
    let names = specs
        .into_iter()
        .flat_map(|spec| field_children(spec, "name"))
        .filter(|n| n.kind() == "identifier")
        .map(|n| text(n, src))
        .collect();
    ValueDecl { names, doc: doc_comment(decl, src) }
}

fn collect_specs<'t>(node: Node<'t>, spec_kind: &str, out: &mut Vec<Node<'t>>) {
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
    for child in children {
        if child.kind() == spec_kind {
            out.push(child);
        } else if child.kind().ends_with("_spec_list") {
            collect_specs(child, spec_kind, out);
        }
    }
}
