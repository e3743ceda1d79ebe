//! Source resolution: fetch, pick a build environment, parse and merge.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use ging_core::traits::FetchTransport;
use ging_core::types::{SourceFile, SourceTree};
use ging_core::{Error, Result};

use crate::decl::{DeclTree, ImportRef};
use crate::env::{BuildEnv, BUILD_ENVS};
use crate::parse::{overwrite_line_comments, parse_file, FileDecls};
use crate::stub::{resolve_stub, KnownSymbols, PackageSymbol};

/// Package clause of files that only carry documentation for `go doc`.
const DOCUMENTATION_PACKAGE: &str = "documentation";

/// Fetches `import_path` through `transport` and resolves it into a
/// declaration tree.
pub fn resolve(transport: &dyn FetchTransport, import_path: &str) -> Result<DeclTree> {
    info!(import_path, "fetching package source");
    let tree = transport.get(import_path)?;
    debug!(import_path, files = tree.files.len(), "fetched source tree");
    resolve_tree(tree)
}

/// Resolves an already fetched tree. The first environment in
/// [`BUILD_ENVS`] with at least one applicable file is used.
pub fn resolve_tree(tree: SourceTree) -> Result<DeclTree> {
    for env in BUILD_ENVS {
        let files = applicable_files(&tree, env)?;
        if files.is_empty() {
            debug!(import_path = %tree.import_path, %env, "no applicable files");
            continue;
        }
        let parsed = parse_all(&files)?;
        if parsed.is_empty() {
            debug!(import_path = %tree.import_path, %env, "only documentation files apply");
            continue;
        }
        info!(import_path = %tree.import_path, %env, files = parsed.len(), "selected build environment");
        return merge(&tree.import_path, env, parsed);
    }
    let tried = BUILD_ENVS.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
    Err(Error::NoBuildableSource { path: tree.import_path, tried })
}

fn applicable_files(tree: &SourceTree, env: BuildEnv) -> Result<Vec<&SourceFile>> {
    let mut files = Vec::new();
    for file in &tree.files {
        let src = String::from_utf8_lossy(&file.data);
        if env.applies(&file.name, &src).map_err(|e| Error::parse(&file.name, format!("build constraint: {e}")))? {
            files.push(file);
        }
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

fn parse_all(files: &[&SourceFile]) -> Result<Vec<FileDecls>> {
    let mut parsed = Vec::with_capacity(files.len());
    for file in files {
        let mut data = file.data.clone();
        overwrite_line_comments(&mut data);
        let decls = parse_file(&file.name, &data)?;
        debug!(file = %file.name, package = %decls.package, "parsed");
        if decls.package != DOCUMENTATION_PACKAGE {
            parsed.push(decls);
        }
    }
    Ok(parsed)
}

/// Joins per-file declarations into one tree. Imports bind to stub symbols
/// unless the file names them; an import no rule can name is skipped.
fn merge(import_path: &str, env: BuildEnv, files: Vec<FileDecls>) -> Result<DeclTree> {
    let first = &files[0];
    if let Some(other) = files.iter().find(|f| f.package != first.package) {
        return Err(Error::parse(
            &other.file,
            format!("found packages {} ({}) and {} ({})", first.package, first.file, other.package, other.file),
        ));
    }

    let mut tree = DeclTree {
        name: first.package.clone(),
        import_path: import_path.to_string(),
        env,
        files: Vec::with_capacity(files.len()),
        doc: String::new(),
        imports: BTreeMap::new(),
        funcs: Vec::new(),
        consts: Vec::new(),
        vars: Vec::new(),
    };
    let mut known = KnownSymbols::new();
    for file in files {
        if file.package_doc.len() > tree.doc.len() {
            tree.doc = file.package_doc;
        }
        for spec in file.imports {
            let binding = match spec.alias.as_deref() {
                Some(alias) if alias != "_" && alias != "." => {
                    ImportRef::Resolved(Arc::new(PackageSymbol { import_path: spec.path.clone(), name: alias.to_string() }))
                }
                _ => match resolve_stub(&mut known, &spec.path) {
                    Ok(handle) => ImportRef::Stub(handle),
                    Err(e) => {
                        warn!(file = %file.file, error = %e, "skipping import");
                        continue;
                    }
                },
            };
            match tree.imports.get(&spec.path) {
                Some(existing) if !existing.is_stub() => {}
                _ => {
                    tree.imports.insert(spec.path, binding);
                }
            }
        }
        tree.funcs.extend(file.funcs);
        tree.consts.extend(file.consts);
        tree.vars.extend(file.vars);
        tree.files.push(file.file);
    }
    Ok(tree)
}
