//! ging-source
//!
//! Turns a Go package import path into a [`DeclTree`] (fetch, pick a build
//! environment, parse, merge) and the tree into a [`PackageDocument`].
//!
//! [`PackageDocument`]: ging_core::types::PackageDocument
pub mod builder;
pub mod constraint;
pub mod decl;
pub mod env;
pub mod fetch;
pub mod godoc;
pub mod parse;
pub mod resolve;
pub mod stub;

pub use builder::build;
pub use decl::{DeclTree, ImportRef};
pub use env::{BuildEnv, BUILD_ENVS};
pub use fetch::{from_settings as transport_from_settings, GithubTransport, LocalTransport};
pub use resolve::{resolve, resolve_tree};
pub use stub::{resolve_stub, KnownSymbols, SymbolHandle};
