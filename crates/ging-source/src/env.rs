//! Build environments and per-file applicability.

use std::fmt;

use crate::constraint::header_constraint;

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux", "nacl", "netbsd",
    "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle", "mips64",
    "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv", "riscv64", "s390", "s390x", "sparc",
    "sparc64", "wasm",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux", "netbsd", "openbsd",
    "solaris",
];

/// An (operating system, architecture) pair deciding which files build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuildEnv {
    pub goos: &'static str,
    pub goarch: &'static str,
}

/// Tried in order; the first one yielding any file wins.
pub const BUILD_ENVS: [BuildEnv; 3] = [
    BuildEnv { goos: "linux", goarch: "amd64" },
    BuildEnv { goos: "darwin", goarch: "amd64" },
    BuildEnv { goos: "windows", goarch: "amd64" },
];

impl fmt::Display for BuildEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.goos, self.goarch)
    }
}

impl BuildEnv {
    /// Whether a build tag holds in this environment. cgo is on and every
    /// `go1.N` release tag is satisfied.
    pub fn satisfies(&self, tag: &str) -> bool {
        tag == self.goos
            || tag == self.goarch
            || (tag == "unix" && UNIX_OS.contains(&self.goos))
            || tag == "gc"
            || tag == "cgo"
            || is_release_tag(tag)
    }

    /// Filename `_GOOS`, `_GOARCH` and `_GOOS_GOARCH` suffix rules. The part
    /// before the first underscore never counts, so `linux.go` builds
    /// everywhere.
    pub fn matches_file_name(&self, name: &str) -> bool {
        let stem = name.split('.').next().unwrap_or(name);
        let Some(i) = stem.find('_') else { return true };
        let parts: Vec<&str> = stem[i..].split('_').collect();
        let n = parts.len();
        if n >= 2 && KNOWN_OS.contains(&parts[n - 2]) && KNOWN_ARCH.contains(&parts[n - 1]) {
            return parts[n - 2] == self.goos && parts[n - 1] == self.goarch;
        }
        let last = parts[n - 1];
        if KNOWN_OS.contains(&last) {
            return last == self.goos;
        }
        if KNOWN_ARCH.contains(&last) {
            return last == self.goarch;
        }
        true
    }

    /// Decides whether `name` with contents `src` is part of the package in
    /// this environment. Malformed constraints are reported, not skipped.
    pub fn applies(&self, name: &str, src: &str) -> Result<bool, String> {
        if !is_go_source(name) || !self.matches_file_name(name) {
            return Ok(false);
        }
        Ok(match header_constraint(src)? {
            Some(expr) => expr.eval(&|tag: &str| self.satisfies(tag)),
            None => true,
        })
    }
}

/// Non-test `.go` files not hidden by a leading `_` or `.`.
pub fn is_go_source(name: &str) -> bool {
    name.ends_with(".go") && !name.ends_with("_test.go") && !name.starts_with('_') && !name.starts_with('.')
}

fn is_release_tag(tag: &str) -> bool {
    tag.strip_prefix("go1.").is_some_and(|minor| !minor.is_empty() && minor.chars().all(|c| c.is_ascii_digit()))
}
