//! Bundled package stubs
//!
//! Declarations (no bodies) for the packages converted blocks usually
//! import, plus the runtime core package that injected calls target.

/// Import path of the runtime package that converted code calls into
pub const CORE_PKG_PATH: &str = "lgo/core";

/// A package stub: import path and Go source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StdlibFile {
    pub path: &'static str,
    pub source: &'static str,
}

const FILES: &[StdlibFile] = &[
    StdlibFile {
        path: "context",
        source: include_str!("../../stdlib/context.go"),
    },
    StdlibFile {
        path: CORE_PKG_PATH,
        source: include_str!("../../stdlib/core.go"),
    },
    StdlibFile {
        path: "errors",
        source: include_str!("../../stdlib/errors.go"),
    },
    StdlibFile {
        path: "fmt",
        source: include_str!("../../stdlib/fmt.go"),
    },
    StdlibFile {
        path: "math",
        source: include_str!("../../stdlib/math.go"),
    },
    StdlibFile {
        path: "strings",
        source: include_str!("../../stdlib/strings.go"),
    },
    StdlibFile {
        path: "sync",
        source: include_str!("../../stdlib/sync.go"),
    },
    StdlibFile {
        path: "time",
        source: include_str!("../../stdlib/time.go"),
    },
];

/// All bundled stubs
pub fn stdlib_files() -> &'static [StdlibFile] {
    FILES
}

/// The stub source for an import path
pub fn find(path: &str) -> Option<&'static str> {
    FILES.iter().find(|f| f.path == path).map(|f| f.source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_stub_declares_its_package() {
        for file in stdlib_files() {
            let last = file.path.rsplit('/').next().unwrap();
            assert!(
                file.source.contains(&format!("package {}", last)),
                "{} has the wrong package clause",
                file.path
            );
        }
        assert!(find(CORE_PKG_PATH).is_some());
        assert!(find("os").is_none());
    }
}
