//! The classifier seam between the engine and whatever policy decides
//! which functions carry which capabilities.
//!
//! The engine never hardcodes library knowledge; it asks a [`Classifier`]
//! for a category per `(package, symbol)` pair and for permission to
//! follow each call edge. [`StdClassifier`] is the builtin oracle: a
//! static catalog of the target language's standard library, usable out
//! of the box and easy to replace in tests or embeddings.

use crate::core::capability::Capability;
use capgraph_ir::{Edge, Program};

pub trait Classifier {
    /// Category for the function `name` in package `package`.
    ///
    /// Symbols are the loader's qualified forms: `os.Getenv`,
    /// `(time.Time).Clock`, `(*sync.Cond).Signal`. Returning
    /// `Capability::Unspecified` means "no opinion" — the node neither
    /// starts nor stops a search, and traversal propagates through it.
    fn function_category(&self, package: &str, name: &str) -> Capability;

    /// Whether a call edge should be considered when searching for
    /// transitive capabilities. Oracles override this to suppress edges
    /// known to be irrelevant (runtime finalizers, test helpers).
    fn include_call(&self, program: &Program, edge: &Edge) -> bool {
        let _ = (program, edge);
        true
    }

    /// Whether `path` names a standard-library package. Drives the
    /// direct/transitive split on witness paths.
    fn is_std_lib(&self, path: &str) -> bool;
}

/// Capabilities of whole standard-library packages. A lookup walks up
/// the path one segment at a time, so `net/http/httputil` inherits the
/// `net` entry unless something more specific appears first.
const PACKAGE_CATEGORIES: &[(&str, Capability)] = &[
    ("bytes", Capability::Safe),
    ("container", Capability::Safe),
    ("crypto", Capability::Safe),
    ("crypto/rand", Capability::ReadSystemState),
    ("crypto/tls", Capability::Network),
    ("crypto/x509", Capability::ReadSystemState),
    ("encoding", Capability::Safe),
    ("errors", Capability::Safe),
    ("fmt", Capability::Safe),
    ("hash", Capability::Safe),
    ("io/ioutil", Capability::Files),
    ("math", Capability::Safe),
    ("net", Capability::Network),
    ("os/exec", Capability::Exec),
    ("os/signal", Capability::OperatingSystem),
    ("plugin", Capability::ArbitraryExecution),
    ("reflect", Capability::Reflect),
    ("regexp", Capability::Safe),
    ("runtime", Capability::Runtime),
    ("runtime/cgo", Capability::Cgo),
    ("sort", Capability::Safe),
    ("strconv", Capability::Safe),
    ("strings", Capability::Safe),
    ("syscall", Capability::SystemCalls),
    ("syscall/js", Capability::Unanalyzed),
    ("unicode", Capability::Safe),
    ("unsafe", Capability::UnsafePointer),
];

/// Per-function categories, consulted before the package table so a
/// function can carve itself out of its package's default.
const FUNCTION_CATEGORIES: &[(&str, &str, Capability)] = &[
    ("os", "os.Chdir", Capability::ModifySystemState),
    ("os", "os.Chmod", Capability::Files),
    ("os", "os.Chown", Capability::Files),
    ("os", "os.Create", Capability::Files),
    ("os", "os.Environ", Capability::ReadEnvironment),
    ("os", "os.Exit", Capability::Runtime),
    ("os", "os.Getenv", Capability::ReadEnvironment),
    ("os", "os.Getpid", Capability::ReadSystemState),
    ("os", "os.Getuid", Capability::ReadSystemState),
    ("os", "os.Getwd", Capability::ReadSystemState),
    ("os", "os.Hostname", Capability::ReadSystemState),
    ("os", "os.LookupEnv", Capability::ReadEnvironment),
    ("os", "os.Lstat", Capability::Files),
    ("os", "os.Mkdir", Capability::Files),
    ("os", "os.MkdirAll", Capability::Files),
    ("os", "os.Open", Capability::Files),
    ("os", "os.OpenFile", Capability::Files),
    ("os", "os.ReadDir", Capability::Files),
    ("os", "os.ReadFile", Capability::Files),
    ("os", "os.Remove", Capability::Files),
    ("os", "os.RemoveAll", Capability::Files),
    ("os", "os.Rename", Capability::Files),
    ("os", "os.Setenv", Capability::ModifySystemState),
    ("os", "os.StartProcess", Capability::Exec),
    ("os", "os.Stat", Capability::Files),
    ("os", "os.Unsetenv", Capability::ModifySystemState),
    ("os", "os.WriteFile", Capability::Files),
    ("os", "(*os.File).Read", Capability::Files),
    ("os", "(*os.File).Write", Capability::Files),
    ("runtime", "runtime.GOMAXPROCS", Capability::ModifySystemState),
    ("runtime", "runtime.NumCPU", Capability::ReadSystemState),
    ("syscall", "syscall.Environ", Capability::ReadEnvironment),
    ("syscall", "syscall.Getenv", Capability::ReadEnvironment),
    ("syscall", "syscall.Setenv", Capability::ModifySystemState),
    ("time", "time.Now", Capability::ReadSystemState),
];

/// First path segments of the bundled standard library. Anything whose
/// first segment carries a dot is a third-party module and never matches.
const STD_PREFIXES: &[&str] = &[
    "bufio",
    "bytes",
    "compress",
    "container",
    "context",
    "crypto",
    "database",
    "debug",
    "embed",
    "encoding",
    "errors",
    "expvar",
    "flag",
    "fmt",
    "go",
    "hash",
    "html",
    "image",
    "index",
    "io",
    "log",
    "maps",
    "math",
    "mime",
    "net",
    "os",
    "path",
    "plugin",
    "reflect",
    "regexp",
    "runtime",
    "slices",
    "sort",
    "strconv",
    "strings",
    "sync",
    "syscall",
    "testing",
    "text",
    "time",
    "unicode",
    "unsafe",
];

/// Builtin classifier backed by the static standard-library catalog.
#[derive(Debug, Clone, Default)]
pub struct StdClassifier {
    exclude_unanalyzed: bool,
}

impl StdClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never report the unanalyzed capability; such functions are
    /// treated as having no opinion instead.
    pub fn excluding_unanalyzed() -> Self {
        Self {
            exclude_unanalyzed: true,
        }
    }

    fn package_category(path: &str) -> Capability {
        let mut prefix = path;
        loop {
            if let Some((_, c)) = PACKAGE_CATEGORIES.iter().find(|(p, _)| *p == prefix) {
                return *c;
            }
            match prefix.rfind('/') {
                Some(i) => prefix = &prefix[..i],
                None => return Capability::Unspecified,
            }
        }
    }
}

impl Classifier for StdClassifier {
    fn function_category(&self, package: &str, name: &str) -> Capability {
        let category = FUNCTION_CATEGORIES
            .iter()
            .find(|(p, n, _)| *p == package && *n == name)
            .map(|(_, _, c)| *c)
            .unwrap_or_else(|| Self::package_category(package));
        if self.exclude_unanalyzed && category == Capability::Unanalyzed {
            return Capability::Unspecified;
        }
        category
    }

    fn is_std_lib(&self, path: &str) -> bool {
        let first = path.split('/').next().unwrap_or(path);
        STD_PREFIXES.contains(&first)
    }
}
