use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Coarse category of externally visible effect a function can have.
///
/// `Unspecified` means the classifier has no opinion and traversal
/// propagates through the node; `Safe` means the node terminates every
/// search. The remaining tags are concrete capabilities. The declaration
/// order is the canonical ascending order used everywhere capabilities
/// are iterated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Unspecified,
    Safe,
    Files,
    Network,
    Runtime,
    ReadSystemState,
    ModifySystemState,
    OperatingSystem,
    SystemCalls,
    ArbitraryExecution,
    Cgo,
    Unanalyzed,
    UnsafePointer,
    Reflect,
    Exec,
    ReadEnvironment,
}

impl Capability {
    pub const ALL: [Capability; 16] = [
        Capability::Unspecified,
        Capability::Safe,
        Capability::Files,
        Capability::Network,
        Capability::Runtime,
        Capability::ReadSystemState,
        Capability::ModifySystemState,
        Capability::OperatingSystem,
        Capability::SystemCalls,
        Capability::ArbitraryExecution,
        Capability::Cgo,
        Capability::Unanalyzed,
        Capability::UnsafePointer,
        Capability::Reflect,
        Capability::Exec,
        Capability::ReadEnvironment,
    ];

    /// A concrete capability, as opposed to the two routing pseudo-values.
    pub fn is_concrete(self) -> bool {
        !matches!(self, Capability::Unspecified | Capability::Safe)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Unspecified => "unspecified",
            Capability::Safe => "safe",
            Capability::Files => "files",
            Capability::Network => "network",
            Capability::Runtime => "runtime",
            Capability::ReadSystemState => "read-system-state",
            Capability::ModifySystemState => "modify-system-state",
            Capability::OperatingSystem => "operating-system",
            Capability::SystemCalls => "system-calls",
            Capability::ArbitraryExecution => "arbitrary-execution",
            Capability::Cgo => "cgo",
            Capability::Unanalyzed => "unanalyzed",
            Capability::UnsafePointer => "unsafe-pointer",
            Capability::Reflect => "reflect",
            Capability::Exec => "exec",
            Capability::ReadEnvironment => "read-environment",
        }
    }

    pub fn parse(s: &str) -> Option<Capability> {
        Capability::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An optional restriction on which capabilities the graph-shaped outputs
/// consider. An unrestricted analysis uses `None` rather than an
/// exhaustive set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn new(caps: impl IntoIterator<Item = Capability>) -> Self {
        Self(caps.into_iter().collect())
    }

    pub fn has(&self, c: Capability) -> bool {
        self.0.contains(&c)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}
