use crate::core::capability::CapabilitySet;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shape of the capability-info list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One record per (capability, query-package function).
    #[default]
    Function,
    /// One record per (capability, query package).
    Package,
    /// One record per (capability, package appearing on a witness path).
    Intermediate,
}

/// Cooperative cancellation handle. The engine checks it between
/// capability iterations, the outermost level at which partial progress
/// is meaningful; a triggered token stops further capabilities and the
/// aggregators return what was already collected.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Engine configuration. The classifier is passed alongside rather than
/// stored here, so a `Config` stays plain data.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub granularity: Granularity,
    /// Skip the derived-capability scanners (reflect escape, unsafe
    /// pointer conversions, assembly); only oracle classifications apply.
    pub disable_builtin: bool,
    /// Restrict which capabilities the graph and intermediate outputs
    /// consider. `None` means all.
    pub capability_set: Option<CapabilitySet>,
    /// Emit only head functions: function granularity keeps `path[0]`,
    /// the other granularities emit empty paths.
    pub omit_paths: bool,
    pub cancel: CancelToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.granularity, Granularity::Function);
        assert!(!config.disable_builtin);
        assert!(config.capability_set.is_none());
        assert!(!config.omit_paths);
        assert!(!config.cancel.is_cancelled());
    }

    #[test]
    fn test_cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
