// src/module/transaction.rs

//! Deferred persistence of install/upgrade results
//!
//! Install and upgrade only request packages; whether they land depends on
//! the package transaction. Touched modules are remembered here and their
//! configs are written once, when the engine reports the post-transaction
//! or verification step. An aborted transaction therefore leaves persisted
//! module state untouched.

use strum_macros::{Display, EnumString};

/// Progress steps reported by the package transaction engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum TransactionAction {
    Download,
    Install,
    Upgrade,
    Erase,
    Cleanup,
    Scriptlet,
    Verify,
    Post,
}

impl TransactionAction {
    /// Steps after which packages are known to be in place
    pub fn is_checkpoint(self) -> bool {
        matches!(self, TransactionAction::Verify | TransactionAction::Post)
    }
}

/// Modules touched by the current package transaction
#[derive(Debug, Clone, Default)]
pub struct ModuleTransaction {
    modules: Vec<String>,
    saved: bool,
}

impl ModuleTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a module; registering it again is harmless
    pub fn register(&mut self, name: &str) {
        if !self.modules.iter().any(|m| m == name) {
            self.modules.push(name.to_string());
        }
    }

    /// Registered modules in registration order
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Whether the commit already ran
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    /// True exactly once: for the first checkpoint action seen
    pub fn checkpoint(&mut self, action: TransactionAction) -> bool {
        if self.saved || !action.is_checkpoint() {
            return false;
        }
        self.saved = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_checkpoint_fires_once() {
        let mut txn = ModuleTransaction::new();
        assert!(!txn.checkpoint(TransactionAction::Install));
        assert!(!txn.is_saved());
        assert!(txn.checkpoint(TransactionAction::Verify));
        assert!(!txn.checkpoint(TransactionAction::Post));
        assert!(txn.is_saved());
    }

    #[test]
    fn test_register_deduplicates() {
        let mut txn = ModuleTransaction::new();
        txn.register("httpd");
        txn.register("nodejs");
        txn.register("httpd");
        assert_eq!(txn.modules().collect::<Vec<_>>(), vec!["httpd", "nodejs"]);
    }

    #[test]
    fn test_action_names() {
        assert_eq!(TransactionAction::Post.to_string(), "post");
        assert_eq!(
            TransactionAction::from_str("verify").unwrap(),
            TransactionAction::Verify
        );
    }
}
