// src/module/report.rs

//! User-facing messages and confirmation prompts
//!
//! The registry never logs user-facing outcomes directly. It hands them to a
//! [`Reporter`], and asks a [`Confirm`] before switching an enabled stream,
//! so embedders and tests decide where messages go and how prompts are
//! answered.

use std::cell::RefCell;
use std::rc::Rc;
use tracing::{error, info, warn};

/// Severity of a reported message
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ReportLevel {
    Info,
    Warn,
    Error,
}

/// Sink for messages meant for the user
pub trait Reporter {
    fn report(&self, level: ReportLevel, message: &str);

    fn info(&self, message: &str) {
        self.report(ReportLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.report(ReportLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.report(ReportLevel::Error, message);
    }
}

/// Forwards messages to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, level: ReportLevel, message: &str) {
        match level {
            ReportLevel::Info => info!("{}", message),
            ReportLevel::Warn => warn!("{}", message),
            ReportLevel::Error => error!("{}", message),
        }
    }
}

/// Keeps every message; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct CollectingReporter {
    entries: Rc<RefCell<Vec<(ReportLevel, String)>>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(ReportLevel, String)> {
        self.entries.borrow().clone()
    }

    /// Messages of one level, in order
    pub fn messages(&self, level: ReportLevel) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn contains(&self, message: &str) -> bool {
        self.entries.borrow().iter().any(|(_, m)| m == message)
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, level: ReportLevel, message: &str) {
        self.entries.borrow_mut().push((level, message.to_string()));
    }
}

/// Yes/no confirmation from the user
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Declines every prompt
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeNo;

impl Confirm for AssumeNo {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

/// Accepts every prompt
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_reporter_shares_log() {
        let reporter = CollectingReporter::new();
        let handle = reporter.clone();
        reporter.info("Enabling different stream for httpd");
        reporter.error("No such module: nope");

        assert!(handle.contains("No such module: nope"));
        assert_eq!(handle.messages(ReportLevel::Info).len(), 1);
        assert_eq!(handle.entries().len(), 2);
    }

    #[test]
    fn test_closure_confirm() {
        let confirm = |prompt: &str| prompt.contains("httpd");
        assert!(confirm.confirm("switch httpd?"));
        assert!(!Confirm::confirm(&AssumeNo, "anything"));
        assert!(Confirm::confirm(&AssumeYes, "anything"));
    }
}
