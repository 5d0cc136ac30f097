// src/module/goal.rs

//! Hand-off of package requests to the transaction engine
//!
//! Dependency resolution and the actual install/upgrade happen elsewhere.
//! The registry only tells a [`PackageGoal`] which packages a module
//! operation needs.

use crate::error::Result;
use std::fmt;

/// Receives package requests computed from module profiles
pub trait PackageGoal {
    /// Request installation of `nevr`, preferring packages from `repo_id`
    fn install(&mut self, nevr: &str, repo_id: &str) -> Result<()>;

    /// Request an upgrade of `nevr`
    fn upgrade(&mut self, nevr: &str) -> Result<()>;
}

/// One recorded package request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalOp {
    Install { nevr: String, repo_id: String },
    Upgrade { nevr: String },
}

impl fmt::Display for GoalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalOp::Install { nevr, repo_id } => write!(f, "install {} (from {})", nevr, repo_id),
            GoalOp::Upgrade { nevr } => write!(f, "upgrade {}", nevr),
        }
    }
}

/// Records requests instead of executing them
#[derive(Debug, Clone, Default)]
pub struct PlannedGoal {
    ops: Vec<GoalOp>,
}

impl PlannedGoal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[GoalOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl PackageGoal for PlannedGoal {
    fn install(&mut self, nevr: &str, repo_id: &str) -> Result<()> {
        self.ops.push(GoalOp::Install {
            nevr: nevr.to_string(),
            repo_id: repo_id.to_string(),
        });
        Ok(())
    }

    fn upgrade(&mut self, nevr: &str) -> Result<()> {
        self.ops.push(GoalOp::Upgrade {
            nevr: nevr.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planned_goal_records_in_order() {
        let mut goal = PlannedGoal::new();
        assert!(goal.is_empty());
        goal.install("bar-1.0-1", "modular").unwrap();
        goal.upgrade("baz-2.0-1").unwrap();

        let lines: Vec<String> = goal.ops().iter().map(ToString::to_string).collect();
        assert_eq!(lines, vec!["install bar-1.0-1 (from modular)", "upgrade baz-2.0-1"]);
    }
}
