// src/commands/module.rs

//! Module stream commands

use super::prompt::TerminalConfirm;
use anyhow::{bail, Result};
use conary_modules::module::{
    BatchReport, EnableOutcome, ListFilter, ModuleRegistry, PlainTable, PlannedGoal,
};
use conary_modules::ModuleSettings;
use tracing::info;

fn open_registry(settings: &ModuleSettings) -> Result<ModuleRegistry> {
    Ok(ModuleRegistry::from_settings(settings)?.with_confirm(TerminalConfirm))
}

/// Fail the command when any spec in a batch failed
fn finish(failed: usize, total: usize) -> Result<()> {
    if failed > 0 {
        bail!("{} of {} module spec(s) failed", failed, total);
    }
    Ok(())
}

/// List module versions
pub fn cmd_module_list(settings: &ModuleSettings, filter: ListFilter, pattern: Option<&str>) -> Result<()> {
    let registry = open_registry(settings)?;
    println!("{}", registry.list(filter, pattern, &PlainTable)?);
    Ok(())
}

/// Show the full metadata of the version a spec resolves to
pub fn cmd_module_info(settings: &ModuleSettings, spec: &str) -> Result<()> {
    let registry = open_registry(settings)?;
    println!("{}", registry.full_description(spec)?);
    Ok(())
}

/// Enable the stream of each spec
pub fn cmd_module_enable(
    settings: &ModuleSettings,
    specs: &[String],
    assume_yes: bool,
    assume_no: bool,
) -> Result<()> {
    let mut registry = open_registry(settings)?;
    let mut failed = 0;

    for spec in specs {
        match registry.enable(spec, assume_yes, assume_no) {
            Ok(EnableOutcome::Enabled) => println!("Enabled {}", spec),
            Ok(EnableOutcome::Unchanged) => println!("{} is already enabled", spec),
            Ok(EnableOutcome::Declined) => {}
            Err(e) => {
                eprintln!("Error: {}", e);
                failed += 1;
            }
        }
    }
    finish(failed, specs.len())
}

/// Disable each spec's module
pub fn cmd_module_disable(settings: &ModuleSettings, specs: &[String]) -> Result<()> {
    let mut registry = open_registry(settings)?;
    let mut failed = 0;

    for spec in specs {
        match registry.disable(spec) {
            Ok(()) => println!("Disabled {}", spec),
            Err(e) => {
                eprintln!("Error: {}", e);
                failed += 1;
            }
        }
    }
    finish(failed, specs.len())
}

/// Plan installation of module profiles
pub fn cmd_module_install(settings: &ModuleSettings, specs: &[String], autoenable: bool) -> Result<()> {
    let mut registry = open_registry(settings)?;
    let mut goal = PlannedGoal::new();
    let report = registry.install(specs, autoenable, &mut goal)?;
    print_plan(&goal, &report);
    finish(report.failed.len(), specs.len())
}

/// Plan upgrades of installed profiles
pub fn cmd_module_upgrade(settings: &ModuleSettings, specs: &[String]) -> Result<()> {
    let mut registry = open_registry(settings)?;
    let mut goal = PlannedGoal::new();
    let report = if specs.is_empty() {
        registry.upgrade_all(&mut goal)?
    } else {
        registry.upgrade(specs, &mut goal)?
    };
    print_plan(&goal, &report);
    finish(report.failed.len(), report.completed.len() + report.failed.len())
}

/// Pin a module to its installed version
pub fn cmd_module_lock(settings: &ModuleSettings, spec: &str) -> Result<()> {
    let mut registry = open_registry(settings)?;
    let version = registry.lock(spec)?;
    println!("Locked {} to version {}", spec, version);
    Ok(())
}

/// Remove a version pin
pub fn cmd_module_unlock(settings: &ModuleSettings, spec: &str) -> Result<()> {
    let mut registry = open_registry(settings)?;
    registry.unlock(spec)?;
    println!("Unlocked {}", spec);
    Ok(())
}

fn print_plan(goal: &PlannedGoal, report: &BatchReport) {
    if goal.is_empty() {
        println!("No package operations planned.");
    } else {
        println!("Planned package operations:");
        for op in goal.ops() {
            println!("  {}", op);
        }
    }
    info!(
        "{} spec(s) planned, {} skipped",
        report.completed.len(),
        report.failed.len()
    );
    for (spec, err) in &report.failed {
        eprintln!("Skipped {}: {}", spec, err);
    }
}
