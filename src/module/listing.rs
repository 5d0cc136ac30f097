// src/module/listing.rs

//! Tabular listing of module versions

use super::registry::ModuleRegistry;
use super::state::Module;
use super::version::ModuleVersion;
use crate::error::{Error, Result};
use glob::Pattern;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Shown instead of an empty table
pub const NOTHING_TO_SHOW: &str = "Nothing to show";

/// Which module versions a listing includes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListFilter {
    #[default]
    All,
    /// Versions of the enabled stream of enabled modules
    Enabled,
    /// Versions of modules that are not enabled
    Disabled,
    /// Only the installed version of each enabled module
    Installed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Column {
    Name,
    Stream,
    Version,
    Repo,
    Installed,
    Info,
}

impl Column {
    pub fn right_aligned(self) -> bool {
        self == Column::Info
    }
}

/// Turns header and rows into printable text
pub trait TableRenderer {
    fn render(&self, columns: &[Column], rows: &[Vec<String>]) -> String;
}

/// Space-padded columns with a header line
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTable;

impl TableRenderer for PlainTable {
    fn render(&self, columns: &[Column], rows: &[Vec<String>]) -> String {
        let header: Vec<String> = columns.iter().map(ToString::to_string).collect();
        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for row in rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let format_line = |cells: &[String]| {
            let line: Vec<String> = columns
                .iter()
                .zip(cells)
                .zip(&widths)
                .map(|((column, cell), width)| {
                    if column.right_aligned() {
                        format!("{:>width$}", cell, width = width)
                    } else {
                        format!("{:<width$}", cell, width = width)
                    }
                })
                .collect();
            line.join("  ").trim_end().to_string()
        };

        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(format_line(&header));
        lines.extend(rows.iter().map(|row| format_line(row)));
        lines.join("\n")
    }
}

impl ModuleRegistry {
    /// Render the versions matching `filter` and a module name glob
    pub fn list(
        &self,
        filter: ListFilter,
        pattern: Option<&str>,
        renderer: &dyn TableRenderer,
    ) -> Result<String> {
        let pattern = pattern
            .filter(|p| !p.is_empty())
            .map(|p| Pattern::new(p).map_err(|e| Error::InvalidPattern(p.to_string(), e.to_string())))
            .transpose()?;

        let mut versions: Vec<(&Module, &ModuleVersion)> = self
            .modules()
            .filter(|m| pattern.as_ref().is_none_or(|p| p.matches(m.name())))
            .flat_map(|m| {
                m.streams()
                    .filter(move |s| stream_listed(m, s.stream(), filter))
                    .flat_map(|s| s.versions())
                    .map(move |v| (m, v))
            })
            .filter(|(m, v)| filter != ListFilter::Installed || is_installed(m, v))
            .collect();

        if versions.is_empty() {
            return Ok(NOTHING_TO_SHOW.to_string());
        }
        versions.sort_by(|(_, a), (_, b)| {
            (a.name(), a.stream(), a.version()).cmp(&(b.name(), b.stream(), b.version()))
        });

        let rows: Vec<Vec<String>> = versions
            .into_iter()
            .map(|(module, version)| {
                let installed = if is_installed(module, version) {
                    module
                        .conf()
                        .map(|c| c.profiles.iter().cloned().collect::<Vec<_>>().join(", "))
                        .unwrap_or_default()
                } else {
                    String::new()
                };
                vec![
                    version.name().to_string(),
                    version.stream().to_string(),
                    version.version().to_string(),
                    version.repo_id().to_string(),
                    installed,
                    version.summary().to_string(),
                ]
            })
            .collect();

        let columns: Vec<Column> = Column::iter().collect();
        Ok(renderer.render(&columns, &rows))
    }
}

fn stream_listed(module: &Module, stream: &str, filter: ListFilter) -> bool {
    match filter {
        ListFilter::All => true,
        ListFilter::Enabled | ListFilter::Installed => module.enabled_stream() == Some(stream),
        ListFilter::Disabled => !module.is_enabled(),
    }
}

/// Whether `version` is the one the module config records as installed
fn is_installed(module: &Module, version: &ModuleVersion) -> bool {
    module.conf().is_some_and(|c| {
        c.version == Some(version.version()) && c.stream.as_deref() == Some(version.stream())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::conf::{MemoryConfStore, ModuleConf};
    use crate::module::version::tests::module_version;

    fn registry() -> ModuleRegistry {
        let store = MemoryConfStore::with_confs([ModuleConf {
            name: "nodejs".into(),
            stream: Some("8".into()),
            version: Some(2),
            enabled: true,
            profiles: ["default".to_string(), "devel".to_string()].into(),
            ..Default::default()
        }]);
        let mut registry = ModuleRegistry::new(store);
        registry.add(module_version("nodejs", "8", 1, &[], &[])).unwrap();
        registry.add(module_version("nodejs", "8", 2, &[], &[])).unwrap();
        registry.add(module_version("nodejs", "10", 1, &[], &[])).unwrap();
        registry.add(module_version("perl", "5.24", 1, &[], &[])).unwrap();
        registry.read_all_modules().unwrap();
        registry
    }

    fn names(output: &str) -> Vec<String> {
        output
            .lines()
            .skip(1)
            .map(|l| {
                let cells: Vec<&str> = l.split_whitespace().collect();
                format!("{}:{}:{}", cells[0], cells[1], cells[2])
            })
            .collect()
    }

    #[test]
    fn test_list_all_sorted() {
        let output = registry().list(ListFilter::All, None, &PlainTable).unwrap();
        assert!(output.starts_with("Name"));
        assert_eq!(
            names(&output),
            vec!["nodejs:10:1", "nodejs:8:1", "nodejs:8:2", "perl:5.24:1"]
        );
        assert!(output.contains("default, devel"));
    }

    #[test]
    fn test_list_filters() {
        let registry = registry();
        let enabled = registry.list(ListFilter::Enabled, None, &PlainTable).unwrap();
        assert_eq!(names(&enabled), vec!["nodejs:8:1", "nodejs:8:2"]);

        let disabled = registry.list(ListFilter::Disabled, None, &PlainTable).unwrap();
        assert_eq!(names(&disabled), vec!["perl:5.24:1"]);

        let installed = registry.list(ListFilter::Installed, None, &PlainTable).unwrap();
        assert_eq!(names(&installed), vec!["nodejs:8:2"]);
    }

    #[test]
    fn test_list_pattern() {
        let registry = registry();
        let output = registry.list(ListFilter::All, Some("pe*"), &PlainTable).unwrap();
        assert_eq!(names(&output), vec!["perl:5.24:1"]);

        let output = registry.list(ListFilter::All, Some("ruby"), &PlainTable).unwrap();
        assert_eq!(output, NOTHING_TO_SHOW);

        assert!(matches!(
            registry.list(ListFilter::All, Some("[oops"), &PlainTable),
            Err(Error::InvalidPattern(_, _))
        ));
    }

    #[test]
    fn test_plain_table_alignment() {
        let rendered = PlainTable.render(
            &[Column::Name, Column::Info],
            &[vec!["a".into(), "x".into()], vec!["longer".into(), "summary".into()]],
        );
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Name       Info");
        assert_eq!(lines[1], "a             x");
        assert_eq!(lines[2], "longer  summary");
    }
}
