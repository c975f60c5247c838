//! Terminal rendering for findings, suggestions and plans

use comfy_table::{Table, presets::ASCII_MARKDOWN};
use sqlscout_analyzer::{Finding, OptimizeReport, PlanComparisonRow, Suggestion};
use sqlscout_core::PlanRow;
use std::fmt::Write;

/// Placeholder printed instead of an empty table
pub const NO_ROWS: &str = "(no rows)";

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown-style tables
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Renders rows under the given headers, or [`NO_ROWS`] when there are none
pub fn table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    if rows.is_empty() {
        return NO_ROWS.to_string();
    }

    let mut table = Table::new();
    table.load_preset(ASCII_MARKDOWN).set_header(headers.to_vec());
    for row in rows {
        table.add_row(row);
    }
    table.to_string()
}

pub fn findings_table(findings: &[Finding]) -> String {
    let rows = findings
        .iter()
        .map(|finding| {
            vec![
                finding.rule.to_string(),
                finding.severity.to_string(),
                finding.message.clone(),
                serde_json::Value::from_iter(finding.detail.clone()).to_string(),
            ]
        })
        .collect();
    table(&["rule", "severity", "message", "detail"], rows)
}

pub fn suggestions_table(suggestions: &[Suggestion]) -> String {
    let rows = suggestions
        .iter()
        .map(|suggestion| {
            vec![
                suggestion.suggestion_type.to_string(),
                suggestion.message.clone(),
                suggestion.ddl.clone(),
                suggestion.runnable.to_string(),
            ]
        })
        .collect();
    table(&["type", "message", "ddl", "runnable"], rows)
}

pub fn comparison_table(comparison: &[PlanComparisonRow]) -> String {
    let rows = comparison
        .iter()
        .map(|row| vec![row.before.clone(), row.after.clone()])
        .collect();
    table(&["before", "after"], rows)
}

pub fn plan_table(plan: &[PlanRow]) -> String {
    let rows = plan
        .iter()
        .map(|row| vec![row.id.to_string(), row.parent.to_string(), row.detail.clone()])
        .collect();
    table(&["id", "parent", "detail"], rows)
}

/// Renders a plan the way the sqlite3 shell prints `EXPLAIN QUERY PLAN`
pub fn plan_tree(plan: &[PlanRow]) -> String {
    let mut rendered = String::from("QUERY PLAN");
    write_plan_children(plan, 0, "", &mut rendered);
    rendered
}

fn write_plan_children(plan: &[PlanRow], parent: i64, prefix: &str, out: &mut String) {
    let children: Vec<_> = plan
        .iter()
        .filter(|row| row.parent == parent && row.id != parent)
        .collect();

    for (i, row) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let _ = write!(out, "\n{}{}{}", prefix, if last { "`--" } else { "|--" }, row.detail);
        let child_prefix = format!("{}{}", prefix, if last { "   " } else { "|  " });
        write_plan_children(plan, row.id, &child_prefix, out);
    }
}

/// Renders the sections printed by `optimize`
pub fn report(report: &OptimizeReport) -> String {
    let mut rendered = format!(
        "# Diagnosis\n{}\n\n# Suggestions\n{}\n",
        findings_table(&report.findings),
        suggestions_table(&report.suggestions)
    );
    if let Some(comparison) = &report.comparison {
        let _ = write!(
            rendered,
            "\n# Plan comparison (before -> after)\n{}\n",
            comparison_table(comparison)
        );
    }
    rendered
}
