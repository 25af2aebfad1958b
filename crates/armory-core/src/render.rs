//! Display rendering for audit diffs and records.
//!
//! Turns a persisted [`AuditDiff`] into labelled rows: enum-like tokens become
//! capitalised words, relation lists are joined with `", "`, and null renders
//! as empty text.

use serde::Serialize;

use crate::diff::{AuditDiff, DiffValue, FieldDiff};
use crate::entities::AuditRecord;
use crate::fields::AuditField;

/// One changed field, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditFieldRow {
    pub field: &'static str,
    pub label: &'static str,
    pub old_value: String,
    pub new_value: String,
}

/// A rendered audit record: a one-line summary plus changed field rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecordView {
    pub summary: String,
    pub rows: Vec<AuditFieldRow>,
}

/// Turn `SHORT_RANGE`, `short_range` or `short-range` into `Short Range`.
#[must_use]
pub fn humanize_token(token: &str) -> String {
    token
        .split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render one diff value as display text.
#[must_use]
pub fn render_value(value: &DiffValue) -> String {
    match value {
        DiffValue::Null => String::new(),
        DiffValue::Text(text) => text.clone(),
        DiffValue::Integer(n) => n.to_string(),
        DiffValue::Token(token) => humanize_token(token),
        DiffValue::List(items) => items.join(", "),
    }
}

fn rows<F: AuditField>(diff: &FieldDiff<F>) -> Vec<AuditFieldRow> {
    diff.changes()
        .map(|(field, old, new)| AuditFieldRow {
            field: field.as_str(),
            label: field.label(),
            old_value: render_value(old),
            new_value: render_value(new),
        })
        .collect()
}

/// Render every changed field of a diff, in field declaration order.
#[must_use]
pub fn render_diff(diff: &AuditDiff) -> Vec<AuditFieldRow> {
    match diff {
        AuditDiff::Weapon(d) => rows(d),
        AuditDiff::WeaponMode(d) => rows(d),
        AuditDiff::Ammo(d) => rows(d),
        AuditDiff::Rule(d) => rows(d),
        AuditDiff::HackingDevice(d) => rows(d),
        AuditDiff::HackingProgram(d) => rows(d),
    }
}

/// Render a persisted audit record for display.
#[must_use]
pub fn render_record(record: &AuditRecord) -> AuditRecordView {
    let mut summary = format!(
        "{} {} '{}'",
        record.action.verb(),
        record.entity_kind.label(),
        record.resource_name
    );
    if let Some(parent) = &record.parent_resource_name {
        summary.push_str(&format!(" of '{parent}'"));
    }
    if let Some(message) = &record.message {
        summary.push_str(": ");
        summary.push_str(message);
    }

    AuditRecordView {
        summary,
        rows: record.diff.as_ref().map(render_diff).unwrap_or_default(),
    }
}
