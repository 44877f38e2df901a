//! Status command: the field registry rendered as a table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

use keenetic_core::fields::{self, FieldValue};
use keenetic_core::{Controller, INTERFACE_FIELDS, ROUTER_FIELDS, Snapshot};

use crate::cli::{GlobalOpts, StatusArgs};
use crate::error::CliError;
use crate::output;

use super::util;

/// One evaluated registry field.
#[derive(Debug, Serialize)]
pub struct StatusEntry {
    /// `router` or an interface id.
    pub scope: String,
    pub key: &'static str,
    pub label: &'static str,
    pub value: Option<FieldValue>,
    pub unit: Option<&'static str>,
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Scope")]
    scope: String,
    #[tabled(rename = "Field")]
    label: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl From<&StatusEntry> for StatusRow {
    fn from(e: &StatusEntry) -> Self {
        let value = match (&e.value, e.unit) {
            (None, _) => "-".to_owned(),
            (Some(v), Some(unit)) => format!("{v} {unit}"),
            (Some(v), None) => v.to_string(),
        };
        Self {
            scope: e.scope.clone(),
            label: e.label.to_owned(),
            value,
        }
    }
}

/// Reject field keys the registry does not know.
pub fn validate_fields(keys: &[String]) -> Result<(), CliError> {
    for key in keys {
        if fields::router_field(key).is_none() && fields::interface_field(key).is_none() {
            let known: Vec<&str> = ROUTER_FIELDS
                .iter()
                .map(|f| f.key)
                .chain(INTERFACE_FIELDS.iter().map(|f| f.key))
                .collect();
            return Err(CliError::Validation {
                field: "fields".into(),
                reason: format!("unknown field '{key}'. Valid fields: {}", known.join(", ")),
            });
        }
    }
    Ok(())
}

/// Evaluate the registry against a snapshot.
///
/// Interface fields are read for every interface that has counters.
pub fn entries(
    snapshot: &Snapshot,
    with_interfaces: bool,
    only: &[String],
    now: DateTime<Utc>,
) -> Vec<StatusEntry> {
    let wanted = |key: &str| only.is_empty() || only.iter().any(|k| k == key);

    let mut entries: Vec<StatusEntry> = fields::router_values(snapshot, now)
        .into_iter()
        .filter(|(field, _)| wanted(field.key))
        .map(|(field, value)| StatusEntry {
            scope: "router".into(),
            key: field.key,
            label: field.label,
            value,
            unit: field.unit,
        })
        .collect();

    if with_interfaces {
        for id in snapshot.interface_stats.keys() {
            let scope = snapshot
                .interface(id)
                .map_or_else(|| id.clone(), |i| i.name.clone());
            entries.extend(
                fields::interface_values(snapshot, id, now)
                    .into_iter()
                    .filter(|(field, _)| wanted(field.key))
                    .map(|(field, value)| StatusEntry {
                        scope: scope.clone(),
                        key: field.key,
                        label: field.label,
                        value,
                        unit: field.unit,
                    }),
            );
        }
    }

    entries
}

pub fn render(entries: &[StatusEntry], global: &GlobalOpts) -> Result<String, CliError> {
    output::render_list(&global.output, entries, |e| StatusRow::from(e), |e| {
        format!(
            "{}.{}={}",
            e.scope,
            e.key,
            e.value.as_ref().map(ToString::to_string).unwrap_or_default()
        )
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(controller: &Controller, args: &StatusArgs, global: &GlobalOpts) -> Result<(), CliError> {
    validate_fields(&args.fields)?;
    let snap = util::snapshot(controller)?;
    let entries = entries(&snap, args.interfaces, &args.fields, Utc::now());

    if snap.is_partial() && !global.quiet {
        eprintln!(
            "warning: router did not answer: {}",
            snap.missing_sections.join(", ")
        );
    }

    output::print_output(&render(&entries, global)?, global.quiet);
    Ok(())
}
