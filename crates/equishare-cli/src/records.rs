//! JSON record tables exchanged with the caller.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use equishare::{AssignedRecord, Placement};
use equishare_core::{EquiShareError, RawRecord};

/// One input row.
///
/// Text columns accept strings or numbers; `capital` also accepts numeric
/// strings, and anything unparseable becomes `0`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RecordRow {
    #[serde(deserialize_with = "lenient_string")]
    pub client_id: String,
    #[serde(default, deserialize_with = "lenient_capital")]
    pub capital: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub origin_party: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_count: Option<u32>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub cohort: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,
}

impl From<RecordRow> for RawRecord {
    fn from(row: RecordRow) -> Self {
        RawRecord {
            client_id: row.client_id,
            capital: row.capital,
            origin_party: row.origin_party,
            zone: row.zone,
            account_count: row.account_count,
            cohort: row.cohort,
            segment: row.segment,
            locked: row.locked,
        }
    }
}

impl From<RawRecord> for RecordRow {
    fn from(record: RawRecord) -> Self {
        RecordRow {
            client_id: record.client_id,
            capital: record.capital,
            origin_party: record.origin_party,
            zone: record.zone,
            account_count: record.account_count,
            cohort: record.cohort,
            segment: record.segment,
            locked: record.locked,
        }
    }
}

/// An input row with its final party.
#[derive(Debug, Clone, Serialize)]
pub struct AssignedRow {
    #[serde(flatten)]
    pub record: RecordRow,
    pub assigned_party: String,
}

impl From<AssignedRecord> for AssignedRow {
    fn from(row: AssignedRecord) -> Self {
        AssignedRow {
            record: row.record.into(),
            assigned_party: row.assigned_party,
        }
    }
}

/// One advisor placement.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementRow {
    pub client_id: String,
    pub capital: f64,
    pub previous_handler: String,
    pub advisor: String,
    pub cohort: String,
    pub tier: String,
}

impl From<Placement> for PlacementRow {
    fn from(p: Placement) -> Self {
        PlacementRow {
            client_id: p.client_id,
            capital: p.capital,
            previous_handler: p.previous_handler,
            advisor: p.advisor,
            cohort: p.cohort,
            tier: p.tier,
        }
    }
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(value_to_string(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(value_to_string(Value::deserialize(deserializer)?))
}

fn lenient_capital<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Reads a JSON array of rows.
///
/// A missing file is reported as [`EquiShareError::InputMissing`].
pub fn read_records(path: &Path) -> anyhow::Result<Vec<RawRecord>> {
    if !path.is_file() {
        return Err(EquiShareError::InputMissing(path.display().to_string()).into());
    }
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let rows: Vec<RecordRow> =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(rows.into_iter().map(RawRecord::from).collect())
}

/// Writes `rows` as pretty JSON to `output`, or to stdout.
pub fn write_json<T: Serialize>(rows: &T, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let text = serde_json::to_string_pretty(rows)?;
            fs::write(path, text + "\n").with_context(|| format!("writing {}", path.display()))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, rows)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capital_coercion() {
        let rows: Vec<RecordRow> = serde_json::from_str(
            r#"[
                {"client_id": "a", "capital": 12.5},
                {"client_id": "b", "capital": " 40 "},
                {"client_id": "c", "capital": "n/a"},
                {"client_id": "d", "capital": null},
                {"client_id": "e"}
            ]"#,
        )
        .unwrap();
        let capitals: Vec<f64> = rows.iter().map(|r| r.capital).collect();

        assert_eq!(capitals, vec![12.5, 40.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_numeric_text_columns() {
        let rows: Vec<RecordRow> = serde_json::from_str(
            r#"[{"client_id": 1045, "capital": 1, "origin_party": null, "zone": "SUR", "cohort": 2021}]"#,
        )
        .unwrap();

        assert_eq!(rows[0].client_id, "1045");
        assert_eq!(rows[0].origin_party, "");
        assert_eq!(rows[0].cohort.as_deref(), Some("2021"));
        assert!(!rows[0].locked);
    }

    #[test]
    fn test_missing_input_is_input_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_records(&dir.path().join("absent.json")).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<EquiShareError>(),
            Some(EquiShareError::InputMissing(_))
        ));
    }

    #[test]
    fn test_assigned_rows_are_flat() {
        let row = AssignedRow::from(AssignedRecord {
            record: RawRecord::new("A1", 10.0, "P1", "NORTE"),
            assigned_party: "P2".to_string(),
        });
        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(json["client_id"], "A1");
        assert_eq!(json["assigned_party"], "P2");
        assert!(json.get("locked").is_none());
    }

    #[test]
    fn test_write_and_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        let rows = vec![RecordRow::from(RawRecord::new("A1", 10.0, "P1", "NORTE").with_cohort("2020"))];

        write_json(&rows, Some(&path)).unwrap();
        let back = read_records(&path).unwrap();

        assert_eq!(back, vec![RawRecord::new("A1", 10.0, "P1", "NORTE").with_cohort("2020")]);
    }
}
