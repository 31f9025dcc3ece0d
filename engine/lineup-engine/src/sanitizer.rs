//! Transport-safe lineup rendering

use crate::generator::Lineup;
use prop_registry::{CellValue, PropRow};
use serde_json::{Map, Number, Value};

/// One pick as a JSON object keyed by column name
pub type SanitizedRow = Map<String, Value>;

/// One lineup as a list of JSON objects
pub type SanitizedLineup = Vec<SanitizedRow>;

/// Convert a cell to JSON; empty cells and non-finite numbers become `null`
pub fn sanitize_value(value: &CellValue) -> Value {
    match value {
        CellValue::Empty => Value::Null,
        CellValue::Bool(b) => Value::Bool(*b),
        CellValue::Number(n) => Number::from_f64(*n).map_or(Value::Null, Value::Number),
        CellValue::Text(s) => Value::String(s.clone()),
    }
}

pub fn sanitize_row(row: &PropRow) -> SanitizedRow {
    row.columns.iter().map(|(name, value)| (name.clone(), sanitize_value(value))).collect()
}

pub fn sanitize_lineup(lineup: &Lineup<'_>) -> SanitizedLineup {
    lineup.picks().iter().map(|row| sanitize_row(row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_nan_becomes_null() {
        let mut columns = BTreeMap::new();
        columns.insert("Value".to_string(), CellValue::Number(f64::NAN));
        columns.insert("Team".to_string(), CellValue::text("BOS"));
        let row = PropRow::from_columns(columns);

        let sanitized = Value::Object(sanitize_row(&row));
        assert_eq!(sanitized, json!({"Value": null, "Team": "BOS"}));
    }

    #[test]
    fn test_values_pass_through() {
        assert_eq!(sanitize_value(&CellValue::Number(7.25)), json!(7.25));
        assert_eq!(sanitize_value(&CellValue::Bool(true)), json!(true));
        assert_eq!(sanitize_value(&CellValue::Text("GOOD".into())), json!("GOOD"));
        assert_eq!(sanitize_value(&CellValue::Empty), Value::Null);
        assert_eq!(sanitize_value(&CellValue::Number(f64::NEG_INFINITY)), Value::Null);
    }
}
