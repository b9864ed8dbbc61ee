// JSON rendering of the computed tables.
//
// The suppression markers only exist here: inside the library the
// comparison cells stay typed, and the "LB" / "Insufficient base" strings
// are purely a display convention.

use std::collections::HashMap;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use survey_metrics::{
    AnnotatedTable, ComparisonCell, TomRow, TomSignificance, TomTable, INSUFFICIENT_BASE_LABEL,
    LOW_BASE_LABEL,
};

use crate::svy::mappings::display_label;

type LabelMap = HashMap<String, String>;

/// One JSON object per entity row. Every comparison block renders as three
/// columns: the score difference, the z-statistic and the verdict.
pub fn annotated_to_json(
    table: &AnnotatedTable,
    column_labels: &LabelMap,
    entity_labels: &LabelMap,
) -> Vec<JSValue> {
    let mut rows: Vec<JSValue> = Vec::with_capacity(table.entities().len());
    for (row_idx, entity) in table.entities().iter().enumerate() {
        let mut obj: JSMap<String, JSValue> = JSMap::new();
        obj.insert(
            table.scores.entity_label.clone(),
            json!(display_label(entity_labels, entity)),
        );
        for column in &table.scores.columns {
            obj.insert(
                display_label(column_labels, column),
                score_js(table.scores.get(row_idx, column)),
            );
        }
        for block in &table.comparisons {
            let reference = display_label(column_labels, &block.reference);
            let comparison = display_label(column_labels, &block.comparison);
            let (diff, z, sig) = comparison_js(&block.cells[row_idx]);
            obj.insert(format!("{}_minus_{}", reference, comparison), diff);
            obj.insert(format!("Z_{}_vs_{}", reference, comparison), z);
            obj.insert(format!("Sig_{}_vs_{}", reference, comparison), sig);
        }
        rows.push(JSValue::Object(obj));
    }
    rows
}

fn score_js(score: Option<f64>) -> JSValue {
    match score {
        Some(x) => json!(x),
        None => JSValue::Null,
    }
}

fn comparison_js(cell: &ComparisonCell) -> (JSValue, JSValue, JSValue) {
    match cell {
        ComparisonCell::LowBase => (
            json!(LOW_BASE_LABEL),
            json!(LOW_BASE_LABEL),
            json!(LOW_BASE_LABEL),
        ),
        ComparisonCell::InsufficientBase => (
            json!(INSUFFICIENT_BASE_LABEL),
            json!(INSUFFICIENT_BASE_LABEL),
            json!(INSUFFICIENT_BASE_LABEL),
        ),
        ComparisonCell::Tested { diff, z, verdict } => (
            json!(diff),
            score_js(*z),
            json!(verdict.to_string()),
        ),
    }
}

pub fn tom_to_json(table: &TomTable, brand_labels: &LabelMap) -> Vec<JSValue> {
    table
        .rows
        .iter()
        .map(|row| tom_row_js(row, brand_labels))
        .collect()
}

fn tom_row_js(row: &TomRow, brand_labels: &LabelMap) -> JSValue {
    let label = display_label(brand_labels, &row.label.to_string());
    let (z, sig) = match &row.test {
        None => (JSValue::Null, JSValue::Null),
        Some(TomSignificance::LowBase) => (json!(LOW_BASE_LABEL), json!(LOW_BASE_LABEL)),
        Some(TomSignificance::Tested { z, verdict }) => (score_js(*z), json!(verdict.to_string())),
    };
    json!({
        "Brand": label,
        "TOM (%)": row.value,
        "Z Score": z,
        "Significance": sig,
    })
}
