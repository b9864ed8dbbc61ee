use std::path::Path;

use survey_metrics::Datum;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string()
}

/// The common cell coercion of the text-based readers: blanks are missing,
/// numeric content is a number, everything else stays text.
pub fn datum_from_text(s: &str) -> Datum {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Datum::Missing;
    }
    match trimmed.parse::<f64>() {
        Ok(x) => Datum::Number(x),
        Err(_) => Datum::Text(trimmed.to_string()),
    }
}
