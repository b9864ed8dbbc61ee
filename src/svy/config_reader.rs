// The JSON description of an analysis run.

use serde::{Deserialize, Serialize};

use survey_metrics::{DEFAULT_MAX_SECTION, SEGMENTED_NPS_REFERENCE};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalysisConfig {
    #[serde(rename = "dataFileSources", default)]
    pub data_file_sources: Vec<FileSource>,
    #[serde(rename = "references", default)]
    pub references: References,
    #[serde(rename = "segmentColumns", default)]
    pub segment_columns: Vec<String>,
    #[serde(rename = "filters", default)]
    pub filters: Vec<RowFilter>,
    #[serde(rename = "mappingsFile")]
    pub mappings_file: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub path: String,
    #[serde(rename = "inputType")]
    pub input_type: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

/// The reference column or code of every analysis. All the fields are
/// optional in the JSON file; the accessors fill in the defaults.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct References {
    #[serde(rename = "npsReference")]
    nps_reference: Option<String>,
    #[serde(rename = "tomReferenceBrand")]
    tom_reference_brand: Option<String>,
    #[serde(rename = "imageryReference")]
    imagery_reference: Option<String>,
    #[serde(rename = "sectionalReference")]
    sectional_reference: Option<String>,
    #[serde(rename = "maxSection")]
    max_section: Option<u32>,
}

impl References {
    pub fn nps_reference(&self) -> String {
        self.nps_reference
            .clone()
            .unwrap_or_else(|| SEGMENTED_NPS_REFERENCE.to_string())
    }

    pub fn tom_reference_brand(&self) -> String {
        self.tom_reference_brand
            .clone()
            .unwrap_or_else(|| "3".to_string())
    }

    /// Falls back to the NPS reference.
    pub fn imagery_reference(&self) -> String {
        self.imagery_reference
            .clone()
            .unwrap_or_else(|| self.nps_reference())
    }

    pub fn sectional_reference(&self) -> String {
        self.sectional_reference
            .clone()
            .unwrap_or_else(|| "q12b_3".to_string())
    }

    pub fn max_section(&self) -> u32 {
        self.max_section.unwrap_or(DEFAULT_MAX_SECTION)
    }
}

/// Keeps only the respondents whose cell in `column` matches one of
/// `values`. Several filters combine with AND.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RowFilter {
    pub column: String,
    pub values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config() {
        let js = r#"{
            "dataFileSources": [
                { "path": "wave_march.csv" },
                { "path": "wave_march.xlsx", "excelWorksheetName": "Sheet2" }
            ],
            "references": {
                "npsReference": "q7_2",
                "tomReferenceBrand": "2",
                "maxSection": 8
            },
            "segmentColumns": ["gender"],
            "filters": [ { "column": "q1a", "values": ["1"] } ]
        }"#;
        let config: AnalysisConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.data_file_sources.len(), 2);
        assert_eq!(config.data_file_sources[0].path, "wave_march.csv");
        assert_eq!(
            config.data_file_sources[1].excel_worksheet_name,
            Some("Sheet2".to_string())
        );
        assert_eq!(config.references.nps_reference(), "q7_2");
        assert_eq!(config.references.tom_reference_brand(), "2");
        // Unset imagery reference follows the NPS reference.
        assert_eq!(config.references.imagery_reference(), "q7_2");
        assert_eq!(config.references.sectional_reference(), "q12b_3");
        assert_eq!(config.references.max_section(), 8);
        assert_eq!(config.segment_columns, vec!["gender".to_string()]);
        assert_eq!(config.filters[0].values, vec!["1".to_string()]);
        assert_eq!(config.mappings_file, None);
    }

    #[test]
    fn defaults() {
        let config: AnalysisConfig = serde_json::from_str("{}").unwrap();
        assert!(config.data_file_sources.is_empty());
        assert_eq!(config.references.nps_reference(), "q7_3");
        assert_eq!(config.references.tom_reference_brand(), "3");
        assert_eq!(config.references.imagery_reference(), "q7_3");
        assert_eq!(config.references.max_section(), 10);
    }
}
