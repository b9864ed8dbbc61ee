// Label mappings: question codes to display names in the summary.

use log::info;

use snafu::prelude::*;

use serde::{Deserialize, Serialize};

use std::collections::HashMap;
use std::fs;

use crate::svy::{OpeningJsonSnafu, ParsingJsonSnafu, SvyResult};

/// The label maps of one analysis run. Keys are matched case-insensitively;
/// they are lower-cased on load.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Mappings {
    /// Per-wave brand maps, keyed by the simplified data file name, plus the
    /// `fallback_3_brand` / `fallback_4_brand` entries.
    brand_maps: HashMap<String, HashMap<String, String>>,
    pub imagery_labels: HashMap<String, String>,
    pub sectional_labels: HashMap<String, String>,
}

// Both spellings of the keys are accepted: camelCase like the analysis
// configuration, and snake_case as found in pre-existing mapping files.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
struct MappingsFile {
    #[serde(rename = "brandMappings", alias = "brand_mappings", default)]
    brand_mappings: HashMap<String, HashMap<String, String>>,
    #[serde(rename = "imageryMappings", alias = "imagery_mappings", default)]
    imagery_mappings: HashMap<String, String>,
    #[serde(rename = "sectionalMappings", alias = "sectional_mappings", default)]
    sectional_mappings: HashMap<String, String>,
}

const FALLBACK_3_BRAND: &str = "fallback_3_brand";
const FALLBACK_4_BRAND: &str = "fallback_4_brand";

impl Mappings {
    pub fn from_file(path: &str) -> SvyResult<Mappings> {
        let contents = fs::read_to_string(path).context(OpeningJsonSnafu {})?;
        let file: MappingsFile = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
        info!(
            "Loaded mappings from {}: {} brand maps, {} imagery labels, {} sectional labels",
            path,
            file.brand_mappings.len(),
            file.imagery_mappings.len(),
            file.sectional_mappings.len()
        );
        Ok(Mappings {
            brand_maps: file
                .brand_mappings
                .into_iter()
                .map(|(k, v)| (k, lower_keys(v)))
                .collect(),
            imagery_labels: lower_keys(file.imagery_mappings),
            sectional_labels: lower_keys(file.sectional_mappings),
        })
    }

    /// The default maps used when no mappings file is configured.
    pub fn built_in() -> Mappings {
        let three: HashMap<String, String> = labels(&[
            ("q7_1", "AU"),
            ("q7_2", "DJ"),
            ("q7_3", "HH"),
            ("1", "AU"),
            ("2", "DJ"),
            ("3", "HH"),
            ("q12b_1", "AU"),
            ("q12b_2", "DJ"),
            ("q12b_3", "HH"),
        ]);
        let four: HashMap<String, String> = labels(&[
            ("q7_1", "DB"),
            ("q7_2", "DJ"),
            ("q7_3", "HH"),
            ("q7_4", "PK"),
            ("1", "DB"),
            ("2", "DJ"),
            ("3", "HH"),
            ("4", "PK"),
            ("q12b_1", "DB"),
            ("q12b_2", "DJ"),
            ("q12b_3", "HH"),
            ("q12b_4", "PK"),
        ]);
        let mut brand_maps = HashMap::new();
        brand_maps.insert(FALLBACK_3_BRAND.to_string(), three);
        brand_maps.insert(FALLBACK_4_BRAND.to_string(), four);
        Mappings {
            brand_maps,
            imagery_labels: labels(&[
                ("q6a.1", "City Paper"),
                ("q6a.2", "Market Leader"),
                ("q6a.3", "Trustworthy"),
                ("q6a.4", "Buzz (Charcha)"),
                ("q6a.5", "Good quantum"),
                ("q6a.6", "Latest local news"),
                ("q6a.7", "Raises issues/ concerns"),
                ("q6a.8", "Changes with time"),
                ("q6a.9", "Complete analysis"),
                ("q6a.10", "Appeals to Everyone"),
                ("q6a.11", "Good Discount / Good Schemes"),
                ("q6a.12", "Unbiased and bold"),
                ("q6a.13", "Best On Education And Employment"),
                ("q6a.14", "Content different from other newspapers"),
                ("q6a.15", "Brand is Ready for Future"),
                ("q6a.16", "Appeals Youth"),
                ("q6a.17", "Offers News in both Print & Digital formats"),
                ("q6a.18", "Premium Brand"),
            ]),
            sectional_labels: labels(&[
                ("1", "Front Page"),
                ("2", "State Polit"),
                ("3", "Local"),
                ("4", "Education/Campus"),
                ("5", "Nearby (Aaspaas)"),
                ("6", "State/Pradesh"),
                ("7", "Business"),
                ("8", "International news"),
                ("9", "National News"),
                ("10", "Sports"),
            ]),
        }
    }

    /// The brand map for one data file: an entry keyed by (a substring of)
    /// the file name wins, otherwise the fallback for the wave's brand count.
    pub fn brand_labels(&self, file_name: &str, has_four_brands: bool) -> HashMap<String, String> {
        let clean = file_name.trim_end_matches(".xlsx").trim_end_matches(".csv");
        for (key, map) in &self.brand_maps {
            if key == FALLBACK_3_BRAND || key == FALLBACK_4_BRAND {
                continue;
            }
            if key.contains(clean) || clean.contains(key.as_str()) {
                return map.clone();
            }
        }
        let fallback = if has_four_brands {
            FALLBACK_4_BRAND
        } else {
            FALLBACK_3_BRAND
        };
        self.brand_maps.get(fallback).cloned().unwrap_or_default()
    }
}

fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn lower_keys(map: HashMap<String, String>) -> HashMap<String, String> {
    map.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect()
}

/// The display label of one raw name: an exact case-insensitive match wins,
/// and composite `A - B` names are mapped part by part.
pub fn display_label(map: &HashMap<String, String>, raw: &str) -> String {
    let key = raw.trim().to_lowercase();
    if let Some(label) = map.get(&key) {
        return label.clone();
    }
    if raw.contains(" - ") {
        return raw
            .split(" - ")
            .map(|part| display_label(map, part))
            .collect::<Vec<String>>()
            .join(" - ");
    }
    raw.trim().to_string()
}
