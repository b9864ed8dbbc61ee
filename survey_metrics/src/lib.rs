mod columns;
mod config;

pub mod builder;
pub mod manual;
pub mod quick_start;

use log::{debug, info, warn};

use std::collections::{BTreeMap, BTreeSet, HashMap};

pub use crate::config::*;

use crate::columns::{parse_column, SurveyColumn};

/// Two-tailed threshold at the 95% confidence level. Fixed, not configurable.
pub const Z_SCORE_95_CONFIDENCE: f64 = 1.96;

/// Minimum reportable base size (survey-industry convention). Below this,
/// significance tests are suppressed regardless of the computed z.
pub const MIN_REPORTABLE_BASE: u64 = 45;

/// Imagery attributes are numbered 1 to 18; higher question numbers in the
/// source data belong to other question families.
pub const MAX_IMAGERY_QUESTION: u32 = 18;

/// The segmented analysis always compares against this rating column.
pub const SEGMENTED_NPS_REFERENCE: &str = "q7_3";

pub const DEFAULT_MAX_SECTION: u32 = 10;

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Two-proportion z-test on the 0-100 percentage scale.
///
/// A sample size of zero contributes a zero term to the squared standard
/// error; when the standard error itself vanishes the z-statistic is
/// undefined and the verdict falls back to Not Significant. The verdict is
/// judged on the unrounded z.
pub fn significance_test(p1: f64, p2: f64, n1: u64, n2: u64) -> SigTest {
    let term1 = if n1 > 0 {
        p1 * (100.0 - p1) / n1 as f64
    } else {
        0.0
    };
    let term2 = if n2 > 0 {
        p2 * (100.0 - p2) / n2 as f64
    } else {
        0.0
    };
    let se_squared = term1 + term2;
    let se = if se_squared > 0.0 { se_squared.sqrt() } else { 0.0 };
    let z = if se != 0.0 { Some((p1 - p2) / se) } else { None };
    let verdict = match z {
        Some(z) if z.abs() > Z_SCORE_95_CONFIDENCE => Verdict::Significant,
        _ => Verdict::NotSignificant,
    };
    SigTest {
        se: round2(se),
        z: z.map(round2),
        verdict,
    }
}

// The three-tier comparison policy, first match wins:
// low base, then insufficient data, then the actual test.
fn compare_cell(
    p1: Option<f64>,
    p2: Option<f64>,
    n1: Option<u64>,
    n2: Option<u64>,
) -> ComparisonCell {
    let low = |n: &Option<u64>| match n {
        None => true,
        Some(n) => *n < MIN_REPORTABLE_BASE,
    };
    if low(&n1) || low(&n2) {
        return ComparisonCell::LowBase;
    }
    match (p1, p2, n1, n2) {
        (Some(p1), Some(p2), Some(n1), Some(n2)) if n1 > 0 && n2 > 0 => {
            let test = significance_test(p1, p2, n1, n2);
            ComparisonCell::Tested {
                diff: round2(p1 - p2),
                z: test.z,
                verdict: test.verdict,
            }
        }
        _ => ComparisonCell::InsufficientBase,
    }
}

/// Appends pairwise comparisons against `ref_col` to a scores table: one
/// [ComparisonBlock] per non-reference column, one cell per entity row.
///
/// A reference column absent from the scores (or from the base counts) is
/// not an error: the zero-base rule marks every cell as low base.
pub fn annotate_comparisons(
    scores: ScoresTable,
    bases: &BaseCounts,
    ref_col: &str,
) -> AnnotatedTable {
    let ref_idx = scores.columns.iter().position(|c| c == ref_col);
    let mut comparisons: Vec<ComparisonBlock> = Vec::new();
    for (comp_idx, comp_col) in scores.columns.iter().enumerate() {
        if comp_col == ref_col {
            continue;
        }
        let mut cells: Vec<ComparisonCell> = Vec::with_capacity(scores.entities.len());
        for row in 0..scores.entities.len() {
            let p1 = ref_idx.and_then(|idx| scores.values[row][idx]);
            let p2 = scores.values[row][comp_idx];
            let n1 = bases.get(row, ref_col);
            let n2 = bases.get(row, comp_col);
            cells.push(compare_cell(p1, p2, n1, n2));
        }
        comparisons.push(ComparisonBlock {
            reference: ref_col.to_string(),
            comparison: comp_col.clone(),
            cells,
        });
    }
    debug!(
        "annotate_comparisons: {} entities, {} comparison blocks against {}",
        scores.entities.len(),
        comparisons.len(),
        ref_col
    );
    AnnotatedTable {
        scores,
        comparisons,
    }
}

struct NpsScore {
    nps: f64,
    base: u64,
}

// Promoters rate 9-10, detractors 0-6. Ratings of 7-8 (and anything outside
// the 11-point scale) count in the denominator only.
fn net_promoter_score(ratings: impl Iterator<Item = f64>) -> Option<NpsScore> {
    let mut promoters: u64 = 0;
    let mut detractors: u64 = 0;
    let mut total: u64 = 0;
    for r in ratings {
        total += 1;
        if (9.0..=10.0).contains(&r) {
            promoters += 1;
        } else if (0.0..=6.0).contains(&r) {
            detractors += 1;
        }
    }
    if total == 0 {
        return None;
    }
    let nps = ((promoters as f64 - detractors as f64) / total as f64 * 100.0).round();
    Some(NpsScore { nps, base: total })
}

fn column_numbers(table: &ResponseTable, name: &str) -> Vec<Option<f64>> {
    table
        .column(name)
        .map(|col| col.iter().map(|d| d.as_number()).collect())
        .unwrap_or_default()
}

/// The NPS source columns of a table, in input order.
pub fn nps_source_columns(table: &ResponseTable) -> Vec<String> {
    table
        .column_names()
        .iter()
        .filter(|c| matches!(parse_column(c), Some(SurveyColumn::Nps { .. })))
        .cloned()
        .collect()
}

/// Overall NPS per rating column, annotated against `ref_col`.
///
/// Produces a single `Overall` row; the base counts are the per-column valid
/// response counts. Fails when the reference column is not among the rating
/// columns.
pub fn overall_nps(table: &ResponseTable, ref_col: &str) -> Result<AnnotatedTable, MetricsError> {
    let ref_col = ref_col.to_lowercase();
    let q7_cols = nps_source_columns(table);
    if !q7_cols.iter().any(|c| *c == ref_col) {
        return Err(MetricsError::MissingReferenceColumn { column: ref_col });
    }
    info!(
        "overall_nps: {} rating columns, reference {}",
        q7_cols.len(),
        ref_col
    );
    let mut values: Vec<Option<f64>> = Vec::with_capacity(q7_cols.len());
    let mut counts: Vec<Option<u64>> = Vec::with_capacity(q7_cols.len());
    for col in &q7_cols {
        match net_promoter_score(column_numbers(table, col).into_iter().flatten()) {
            Some(score) => {
                values.push(Some(score.nps));
                counts.push(Some(score.base));
            }
            None => {
                values.push(None);
                counts.push(Some(0));
            }
        }
    }
    let scores = ScoresTable {
        entity_label: "Paper".to_string(),
        entities: vec!["Overall".to_string()],
        columns: q7_cols.clone(),
        values: vec![values],
    };
    let bases = BaseCounts {
        columns: q7_cols,
        counts: vec![counts],
    };
    Ok(annotate_comparisons(scores, &bases, &ref_col))
}

/// Top-of-mind share per brand code, with synthesized reference-vs-other
/// difference rows.
///
/// The difference rows are built from the share values themselves, and their
/// significance tests use the total respondent count as both sample sizes:
/// every code's share is estimated from the same respondent pool. An
/// unobserved reference code or an empty response column yields an empty
/// table, not an error.
pub fn top_of_mind(table: &ResponseTable, ref_brand: &str) -> Result<TomTable, MetricsError> {
    let target = table
        .column_names()
        .iter()
        .find(|c| matches!(parse_column(c), Some(SurveyColumn::TopOfMind)))
        .cloned()
        .ok_or(MetricsError::MissingTomColumn)?;
    let codes: Vec<i64> = table
        .column(&target)
        .unwrap_or_default()
        .iter()
        .filter_map(|d| d.as_number())
        .map(|v| v.trunc() as i64)
        .collect();
    let total = codes.len() as u64;
    if total == 0 {
        info!("top_of_mind: no valid responses in column {}", target);
        return Ok(TomTable::default());
    }
    let mut counts: HashMap<i64, u64> = HashMap::new();
    for code in &codes {
        *counts.entry(*code).or_insert(0) += 1;
    }
    // Most-mentioned brands first, ties by code.
    let mut ordered: Vec<(i64, u64)> = counts.into_iter().collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    info!(
        "top_of_mind: {} codes across {} valid responses",
        ordered.len(),
        total
    );
    let shares: Vec<(String, f64)> = ordered
        .iter()
        .map(|(code, n)| {
            (
                code.to_string(),
                (*n as f64 / total as f64 * 100.0).round(),
            )
        })
        .collect();

    let reference = ref_brand.trim().to_string();
    let ref_share = match shares.iter().find(|(label, _)| *label == reference) {
        Some((_, share)) => *share,
        None => {
            warn!(
                "top_of_mind: reference brand '{}' not observed in column {}",
                reference, target
            );
            return Ok(TomTable::default());
        }
    };

    let mut rows: Vec<TomRow> = shares
        .iter()
        .map(|(label, share)| TomRow {
            label: TomLabel::Brand(label.clone()),
            value: *share,
            test: None,
        })
        .collect();
    for (label, share) in &shares {
        if *label == reference {
            continue;
        }
        let test = if total < MIN_REPORTABLE_BASE {
            TomSignificance::LowBase
        } else {
            let t = significance_test(ref_share, *share, total, total);
            TomSignificance::Tested {
                z: t.z,
                verdict: t.verdict,
            }
        };
        rows.push(TomRow {
            label: TomLabel::Difference {
                reference: reference.clone(),
                other: label.clone(),
            },
            value: round2(ref_share - *share),
            test: Some(test),
        });
    }
    Ok(TomTable { rows })
}

/// Imagery attribute association rate per question x brand.
///
/// For each attribute question (1-18) and each rating column, the cell is
/// the percentage of respondents with a valid rating for that brand whose
/// matching imagery cell is >= 1. The base counts are supplied by the
/// caller (per rating column), not recomputed from the imagery data.
pub fn imagery(
    table: &ResponseTable,
    base_counts: &HashMap<String, u64>,
    ref_col: &str,
) -> Result<AnnotatedTable, MetricsError> {
    let ref_col = ref_col.to_lowercase();
    let q7_cols = nps_source_columns(table);
    if !q7_cols.iter().any(|c| *c == ref_col) {
        return Err(MetricsError::MissingReferenceColumn { column: ref_col });
    }
    let mut attribute_cols: HashMap<(u32, u32), String> = HashMap::new();
    let mut questions: BTreeSet<u32> = BTreeSet::new();
    for col in table.column_names() {
        if let Some(SurveyColumn::Imagery { question, brand }) = parse_column(col) {
            if (1..=MAX_IMAGERY_QUESTION).contains(&question) {
                attribute_cols.insert((question, brand), col.clone());
                questions.insert(question);
            }
        }
    }
    info!(
        "imagery: {} attribute questions across {} rating columns",
        questions.len(),
        q7_cols.len()
    );

    // Which respondents hold a valid rating for each brand column.
    let masks: Vec<Vec<bool>> = q7_cols
        .iter()
        .map(|c| {
            column_numbers(table, c)
                .iter()
                .map(|v| v.is_some())
                .collect()
        })
        .collect();
    let brands: Vec<Option<u32>> = q7_cols
        .iter()
        .map(|c| match parse_column(c) {
            Some(SurveyColumn::Nps { brand }) => brand,
            _ => None,
        })
        .collect();

    let mut entities: Vec<String> = Vec::new();
    let mut values: Vec<Vec<Option<f64>>> = Vec::new();
    for question in &questions {
        let mut row: Vec<Option<f64>> = Vec::with_capacity(q7_cols.len());
        for idx in 0..q7_cols.len() {
            let cell = match brands[idx] {
                Some(brand) => {
                    association_rate(table, attribute_cols.get(&(*question, brand)), &masks[idx])
                }
                None => None,
            };
            row.push(cell);
        }
        entities.push(format!("q6a.{}", question));
        values.push(row);
    }

    let base_row: Vec<Option<u64>> = q7_cols
        .iter()
        .map(|c| Some(base_counts.get(c).copied().unwrap_or(0)))
        .collect();
    let bases = BaseCounts {
        columns: q7_cols.clone(),
        counts: vec![base_row; entities.len()],
    };
    let scores = ScoresTable {
        entity_label: "Question".to_string(),
        entities,
        columns: q7_cols,
        values,
    };
    Ok(annotate_comparisons(scores, &bases, &ref_col))
}

fn association_rate(
    table: &ResponseTable,
    attribute_col: Option<&String>,
    mask: &[bool],
) -> Option<f64> {
    let col = attribute_col?;
    let base = mask.iter().filter(|k| **k).count();
    if base == 0 {
        return None;
    }
    let values = column_numbers(table, col);
    let hits = values
        .iter()
        .zip(mask.iter())
        .filter(|(v, keep)| **keep && matches!(v, Some(x) if *x >= 1.0))
        .count();
    Some((hits as f64 / base as f64 * 100.0).round())
}

/// NPS per rating column within each distinct value of a grouping column.
///
/// One row per segment value, in order of first appearance. The reference
/// is always [SEGMENTED_NPS_REFERENCE]; the comparison cells follow the same
/// three-tier policy as [annotate_comparisons] and are computed while each
/// row is built.
pub fn segmented_nps(
    table: &ResponseTable,
    segment_col: &str,
) -> Result<AnnotatedTable, MetricsError> {
    let segment_col = segment_col.to_lowercase();
    let q7_cols = nps_source_columns(table);
    let ref_idx = match q7_cols.iter().position(|c| c == SEGMENTED_NPS_REFERENCE) {
        Some(idx) => idx,
        None => {
            return Err(MetricsError::MissingReferenceColumn {
                column: SEGMENTED_NPS_REFERENCE.to_string(),
            })
        }
    };
    let seg = match table.column(&segment_col) {
        Some(col) => col,
        None => {
            return Err(MetricsError::MissingSegmentColumn {
                column: segment_col,
            })
        }
    };

    let mut segments: Vec<String> = Vec::new();
    for d in seg.iter() {
        if let Some(label) = d.label() {
            if !segments.contains(&label) {
                segments.push(label);
            }
        }
    }
    info!(
        "segmented_nps: {} segments of {}, {} rating columns",
        segments.len(),
        segment_col,
        q7_cols.len()
    );

    let ratings: Vec<Vec<Option<f64>>> =
        q7_cols.iter().map(|c| column_numbers(table, c)).collect();

    let mut entities: Vec<String> = Vec::new();
    let mut values: Vec<Vec<Option<f64>>> = Vec::new();
    let mut blocks: Vec<ComparisonBlock> = q7_cols
        .iter()
        .filter(|c| c.as_str() != SEGMENTED_NPS_REFERENCE)
        .map(|c| ComparisonBlock {
            reference: SEGMENTED_NPS_REFERENCE.to_string(),
            comparison: c.clone(),
            cells: Vec::with_capacity(segments.len()),
        })
        .collect();

    for segment in segments {
        let keep: Vec<bool> = seg
            .iter()
            .map(|d| d.label().as_deref() == Some(segment.as_str()))
            .collect();
        let mut row_scores: Vec<Option<f64>> = Vec::with_capacity(q7_cols.len());
        let mut row_bases: Vec<Option<u64>> = Vec::with_capacity(q7_cols.len());
        for col_ratings in &ratings {
            let subgroup = col_ratings
                .iter()
                .zip(keep.iter())
                .filter_map(|(v, k)| if *k { *v } else { None });
            match net_promoter_score(subgroup) {
                Some(score) => {
                    row_scores.push(Some(score.nps));
                    row_bases.push(Some(score.base));
                }
                None => {
                    row_scores.push(None);
                    row_bases.push(Some(0));
                }
            }
        }
        let mut block_idx = 0;
        for (idx, _) in q7_cols.iter().enumerate() {
            if idx == ref_idx {
                continue;
            }
            blocks[block_idx].cells.push(compare_cell(
                row_scores[ref_idx],
                row_scores[idx],
                row_bases[ref_idx],
                row_bases[idx],
            ));
            block_idx += 1;
        }
        entities.push(segment);
        values.push(row_scores);
    }

    Ok(AnnotatedTable {
        scores: ScoresTable {
            entity_label: "Segment".to_string(),
            entities,
            columns: q7_cols,
            values,
        },
        comparisons: blocks,
    })
}

/// NPS per newspaper section, pivoted to one row per section number and one
/// column per brand (`q12b_<brand>`), annotated against `ref_col`.
///
/// Sections above `max_section` are excluded entirely. An input with no
/// sectional columns yields an empty table.
pub fn sectional_nps(table: &ResponseTable, ref_col: &str, max_section: u32) -> AnnotatedTable {
    let ref_col = ref_col.to_lowercase();
    // (section, brand) -> (nps, base)
    let mut measured: BTreeMap<(u32, u32), (f64, u64)> = BTreeMap::new();
    for col in table.column_names() {
        if let Some(SurveyColumn::Sectional { brand, section }) = parse_column(col) {
            if section <= max_section {
                if let Some(score) =
                    net_promoter_score(column_numbers(table, col).into_iter().flatten())
                {
                    measured.insert((section, brand), (score.nps, score.base));
                }
            }
        }
    }
    if measured.is_empty() {
        info!("sectional_nps: no sectional columns matched");
        return AnnotatedTable::empty("Q No.");
    }
    let sections: BTreeSet<u32> = measured.keys().map(|(s, _)| *s).collect();
    let brands: BTreeSet<u32> = measured.keys().map(|(_, b)| *b).collect();
    let columns: Vec<String> = brands.iter().map(|b| format!("q12b_{}", b)).collect();

    let mut entities: Vec<String> = Vec::with_capacity(sections.len());
    let mut values: Vec<Vec<Option<f64>>> = Vec::with_capacity(sections.len());
    let mut counts: Vec<Vec<Option<u64>>> = Vec::with_capacity(sections.len());
    for section in &sections {
        let mut row: Vec<Option<f64>> = Vec::with_capacity(brands.len());
        let mut row_counts: Vec<Option<u64>> = Vec::with_capacity(brands.len());
        for brand in &brands {
            match measured.get(&(*section, *brand)) {
                Some((nps, base)) => {
                    row.push(Some(*nps));
                    row_counts.push(Some(*base));
                }
                None => {
                    row.push(None);
                    row_counts.push(None);
                }
            }
        }
        entities.push(section.to_string());
        values.push(row);
        counts.push(row_counts);
    }

    let scores = ScoresTable {
        entity_label: "Q No.".to_string(),
        entities,
        columns: columns.clone(),
        values,
    };
    let bases = BaseCounts { columns, counts };
    annotate_comparisons(scores, &bases, &ref_col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    fn table(columns: &[&str], rows: &[&[Option<f64>]]) -> ResponseTable {
        let names: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let mut builder = Builder::new(&names).unwrap();
        for row in rows {
            builder.add_numeric_row(row).unwrap();
        }
        builder.build()
    }

    fn single_scores(columns: &[&str], values: &[Option<f64>]) -> ScoresTable {
        ScoresTable {
            entity_label: "Paper".to_string(),
            entities: vec!["Overall".to_string()],
            columns: columns.iter().map(|c| c.to_string()).collect(),
            values: vec![values.to_vec()],
        }
    }

    fn single_bases(columns: &[&str], counts: &[Option<u64>]) -> BaseCounts {
        BaseCounts {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            counts: vec![counts.to_vec()],
        }
    }

    #[test]
    fn significance_sixty_forty() {
        // se = sqrt(60*40/100 + 40*60/100) = sqrt(48)
        let t = significance_test(60.0, 40.0, 100, 100);
        assert_eq!(t.se, 6.93);
        assert_eq!(t.z, Some(2.89));
        assert_eq!(t.verdict, Verdict::Significant);
    }

    #[test]
    fn significance_below_threshold() {
        // z = 10 / 7 = 1.43, inside the 95% band
        let t = significance_test(50.0, 40.0, 100, 100);
        assert_eq!(t.z, Some(1.43));
        assert_eq!(t.verdict, Verdict::NotSignificant);
    }

    #[test]
    fn significance_zero_bases() {
        let t = significance_test(60.0, 40.0, 0, 0);
        assert_eq!(t.se, 0.0);
        assert_eq!(t.z, None);
        assert_eq!(t.verdict, Verdict::NotSignificant);
    }

    #[test]
    fn significance_degenerate_proportions() {
        // p=100 and p=0 both zero out their term.
        let t = significance_test(100.0, 0.0, 80, 80);
        assert_eq!(t.se, 0.0);
        assert_eq!(t.z, None);
        assert_eq!(t.verdict, Verdict::NotSignificant);
    }

    #[test]
    fn annotator_low_base_wins_over_scores() {
        let scores = single_scores(&["q7_3", "q7_1"], &[Some(90.0), Some(10.0)]);
        let bases = single_bases(&["q7_3", "q7_1"], &[Some(30), Some(100)]);
        let out = annotate_comparisons(scores, &bases, "q7_3");
        assert_eq!(out.comparisons.len(), 1);
        assert_eq!(out.comparisons[0].cells, vec![ComparisonCell::LowBase]);
    }

    #[test]
    fn annotator_missing_base_is_low_base() {
        let scores = single_scores(&["q7_3", "q7_1"], &[Some(50.0), Some(50.0)]);
        let bases = single_bases(&["q7_3", "q7_1"], &[Some(100), None]);
        let out = annotate_comparisons(scores, &bases, "q7_3");
        assert_eq!(out.comparisons[0].cells, vec![ComparisonCell::LowBase]);
    }

    #[test]
    fn annotator_missing_score_is_insufficient() {
        let scores = single_scores(&["q7_3", "q7_1"], &[Some(50.0), None]);
        let bases = single_bases(&["q7_3", "q7_1"], &[Some(100), Some(100)]);
        let out = annotate_comparisons(scores, &bases, "q7_3");
        assert_eq!(
            out.comparisons[0].cells,
            vec![ComparisonCell::InsufficientBase]
        );
    }

    #[test]
    fn annotator_absent_reference_column_suppresses_everything() {
        let scores = single_scores(&["q7_1", "q7_2"], &[Some(50.0), Some(60.0)]);
        let bases = single_bases(&["q7_1", "q7_2"], &[Some(100), Some(100)]);
        let out = annotate_comparisons(scores, &bases, "q7_3");
        // Both columns are compared against the missing reference.
        assert_eq!(out.comparisons.len(), 2);
        for block in &out.comparisons {
            assert_eq!(block.cells, vec![ComparisonCell::LowBase]);
        }
    }

    #[test]
    fn annotator_column_count_invariant() {
        let scores = single_scores(
            &["q7_1", "q7_2", "q7_3"],
            &[Some(10.0), Some(20.0), Some(30.0)],
        );
        let bases = single_bases(&["q7_1", "q7_2", "q7_3"], &[Some(50), Some(50), Some(50)]);
        let out = annotate_comparisons(scores, &bases, "q7_3");
        assert_eq!(out.derived_column_count(), 3 * 2);
    }

    #[test]
    fn nps_rating_scenario() {
        // 9, 9, 10 promote; 0 and 5 detract.
        let rows: Vec<&[Option<f64>]> = vec![
            &[Some(9.0)],
            &[Some(9.0)],
            &[Some(10.0)],
            &[Some(0.0)],
            &[Some(5.0)],
        ];
        let t = table(&["q7_3"], &rows);
        let out = overall_nps(&t, "q7_3").unwrap();
        assert_eq!(out.scores.get(0, "q7_3"), Some(20.0));
        assert_eq!(out.comparisons.len(), 0);
    }

    #[test]
    fn nps_bounds() {
        let all_tens: Vec<&[Option<f64>]> = vec![&[Some(10.0)]; 4];
        let t = table(&["q7_3"], &all_tens);
        assert_eq!(
            overall_nps(&t, "q7_3").unwrap().scores.get(0, "q7_3"),
            Some(100.0)
        );

        let all_threes: Vec<&[Option<f64>]> = vec![&[Some(3.0)]; 4];
        let t = table(&["q7_3"], &all_threes);
        assert_eq!(
            overall_nps(&t, "q7_3").unwrap().scores.get(0, "q7_3"),
            Some(-100.0)
        );
    }

    #[test]
    fn nps_neutral_and_out_of_scale_count_in_base_only() {
        // 7, 8 are neutral; 99 (refused) is outside the scale.
        let rows: Vec<&[Option<f64>]> = vec![
            &[Some(10.0)],
            &[Some(7.0)],
            &[Some(8.0)],
            &[Some(99.0)],
            &[None],
        ];
        let t = table(&["q7_3"], &rows);
        let out = overall_nps(&t, "q7_3").unwrap();
        // 1 promoter out of 4 valid responses.
        assert_eq!(out.scores.get(0, "q7_3"), Some(25.0));
    }

    #[test]
    fn overall_nps_missing_reference() {
        let t = table(&["q7_1"], &[&[Some(9.0)]]);
        assert_eq!(
            overall_nps(&t, "q7_3"),
            Err(MetricsError::MissingReferenceColumn {
                column: "q7_3".to_string()
            })
        );
    }

    #[test]
    fn overall_nps_full_comparison() {
        // q7_3: 30 promoters + 20 detractors -> 20; q7_1: 40 + 10 -> 60.
        let mut rows: Vec<Vec<Option<f64>>> = Vec::new();
        for i in 0..50 {
            let v3 = if i < 30 { 10.0 } else { 0.0 };
            let v1 = if i < 40 { 10.0 } else { 0.0 };
            rows.push(vec![Some(v3), Some(v1)]);
        }
        let refs: Vec<&[Option<f64>]> = rows.iter().map(|r| r.as_slice()).collect();
        let t = table(&["q7_3", "q7_1"], &refs);
        let out = overall_nps(&t, "q7_3").unwrap();
        assert_eq!(out.scores.get(0, "q7_3"), Some(20.0));
        assert_eq!(out.scores.get(0, "q7_1"), Some(60.0));
        // se = sqrt(20*80/50 + 60*40/50) = sqrt(80), z = -40/8.944
        assert_eq!(
            out.comparisons[0].cells[0],
            ComparisonCell::Tested {
                diff: -40.0,
                z: Some(-4.47),
                verdict: Verdict::Significant,
            }
        );
    }

    #[test]
    fn overall_nps_is_idempotent() {
        let rows: Vec<&[Option<f64>]> = vec![&[Some(9.0), Some(2.0)], &[Some(4.0), None]];
        let t = table(&["q7_3", "q7_1"], &rows);
        let first = overall_nps(&t, "q7_3").unwrap();
        let second = overall_nps(&t, "q7_3").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn tom_share_scenario() {
        // 50 / 30 / 20 mentions across 100 respondents.
        let mut rows: Vec<Vec<Option<f64>>> = Vec::new();
        for i in 0..100 {
            let code = if i < 50 {
                1.0
            } else if i < 80 {
                2.0
            } else {
                3.0
            };
            rows.push(vec![Some(code)]);
        }
        let refs: Vec<&[Option<f64>]> = rows.iter().map(|r| r.as_slice()).collect();
        let t = table(&["q5a_1"], &refs);
        let out = top_of_mind(&t, "1").unwrap();
        assert_eq!(out.rows.len(), 5);
        assert_eq!(out.rows[0].label, TomLabel::Brand("1".to_string()));
        assert_eq!(out.rows[0].value, 50.0);
        assert_eq!(out.rows[0].test, None);
        assert_eq!(
            out.rows[3].label,
            TomLabel::Difference {
                reference: "1".to_string(),
                other: "2".to_string()
            }
        );
        assert_eq!(out.rows[3].value, 20.0);
        // se = sqrt(50*50/100 + 30*70/100) = sqrt(46), z = 20/6.78 = 2.95
        assert_eq!(
            out.rows[3].test,
            Some(TomSignificance::Tested {
                z: Some(2.95),
                verdict: Verdict::Significant,
            })
        );
        assert_eq!(out.rows[4].value, 30.0);
    }

    #[test]
    fn tom_low_base_suppresses_tests() {
        let rows: Vec<&[Option<f64>]> = vec![&[Some(1.0)], &[Some(1.0)], &[Some(2.0)]];
        let t = table(&["q5a_brand1"], &rows);
        let out = top_of_mind(&t, "1").unwrap();
        let diff_row = out
            .rows
            .iter()
            .find(|r| matches!(r.label, TomLabel::Difference { .. }))
            .unwrap();
        assert_eq!(diff_row.test, Some(TomSignificance::LowBase));
    }

    #[test]
    fn tom_unobserved_reference_is_empty() {
        let rows: Vec<&[Option<f64>]> = vec![&[Some(1.0)], &[Some(2.0)]];
        let t = table(&["q5a_1"], &rows);
        assert!(top_of_mind(&t, "9").unwrap().is_empty());
    }

    #[test]
    fn tom_no_valid_responses_is_empty() {
        let rows: Vec<&[Option<f64>]> = vec![&[None], &[None]];
        let t = table(&["q5a_1"], &rows);
        assert!(top_of_mind(&t, "1").unwrap().is_empty());
    }

    #[test]
    fn tom_missing_column_fails() {
        let t = table(&["q7_1"], &[&[Some(1.0)]]);
        assert_eq!(top_of_mind(&t, "1"), Err(MetricsError::MissingTomColumn));
    }

    #[test]
    fn imagery_association_rates() {
        // 4 respondents rate brand 3; imagery hits on 2 of them.
        let rows: Vec<&[Option<f64>]> = vec![
            &[Some(9.0), Some(1.0)],
            &[Some(5.0), Some(0.0)],
            &[Some(7.0), Some(2.0)],
            &[Some(8.0), None],
        ];
        let t = table(&["q7_3", "q6a.1.3"], &rows);
        let bases: HashMap<String, u64> = [("q7_3".to_string(), 50u64)].into_iter().collect();
        let out = imagery(&t, &bases, "q7_3").unwrap();
        assert_eq!(out.entities(), &["q6a.1".to_string()]);
        assert_eq!(out.scores.get(0, "q7_3"), Some(50.0));
    }

    #[test]
    fn imagery_missing_attribute_column_is_null() {
        let rows: Vec<&[Option<f64>]> = vec![&[Some(9.0), Some(8.0), Some(1.0)]];
        // Question 2 has an attribute column for brand 1 only.
        let t = table(&["q7_3", "q7_1", "q6a.2.1"], &rows);
        let bases: HashMap<String, u64> = [
            ("q7_3".to_string(), 50u64),
            ("q7_1".to_string(), 50u64),
        ]
        .into_iter()
        .collect();
        let out = imagery(&t, &bases, "q7_3").unwrap();
        assert_eq!(out.scores.get(0, "q7_3"), None);
        assert_eq!(out.scores.get(0, "q7_1"), Some(100.0));
        // The comparison cell against the reference is insufficient data.
        assert_eq!(
            out.comparisons[0].cells,
            vec![ComparisonCell::InsufficientBase]
        );
    }

    #[test]
    fn imagery_skips_out_of_range_questions() {
        let rows: Vec<&[Option<f64>]> = vec![&[Some(9.0), Some(1.0), Some(1.0)]];
        let t = table(&["q7_3", "q6a.19.3", "q6a.18.3"], &rows);
        let bases: HashMap<String, u64> = HashMap::new();
        let out = imagery(&t, &bases, "q7_3").unwrap();
        assert_eq!(out.entities(), &["q6a.18".to_string()]);
    }

    #[test]
    fn segmented_rows_in_first_appearance_order() {
        let names = vec!["q7_3".to_string(), "gender".to_string()];
        let mut builder = Builder::new(&names).unwrap();
        for (rating, gender) in [
            (10.0, "Female"),
            (0.0, "Male"),
            (10.0, "Female"),
            (9.0, "Male"),
        ] {
            builder
                .add_row(vec![
                    Datum::Number(rating),
                    Datum::Text(gender.to_string()),
                ])
                .unwrap();
        }
        let t = builder.build();
        let out = segmented_nps(&t, "gender").unwrap();
        assert_eq!(
            out.entities(),
            &["Female".to_string(), "Male".to_string()]
        );
        assert_eq!(out.scores.get(0, "q7_3"), Some(100.0));
        assert_eq!(out.scores.get(1, "q7_3"), Some(0.0));
        assert!(out.comparisons.is_empty());
    }

    #[test]
    fn segmented_small_groups_are_low_base() {
        let rows: Vec<&[Option<f64>]> = vec![
            &[Some(10.0), Some(2.0), Some(1.0)],
            &[Some(3.0), Some(9.0), Some(2.0)],
        ];
        let t = table(&["q7_3", "q7_1", "seg"], &rows);
        let out = segmented_nps(&t, "seg").unwrap();
        assert_eq!(out.entities().len(), 2);
        assert_eq!(out.comparisons.len(), 1);
        assert_eq!(
            out.comparisons[0].cells,
            vec![ComparisonCell::LowBase, ComparisonCell::LowBase]
        );
    }

    #[test]
    fn segmented_requires_fixed_reference() {
        let rows: Vec<&[Option<f64>]> = vec![&[Some(10.0), Some(1.0)]];
        let t = table(&["q7_1", "seg"], &rows);
        assert_eq!(
            segmented_nps(&t, "seg"),
            Err(MetricsError::MissingReferenceColumn {
                column: "q7_3".to_string()
            })
        );
    }

    #[test]
    fn segmented_requires_grouping_column() {
        let rows: Vec<&[Option<f64>]> = vec![&[Some(10.0)]];
        let t = table(&["q7_3"], &rows);
        assert_eq!(
            segmented_nps(&t, "gender"),
            Err(MetricsError::MissingSegmentColumn {
                column: "gender".to_string()
            })
        );
    }

    #[test]
    fn sectional_pivot_shape() {
        let mut rows: Vec<Vec<Option<f64>>> = Vec::new();
        for _ in 0..50 {
            rows.push(vec![Some(10.0), Some(10.0), Some(10.0), Some(0.0)]);
        }
        let refs: Vec<&[Option<f64>]> = rows.iter().map(|r| r.as_slice()).collect();
        // Section 11 is beyond the default maximum and must vanish.
        let t = table(
            &["q12b_1_1", "q12b_3_1", "q12b_3_2", "q12b_3_11"],
            &refs,
        );
        let out = sectional_nps(&t, "q12b_3", DEFAULT_MAX_SECTION);
        assert_eq!(out.entities(), &["1".to_string(), "2".to_string()]);
        assert_eq!(
            out.scores.columns,
            vec!["q12b_1".to_string(), "q12b_3".to_string()]
        );
        assert_eq!(out.scores.get(0, "q12b_1"), Some(100.0));
        assert_eq!(out.scores.get(1, "q12b_3"), Some(100.0));
        // Brand 1 was not measured for section 2.
        assert_eq!(out.scores.get(1, "q12b_1"), None);
        assert_eq!(out.comparisons.len(), 1);
        // Identical scores of 100 zero out the standard error.
        assert_eq!(
            out.comparisons[0].cells[0],
            ComparisonCell::Tested {
                diff: 0.0,
                z: None,
                verdict: Verdict::NotSignificant,
            }
        );
        assert_eq!(out.comparisons[0].cells[1], ComparisonCell::LowBase);
    }

    #[test]
    fn sectional_no_columns_is_empty() {
        let t = table(&["q7_3"], &[&[Some(9.0)]]);
        let out = sectional_nps(&t, "q12b_3", DEFAULT_MAX_SECTION);
        assert!(out.is_empty());
    }

    #[test]
    fn verdict_labels() {
        assert_eq!(Verdict::Significant.to_string(), "Significant");
        assert_eq!(Verdict::NotSignificant.to_string(), "Not Significant");
    }
}
