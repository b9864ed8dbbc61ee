/*!

This is the long-form manual for `survey_metrics` and `npstab`.

## Input formats

The following formats are supported:
* `csv` Comma Separated Values, question codes in the first row
* `xlsx` Excel spreadsheets (one worksheet per file)

In both cases the first row holds the column names and every following row
is one respondent. Empty cells are treated as missing responses, never as
zero. Numeric codes exported as text (`"3"` instead of `3`) are coerced when
a computation needs a number.

## Column conventions

The analyses recognize columns by their names, case-insensitively. The
separators `.`, `_` and `/` are interchangeable.

### `q7_<brand>`

An 11-point (0 to 10) rating question for one brand. These columns feed the
overall, segmented and imagery analyses. The suffix is usually the brand
number (`q7_3`); a non-numeric suffix is still treated as a rating column
but is skipped by the imagery analysis, which needs the brand number to
find the matching attribute columns.

### `q5a_1` / `q5a_brand1`

The first-mention ("top of mind") brand code. Either spelling is accepted;
the first match in column order wins.

### `q6a.<question>.<brand>`

One imagery attribute rating. Questions are numbered 1 to 18; columns with
a higher question number belong to other question families and are ignored.
A respondent is counted as associating the attribute with the brand when
the cell holds a value of 1 or more.

### `q12b.<brand>.<section>`

A newspaper-section rating. The section number may carry a trailing
qualifier (`q12b_2_7bis` reads as section 7). Sections above the configured
maximum (10 by default) are excluded.

## The analyses

All score tables follow the same shape: one row per entity (paper, segment
value, attribute question or section number), one column per brand, and for
every non-reference column three derived columns against the reference:
the score difference, the z-statistic and the significance verdict.

The test is a two-proportion z-test at the 95% confidence level (1.96).
Whenever either base size is below 45 respondents the comparison is
suppressed and rendered as `LB`; a missing score or an empty base renders
as `Insufficient base`. These markers are data, not errors: a run never
fails because one cell is too thin.

* **Overall NPS** One `Overall` row with the Net Promoter Score of every
  rating column. Promoters rate 9 or 10, detractors 0 to 6; ratings of 7
  or 8 count in the base only.
* **Top of mind** The share of first mentions per brand code, most
  mentioned first, followed by one synthesized `ref - other` difference row
  per non-reference code.
* **Imagery** The percentage of each brand's raters who associate each
  attribute with the brand.
* **Segmented NPS** One row per value of a grouping column (gender, age
  group, socio-economic class), in order of first appearance, always
  compared against `q7_3`.
* **Sectional NPS** One row per section number, one column per brand.

## Configuration

`npstab` accepts a JSON configuration file through the `--config` flag:

```javascript
{
  "dataFileSources": [
    { "path": "wave_march.csv" }
  ],
  "references": {
    "npsReference": "q7_3",
    "tomReferenceBrand": "3",
    "sectionalReference": "q12b_3",
    "maxSection": 10
  },
  "segmentColumns": ["gender", "age_group"],
  "filters": [
    { "column": "q1a", "values": ["1"] }
  ],
  "mappingsFile": "mappings.json"
}
```

* `dataFileSources` The input files. Several files are analyzed one after
  the other; each gets its own section in the summary, keyed by the
  simplified file name.
* `references` The reference column or code of every analysis. All fields
  are optional; the defaults are shown above.
* `segmentColumns` The grouping columns for the segmented analysis. The
  standard demographic columns (`gender`, `age_group`, `nccs_group`) are
  derived automatically from `q1a`, `sq1b` and `sec`/`sech_cod` when those
  source columns are present.
* `filters` Keep only the respondents whose cell in `column` matches one of
  `values`. Filters combine with AND.
* `mappingsFile` A JSON file mapping question codes to display labels (for
  example `q7_3` to the paper's name). When absent, a built-in default
  mapping is used.

## Output

The summary is a single JSON document, one object per analyzed file, one
array of row objects per analysis. Derived columns are named
`<ref>_minus_<col>`, `Z_<ref>_vs_<col>` and `Sig_<ref>_vs_<col>`.

With `--reference <file>`, the produced summary is compared against the
given file and the differences are printed, which makes regression checks
on historical waves a one-liner.

*/
