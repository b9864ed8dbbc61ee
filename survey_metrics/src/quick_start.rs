/*!

# Quick start

This example runs one survey file end to end with the `npstab` command line
tool. The input is a table of raw responses: one row per respondent, one
column per question.

**Preparing the data** Export your fieldwork data as a CSV (or Excel) file
with the question codes in the first row. A minimal file could look like
this:

```text
q5a_1,q7_1,q7_3,q6a.1.3,q12b_3_1
3,8,10,1,9
1,5,9,0,10
3,7,10,1,
```

The column names matter: `q7_<brand>` columns are the 11-point rating
questions feeding the NPS computations, `q5a_1` is the first-mention brand
code, `q6a.<question>.<brand>` are the imagery attributes and
`q12b.<brand>.<section>` the sectional ratings. See the
[manual](../manual/index.html#column-conventions) for the full conventions.

**Running the analysis** Point `npstab` at the file:

```bash
npstab -i responses.csv
```

You should see the computed tables in the logs:

```text
[2023-02-12T10:04:31Z INFO  survey_metrics] overall_nps: 2 rating columns, reference q7_3
[2023-02-12T10:04:31Z INFO  survey_metrics] top_of_mind: 3 codes across 3 valid responses
[2023-02-12T10:04:31Z INFO  survey_metrics] imagery: 1 attribute questions across 2 rating columns
```

**Exporting the results** The full summary (scores, base sizes, pairwise
differences, z-scores and significance verdicts) is printed as JSON and can
be written to a file with the `--out` flag:

```bash
npstab -i responses.csv --out summary.json
```

Comparison cells backed by fewer than 45 respondents are reported as `LB`
(low base), following the usual market-research convention, and are never
tested for significance.

To go further:
- the `--config` flag accepts a JSON file that selects the reference brand,
  adds respondent segments and filters, and maps question codes to display
  labels. See the [configuration section](../manual/index.html#configuration).
- `--reference` compares the produced summary against a known-good file and
  prints a diff, which is convenient for re-running historical waves.

*/
