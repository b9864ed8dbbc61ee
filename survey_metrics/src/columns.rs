// Lexer for the survey column naming conventions.
//
// All the computers go through this single parser instead of matching
// substrings ad hoc. Names are expected to be lower-cased already (the
// response table does that on entry). The conventions accept `.`, `_` and
// `/` interchangeably as separators.

/// A column name recognized as one of the survey question families.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub(crate) enum SurveyColumn {
    /// `q7_<brand>`: an 11-point rating feeding the NPS computations. The
    /// brand number is absent when the suffix is not numeric.
    Nps { brand: Option<u32> },
    /// `q5a_1` or `q5a_brand1`: the first-mention (top-of-mind) brand code.
    TopOfMind,
    /// `q6a.<question>.<brand>`: an imagery attribute rating.
    Imagery { question: u32, brand: u32 },
    /// `q12b.<brand>.<section>`: a sectional rating. Matched by prefix, so a
    /// trailing qualifier after the section number is tolerated.
    Sectional { brand: u32, section: u32 },
}

const TOM_ALIASES: [&str; 2] = ["q5a_1", "q5a_brand1"];

pub(crate) fn parse_column(name: &str) -> Option<SurveyColumn> {
    if TOM_ALIASES.contains(&name) {
        return Some(SurveyColumn::TopOfMind);
    }
    if let Some(rest) = name.strip_prefix("q7_") {
        return Some(SurveyColumn::Nps {
            brand: rest.parse::<u32>().ok(),
        });
    }
    let mut parts = name.splitn(3, is_separator);
    let family = parts.next()?;
    let first = parts.next()?;
    let second = parts.next()?;
    match family {
        "q6a" => {
            let question = parse_number(first)?;
            // The last part must be exactly the brand number.
            let brand = parse_number(second)?;
            Some(SurveyColumn::Imagery { question, brand })
        }
        "q12b" => {
            let brand = parse_number(first)?;
            let section = parse_leading_number(second)?;
            Some(SurveyColumn::Sectional { brand, section })
        }
        _ => None,
    }
}

fn is_separator(c: char) -> bool {
    c == '.' || c == '_' || c == '/'
}

fn parse_number(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u32>().ok()
}

fn parse_leading_number(s: &str) -> Option<u32> {
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    parse_number(&digits)
}
