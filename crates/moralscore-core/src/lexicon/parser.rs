//! Lexicon parsing from eMFD CSV tables and LIWC-style `.dic` files.

use std::collections::HashMap;
use std::io::Read;
use thiserror::Error;

use super::{CategoryTag, EmfdEntry};
use crate::types::{Foundation, Polarity};

/// Errors that can occur when loading a lexicon.
#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("Failed to read lexicon file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse eMFD table: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Malformed lexicon at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Lexicon contains no entries")]
    Empty,

    #[error("Built-in {0} lexicon is corrupt: {1}")]
    Builtin(&'static str, String),
}

/// eMFD table columns other than `word`, in the order they are stored.
const EMFD_COLUMNS: [&str; 10] = [
    "care_p",
    "fairness_p",
    "loyalty_p",
    "authority_p",
    "sanctity_p",
    "care_sent",
    "fairness_sent",
    "loyalty_sent",
    "authority_sent",
    "sanctity_sent",
];

/// Lowercase and collapse internal whitespace so phrases compare exactly.
pub(crate) fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse an eMFD CSV table.
///
/// Columns are located by header name, so extra columns and any column
/// order are accepted. Probabilities must lie in `[0, 1]` and sentiments in
/// `[-1, 1]`; duplicate words are rejected.
pub(crate) fn parse_emfd_csv<R: Read>(reader: R) -> Result<HashMap<String, EmfdEntry>, LexiconError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column = |name: &str| -> Result<usize, LexiconError> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| LexiconError::MissingColumn(name.to_string()))
    };

    let word_idx = column("word")?;
    let value_idx = EMFD_COLUMNS
        .iter()
        .map(|name| column(name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut entries = HashMap::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

        let word = normalize_key(record.get(word_idx).unwrap_or_default());
        if word.is_empty() {
            return Err(LexiconError::Malformed {
                line,
                reason: "empty word".to_string(),
            });
        }

        let mut values = [0.0f64; 10];
        for (slot, (&idx, name)) in values.iter_mut().zip(value_idx.iter().zip(EMFD_COLUMNS)) {
            let raw = record.get(idx).unwrap_or_default();
            let value: f64 = raw.parse().map_err(|_| LexiconError::Malformed {
                line,
                reason: format!("{} is not a number: '{}'", name, raw),
            })?;
            let (lo, hi) = if name.ends_with("_p") { (0.0, 1.0) } else { (-1.0, 1.0) };
            if !value.is_finite() || value < lo || value > hi {
                return Err(LexiconError::Malformed {
                    line,
                    reason: format!("{} = {} outside [{}, {}]", name, value, lo, hi),
                });
            }
            *slot = value;
        }

        let mut probabilities = [0.0; 5];
        let mut sentiments = [0.0; 5];
        probabilities.copy_from_slice(&values[..5]);
        sentiments.copy_from_slice(&values[5..]);

        if entries
            .insert(word.clone(), EmfdEntry { probabilities, sentiments })
            .is_some()
        {
            return Err(LexiconError::Malformed {
                line,
                reason: format!("duplicate word '{}'", word),
            });
        }
    }

    if entries.is_empty() {
        return Err(LexiconError::Empty);
    }
    Ok(entries)
}

/// Map a `.dic` category label to a tag. `Ok(None)` is the general-morality
/// category, which counts as moral without scoring a foundation.
fn parse_category_label(label: &str) -> Option<Option<CategoryTag>> {
    let lower = label.trim().to_ascii_lowercase();
    if matches!(lower.as_str(), "moralitygeneral" | "morality.general" | "general") {
        return Some(None);
    }

    let (foundation_part, polarity) = if let Some((f, p)) = lower.split_once('.') {
        let polarity = match p {
            "virtue" => Polarity::Virtue,
            "vice" => Polarity::Vice,
            _ => return None,
        };
        (f.to_string(), polarity)
    } else if let Some(f) = lower.strip_suffix("virtue") {
        (f.to_string(), Polarity::Virtue)
    } else if let Some(f) = lower.strip_suffix("vice") {
        (f.to_string(), Polarity::Vice)
    } else {
        return None;
    };

    let foundation = match foundation_part.as_str() {
        "care" | "harm" => Foundation::Care,
        "fairness" | "fair" => Foundation::Fairness,
        "loyalty" | "ingroup" => Foundation::Loyalty,
        "authority" => Foundation::Authority,
        "sanctity" | "purity" => Foundation::Sanctity,
        _ => return None,
    };

    Some(Some(CategoryTag { foundation, polarity }))
}

/// Parsed contents of a `.dic` file.
#[derive(Debug, Default)]
pub(crate) struct DicTable {
    pub exact: HashMap<String, Vec<CategoryTag>>,
    /// Wildcard stems without the trailing `*`.
    pub stems: Vec<(String, Vec<CategoryTag>)>,
}

/// Parse a LIWC-style dictionary.
///
/// ```text
/// %
/// 01	HarmVirtue
/// 11	MoralityGeneral
/// %
/// safe*	01
/// honest*	03	11
/// ```
///
/// Trailing numeric fields on a word line are category ids; everything
/// before them is the (possibly multi-word) entry.
pub(crate) fn parse_dic(text: &str) -> Result<DicTable, LexiconError> {
    let mut categories: HashMap<String, Option<CategoryTag>> = HashMap::new();
    let mut percent_seen = 0;
    let mut table = DicTable::default();
    let mut seen_words: HashMap<String, usize> = HashMap::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if line == "%" {
            percent_seen += 1;
            if percent_seen > 2 {
                return Err(LexiconError::Malformed {
                    line: line_no,
                    reason: "unexpected third '%' marker".to_string(),
                });
            }
            continue;
        }

        match percent_seen {
            0 => {
                return Err(LexiconError::Malformed {
                    line: line_no,
                    reason: "expected '%' to open the category header".to_string(),
                })
            }
            1 => {
                let mut parts = line.split_whitespace();
                let (id, label) = match (parts.next(), parts.next()) {
                    (Some(id), Some(label)) => (id, label),
                    _ => {
                        return Err(LexiconError::Malformed {
                            line: line_no,
                            reason: "category line needs an id and a label".to_string(),
                        })
                    }
                };
                let tag = parse_category_label(label).ok_or_else(|| LexiconError::Malformed {
                    line: line_no,
                    reason: format!("unknown category label '{}'", label),
                })?;
                categories.insert(canonical_id(id), tag);
            }
            _ => {
                let fields: Vec<&str> = line.split_whitespace().collect();
                let split = fields
                    .iter()
                    .rposition(|f| !f.chars().all(|c| c.is_ascii_digit()))
                    .map(|i| i + 1)
                    .unwrap_or(0);
                let (words, ids) = fields.split_at(split);
                if words.is_empty() || ids.is_empty() {
                    return Err(LexiconError::Malformed {
                        line: line_no,
                        reason: "entry needs a word and at least one category id".to_string(),
                    });
                }

                let mut tags = Vec::new();
                for id in ids {
                    let tag = categories.get(&canonical_id(id)).ok_or_else(|| {
                        LexiconError::Malformed {
                            line: line_no,
                            reason: format!("unknown category id '{}'", id),
                        }
                    })?;
                    if let Some(tag) = tag {
                        if !tags.contains(tag) {
                            tags.push(*tag);
                        }
                    }
                }

                let key = normalize_key(&words.join(" "));
                if let Some(first) = seen_words.insert(key.clone(), line_no) {
                    return Err(LexiconError::Malformed {
                        line: line_no,
                        reason: format!("duplicate entry '{}' (first at line {})", key, first),
                    });
                }

                match key.strip_suffix('*') {
                    Some(stem) if !stem.is_empty() && !stem.contains(' ') => {
                        table.stems.push((stem.to_string(), tags));
                    }
                    Some(_) => {
                        return Err(LexiconError::Malformed {
                            line: line_no,
                            reason: format!("invalid wildcard entry '{}'", key),
                        })
                    }
                    None => {
                        table.exact.insert(key, tags);
                    }
                }
            }
        }
    }

    if percent_seen < 2 {
        return Err(LexiconError::Malformed {
            line: text.lines().count(),
            reason: "category header is not closed with '%'".to_string(),
        });
    }
    if table.exact.is_empty() && table.stems.is_empty() {
        return Err(LexiconError::Empty);
    }

    // Longest stem wins when several match.
    table.stems.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
    Ok(table)
}

/// `01` and `1` name the same category.
fn canonical_id(id: &str) -> String {
    let trimmed = id.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMFD_SAMPLE: &str = "\
word,care_p,fairness_p,loyalty_p,authority_p,sanctity_p,care_sent,fairness_sent,loyalty_sent,authority_sent,sanctity_sent
Care,0.3,0.1,0.1,0.1,0.1,0.2,0.1,0.0,0.0,0.0
human  rights,0.1,0.4,0.0,0.1,0.0,0.1,0.3,0.0,0.0,0.0
";

    #[test]
    fn test_parse_emfd_csv() {
        let entries = parse_emfd_csv(EMFD_SAMPLE.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        let care = &entries["care"];
        assert_eq!(care.probabilities[0], 0.3);
        assert_eq!(care.sentiments[0], 0.2);
        assert!(entries.contains_key("human rights"));
    }

    #[test]
    fn test_emfd_column_order_is_free() {
        let csv = "\
sanctity_sent,word,care_p,fairness_p,loyalty_p,authority_p,sanctity_p,care_sent,fairness_sent,loyalty_sent,authority_sent
-0.4,sin,0.05,0.06,0.05,0.07,0.36,-0.05,-0.07,-0.05,-0.07
";
        let entries = parse_emfd_csv(csv.as_bytes()).unwrap();
        assert_eq!(entries["sin"].sentiments[4], -0.4);
        assert_eq!(entries["sin"].probabilities[4], 0.36);
    }

    #[test]
    fn test_emfd_missing_column() {
        let csv = "word,care_p\ncare,0.3\n";
        assert!(matches!(
            parse_emfd_csv(csv.as_bytes()),
            Err(LexiconError::MissingColumn(c)) if c == "fairness_p"
        ));
    }

    #[test]
    fn test_emfd_rejects_out_of_range_probability() {
        let csv = "\
word,care_p,fairness_p,loyalty_p,authority_p,sanctity_p,care_sent,fairness_sent,loyalty_sent,authority_sent,sanctity_sent
care,1.3,0.1,0.1,0.1,0.1,0.2,0.1,0.0,0.0,0.0
";
        match parse_emfd_csv(csv.as_bytes()) {
            Err(LexiconError::Malformed { line, reason }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("care_p"));
            }
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_emfd_rejects_non_numeric() {
        let csv = "\
word,care_p,fairness_p,loyalty_p,authority_p,sanctity_p,care_sent,fairness_sent,loyalty_sent,authority_sent,sanctity_sent
care,high,0.1,0.1,0.1,0.1,0.2,0.1,0.0,0.0,0.0
";
        assert!(matches!(
            parse_emfd_csv(csv.as_bytes()),
            Err(LexiconError::Malformed { .. })
        ));
    }

    #[test]
    fn test_emfd_rejects_duplicates_and_empty() {
        let header = "word,care_p,fairness_p,loyalty_p,authority_p,sanctity_p,care_sent,fairness_sent,loyalty_sent,authority_sent,sanctity_sent\n";
        let row = "care,0.3,0.1,0.1,0.1,0.1,0.2,0.1,0.0,0.0,0.0\n";
        let dup = format!("{}{}{}", header, row, row.replace("care", "CARE"));
        assert!(matches!(
            parse_emfd_csv(dup.as_bytes()),
            Err(LexiconError::Malformed { .. })
        ));
        assert!(matches!(parse_emfd_csv(header.as_bytes()), Err(LexiconError::Empty)));
    }

    #[test]
    fn test_category_labels() {
        let harm = parse_category_label("HarmVirtue").unwrap().unwrap();
        assert_eq!(harm.foundation, Foundation::Care);
        assert_eq!(harm.polarity, Polarity::Virtue);

        let ingroup = parse_category_label("IngroupVice").unwrap().unwrap();
        assert_eq!(ingroup.foundation, Foundation::Loyalty);
        assert_eq!(ingroup.polarity, Polarity::Vice);

        let sanctity = parse_category_label("sanctity.vice").unwrap().unwrap();
        assert_eq!(sanctity.foundation, Foundation::Sanctity);

        assert_eq!(parse_category_label("MoralityGeneral"), Some(None));
        assert_eq!(parse_category_label("Liberty.virtue"), None);
    }

    #[test]
    fn test_parse_dic_with_stems_and_phrases() {
        let dic = "%\n01\tHarmVirtue\n02\tHarmVice\n11\tMoralityGeneral\n%\nsafe*\t01\nharm\t02\nhonest*\t01\t11\nhuman rights\t1\nhonest\t11\n";
        let table = parse_dic(dic).unwrap();
        assert_eq!(table.exact["harm"][0].polarity, Polarity::Vice);
        assert_eq!(table.exact["human rights"].len(), 1);
        // General-only entries keep an empty tag list.
        assert!(table.exact["honest"].is_empty());
        assert_eq!(table.stems.len(), 2);
        // Longest stem first.
        assert_eq!(table.stems[0].0, "honest");
    }

    #[test]
    fn test_parse_dic_errors_name_the_line() {
        let unknown_id = "%\n1\tcare.virtue\n%\ncare\t7\n";
        assert!(matches!(
            parse_dic(unknown_id),
            Err(LexiconError::Malformed { line: 4, .. })
        ));

        let no_header = "care\t1\n";
        assert!(matches!(
            parse_dic(no_header),
            Err(LexiconError::Malformed { line: 1, .. })
        ));

        let unclosed = "%\n1\tcare.virtue\n";
        assert!(matches!(parse_dic(unclosed), Err(LexiconError::Malformed { .. })));

        let bad_label = "%\n1\tliberty.virtue\n%\nfree\t1\n";
        assert!(matches!(
            parse_dic(bad_label),
            Err(LexiconError::Malformed { line: 2, .. })
        ));

        let empty = "%\n1\tcare.virtue\n%\n";
        assert!(matches!(parse_dic(empty), Err(LexiconError::Empty)));
    }
}
