//! Content gates and shared cell/row helpers.
//!
//! Other Companies House forms carry their own "Section B" headings, so a
//! plausible-looking extraction can still be the wrong form entirely. These
//! checks run on recovered content, not on page headers.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::ActivityRecord;
use crate::patterns;

/// True when any recovered record carries IN01 registration-form content.
pub fn is_wrong_section(records: &[ActivityRecord]) -> bool {
    records.iter().any(|record| {
        let combined = format!("{} {}", record.activity, record.benefit);
        patterns::matches_any(&combined, &patterns::WRONG_SECTION)
    })
}

/// Combined text plus records must look like Section B at all: at least one
/// of the expected content markers, once there is enough text to judge.
pub fn looks_like_cic36(records: &[ActivityRecord], text: &str) -> bool {
    let mut combined = text.to_string();
    for record in records {
        combined.push(' ');
        combined.push_str(&record.activity);
        combined.push(' ');
        combined.push_str(&record.benefit);
    }

    if patterns::matches_any(&combined, &patterns::WRONG_SECTION) {
        return false;
    }

    let markers = patterns::CIC36_CONTENT_MARKERS
        .iter()
        .filter(|pattern| pattern.is_match(&combined))
        .count();

    markers >= 1 || combined.chars().count() <= 100
}

/// Records that only point at an attachment carry no content of their own.
pub fn is_referential(records: &[ActivityRecord]) -> bool {
    records.iter().any(|record| {
        let combined = format!(
            "{} {}",
            record.activity.to_lowercase(),
            record.benefit.to_lowercase()
        );
        patterns::matches_any(&combined, &patterns::REFERENTIAL)
            && combined.trim().chars().count() < 300
    })
}

pub fn is_header_or_instruction(text: &str) -> bool {
    if text.trim().is_empty() {
        return true;
    }
    let lower = text.to_lowercase();
    let trimmed = lower.trim();
    patterns::CELL_HEADER
        .iter()
        .any(|pattern| matches_at_start(pattern, trimmed))
        || patterns::matches_any(trimmed, &patterns::CELL_INSTRUCTION)
}

// Header keywords only count when the cell opens with them; a data cell
// mentioning "community" mid-sentence is content, not a header.
fn matches_at_start(pattern: &Regex, text: &str) -> bool {
    pattern
        .find(text)
        .map(|found| found.start() == 0)
        .unwrap_or(false)
}

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("pattern must compile"));

/// Collapse whitespace and drop multi-character OCR artifacts.
pub fn clean_cell_text(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };

    let mut text = value.replace('\u{0000}', "");
    for artifact in patterns::OCR_ARTIFACTS {
        if artifact.chars().count() > 1 {
            text = text.replace(artifact, "");
        }
    }
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Drop records whose (activity, benefit) pair repeats; table content that
/// spans pages gets extracted twice. Prefix mode compares the first 100
/// characters so OCR variation between reads still deduplicates.
pub fn deduplicate(records: Vec<ActivityRecord>, use_prefix: bool) -> Vec<ActivityRecord> {
    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::new();

    for record in records {
        let key = if use_prefix {
            (
                prefix_lower(&record.activity, 100),
                prefix_lower(&record.benefit, 100),
            )
        } else {
            (record.activity.to_lowercase(), record.benefit.to_lowercase())
        };

        if (!record.activity.is_empty() || !record.benefit.is_empty()) && seen.insert(key) {
            unique.push(record);
        }
    }

    unique
}

fn prefix_lower(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect::<String>().to_lowercase()
}

/// Index of the header row: the first row where two or more header keywords
/// appear across the joined cells.
pub fn find_header_row(rows: &[Vec<String>]) -> Option<usize> {
    rows.iter().position(|row| {
        let joined = row.join(" ").to_lowercase();
        patterns::HEADER_ROW_KEYWORDS
            .iter()
            .filter(|pattern| pattern.is_match(&joined))
            .count()
            >= 2
    })
}

/// Single-line header or form-chrome check for alternative parsing.
pub fn is_header_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    patterns::matches_any(lower.trim(), &patterns::HEADER_LINE)
}

/// True when a text block is instruction boilerplate with no real content.
pub fn is_form_instruction_only(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.chars().count() < 20 {
        return true;
    }

    let lower = trimmed.to_lowercase();
    if patterns::matches_any(&lower, &patterns::INSTRUCTION_ONLY_START) {
        return true;
    }

    let indicators = patterns::INSTRUCTION_ONLY_INDICATORS
        .iter()
        .filter(|pattern| pattern.is_match(&lower))
        .count();

    let length = lower.chars().count();
    (indicators >= 2 && length < 500) || (indicators >= 1 && length < 200)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Confidence;

    fn record(activity: &str, benefit: &str) -> ActivityRecord {
        ActivityRecord::new(activity.to_string(), benefit.to_string(), 1, Confidence::Medium)
    }

    #[test]
    fn registration_form_content_is_wrong_section() {
        let records = vec![record(
            "Proposed officers and the appointment of a secretary",
            "For a secretary who is an individual, go to Section C1",
        )];
        assert!(is_wrong_section(&records));
        assert!(!looks_like_cic36(&records, ""));
    }

    #[test]
    fn genuine_section_b_content_passes() {
        let records = vec![record(
            "Providing debt advice sessions",
            "The community will benefit from reduced financial hardship",
        )];
        assert!(!is_wrong_section(&records));
        assert!(looks_like_cic36(&records, ""));
    }

    #[test]
    fn short_attachment_reference_is_referential() {
        let records = vec![record("Please see attached appendix", "")];
        assert!(is_referential(&records));
    }

    #[test]
    fn long_content_with_reference_is_not_referential() {
        let filler = "delivering weekly training and outreach sessions across the borough ";
        let records = vec![record(
            &format!("see attached schedule for the venue list. {}", filler.repeat(5)),
            "the community will benefit from improved access to services",
        )];
        assert!(!is_referential(&records));
    }

    #[test]
    fn header_cells_are_rejected() {
        assert!(is_header_or_instruction("Activities"));
        assert!(is_header_or_instruction("How will the activity benefit the community?"));
        assert!(is_header_or_instruction("CIC 36 continuation"));
        assert!(!is_header_or_instruction("Operating a food bank in Leeds"));
    }

    #[test]
    fn header_row_needs_two_keywords() {
        let rows = vec![
            vec!["COMPANY NAME".to_string(), "Example CIC".to_string()],
            vec![
                "Activities".to_string(),
                "How will the activity benefit the community?".to_string(),
            ],
            vec!["Running a cafe".to_string(), "Local jobs".to_string()],
        ];
        assert_eq!(find_header_row(&rows), Some(1));
    }

    #[test]
    fn duplicate_rows_collapse() {
        let records = vec![
            record("Running a cafe", "Local jobs"),
            record("running a cafe", "local jobs"),
            record("Teaching IT skills", "Digital inclusion"),
        ];
        let unique = deduplicate(records, false);
        assert_eq!(unique.len(), 2);
    }

    #[test]
    fn cell_cleaning_strips_artifacts() {
        assert_eq!(
            clean_cell_text(Some("  Running \u{0000} a *** cafe \n open ")),
            "Running a cafe open"
        );
        assert_eq!(clean_cell_text(None), "");
    }
}
