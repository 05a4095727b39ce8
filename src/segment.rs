//! Section B text segmentation.
//!
//! Everything in here operates on OCR or text-layer output that has lost
//! the table ruling: the job is to recover (activity, benefit) rows plus
//! the secondary statements from flat text. Strategies run as a cascade
//! from most to least structured, and every stage strips form boilerplate
//! before it interprets anything as content.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::config::Tuning;
use crate::model::{ActivityRecord, Confidence, RecordExtras};
use crate::patterns;
use crate::validate;

static BLANK_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n\s*\n+").expect("pattern must compile"));
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"  +").expect("pattern must compile"));
static LINE_LEAD_WS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]+").expect("pattern must compile"));
static ORPHAN_PUNCT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*[(\[\])\s]+\s*$").expect("pattern must compile"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("pattern must compile"));
static LEADING_DOTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\.{1,3}\s*").expect("pattern must compile"));
static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n+").expect("pattern must compile"));
static SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+[A-Z]").expect("pattern must compile"));

static PIPE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[|¦]").expect("pattern must compile"));
static EDGE_DASHES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"^\s*[-–—]\s*", r"\s*[-–—]\s*$"]
        .iter()
        .map(|p| Regex::new(p).expect("pattern must compile"))
        .collect()
});
static TELL_US_PAREN: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"\(Tell\s+us\s+here[^)]*\)")
        .case_insensitive(true)
        .build()
        .expect("pattern must compile")
});
static BENEFIT_PAREN: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"\(The\s+community\s+will\s+benefit[^)]*\)")
        .case_insensitive(true)
        .build()
        .expect("pattern must compile")
});
static COLUMN_HEADER_RUN: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"(?s)Activities?\s+How\s+will.*?community\s*\?")
        .case_insensitive(true)
        .build()
        .expect("pattern must compile")
});
static BENEFIT_LEAK: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"having\s+access\s+to\s+flexible.*$")
        .case_insensitive(true)
        .build()
        .expect("pattern must compile")
});
static TRAILING_STUB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+\w{1,3}\s*$").expect("pattern must compile"));
static CONTINUE_PAREN: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"\(Please\s+continue[^)]*\)")
        .case_insensitive(true)
        .build()
        .expect("pattern must compile")
});
static BENEFIT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"^The\s+community\s+will\s+benefit\s+(by\s+)?")
        .case_insensitive(true)
        .build()
        .expect("pattern must compile")
});
static LEADING_NON_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^a-zA-Z]+").expect("pattern must compile"));
static LEADING_ARTIFACT_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]\s+(The\s+company)").expect("pattern must compile"));
static TRAILING_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s.,:;]+$").expect("pattern must compile"));

/// Remove Section B instruction paragraphs, column headers, and other form
/// chrome, then tidy the whitespace the removals leave behind.
pub fn strip_boilerplate(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut cleaned = patterns::strip_all(text, &patterns::SECTION_B_BOILERPLATE);
    cleaned = BLANK_RUNS.replace_all(&cleaned, "\n\n").into_owned();
    cleaned = MULTI_SPACE.replace_all(&cleaned, " ").into_owned();
    cleaned = LINE_LEAD_WS.replace_all(&cleaned, "").into_owned();
    cleaned = ORPHAN_PUNCT_LINE.replace_all(&cleaned, "").into_owned();
    cleaned.trim().to_string()
}

fn slice_between(text: &str, starts: &[Regex], ends: &[Regex]) -> Option<String> {
    for start in starts {
        if let Some(found) = start.find(text) {
            let remaining = &text[found.end()..];
            let cut = ends
                .iter()
                .find_map(|pattern| pattern.find(remaining).map(|m| m.start()))
                .unwrap_or(remaining.len());
            return Some(remaining[..cut].trim().to_string());
        }
    }
    None
}

/// "Our company differs from a general commercial company because..."
pub fn extract_company_differs(text: &str) -> String {
    let Some(content) = slice_between(
        text,
        &patterns::COMPANY_DIFFERS_START,
        &patterns::COMPANY_DIFFERS_END,
    ) else {
        return String::new();
    };

    let collapsed = WHITESPACE.replace_all(&content, " ");
    LEADING_DOTS.replace(&collapsed, "").trim().to_string()
}

/// "If the company makes any surplus it will be used for..."
pub fn extract_surplus_use(text: &str, tuning: &Tuning) -> String {
    let Some(content) = slice_between(text, &patterns::SURPLUS_START, &patterns::SURPLUS_END)
    else {
        return String::new();
    };

    let mut cleaned = WHITESPACE.replace_all(&content, " ").into_owned();
    cleaned = LEADING_DOTS.replace(&cleaned, "").into_owned();
    cleaned = patterns::strip_all(&cleaned, &patterns::SURPLUS_BOILERPLATE);
    cleaned = patterns::strip_all(&cleaned, &patterns::SURPLUS_TRAILING);
    cleaned = patterns::strip_all(&cleaned, &patterns::SURPLUS_UPPER_GARBAGE);
    let mut cleaned = cleaned.trim().to_string();

    // Genuine surplus statements are a sentence or two; anything longer is
    // activity content bleeding through the form boundary.
    if cleaned.chars().count() > tuning.max_surplus_length {
        let truncated: String = cleaned.chars().take(tuning.max_surplus_length).collect();
        let last_stop = truncated
            .rfind(['.', '!', '?'])
            .filter(|position| *position > 50);
        if let Some(position) = last_stop {
            cleaned = truncated[..=position].to_string();
        }
    }

    cleaned
}

/// Section A beneficiaries: the content that follows the declaration
/// boilerplate, up to the Section B header.
pub fn extract_beneficiaries(text: &str) -> String {
    let content = slice_between(
        text,
        &patterns::BENEFICIARIES_BOILERPLATE_END,
        &patterns::BENEFICIARIES_SECTION_END,
    )
    .or_else(|| {
        slice_between(
            text,
            &patterns::BENEFICIARIES_FALLBACK_START,
            &patterns::BENEFICIARIES_SECTION_END,
        )
    });

    let Some(content) = content else {
        return String::new();
    };

    let mut cleaned = WHITESPACE.replace_all(&content, " ").into_owned();
    cleaned = LEADING_DOTS.replace(&cleaned, "").into_owned();
    cleaned = LEADING_ARTIFACT_LETTER.replace(&cleaned, "$1").into_owned();
    cleaned = LEADING_NON_LETTER.replace(&cleaned, "").into_owned();
    cleaned = patterns::strip_all(cleaned.trim(), &patterns::BENEFICIARIES_TRAILING);
    cleaned = TRAILING_PUNCT.replace(&cleaned, "").into_owned();
    cleaned = patterns::strip_all(&cleaned, &patterns::BENEFICIARIES_PREFIX);
    cleaned.trim().to_string()
}

/// Electronic-path beneficiaries: the prefix itself marks the start.
pub fn extract_beneficiaries_from_text(text: &str) -> String {
    let Some(content) = slice_between(
        text,
        &patterns::BENEFICIARIES_TEXT_START,
        &patterns::BENEFICIARIES_SECTION_END,
    ) else {
        return String::new();
    };

    let mut cleaned = WHITESPACE.replace_all(&content, " ").into_owned();
    cleaned = LEADING_DOTS.replace(&cleaned, "").into_owned();
    cleaned = patterns::strip_all(cleaned.trim(), &patterns::BENEFICIARIES_TRAILING);
    cleaned = patterns::strip_all(&cleaned, &patterns::BENEFICIARIES_PREFIX);
    cleaned.trim().to_string()
}

/// Parse linear OCR text into activity records.
///
/// Cascade: locate the table body between the column headers and the
/// Section C boundary, scrub instruction text, then try increasingly loose
/// row recovery until something yields records.
pub fn parse_linear(text: &str, tuning: &Tuning) -> Vec<ActivityRecord> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    // Secondary statements come off the raw text; the boilerplate strip
    // removes the unfilled-field variant of their marker phrases.
    let company_differs = extract_company_differs(text);
    let surplus_use = extract_surplus_use(text, tuning);

    let raw = text;
    let text = strip_boilerplate(text);

    let mut body_start = 0usize;
    for pattern in patterns::HEADER_END.iter() {
        if let Some(found) = pattern.find(&text) {
            body_start = body_start.max(found.end());
        }
    }
    if body_start == 0 {
        body_start = patterns::first_end(&text, &patterns::HEADER_END_SIMPLE).unwrap_or(0);
    }

    let section = &text[body_start..];
    let section_end = patterns::earliest_start(section, &patterns::SECTION_B_END_MARKERS)
        .unwrap_or(section.len());
    let section = &section[..section_end];

    let mut cleaned = patterns::strip_all(section, &patterns::FORM_INSTRUCTIONS);
    cleaned = cleaned
        .lines()
        .filter(|line| !patterns::matches_any(line.trim(), &patterns::INSTRUCTION_FRAGMENTS))
        .collect::<Vec<_>>()
        .join("\n");

    let mut records = parse_two_column(&cleaned, raw, tuning);

    if records.is_empty() {
        records = split_into_rows(&cleaned);
    }
    if records.is_empty() {
        records = parse_single_entry(&cleaned);
    }

    attach_extras(&mut records, company_differs, surplus_use);
    records
}

fn attach_extras(records: &mut Vec<ActivityRecord>, company_differs: String, surplus_use: String) {
    if company_differs.is_empty() && surplus_use.is_empty() {
        return;
    }

    if let Some(first) = records.first_mut() {
        let extras = first.extras_mut();
        if extras.company_differs.is_none() && !company_differs.is_empty() {
            extras.company_differs = Some(company_differs);
        }
        if extras.surplus_use.is_none() && !surplus_use.is_empty() {
            extras.surplus_use = Some(surplus_use);
        }
    } else {
        // Secondary statements without a recoverable table still carry value.
        let mut record = ActivityRecord::new(String::new(), String::new(), 0, Confidence::Low);
        *record.extras_mut() = RecordExtras {
            company_differs: (!company_differs.is_empty()).then_some(company_differs),
            surplus_use: (!surplus_use.is_empty()).then_some(surplus_use),
            beneficiaries: None,
        };
        records.push(record);
    }
}

/// Two-column table content read across the gap by linear OCR: first try
/// line-by-line separation, then benefit-marker splitting.
fn parse_two_column(text: &str, full_text: &str, tuning: &Tuning) -> Vec<ActivityRecord> {
    if text.trim().chars().count() < 50 {
        return Vec::new();
    }

    let interleaved = parse_interleaved(text, full_text, tuning);
    if !interleaved.is_empty() {
        return interleaved;
    }

    if !patterns::matches_any(text, &patterns::TABLE_BENEFIT_MARKERS) {
        return Vec::new();
    }

    let marks: Vec<regex::Match> = patterns::BENEFIT_SPLIT.find_iter(text).collect();
    if marks.is_empty() {
        return Vec::new();
    }

    let mut records = Vec::new();
    let mut cursor = 0usize;
    for (index, mark) in marks.iter().enumerate() {
        let activity = text[cursor..mark.start()].trim();
        let benefit_end = marks
            .get(index + 1)
            .map(|next| next.start())
            .unwrap_or(text.len());
        let benefit = text[mark.end()..benefit_end].trim();

        let activity_clean = clean_activity_text(activity);
        let benefit_clean = clean_benefit_text(benefit);
        if !activity_clean.is_empty() || !benefit_clean.is_empty() {
            records.push(ActivityRecord::new(
                activity_clean,
                benefit_clean,
                0,
                Confidence::Medium,
            ));
        }
        cursor = benefit_end;
    }

    if records.len() == 1 {
        let split = try_split_single(&records[0]);
        if !split.is_empty() {
            return split;
        }
    }

    records
}

/// Line-by-line column separation for interleaved OCR reads: pipes and
/// benefit phrases mark where the right column starts on each line.
fn parse_interleaved(text: &str, full_text: &str, tuning: &Tuning) -> Vec<ActivityRecord> {
    let mut start = 0usize;
    for pattern in patterns::INTERLEAVED_TABLE_START.iter() {
        if let Some(found) = pattern.find(text) {
            start = start.max(found.end());
        }
    }

    let table = &text[start..];
    let end = patterns::earliest_start(table, &patterns::INTERLEAVED_TABLE_END)
        .unwrap_or(table.len());
    let table = &table[..end];

    let company_differs = extract_company_differs(full_text);
    let surplus_use = extract_surplus_use(full_text, tuning);

    if table.trim().chars().count() < 30 {
        let mut records = Vec::new();
        attach_extras(&mut records, company_differs, surplus_use);
        return records;
    }

    let mut left_column: Vec<String> = Vec::new();
    let mut right_column: Vec<String> = Vec::new();

    for line in table.lines() {
        let line = line.trim();
        if line.chars().count() < 5 {
            continue;
        }

        if line.contains('|') {
            let mut parts = line.splitn(2, '|');
            if let (Some(left), Some(right)) = (parts.next(), parts.next()) {
                left_column.push(left.trim().to_string());
                right_column.push(right.trim().to_string());
                continue;
            }
        }

        if let Some(caps) = patterns::INTERLEAVED_BENEFIT_MID.captures(line) {
            let left = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            let right = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
            if left.chars().count() > 5 {
                left_column.push(left.to_string());
            }
            if right.chars().count() > 5 {
                right_column.push(right.to_string());
            }
            continue;
        }

        if let Some(caps) = patterns::INTERLEAVED_BENEFIT_HINT.captures(line) {
            let left = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            if let Some(right_start) = caps.get(2).map(|m| m.start()) {
                left_column.push(left.to_string());
                right_column.push(line[right_start..].trim().to_string());
                continue;
            }
        }

        // No separator on this line; route by content.
        if patterns::RIGHT_COLUMN_HINT.is_match(line) {
            right_column.push(line.to_string());
        } else {
            left_column.push(line.to_string());
        }
    }

    let activity = clean_activity_text(&left_column.join(" "));
    let mut benefit = clean_benefit_text(&right_column.join(" "));
    benefit = BENEFIT_PREFIX.replace(&benefit, "").trim().to_string();

    let mut records = Vec::new();
    if !activity.is_empty() || !benefit.is_empty() {
        records.push(ActivityRecord::new(activity, benefit, 0, Confidence::Medium));
    }
    attach_extras(&mut records, company_differs, surplus_use);
    records
}

/// Split table content at explicit row delimiters; fall back to paragraph
/// breaks when none exist.
fn split_into_rows(text: &str) -> Vec<ActivityRecord> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let prefixed = format!("\n{text}");
    let mut cut_points: Vec<usize> = patterns::ROW_DELIMITERS
        .iter()
        .flat_map(|pattern| pattern.find_iter(&prefixed).map(|found| found.start()))
        .collect();

    if cut_points.is_empty() {
        return split_by_paragraphs(text);
    }

    cut_points.sort_unstable();
    cut_points.dedup();
    cut_points.push(prefixed.len());

    let mut records = Vec::new();
    let mut previous = 0usize;
    for cut in cut_points {
        let segment = prefixed[previous..cut].trim();
        previous = cut;
        if segment.chars().count() < 20 || validate::is_form_instruction_only(segment) {
            continue;
        }

        let (activity, benefit) = extract_activity_description(segment);
        if !activity.is_empty() || !benefit.is_empty() {
            let confidence = if records.is_empty() {
                Confidence::Low
            } else {
                Confidence::Medium
            };
            records.push(ActivityRecord::new(
                clean_extracted_text(&activity),
                clean_extracted_text(&benefit),
                0,
                confidence,
            ));
        }
    }

    records
}

fn split_by_paragraphs(text: &str) -> Vec<ActivityRecord> {
    let paragraphs: Vec<&str> = PARAGRAPH_BREAK.split(text).collect();
    if paragraphs.len() <= 1 {
        return Vec::new();
    }

    let mut records = Vec::new();
    for paragraph in paragraphs {
        let paragraph = paragraph.trim();
        if paragraph.chars().count() < 30 || validate::is_form_instruction_only(paragraph) {
            continue;
        }

        let (activity, benefit) = extract_activity_description(paragraph);
        if !activity.is_empty() || !benefit.is_empty() {
            records.push(ActivityRecord::new(
                clean_extracted_text(&activity),
                clean_extracted_text(&benefit),
                0,
                Confidence::Low,
            ));
        }
    }

    records
}

/// Split one segment into (activity, benefit) at a benefit marker, or by
/// sentence midpoint when no marker exists.
fn extract_activity_description(text: &str) -> (String, String) {
    let collapsed = WHITESPACE.replace_all(text, " ").trim().to_string();

    for marker in patterns::BENEFIT_MARKERS.iter() {
        if let Some(found) = marker.find(&collapsed) {
            let activity = collapsed[..found.start()].trim().to_string();
            let benefit = collapsed[found.end()..].trim().to_string();
            return (activity, benefit);
        }
    }

    if collapsed.contains('.') {
        let sentences: Vec<&str> = collapsed.split('.').collect();
        if sentences.len() >= 2 {
            let midpoint = sentences.len() / 2;
            let mut activity = sentences[..midpoint].join(". ").trim().to_string();
            let benefit = sentences[midpoint..].join(". ").trim().to_string();
            if !activity.is_empty() && !activity.ends_with('.') {
                activity.push('.');
            }
            return (activity, benefit);
        }
    }

    (collapsed, String::new())
}

fn parse_single_entry(text: &str) -> Vec<ActivityRecord> {
    let collapsed = WHITESPACE.replace_all(text, " ").trim().to_string();
    if collapsed.chars().count() < 20 {
        return Vec::new();
    }

    let (activity, benefit) = extract_activity_description(&collapsed);
    let activity = clean_extracted_text(&activity);
    let benefit = clean_extracted_text(&benefit);

    if activity.is_empty() && benefit.is_empty() {
        return Vec::new();
    }
    if validate::is_form_instruction_only(&activity) && validate::is_form_instruction_only(&benefit)
    {
        return Vec::new();
    }

    vec![ActivityRecord::new(activity, benefit, 0, Confidence::Low)]
}

/// A single merged record sometimes holds several activities back to back;
/// split at sentence boundaries when the pieces look like distinct entries.
fn try_split_single(record: &ActivityRecord) -> Vec<ActivityRecord> {
    let sentences = split_sentences(&record.activity);
    if sentences.len() <= 1 {
        return Vec::new();
    }

    let mut records = Vec::new();
    for sentence in sentences {
        let sentence = sentence.trim();
        if sentence.chars().count() > 30 && !validate::is_form_instruction_only(sentence) {
            let benefit = if records.is_empty() {
                record.benefit.clone()
            } else {
                String::new()
            };
            records.push(ActivityRecord::new(
                sentence.to_string(),
                benefit,
                record.source_page,
                Confidence::Low,
            ));
        }
    }

    if records.len() > 1 { records } else { Vec::new() }
}

/// Sentence split at `[.!?]` followed by whitespace and a capital.
fn split_sentences(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut cursor = 0usize;
    for found in SENTENCE_BOUNDARY.find_iter(text) {
        let split_at = found.start() + 1;
        pieces.push(text[cursor..split_at].to_string());
        cursor = found.end() - 1;
    }
    pieces.push(text[cursor..].to_string());
    pieces
}

/// Last-resort parse: keep every meaningful line and bisect into a single
/// low-confidence record for manual review.
pub fn parse_alternative(text: &str) -> Vec<ActivityRecord> {
    let meaningful: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > 10 && !validate::is_header_line(line))
        .collect();

    if meaningful.is_empty() {
        return Vec::new();
    }

    let midpoint = meaningful.len() / 2;
    let mut record = ActivityRecord::new(
        meaningful[..midpoint].join(" "),
        meaningful[midpoint..].join(" "),
        0,
        Confidence::Low,
    );
    record.note = Some("Manual review recommended - OCR parsing uncertain".to_string());
    vec![record]
}

/// Clean one layout-OCR column: full boilerplate strip plus the residue
/// specific to whichever column this is.
pub fn clean_layout_column(text: &str, is_activity: bool) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut cleaned = strip_boilerplate(text);
    cleaned = patterns::strip_all(&cleaned, &patterns::LAYOUT_COMMON_CLEANUP);
    cleaned = if is_activity {
        patterns::strip_all(&cleaned, &patterns::LAYOUT_ACTIVITY_CLEANUP)
    } else {
        patterns::strip_all(&cleaned, &patterns::LAYOUT_BENEFIT_CLEANUP)
    };

    WHITESPACE.replace_all(&cleaned, " ").trim().to_string()
}

pub fn clean_activity_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut cleaned = PIPE_CHARS.replace_all(text, " ").into_owned();
    cleaned = WHITESPACE.replace_all(&cleaned, " ").into_owned();
    for pattern in EDGE_DASHES.iter() {
        cleaned = pattern.replace(&cleaned, "").into_owned();
    }
    cleaned = TELL_US_PAREN.replace_all(&cleaned, "").into_owned();
    cleaned = BENEFIT_PAREN.replace_all(&cleaned, "").into_owned();
    cleaned = COLUMN_HEADER_RUN.replace_all(&cleaned, "").into_owned();
    cleaned = BENEFIT_LEAK.replace(&cleaned, "").into_owned();
    cleaned = TRAILING_STUB.replace(&cleaned, "").into_owned();
    cleaned.trim().to_string()
}

pub fn clean_benefit_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut cleaned = PIPE_CHARS.replace_all(text, " ").into_owned();
    cleaned = WHITESPACE.replace_all(&cleaned, " ").into_owned();
    cleaned = CONTINUE_PAREN.replace_all(&cleaned, "").into_owned();
    cleaned.trim().to_string()
}

fn clean_extracted_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut cleaned = PIPE_CHARS.replace_all(text, "").into_owned();
    cleaned = WHITESPACE.replace_all(&cleaned, " ").into_owned();
    for pattern in EDGE_DASHES.iter() {
        cleaned = pattern.replace(&cleaned, "").into_owned();
    }
    cleaned = TELL_US_PAREN.replace_all(&cleaned, "").into_owned();
    cleaned = BENEFIT_PAREN.replace_all(&cleaned, "").into_owned();
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> Tuning {
        Tuning::default()
    }

    #[test]
    fn surplus_statement_is_extracted_and_capped() {
        let text = "If the company makes any surplus it will be used for \
                    reinvestment into free community sessions. Section C";
        let surplus = extract_surplus_use(text, &tuning());
        assert_eq!(surplus, "reinvestment into free community sessions.");
    }

    #[test]
    fn overlong_surplus_truncates_at_sentence_boundary() {
        let filler = "This sentence pads the surplus statement well past the cap. ";
        let text = format!(
            "If the company makes any surplus it will be used for community work. {}",
            filler.repeat(10)
        );
        let surplus = extract_surplus_use(&text, &tuning());
        assert!(surplus.chars().count() <= 300);
        assert!(surplus.ends_with('.'));
    }

    #[test]
    fn company_differs_stops_at_surplus() {
        let text = "Our company differs from a general commercial company because \
                    profits serve the community not shareholders. \
                    If the company makes any surplus it will be reinvested.";
        let differs = extract_company_differs(text);
        assert_eq!(differs, "profits serve the community not shareholders.");
    }

    #[test]
    fn beneficiaries_follow_declaration_boilerplate() {
        let text = "sections of the community which it is intended that the company \
                    will benefit below ] local families and elderly residents of Hull \
                    SECTION B: Community Interest Statement";
        assert_eq!(
            extract_beneficiaries(text),
            "local families and elderly residents of Hull"
        );
    }

    #[test]
    fn numbered_rows_split_into_records() {
        let text = "\n1. Running a weekly youth club for ages 10 to 16 in the village hall. \
                    The community will benefit by giving young people a safe space.\n\
                    2. Offering free IT training sessions for older residents. \
                    The community will benefit by reducing digital exclusion.";
        let records = split_into_rows(text);
        assert_eq!(records.len(), 2);
        assert!(records[0].activity.contains("youth club"));
        assert!(records[0].benefit.contains("safe space"));
        assert!(records[1].activity.contains("IT training"));
    }

    #[test]
    fn benefit_marker_splits_single_entry() {
        let text = "Providing subsidised sports coaching across the district. \
                    The community will benefit by improved physical and mental health.";
        let records = parse_single_entry(text);
        assert_eq!(records.len(), 1);
        assert!(records[0].activity.contains("sports coaching"));
        assert!(records[0].benefit.contains("physical and mental health"));
    }

    #[test]
    fn linear_parse_recovers_rows_and_extras() {
        let text = "SECTION B: Community Interest Statement - Activities & Related Benefit\n\
                    Activities (Please provide the day to day activities of the company)\n\
                    (The community will benefit by...)\n\
                    Running a community cafe and food bank in the town centre serving anyone in need. \
                    The community will benefit by access to affordable meals and reduced food poverty.\n\
                    Our company differs from a general commercial company because all profits are \
                    retained for the community. \
                    If the company makes any surplus it will be used for expanding the food bank. \
                    SECTION C";
        let records = parse_linear(text, &tuning());
        assert!(!records.is_empty());
        let extras = records[0].extras.as_ref().expect("extras expected");
        assert!(
            extras
                .surplus_use
                .as_deref()
                .unwrap_or("")
                .contains("expanding the food bank")
        );
        assert!(
            extras
                .company_differs
                .as_deref()
                .unwrap_or("")
                .contains("profits are")
        );
    }

    #[test]
    fn alternative_parse_bisects_meaningful_lines() {
        let text = "Activities\nrunning outreach sessions for rough sleepers\n\
                    providing hot meals and clothing\nPage 3\n\
                    the community will benefit from reduced homelessness\n\
                    volunteers gain skills and confidence";
        let records = parse_alternative(text);
        assert_eq!(records.len(), 1);
        assert!(records[0].activity.contains("outreach"));
        assert!(records[0].benefit.contains("homelessness"));
        assert!(records[0].note.is_some());
    }

    #[test]
    fn boilerplate_only_text_yields_nothing() {
        let text = "Please indicate how it is proposed that the company's activities \
                    will benefit the community";
        let records = parse_linear(text, &tuning());
        assert!(records.is_empty());
    }

    #[test]
    fn interleaved_pipe_lines_rebuild_columns() {
        let text = "is being set up to do)\n\
                    Operating a boxing gym for juniors | The community will benefit by having\n\
                    with qualified volunteer coaches | access to structured sport and mentoring\n\
                    Section C";
        let records = parse_interleaved(text, text, &tuning());
        assert_eq!(records.len(), 1);
        assert!(records[0].activity.contains("boxing gym"));
        assert!(records[0].benefit.contains("structured sport"));
        assert!(!records[0].activity.contains("mentoring"));
    }
}
