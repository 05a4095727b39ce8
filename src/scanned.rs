//! Section B extraction for scanned documents via OCR.
//!
//! `read_pages` does all the subprocess work (rasterize, recognize, layout);
//! `analyze` is pure and carries the whole decision tree: find the form,
//! find Section B, pick the parsing path, then gate the result.

use tracing::{debug, warn};

use crate::columns::{self, ColumnLayout};
use crate::config::Tuning;
use crate::model::{
    ActivityRecord, Confidence, Extraction, ExtractionMethod, FailureKind, OcrQuality,
};
use crate::patterns;
use crate::pdftools::{OcrEngine, PdfSource};
use crate::quality;
use crate::segment;
use crate::validate;

/// One candidate page after OCR.
#[derive(Debug, Clone, Default)]
pub struct OcrPage {
    pub page_number: usize,
    pub text: String,
    pub layout: ColumnLayout,
}

/// OCR every candidate page. Pages that fail to render or recognize are
/// dropped with a warning; low yield triggers a retry over the fallback DPI
/// ladder, keeping whichever resolution recovered the most text.
pub fn read_pages(
    source: &dyn PdfSource,
    ocr: &dyn OcrEngine,
    page_numbers: &[usize],
    tuning: &Tuning,
) -> Vec<OcrPage> {
    let mut pages = Vec::new();

    for &page_number in page_numbers {
        let recognize = |dpi: u32| -> Option<(String, crate::pdftools::PageImage)> {
            let image = match source.render_page(page_number, dpi) {
                Ok(image) => image,
                Err(error) => {
                    warn!(page = page_number, dpi, %error, "render failed");
                    return None;
                }
            };
            match ocr.recognize(&image) {
                Ok(text) => Some((text, image)),
                Err(error) => {
                    warn!(page = page_number, dpi, %error, "recognition failed");
                    None
                }
            }
        };

        let Some((mut text, mut image)) = recognize(tuning.ocr_dpi) else {
            continue;
        };

        if text.trim().chars().count() < tuning.min_chars_per_page {
            for dpi in tuning.retry_dpis() {
                if let Some((retry_text, retry_image)) = recognize(dpi)
                    && retry_text.trim().chars().count() > text.trim().chars().count()
                {
                    text = retry_text;
                    image = retry_image;
                }
            }
        }

        debug!(
            page = page_number,
            dpi = image.dpi,
            chars = text.trim().chars().count(),
            "page recognized"
        );
        let layout = match ocr.recognize_layout(&image) {
            Ok(recognized) => {
                columns::analyze_columns(&recognized.words, recognized.page_width, tuning)
            }
            Err(error) => {
                warn!(page = page_number, %error, "layout recognition failed");
                ColumnLayout::default()
            }
        };

        pages.push(OcrPage {
            page_number,
            text,
            layout,
        });
    }

    pages
}

pub fn extract_section_b_ocr(
    source: &dyn PdfSource,
    ocr: &dyn OcrEngine,
    page_numbers: &[usize],
    tuning: &Tuning,
) -> Extraction {
    let pages = read_pages(source, ocr, page_numbers, tuning);
    analyze(&pages, tuning)
}

/// Decide what the OCR'd pages hold and extract from them.
pub fn analyze(pages: &[OcrPage], tuning: &Tuning) -> Extraction {
    if pages.is_empty() {
        return Extraction::failed(
            ExtractionMethod::None,
            FailureKind::UnreadableInput,
            "No OCR text recovered from candidate pages".to_string(),
        );
    }

    let form_start = find_form_start(pages);
    let beneficiaries = find_beneficiaries(pages, form_start);
    let section_pages = find_section_b_pages(pages, form_start, tuning);

    if section_pages.is_empty() {
        let error = match form_start {
            Some(page) => format!(
                "CIC 36 form found on page {page} but Section B not detected on following pages"
            ),
            None => "No CIC 36 form found in document".to_string(),
        };
        return Extraction::failed(ExtractionMethod::None, FailureKind::NoCic36Form, error);
    }

    debug!(?form_start, ?section_pages, "section B pages selected");

    let section: Vec<&OcrPage> = pages
        .iter()
        .filter(|page| section_pages.contains(&page.page_number))
        .collect();
    let raw_text = section
        .iter()
        .map(|page| page.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let use_layout = section.iter().any(|page| page.layout.two_columns);
    let (mut records, mut method) = if use_layout {
        match parse_with_layout(&section, &raw_text, tuning) {
            Some(records) => (records, ExtractionMethod::OcrLayout),
            None => (
                linear_with_raw_extras(&raw_text, tuning),
                ExtractionMethod::OcrLinear,
            ),
        }
    } else {
        (
            segment::parse_linear(&raw_text, tuning),
            ExtractionMethod::OcrLinear,
        )
    };

    let first_page = section_pages.first().copied().unwrap_or(0);
    for record in &mut records {
        if record.source_page == 0 {
            record.source_page = first_page;
        }
    }

    let ocr_quality = quality::assess_quality(&raw_text);
    let handwritten = quality::is_likely_handwritten(&raw_text);

    if validate::is_wrong_section(&records) || !validate::looks_like_cic36(&records, &raw_text) {
        let mut extraction = Extraction::failed(
            method,
            FailureKind::WrongSection,
            "Extracted content belongs to a different form section".to_string(),
        );
        extraction.pages_searched = section_pages;
        extraction.ocr_quality = Some(ocr_quality);
        return extraction;
    }

    let mut note: Option<String> = None;

    if handwritten {
        note = Some("Handwritten content detected - manual review required".to_string());
    } else if ocr_quality == OcrQuality::VeryLow {
        for record in &mut records {
            record.confidence = Confidence::Low;
        }
        note = Some("Very low OCR quality - manual review recommended".to_string());
    }

    let mut referential = false;
    if validate::is_referential(&records) {
        referential = true;
        match find_standalone_section_b(pages, &section_pages, tuning) {
            Some((standalone_records, standalone_page)) => {
                records = validate::deduplicate(standalone_records, true);
                method = ExtractionMethod::OcrStandalone;
                note = Some("Found via 'see attached' reference".to_string());
                for record in &mut records {
                    record.source_page = standalone_page;
                }
            }
            None => {
                note = Some("Content may be referential - check for attached pages".to_string());
            }
        }
    }

    if records.is_empty() || records.iter().all(|record| record.activity.is_empty()) {
        let alternative = segment::parse_alternative(&raw_text);
        if !alternative.is_empty() {
            records = alternative;
            method = ExtractionMethod::OcrAlternative;
            for record in &mut records {
                if record.source_page == 0 {
                    record.source_page = first_page;
                }
            }
        }
    }

    if !beneficiaries.is_empty()
        && let Some(first) = records.first_mut()
    {
        first.extras_mut().beneficiaries = Some(beneficiaries);
    }

    let success = records
        .iter()
        .any(|record| !record.activity.is_empty() || !record.benefit.is_empty());

    let mut extraction = Extraction::empty(method);
    extraction.success = success;
    extraction.activities = records;
    extraction.pages_searched = section_pages;
    extraction.ocr_quality = Some(ocr_quality);
    extraction.handwritten = handwritten;
    extraction.referential = referential;
    extraction.note = note;
    if !success {
        extraction.failure = Some(FailureKind::SectionNotLocated);
        extraction.error = Some("No activities recovered from Section B pages".to_string());
    }
    extraction
}

/// The form's first page: title matches win outright, a bare "CIC 36" only
/// counts away from Articles pages that cross-reference the form.
fn find_form_start(pages: &[OcrPage]) -> Option<usize> {
    for page in pages {
        if patterns::matches_any(&page.text, &patterns::FORM_START_HIGH) {
            return Some(page.page_number);
        }
    }
    for page in pages {
        if patterns::matches_any(&page.text, &patterns::ARTICLES_MARKERS) {
            continue;
        }
        if patterns::matches_any(&page.text, &patterns::FORM_START_MEDIUM) {
            return Some(page.page_number);
        }
    }
    None
}

/// Beneficiaries sit in Section A: on the form's first page or the page
/// carrying the Section A header, spilling onto the next page either way.
fn find_beneficiaries(pages: &[OcrPage], form_start: Option<usize>) -> String {
    let anchor = form_start.or_else(|| {
        pages
            .iter()
            .find(|page| patterns::matches_any(&page.text, &patterns::SECTION_A_HEADERS))
            .map(|page| page.page_number)
    });
    let Some(anchor) = anchor else {
        return String::new();
    };

    let mut combined = String::new();
    for page in pages {
        if page.page_number == anchor || page.page_number == anchor + 1 {
            combined.push_str(&page.text);
            combined.push('\n');
        }
    }

    let found = segment::extract_beneficiaries(&combined);
    if !found.is_empty() {
        return found;
    }
    segment::extract_beneficiaries_from_text(&combined)
}

/// The set of pages holding Section B content. The header page is found by
/// tiered pattern match inside the post-form window; continuation pages
/// follow until the surplus statement or a section boundary.
fn find_section_b_pages(
    pages: &[OcrPage],
    form_start: Option<usize>,
    tuning: &Tuning,
) -> Vec<usize> {
    let in_window = |page_number: usize| match form_start {
        Some(start) => page_number > start && page_number <= start + tuning.form_window,
        None => true,
    };

    let tiers = [
        &patterns::OCR_SECTION_B_PRIMARY,
        &patterns::OCR_SECTION_B_FALLBACK,
        &patterns::OCR_SECTION_B_JUMBLED,
    ];

    let mut header: Option<usize> = None;
    'tier: for tier in tiers {
        for page in pages {
            if in_window(page.page_number) && patterns::matches_any(&page.text, tier) {
                header = Some(page.page_number);
                break 'tier;
            }
        }
    }

    let Some(header) = header else {
        return Vec::new();
    };

    let mut selected = vec![header];

    let header_text = pages
        .iter()
        .find(|page| page.page_number == header)
        .map(|page| page.text.as_str())
        .unwrap_or("");
    if patterns::matches_any(header_text, &patterns::SURPLUS_MARKERS) {
        return selected;
    }

    for page in pages {
        if page.page_number <= header {
            continue;
        }
        if page.page_number > header + tuning.section_page_cap {
            break;
        }
        // Section C opens the signatory block; that page is past the table.
        if patterns::matches_any(&page.text, &patterns::SECTION_C_MARKER) {
            break;
        }

        selected.push(page.page_number);

        if patterns::matches_any(&page.text, &patterns::SURPLUS_MARKERS) {
            break;
        }
        let other_boundary = patterns::SECTION_B_END_MARKERS
            .iter()
            .skip(2)
            .any(|pattern| pattern.is_match(&page.text));
        if other_boundary {
            break;
        }
    }

    selected.sort_unstable();
    selected.dedup();
    selected
}

/// Column-aware parse across the section pages. Returns `None` when the
/// rebuilt columns are too thin to trust, sending the caller back to the
/// linear path.
fn parse_with_layout(
    section: &[&OcrPage],
    raw_text: &str,
    tuning: &Tuning,
) -> Option<Vec<ActivityRecord>> {
    // The raw text keeps continuation markers the column split loses.
    let company_differs = segment::extract_company_differs(raw_text);
    let surplus_use = segment::extract_surplus_use(raw_text, tuning);

    let mut left_parts = Vec::new();
    let mut right_parts = Vec::new();
    for page in section {
        if page.layout.two_columns {
            left_parts.push(segment::clean_layout_column(&page.layout.left_column, true));
            right_parts.push(segment::clean_layout_column(
                &page.layout.right_column,
                false,
            ));
        } else {
            left_parts.push(segment::clean_layout_column(&page.layout.linear_text, true));
        }
    }

    let activity = patterns::strip_all(
        left_parts.join(" ").trim(),
        &patterns::LAYOUT_LEADING_BOILERPLATE,
    )
    .trim()
    .to_string();
    let benefit = right_parts.join(" ").trim().to_string();

    if activity.chars().count() < 50 || benefit.chars().count() < 20 {
        return None;
    }

    let source_page = section
        .iter()
        .map(|page| page.page_number)
        .min()
        .unwrap_or(0);
    let mut record = ActivityRecord::new(activity, benefit, source_page, Confidence::Medium);
    record.note = Some("layout_aware_ocr".to_string());
    if !company_differs.is_empty() {
        record.extras_mut().company_differs = Some(company_differs);
    }
    if !surplus_use.is_empty() {
        record.extras_mut().surplus_use = Some(surplus_use);
    }

    Some(vec![record])
}

/// Linear fallback from the layout path; the secondary statements still come
/// from the raw text, which the linear cascade may no longer see intact.
fn linear_with_raw_extras(raw_text: &str, tuning: &Tuning) -> Vec<ActivityRecord> {
    let mut records = segment::parse_linear(raw_text, tuning);
    let surplus_use = segment::extract_surplus_use(raw_text, tuning);
    if !surplus_use.is_empty()
        && let Some(first) = records.first_mut()
    {
        let extras = first.extras_mut();
        if extras.surplus_use.is_none() {
            extras.surplus_use = Some(surplus_use);
        }
    }
    records
}

/// "See attached" filings carry the real statement on a separate sheet
/// elsewhere in the filing; search the pages not already processed.
fn find_standalone_section_b(
    pages: &[OcrPage],
    processed: &[usize],
    tuning: &Tuning,
) -> Option<(Vec<ActivityRecord>, usize)> {
    for page in pages {
        if processed.contains(&page.page_number) {
            continue;
        }

        let Some(header) = patterns::STANDALONE_SECTION_B
            .iter()
            .filter_map(|pattern| pattern.find(&page.text))
            .min_by_key(|found| found.start())
        else {
            continue;
        };

        let remaining = &page.text[header.end()..];
        let content_end = patterns::earliest_start(remaining, &patterns::STANDALONE_END)
            .unwrap_or(remaining.len());
        let content = &remaining[..content_end];

        if content.trim().chars().count() < 50 {
            continue;
        }

        let records = segment::parse_linear(content, tuning);
        if records.is_empty() || validate::is_referential(&records) {
            continue;
        }

        return Some((records, page.page_number));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page_number: usize, text: &str) -> OcrPage {
        OcrPage {
            page_number,
            text: text.to_string(),
            layout: ColumnLayout::default(),
        }
    }

    fn tuning() -> Tuning {
        Tuning::default()
    }

    const FORM_PAGE: &str =
        "CIC 36\nDeclarations on Formation of a Community Interest Company\n\
         The company's activities will provide benefit to residents of the borough of Barnsley \
         SECTION B";

    #[test]
    fn section_pages_stop_before_signatory_block() {
        let pages = vec![
            page(29, FORM_PAGE),
            page(
                30,
                "SECTION B: Community Interest Statement - Activities & Related Benefit\n\
                 Running youth sports sessions. The community will benefit by healthier \
                 young people in the area.",
            ),
            page(
                31,
                "continued activities text about community projects and further benefit \
                 for residents across the whole district",
            ),
            page(32, "SECTION C\nSIGNATORIES to the community interest statement"),
            page(33, "CHECKLIST"),
        ];

        let selected = find_section_b_pages(&pages, Some(29), &tuning());
        assert_eq!(selected, vec![30, 31]);
    }

    #[test]
    fn surplus_on_header_page_ends_the_section() {
        let pages = vec![
            page(5, FORM_PAGE),
            page(
                6,
                "SECTION B: Community Interest Statement\nRunning a repair cafe. \
                 If the company makes any surplus it will be used for tools and training.",
            ),
            page(7, "unrelated continuation sheet"),
        ];

        let selected = find_section_b_pages(&pages, Some(5), &tuning());
        assert_eq!(selected, vec![6]);
    }

    #[test]
    fn linear_extraction_produces_records_and_quality() {
        let pages = vec![
            page(1, FORM_PAGE),
            page(
                2,
                "SECTION B: Community Interest Statement - Activities & Related Benefit\n\
                 Running a community cafe and food bank for the town serving anyone in need. \
                 The community will benefit by access to affordable meals and less food poverty.\n\
                 If the company makes any surplus it will be used for extra opening hours.",
            ),
        ];

        let extraction = analyze(&pages, &tuning());
        assert!(extraction.success);
        assert_eq!(extraction.method, ExtractionMethod::OcrLinear);
        assert_eq!(extraction.pages_searched, vec![2]);
        assert!(extraction.activities[0].activity.contains("community cafe"));
        assert_eq!(extraction.activities[0].source_page, 2);
        assert!(extraction.ocr_quality.is_some());
        let extras = extraction.first_extras();
        assert!(
            extras
                .beneficiaries
                .as_deref()
                .unwrap_or("")
                .contains("Barnsley")
        );
        assert!(
            extras
                .surplus_use
                .as_deref()
                .unwrap_or("")
                .contains("extra opening hours")
        );
    }

    #[test]
    fn missing_section_b_reports_form_page() {
        let pages = vec![
            page(4, FORM_PAGE.replace("SECTION B", "").as_str()),
            page(5, "ordinary memorandum text with nothing relevant on it"),
        ];

        let extraction = analyze(&pages, &tuning());
        assert!(!extraction.success);
        assert_eq!(extraction.failure, Some(FailureKind::NoCic36Form));
        assert!(extraction.error.as_deref().unwrap_or("").contains("page 4"));
    }

    #[test]
    fn no_form_at_all_reports_no_cic36() {
        let pages = vec![page(1, "Articles of Association\nplain memorandum content")];
        let extraction = analyze(&pages, &tuning());
        assert!(!extraction.success);
        assert_eq!(extraction.failure, Some(FailureKind::NoCic36Form));
        assert!(extraction.error.as_deref().unwrap_or("").contains("No CIC 36"));
    }

    #[test]
    fn two_column_layout_takes_the_layout_path() {
        let mut section_page = page(
            2,
            "SECTION B: Community Interest Statement\n\
             Running sports activity sessions The community will benefit by better health",
        );
        section_page.layout = ColumnLayout {
            linear_text: String::new(),
            left_column: "Running weekly multi sport coaching sessions for young people \
                          at the leisure centre with qualified coaches"
                .to_string(),
            right_column: "The community will benefit by improved physical health and \
                           new friendships across the estate"
                .to_string(),
            two_columns: true,
            boundary: 600,
        };
        let pages = vec![page(1, FORM_PAGE), section_page];

        let extraction = analyze(&pages, &tuning());
        assert!(extraction.success);
        assert_eq!(extraction.method, ExtractionMethod::OcrLayout);
        assert_eq!(extraction.activities.len(), 1);
        assert!(extraction.activities[0].activity.contains("multi sport"));
        assert_eq!(
            extraction.activities[0].note.as_deref(),
            Some("layout_aware_ocr")
        );
    }

    #[test]
    fn referential_content_finds_standalone_sheet() {
        let pages = vec![
            page(1, FORM_PAGE),
            page(
                2,
                "SECTION B: Community Interest Statement\n\
                 Please see attached sheet for the community activity statement",
            ),
            page(
                8,
                "SECTION B\nProviding supported employment placements for adults with \
                 learning disabilities in our market garden. The community will benefit \
                 by greater independence and inclusion for the adults we support.\n\
                 Declaration",
            ),
        ];

        let extraction = analyze(&pages, &tuning());
        assert!(extraction.success);
        assert!(extraction.referential);
        assert_eq!(extraction.method, ExtractionMethod::OcrStandalone);
        assert_eq!(
            extraction.note.as_deref(),
            Some("Found via 'see attached' reference")
        );
        assert!(extraction.activities[0].activity.contains("market garden"));
        assert_eq!(extraction.activities[0].source_page, 8);
    }

    #[test]
    fn wrong_form_content_is_rejected() {
        let pages = vec![
            page(1, FORM_PAGE),
            page(
                2,
                "SECTION B: Proposed officers\nFor a secretary who is an individual, \
                 go to Section C1. Private companies must appoint a director.",
            ),
        ];

        let extraction = analyze(&pages, &tuning());
        assert!(!extraction.success);
        assert_eq!(extraction.failure, Some(FailureKind::WrongSection));
    }
}
