//! CIC 36 form and Section B location.
//!
//! The electronic path matches the native text layer against the tiered
//! header patterns. Scanned documents get no text search here; location
//! produces a structural page guess and the OCR path confirms it.

use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::config::Tuning;
use crate::model::{Confidence, Location, PageText};
use crate::patterns;
use crate::pdftools::{PdfSource, PopplerPdf, ToolConfig};

/// Locate the form within native page text.
pub fn locate_electronic(pages: &[PageText], tuning: &Tuning) -> Location {
    let mut location = Location::empty();
    let page_count = pages.len();

    let mut section_b_matches: Vec<usize> = Vec::new();

    for page in pages {
        let text = page.text.as_str();
        let excluded = patterns::matches_any(text, &patterns::EXCLUDE_SECTIONS);

        let is_cic36 = patterns::matches_any(text, &patterns::CIC36_PRIMARY)
            || patterns::matches_any(text, &patterns::CIC36_SECONDARY);
        if is_cic36 {
            location.cic36_pages.push(page.page_number);
        }

        // A page that carries the form marker itself may legitimately also
        // mention adjacent sections, so exclusion only applies elsewhere.
        if excluded && !is_cic36 {
            continue;
        }

        if patterns::matches_any(text, &patterns::SECTION_B_PRIMARY)
            || patterns::matches_any(text, &patterns::SECTION_B_SECONDARY)
            || patterns::matches_any(text, &patterns::SECTION_B_TABLE)
        {
            section_b_matches.push(page.page_number);
        }
    }

    location.cic36_pages.dedup();
    section_b_matches.dedup();
    location.section_b_candidates = section_b_matches.clone();

    // Section B sits on or after the form's first page.
    location.section_b_page = section_b_matches
        .iter()
        .find(|candidate| {
            location
                .cic36_pages
                .iter()
                .any(|form_page| *candidate >= form_page)
        })
        .or_else(|| section_b_matches.first())
        .copied();

    location.confidence = match (
        !location.cic36_pages.is_empty(),
        location.section_b_page.is_some(),
    ) {
        (true, true) => Confidence::High,
        (false, false) => Confidence::Low,
        _ => Confidence::Medium,
    };

    if location.confidence == Confidence::Low {
        // No direct match anywhere; modern filings put the form near the end.
        location.suggested_pages = (page_count
            .saturating_sub(tuning.electronic_trailing_window)
            .max(1)..=page_count)
            .collect();
    }

    debug!(
        cic36_pages = ?location.cic36_pages,
        section_b = ?location.section_b_page,
        confidence = location.confidence.as_str(),
        "located form in text layer"
    );

    location
}

/// Structural page guess for scanned documents. Covers the three observed
/// form placements in priority order: legacy filings open with the form,
/// long composite filings bury it mid-document, modern filings append it.
pub fn guess_scanned_pages(page_count: usize, tuning: &Tuning) -> Vec<usize> {
    let mut pages: Vec<usize> = (1..=page_count.min(tuning.legacy_window)).collect();

    if page_count > tuning.mid_window_min_pages {
        let (mid_start, mid_end) = tuning.mid_window;
        for page in mid_start..=mid_end.min(page_count) {
            if !pages.contains(&page) {
                pages.push(page);
            }
        }
    }

    let trailing_start = page_count.saturating_sub(tuning.trailing_window).max(1);
    for page in trailing_start..=page_count {
        if !pages.contains(&page) {
            pages.push(page);
        }
    }

    pages
}

pub fn locate_scanned(page_count: usize, tuning: &Tuning) -> Location {
    let mut location = Location::empty();
    location.suggested_pages = guess_scanned_pages(page_count, tuning);
    location
}

pub fn locate_path(
    path: &Path,
    tools: &ToolConfig,
    tuning: &Tuning,
    scanned: bool,
) -> Result<Location> {
    let pdf = PopplerPdf::open(path, tools)?;
    if scanned {
        return Ok(locate_scanned(pdf.page_count(), tuning));
    }
    let pages = crate::classify::collect_pages(&pdf)?;
    Ok(locate_electronic(&pages, tuning))
}
