//! Document classification by text-layer coverage.
//!
//! Electronic filings carry extractable text on every page; scans carry
//! none. Composite filings mix a born-digital cover with scanned form
//! pages and need the OCR path for the pages that matter.

use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::config::Tuning;
use crate::model::{Classification, DocumentKind, PageText};
use crate::pdftools::{PdfSource, PopplerPdf, ToolConfig};

/// Classify from already extracted page text. Pure, so the thresholds can
/// be exercised without a PDF on disk.
pub fn classify_pages(pages: &[PageText], tuning: &Tuning) -> Classification {
    let mut electronic_pages = Vec::new();
    let mut image_pages = Vec::new();
    let mut total_chars = 0usize;

    for page in pages {
        total_chars += page.char_count;
        if page.char_count >= tuning.min_chars_per_page {
            electronic_pages.push(page.page_number);
        } else {
            image_pages.push(page.page_number);
        }
    }

    let kind = if image_pages.is_empty() {
        DocumentKind::Electronic
    } else if electronic_pages.is_empty() {
        DocumentKind::Scanned
    } else {
        DocumentKind::Hybrid
    };

    let avg_chars_per_page = if pages.is_empty() {
        0.0
    } else {
        total_chars as f64 / pages.len() as f64
    };

    Classification {
        kind,
        page_count: pages.len(),
        avg_chars_per_page,
        electronic_pages,
        image_pages,
        error: None,
    }
}

pub fn classify_source(source: &dyn PdfSource, tuning: &Tuning) -> Result<Classification> {
    let pages = collect_pages(source)?;
    Ok(classify_pages(&pages, tuning))
}

/// Classify a PDF on disk. An unreadable file is not an error here; it
/// classifies as `unknown` so the pipeline can route it to OCR.
pub fn classify_path(path: &Path, tools: &ToolConfig, tuning: &Tuning) -> Classification {
    match PopplerPdf::open(path, tools) {
        Ok(pdf) => match classify_source(&pdf, tuning) {
            Ok(classification) => {
                debug!(
                    path = %path.display(),
                    kind = classification.kind.as_str(),
                    pages = classification.page_count,
                    "classified document"
                );
                classification
            }
            Err(error) => Classification::unknown(error.to_string()),
        },
        Err(error) => {
            debug!(path = %path.display(), %error, "could not open document");
            Classification::unknown(error.to_string())
        }
    }
}

pub fn collect_pages(source: &dyn PdfSource) -> Result<Vec<PageText>> {
    (1..=source.page_count())
        .map(|page_number| {
            source
                .page_text(page_number)
                .map(|text| PageText::new(page_number, text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: usize, chars: usize) -> PageText {
        PageText::new(number, "x".repeat(chars))
    }

    #[test]
    fn all_text_pages_classify_electronic() {
        let pages: Vec<PageText> = (1..=4).map(|n| page(n, 800)).collect();
        let classification = classify_pages(&pages, &Tuning::default());
        assert_eq!(classification.kind, DocumentKind::Electronic);
        assert_eq!(classification.electronic_pages, vec![1, 2, 3, 4]);
        assert!(classification.image_pages.is_empty());
        assert_eq!(classification.avg_chars_per_page, 800.0);
    }

    #[test]
    fn bare_pages_classify_scanned() {
        let pages: Vec<PageText> = (1..=3).map(|n| page(n, 10)).collect();
        let classification = classify_pages(&pages, &Tuning::default());
        assert_eq!(classification.kind, DocumentKind::Scanned);
        assert_eq!(classification.image_pages, vec![1, 2, 3]);
    }

    #[test]
    fn mixed_pages_classify_hybrid() {
        let pages = vec![page(1, 900), page(2, 0), page(3, 40), page(4, 600)];
        let classification = classify_pages(&pages, &Tuning::default());
        assert_eq!(classification.kind, DocumentKind::Hybrid);
        assert_eq!(classification.electronic_pages, vec![1, 4]);
        assert_eq!(classification.image_pages, vec![2, 3]);
    }

    #[test]
    fn threshold_is_on_trimmed_characters() {
        // 49 chars of content padded with whitespace stays an image page.
        let text = format!("   {}   \n", "y".repeat(49));
        let pages = vec![PageText::new(1, text)];
        let classification = classify_pages(&pages, &Tuning::default());
        assert_eq!(classification.kind, DocumentKind::Scanned);
    }
}
