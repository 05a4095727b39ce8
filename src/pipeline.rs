//! Batch orchestration: classify, locate, extract, persist.
//!
//! Per-document failures never abort the batch; every input produces a
//! canonical record, successful or not.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::classify;
use crate::config::Tuning;
use crate::electronic;
use crate::locate;
use crate::model::{
    BatchSummary, CanonicalRecord, Classification, DocumentKind, Extraction, ExtractionMethod,
    FailureKind, Location,
};
use crate::pdftools::{PdfSource, PopplerPdf, TesseractOcr, ToolConfig};
use crate::scanned;
use crate::structure;
use crate::util;

/// Candidate pages for the OCR path, by document kind.
///
/// Scanned documents get the structural guess windows. Hybrid documents are
/// born-digital filings with the scanned form appended, so only the trailing
/// image pages are worth rasterizing.
pub fn select_ocr_pages(classification: &Classification, tuning: &Tuning) -> Vec<usize> {
    match classification.kind {
        DocumentKind::Hybrid => {
            let image_pages = &classification.image_pages;
            let skip = image_pages.len().saturating_sub(tuning.max_hybrid_pages);
            image_pages[skip..].to_vec()
        }
        _ => locate::guess_scanned_pages(classification.page_count, tuning),
    }
}

/// The page the electronic extractor should start from: the located header,
/// or the best structural guess when location came up empty.
pub fn electronic_target_page(location: &Location) -> Option<usize> {
    location
        .section_b_page
        .or_else(|| location.suggested_pages.first().copied())
}

pub fn process_single_document(path: &Path, tools: &ToolConfig, tuning: &Tuning) -> CanonicalRecord {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let classification = classify::classify_path(path, tools, tuning);
    let source_sha256 = util::sha256_file(path).ok();

    let pdf = match PopplerPdf::open(path, tools) {
        Ok(pdf) => pdf,
        Err(error) => {
            // Classification already recorded the unknown kind; the record
            // still goes out so the batch accounts for every input.
            let extraction = Extraction::failed(
                ExtractionMethod::None,
                FailureKind::UnreadableInput,
                error.to_string(),
            );
            return structure::build_record(
                &file_name,
                &classification,
                &Location::empty(),
                &extraction,
                source_sha256,
            );
        }
    };

    let (location, extraction) = match classification.kind {
        DocumentKind::Electronic => {
            let pages = match classify::collect_pages(&pdf) {
                Ok(pages) => pages,
                Err(error) => {
                    let extraction = Extraction::failed(
                        ExtractionMethod::None,
                        FailureKind::UnreadableInput,
                        error.to_string(),
                    );
                    return structure::build_record(
                        &file_name,
                        &classification,
                        &Location::empty(),
                        &extraction,
                        source_sha256,
                    );
                }
            };
            let location = locate::locate_electronic(&pages, tuning);
            let extraction = match electronic_target_page(&location) {
                Some(page) => electronic::extract_section_b(&pdf, page, tuning),
                None => Extraction::failed(
                    ExtractionMethod::None,
                    FailureKind::SectionNotLocated,
                    "Section B not located in text layer".to_string(),
                ),
            };
            (location, extraction)
        }
        // Unknown kinds reach here only when the file opened after all;
        // treat them like scans and let OCR decide.
        DocumentKind::Scanned | DocumentKind::Hybrid | DocumentKind::Unknown => {
            let candidates = select_ocr_pages(&classification, tuning);
            let location = locate::locate_scanned(pdf.page_count(), tuning);
            let ocr = TesseractOcr::new(tools);
            let extraction = scanned::extract_section_b_ocr(&pdf, &ocr, &candidates, tuning);
            (location, extraction)
        }
    };

    structure::build_record(
        &file_name,
        &classification,
        &location,
        &extraction,
        source_sha256,
    )
}

pub struct BatchOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub workers: usize,
    pub dated_run_folder: bool,
}

pub fn process_batch(
    options: &BatchOptions,
    tools: &ToolConfig,
    tuning: &Tuning,
) -> Result<BatchSummary> {
    let documents = collect_pdfs(&options.input_dir)?;
    if documents.is_empty() {
        info!(input = %options.input_dir.display(), "no PDF documents found");
    }

    let run_dir = if options.dated_run_folder {
        options.output_dir.join(util::run_folder_string(chrono::Utc::now()))
    } else {
        options.output_dir.clone()
    };
    util::ensure_directory(&run_dir)?;

    info!(
        documents = documents.len(),
        workers = options.workers,
        output = %run_dir.display(),
        "starting batch"
    );

    let cursor = AtomicUsize::new(0);
    let results: Mutex<Vec<CanonicalRecord>> = Mutex::new(Vec::with_capacity(documents.len()));
    let worker_count = options.workers.max(1).min(documents.len().max(1));

    std::thread::scope(|scope| {
        for _ in 0..worker_count {
            scope.spawn(|| {
                loop {
                    let index = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some(path) = documents.get(index) else {
                        break;
                    };

                    let record = process_single_document(path, tools, tuning);
                    info!(
                        document = %path.display(),
                        status = %record.extraction_status,
                        method = %record.extraction_metadata.extraction_method,
                        "processed"
                    );

                    if let Err(error) = write_document_record(&run_dir, path, &record) {
                        warn!(document = %path.display(), %error, "failed to write record");
                    }

                    results
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .push(record);
                }
            });
        }
    });

    let mut collected = results
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    collected.sort_by(|a, b| {
        a.extraction_metadata
            .source_file
            .cmp(&b.extraction_metadata.source_file)
    });

    let summary = structure::summarize_batch(collected);
    util::write_json_pretty(&run_dir.join("batch_summary.json"), &summary)?;

    let failed = structure::failed_documents(&summary.results);
    util::write_json_pretty(&run_dir.join("failed_documents.json"), &failed)?;

    info!(
        successful = summary.batch_info.successful,
        failed = summary.batch_info.failed,
        no_data = summary.batch_info.no_data,
        activities = summary.batch_info.total_activities,
        "batch complete"
    );

    Ok(summary)
}

fn write_document_record(run_dir: &Path, source: &Path, record: &CanonicalRecord) -> Result<()> {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    util::write_json_pretty(&run_dir.join(format!("{stem}.json")), record)
}

fn collect_pdfs(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(input_dir)
        .with_context(|| format!("failed to read input directory {}", input_dir.display()))?;

    let mut documents: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|extension| extension.to_str())
                .map(|extension| extension.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .collect();

    documents.sort();
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Confidence;

    fn classification(kind: DocumentKind, page_count: usize, image_pages: Vec<usize>) -> Classification {
        Classification {
            kind,
            page_count,
            avg_chars_per_page: 0.0,
            electronic_pages: Vec::new(),
            image_pages,
            error: None,
        }
    }

    #[test]
    fn hybrid_selection_keeps_trailing_image_pages() {
        let image_pages: Vec<usize> = (10..=50).collect();
        let selected = select_ocr_pages(
            &classification(DocumentKind::Hybrid, 50, image_pages),
            &Tuning::default(),
        );
        assert_eq!(selected.len(), 25);
        assert_eq!(selected.first(), Some(&26));
        assert_eq!(selected.last(), Some(&50));
    }

    #[test]
    fn short_hybrid_keeps_all_image_pages() {
        let selected = select_ocr_pages(
            &classification(DocumentKind::Hybrid, 6, vec![4, 5, 6]),
            &Tuning::default(),
        );
        assert_eq!(selected, vec![4, 5, 6]);
    }

    #[test]
    fn scanned_selection_uses_structural_guess() {
        let selected = select_ocr_pages(
            &classification(DocumentKind::Scanned, 12, (1..=12).collect()),
            &Tuning::default(),
        );
        assert_eq!(selected.first(), Some(&1));
        assert!(selected.contains(&12));
    }

    #[test]
    fn target_page_prefers_located_header() {
        let mut location = Location::empty();
        location.section_b_page = Some(7);
        location.suggested_pages = vec![30, 31];
        location.confidence = Confidence::High;
        assert_eq!(electronic_target_page(&location), Some(7));

        location.section_b_page = None;
        assert_eq!(electronic_target_page(&location), Some(30));

        location.suggested_pages.clear();
        assert_eq!(electronic_target_page(&location), None);
    }
}
