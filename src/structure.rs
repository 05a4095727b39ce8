//! Canonical output records.
//!
//! Everything downstream consumes the per-document JSON produced here, so
//! the shape is deliberately flat and stable: company identity from the
//! filename, Section A and B content, and extraction provenance.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{
    ActivityEntry, BatchInfo, BatchSummary, CanonicalRecord, Classification, Extraction,
    ExtractionMetadata, FilenameFormat, FilenameInfo, Location, SectionA, SectionB,
};
use crate::util;

static MODERN_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)_newinc_(\d{4}-\d{2}-\d{2})").expect("pattern must compile"));
static PARTIAL_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{6,8})").expect("pattern must compile"));

/// Company number and incorporation date from the download naming scheme
/// `<number>_newinc_<date>.pdf`; older archives carry the number alone or
/// nothing recognizable.
pub fn parse_filename(file_name: &str) -> FilenameInfo {
    if let Some(caps) = MODERN_FILENAME.captures(file_name) {
        return FilenameInfo {
            company_number: caps.get(1).map(|m| m.as_str().to_string()),
            incorporation_date: caps.get(2).map(|m| m.as_str().to_string()),
            format: FilenameFormat::Modern,
        };
    }

    if let Some(caps) = PARTIAL_FILENAME.captures(file_name) {
        return FilenameInfo {
            company_number: caps.get(1).map(|m| m.as_str().to_string()),
            incorporation_date: None,
            format: FilenameFormat::Partial,
        };
    }

    FilenameInfo {
        company_number: None,
        incorporation_date: None,
        format: FilenameFormat::Legacy,
    }
}

/// Terminal status of one document: `success` when activities came out,
/// `error` when the pass failed, `no_data` when it ran clean but found
/// nothing. The status vocabulary is fixed to those three values; the
/// failure detail rides in the metadata error field.
pub fn extraction_status(extraction: &Extraction) -> &'static str {
    if extraction.success && !extraction.activities.is_empty() {
        return "success";
    }
    if extraction.failure.is_some() || extraction.error.is_some() {
        return "error";
    }
    "no_data"
}

pub fn build_record(
    source_file: &str,
    classification: &Classification,
    location: &Location,
    extraction: &Extraction,
    source_sha256: Option<String>,
) -> CanonicalRecord {
    let filename = parse_filename(source_file);
    let extras = extraction.first_extras();

    let activities: Vec<ActivityEntry> = extraction
        .activities
        .iter()
        .filter(|record| !record.activity.is_empty() || !record.benefit.is_empty())
        .map(|record| ActivityEntry {
            activity: record.activity.clone(),
            description: record.benefit.clone(),
        })
        .collect();

    CanonicalRecord {
        company_number: filename.company_number,
        incorporation_date: filename.incorporation_date,
        document_type: classification.kind.as_str().to_string(),
        extraction_status: extraction_status(extraction).to_string(),
        section_a: SectionA {
            beneficiaries: extras.beneficiaries.unwrap_or_default(),
        },
        section_b: SectionB {
            activities,
            company_differs: extras.company_differs.unwrap_or_default(),
            surplus_use: extras.surplus_use.unwrap_or_default(),
        },
        extraction_metadata: ExtractionMetadata {
            source_file: source_file.to_string(),
            cic36_page: location.section_b_page,
            cic36_pages_found: location.cic36_pages.clone(),
            location_confidence: location.confidence.as_str().to_string(),
            extraction_method: extraction.method.as_str().to_string(),
            pages_searched: extraction.pages_searched.clone(),
            extracted_at: util::now_utc_string(),
            document_page_count: classification.page_count,
            avg_chars_per_page: classification.avg_chars_per_page,
            error: extraction
                .error
                .clone()
                .or_else(|| extraction.failure.map(|failure| failure.as_str().to_string())),
            ocr_quality: extraction.ocr_quality.map(|quality| quality.as_str().to_string()),
            note: extraction.note.clone(),
            source_sha256,
        },
    }
}

/// Read one persisted per-document record back.
pub fn load_record(path: &std::path::Path) -> anyhow::Result<CanonicalRecord> {
    util::read_json(path)
}

/// Source files of the records that ended in error; persisted next to the
/// batch summary so a failed subset can be re-run as a list.
pub fn failed_documents(results: &[CanonicalRecord]) -> Vec<String> {
    results
        .iter()
        .filter(|record| !matches!(record.extraction_status.as_str(), "success" | "no_data"))
        .map(|record| record.extraction_metadata.source_file.clone())
        .collect()
}

/// Roll per-document records into the batch summary artifact.
pub fn summarize_batch(results: Vec<CanonicalRecord>) -> BatchSummary {
    let mut info = BatchInfo {
        total_documents: results.len(),
        successful: 0,
        failed: 0,
        no_data: 0,
        electronic_docs: 0,
        scanned_docs: 0,
        hybrid_docs: 0,
        total_activities: 0,
        processed_at: util::now_utc_string(),
    };

    for record in &results {
        match record.extraction_status.as_str() {
            "success" => info.successful += 1,
            "no_data" => info.no_data += 1,
            _ => info.failed += 1,
        }
        match record.document_type.as_str() {
            "electronic" => info.electronic_docs += 1,
            "scanned" => info.scanned_docs += 1,
            "hybrid" => info.hybrid_docs += 1,
            _ => {}
        }
        info.total_activities += record.section_b.activities.len();
    }

    BatchSummary {
        batch_info: info,
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ActivityRecord, Confidence, DocumentKind, ExtractionMethod, FailureKind, OcrQuality,
    };

    fn classification(kind: DocumentKind) -> Classification {
        Classification {
            kind,
            page_count: 12,
            avg_chars_per_page: 840.0,
            electronic_pages: vec![1, 2, 3],
            image_pages: Vec::new(),
            error: None,
        }
    }

    #[test]
    fn modern_filename_parses_number_and_date() {
        let info = parse_filename("14941059_newinc_2023-06-16.pdf");
        assert_eq!(info.company_number.as_deref(), Some("14941059"));
        assert_eq!(info.incorporation_date.as_deref(), Some("2023-06-16"));
        assert_eq!(info.format, FilenameFormat::Modern);
    }

    #[test]
    fn bare_number_is_partial_and_rest_is_legacy() {
        let partial = parse_filename("06352054.pdf");
        assert_eq!(partial.company_number.as_deref(), Some("06352054"));
        assert_eq!(partial.format, FilenameFormat::Partial);

        let legacy = parse_filename("scan_batch_7.pdf");
        assert!(legacy.company_number.is_none());
        assert_eq!(legacy.format, FilenameFormat::Legacy);
    }

    #[test]
    fn record_carries_sections_and_provenance() {
        let mut extraction = Extraction::empty(ExtractionMethod::PdfTable);
        extraction.success = true;
        let mut first = ActivityRecord::new(
            "Running a community cafe".to_string(),
            "Affordable meals".to_string(),
            3,
            Confidence::High,
        );
        let extras = first.extras_mut();
        extras.company_differs = Some("profits stay local".to_string());
        extras.surplus_use = Some("more free sessions".to_string());
        extras.beneficiaries = Some("residents of Hull".to_string());
        extraction.activities = vec![first];
        extraction.pages_searched = vec![2, 3, 4];

        let mut location = Location::empty();
        location.cic36_pages = vec![2];
        location.section_b_page = Some(3);
        location.confidence = Confidence::High;

        let record = build_record(
            "14941059_newinc_2023-06-16.pdf",
            &classification(DocumentKind::Electronic),
            &location,
            &extraction,
            Some("abc123".to_string()),
        );

        assert_eq!(record.company_number.as_deref(), Some("14941059"));
        assert_eq!(record.extraction_status, "success");
        assert_eq!(record.document_type, "electronic");
        assert_eq!(record.section_a.beneficiaries, "residents of Hull");
        assert_eq!(record.section_b.activities.len(), 1);
        assert_eq!(record.section_b.activities[0].activity, "Running a community cafe");
        assert_eq!(record.section_b.company_differs, "profits stay local");
        assert_eq!(record.extraction_metadata.cic36_page, Some(3));
        assert_eq!(record.extraction_metadata.extraction_method, "pdf_table");
        assert_eq!(record.extraction_metadata.source_sha256.as_deref(), Some("abc123"));
    }

    #[test]
    fn failures_map_to_error_status_with_detail_in_metadata() {
        let extraction = Extraction::failed(
            ExtractionMethod::None,
            FailureKind::NoCic36Form,
            "No CIC 36 form found in document".to_string(),
        );
        assert_eq!(extraction_status(&extraction), "error");

        let record = build_record(
            "06352054.pdf",
            &classification(DocumentKind::Scanned),
            &Location::empty(),
            &extraction,
            None,
        );
        assert_eq!(record.extraction_status, "error");
        assert_eq!(
            record.extraction_metadata.error.as_deref(),
            Some("No CIC 36 form found in document")
        );

        let wrong = Extraction::failed(
            ExtractionMethod::OcrLinear,
            FailureKind::WrongSection,
            "wrong form".to_string(),
        );
        assert_eq!(extraction_status(&wrong), "error");

        let empty = Extraction::empty(ExtractionMethod::OcrLinear);
        assert_eq!(extraction_status(&empty), "no_data");
    }

    #[test]
    fn failure_kind_backfills_missing_error_detail() {
        let mut extraction = Extraction::empty(ExtractionMethod::OcrLinear);
        extraction.failure = Some(FailureKind::WrongSection);

        let record = build_record(
            "06352054.pdf",
            &classification(DocumentKind::Scanned),
            &Location::empty(),
            &extraction,
            None,
        );
        assert_eq!(record.extraction_status, "error");
        assert_eq!(record.extraction_metadata.error.as_deref(), Some("wrong_section"));
    }

    #[test]
    fn record_round_trips_through_json() {
        let mut extraction = Extraction::empty(ExtractionMethod::OcrLayout);
        extraction.success = true;
        extraction.activities = vec![ActivityRecord::new(
            "Providing outreach".to_string(),
            "Reduced isolation".to_string(),
            6,
            Confidence::Medium,
        )];
        extraction.ocr_quality = Some(OcrQuality::Medium);

        let record = build_record(
            "06352054.pdf",
            &classification(DocumentKind::Scanned),
            &Location::empty(),
            &extraction,
            None,
        );

        let json = serde_json::to_string_pretty(&record).expect("serialize");
        let parsed: CanonicalRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, record);
        assert!(json.contains("\"ocr_quality\": \"medium\""));
        assert!(!json.contains("source_sha256"));
    }

    #[test]
    fn record_round_trips_through_file() {
        let mut extraction = Extraction::empty(ExtractionMethod::PdfTable);
        extraction.success = true;
        extraction.activities = vec![ActivityRecord::new(
            "Running a food bank".to_string(),
            "Reduced food poverty".to_string(),
            2,
            Confidence::High,
        )];

        let record = build_record(
            "14941059_newinc_2023-06-16.pdf",
            &classification(DocumentKind::Electronic),
            &Location::empty(),
            &extraction,
            None,
        );

        let path = std::env::temp_dir().join(format!(
            "cic36_record_roundtrip_{}.json",
            std::process::id()
        ));
        util::write_json_pretty(&path, &record).expect("write record");
        let loaded = load_record(&path).expect("load record");
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, record);
    }

    #[test]
    fn batch_summary_counts_statuses_and_kinds() {
        let mut success = Extraction::empty(ExtractionMethod::PdfTable);
        success.success = true;
        success.activities = vec![
            ActivityRecord::new("a".to_string(), "b".to_string(), 1, Confidence::High),
            ActivityRecord::new("c".to_string(), "d".to_string(), 1, Confidence::High),
        ];

        let failed = Extraction::failed(
            ExtractionMethod::None,
            FailureKind::UnreadableInput,
            "boom".to_string(),
        );
        let empty = Extraction::empty(ExtractionMethod::OcrLinear);

        let records = vec![
            build_record(
                "1_newinc_2023-01-01.pdf",
                &classification(DocumentKind::Electronic),
                &Location::empty(),
                &success,
                None,
            ),
            build_record(
                "06352054.pdf",
                &classification(DocumentKind::Scanned),
                &Location::empty(),
                &failed,
                None,
            ),
            build_record(
                "old_scan.pdf",
                &classification(DocumentKind::Hybrid),
                &Location::empty(),
                &empty,
                None,
            ),
        ];

        assert_eq!(failed_documents(&records), vec!["06352054.pdf".to_string()]);

        let summary = summarize_batch(records);
        assert_eq!(summary.batch_info.total_documents, 3);
        assert_eq!(summary.batch_info.successful, 1);
        assert_eq!(summary.batch_info.failed, 1);
        assert_eq!(summary.batch_info.no_data, 1);
        assert_eq!(summary.batch_info.electronic_docs, 1);
        assert_eq!(summary.batch_info.scanned_docs, 1);
        assert_eq!(summary.batch_info.hybrid_docs, 1);
        assert_eq!(summary.batch_info.total_activities, 2);
    }
}
