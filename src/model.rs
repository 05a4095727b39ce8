use serde::{Deserialize, Serialize};

/// Native text layer of one page, produced once per document by the PDF
/// collaborator. Page numbers are 1-indexed throughout.
#[derive(Debug, Clone)]
pub struct PageText {
    pub page_number: usize,
    pub text: String,
    pub char_count: usize,
}

impl PageText {
    pub fn new(page_number: usize, text: String) -> Self {
        let char_count = text.trim().chars().count();
        Self {
            page_number,
            text,
            char_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Electronic,
    Scanned,
    Hybrid,
    Unknown,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Electronic => "electronic",
            Self::Scanned => "scanned",
            Self::Hybrid => "hybrid",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub kind: DocumentKind,
    pub page_count: usize,
    pub avg_chars_per_page: f64,
    pub electronic_pages: Vec<usize>,
    pub image_pages: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Classification {
    pub fn unknown(error: String) -> Self {
        Self {
            kind: DocumentKind::Unknown,
            page_count: 0,
            avg_chars_per_page: 0.0,
            electronic_pages: Vec::new(),
            image_pages: Vec::new(),
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Where the CIC 36 form and its Section B were found.
#[derive(Debug, Clone, Serialize)]
pub struct Location {
    pub cic36_pages: Vec<usize>,
    pub section_b_page: Option<usize>,
    pub confidence: Confidence,
    /// Candidate pages when no direct section match exists; ordered by how
    /// likely each structural window is to hold the form.
    pub suggested_pages: Vec<usize>,
    pub section_b_candidates: Vec<usize>,
}

impl Location {
    pub fn empty() -> Self {
        Self {
            cic36_pages: Vec::new(),
            section_b_page: None,
            confidence: Confidence::Low,
            suggested_pages: Vec::new(),
            section_b_candidates: Vec::new(),
        }
    }
}

/// One recognized word with its bounding box, from layout-mode OCR.
/// Confidence runs 0-100.
#[derive(Debug, Clone)]
pub struct WordBox {
    pub text: String,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    pub conf: i32,
}

impl WordBox {
    pub fn center_x(&self) -> i32 {
        self.left + self.width / 2
    }
}

/// A logical table recovered from one page; rows hold 2+ cells each.
#[derive(Debug, Clone)]
pub struct RecoveredTable {
    pub rows: Vec<Vec<String>>,
    pub source_page: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrQuality {
    VeryLow,
    Low,
    Medium,
    High,
}

impl OcrQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VeryLow => "very_low",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Document-level statements that ride on the first record of a document
/// rather than repeating per activity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordExtras {
    pub company_differs: Option<String>,
    pub surplus_use: Option<String>,
    pub beneficiaries: Option<String>,
}

impl RecordExtras {
    pub fn is_empty(&self) -> bool {
        self.company_differs.is_none() && self.surplus_use.is_none() && self.beneficiaries.is_none()
    }
}

/// One (activity, benefit) row recovered from Section B.
#[derive(Debug, Clone)]
pub struct ActivityRecord {
    pub activity: String,
    pub benefit: String,
    pub source_page: usize,
    pub confidence: Confidence,
    pub extras: Option<RecordExtras>,
    pub note: Option<String>,
}

impl ActivityRecord {
    pub fn new(activity: String, benefit: String, source_page: usize, confidence: Confidence) -> Self {
        Self {
            activity,
            benefit,
            source_page,
            confidence,
            extras: None,
            note: None,
        }
    }

    pub fn extras_mut(&mut self) -> &mut RecordExtras {
        self.extras.get_or_insert_with(RecordExtras::default)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    PdfTable,
    TextFallback,
    OcrLinear,
    OcrLayout,
    OcrStandalone,
    OcrAlternative,
    None,
}

impl ExtractionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PdfTable => "pdf_table",
            Self::TextFallback => "text_fallback",
            Self::OcrLinear => "ocr_tesseract",
            Self::OcrLayout => "ocr_tesseract_layout",
            Self::OcrStandalone => "ocr_tesseract_standalone",
            Self::OcrAlternative => "ocr_tesseract_alternative",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    UnreadableInput,
    ClassificationUnknown,
    SectionNotLocated,
    NoCic36Form,
    WrongSection,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnreadableInput => "unreadable_input",
            Self::ClassificationUnknown => "classification_unknown",
            Self::SectionNotLocated => "section_not_located",
            Self::NoCic36Form => "no_cic36_form",
            Self::WrongSection => "wrong_section",
        }
    }
}

/// Terminal artifact of one document's extraction pass. Never raises past
/// the pipeline boundary; failure is carried in `failure`/`error`.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub success: bool,
    pub activities: Vec<ActivityRecord>,
    pub method: ExtractionMethod,
    pub pages_searched: Vec<usize>,
    pub failure: Option<FailureKind>,
    pub error: Option<String>,
    pub ocr_quality: Option<OcrQuality>,
    pub handwritten: bool,
    pub referential: bool,
    pub note: Option<String>,
}

impl Extraction {
    pub fn empty(method: ExtractionMethod) -> Self {
        Self {
            success: false,
            activities: Vec::new(),
            method,
            pages_searched: Vec::new(),
            failure: None,
            error: None,
            ocr_quality: None,
            handwritten: false,
            referential: false,
            note: None,
        }
    }

    pub fn failed(method: ExtractionMethod, failure: FailureKind, error: String) -> Self {
        let mut extraction = Self::empty(method);
        extraction.failure = Some(failure);
        extraction.error = Some(error);
        extraction
    }

    /// First-found document-level extras across all records.
    pub fn first_extras(&self) -> RecordExtras {
        let mut merged = RecordExtras::default();
        for record in &self.activities {
            let Some(extras) = &record.extras else {
                continue;
            };
            if merged.company_differs.is_none() {
                merged.company_differs = extras.company_differs.clone();
            }
            if merged.surplus_use.is_none() {
                merged.surplus_use = extras.surplus_use.clone();
            }
            if merged.beneficiaries.is_none() {
                merged.beneficiaries = extras.beneficiaries.clone();
            }
        }
        merged
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilenameFormat {
    Modern,
    Partial,
    Legacy,
}

impl FilenameFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Modern => "modern",
            Self::Partial => "partial",
            Self::Legacy => "legacy",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilenameInfo {
    pub company_number: Option<String>,
    pub incorporation_date: Option<String>,
    pub format: FilenameFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEntry {
    pub activity: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionA {
    pub beneficiaries: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionB {
    pub activities: Vec<ActivityEntry>,
    pub company_differs: String,
    pub surplus_use: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionMetadata {
    pub source_file: String,
    pub cic36_page: Option<usize>,
    pub cic36_pages_found: Vec<usize>,
    pub location_confidence: String,
    pub extraction_method: String,
    pub pages_searched: Vec<usize>,
    pub extracted_at: String,
    pub document_page_count: usize,
    pub avg_chars_per_page: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_sha256: Option<String>,
}

/// The persisted per-document artifact; the unit external consumers read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalRecord {
    pub company_number: Option<String>,
    pub incorporation_date: Option<String>,
    pub document_type: String,
    pub extraction_status: String,
    pub section_a: SectionA,
    pub section_b: SectionB,
    pub extraction_metadata: ExtractionMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchInfo {
    pub total_documents: usize,
    pub successful: usize,
    pub failed: usize,
    pub no_data: usize,
    pub electronic_docs: usize,
    pub scanned_docs: usize,
    pub hybrid_docs: usize,
    pub total_activities: usize,
    pub processed_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub batch_info: BatchInfo,
    pub results: Vec<CanonicalRecord>,
}
