/// Empirically tuned thresholds and search windows.
///
/// The page windows were tuned against observed filing layouts rather than
/// derived from any structural rule, so they are carried as configuration
/// with the historical defaults instead of constants.
#[derive(Debug, Clone)]
pub struct Tuning {
    /// A page with at least this many stripped text-layer characters counts
    /// as electronic.
    pub min_chars_per_page: usize,
    /// Word boxes below this OCR confidence are discarded.
    pub min_word_confidence: i32,
    /// Both column buckets must hold more than this share of character mass
    /// for a page to count as two-column.
    pub column_mass_floor: f64,
    /// Vertical distance in pixels within which words belong to one line.
    pub line_threshold: i32,
    /// Pages to search for Section B after a CIC 36 form match.
    pub form_window: usize,
    /// Pages past the Section B header before giving up on an end marker.
    pub section_page_cap: usize,
    /// Legacy forms carry Section B in roughly the first this-many pages.
    pub legacy_window: usize,
    /// Mid-document window searched in long composite filings.
    pub mid_window: (usize, usize),
    /// Documents longer than this get the mid-document window.
    pub mid_window_min_pages: usize,
    /// Modern forms sit within this many trailing pages.
    pub trailing_window: usize,
    /// Trailing pages suggested when the text layer matched nothing at all.
    pub electronic_trailing_window: usize,
    /// Hybrid documents OCR at most this many trailing image pages.
    pub max_hybrid_pages: usize,
    /// Rasterization DPI for the first OCR attempt.
    pub ocr_dpi: u32,
    /// Alternate DPI values retried when a page OCRs implausibly short and
    /// the base DPI is the 200 default; see `retry_dpis`.
    pub fallback_dpis: Vec<u32>,
    /// Surplus statements longer than this are truncated at a sentence
    /// boundary; longer text is activity content bleeding through.
    pub max_surplus_length: usize,
}

impl Tuning {
    /// The DPI retry ladder for implausibly short OCR output. A non-default
    /// base DPI gets a ladder anchored on 200, the resolution most filings
    /// recognize best at; the base itself is never retried.
    pub fn retry_dpis(&self) -> Vec<u32> {
        if self.ocr_dpi == 200 {
            return self.fallback_dpis.clone();
        }
        let mut ladder = vec![200, 150, 250];
        ladder.retain(|dpi| *dpi != self.ocr_dpi);
        ladder
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            min_chars_per_page: 50,
            min_word_confidence: 20,
            column_mass_floor: 0.15,
            line_threshold: 15,
            form_window: 6,
            section_page_cap: 4,
            legacy_window: 15,
            mid_window: (35, 65),
            mid_window_min_pages: 30,
            trailing_window: 30,
            electronic_trailing_window: 10,
            max_hybrid_pages: 25,
            ocr_dpi: 200,
            fallback_dpis: vec![150, 250, 300],
            max_surplus_length: 300,
        }
    }
}
