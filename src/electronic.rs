//! Section B extraction for documents with a native text layer.
//!
//! Table recovery runs a strategy cascade per page; when no table survives,
//! a raw-text fallback salvages whatever sits between the Section B header
//! and the next section.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use crate::config::Tuning;
use crate::model::{
    ActivityRecord, Confidence, Extraction, ExtractionMethod, FailureKind, RecoveredTable,
};
use crate::pdftools::{PdfSource, TableStrategy};
use crate::segment;
use crate::validate;

static TEXT_FALLBACK_START: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"(?s)Section\s*B[:\s].*?Activities.*?Benefit")
        .case_insensitive(true)
        .build()
        .expect("pattern must compile")
});
static TEXT_FALLBACK_END: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"Section\s*[C-Z]\b")
        .case_insensitive(true)
        .build()
        .expect("pattern must compile")
});

const STRATEGIES: [TableStrategy; 3] = [
    TableStrategy::Lattice,
    TableStrategy::RelaxedLines,
    TableStrategy::TextAlignment,
];

/// Extract Section B starting from the located header page. The table often
/// starts on the previous page or runs onto the following ones, so a small
/// window around the header page is searched.
pub fn extract_section_b(
    source: &dyn PdfSource,
    section_b_page: usize,
    tuning: &Tuning,
) -> Extraction {
    let page_count = source.page_count();
    if page_count == 0 || section_b_page == 0 || section_b_page > page_count {
        return Extraction::failed(
            ExtractionMethod::None,
            FailureKind::SectionNotLocated,
            format!("Section B page {section_b_page} out of range ({page_count} pages)"),
        );
    }

    let pages = candidate_pages(section_b_page, page_count);

    let mut records: Vec<ActivityRecord> = Vec::new();
    for &page in &pages {
        for strategy in STRATEGIES {
            let tables = match source.page_tables(page, strategy) {
                Ok(tables) => tables,
                Err(error) => {
                    warn!(page, ?strategy, %error, "table recovery failed");
                    continue;
                }
            };

            let mut found = Vec::new();
            for table in &tables {
                found.extend(parse_activities_table(table));
            }
            if !found.is_empty() {
                debug!(page, ?strategy, rows = found.len(), "recovered table rows");
                records.extend(found);
                break;
            }
        }
    }

    let mut records = validate::deduplicate(records, false);

    let combined_text = collect_text(source, &pages);

    if records.is_empty() {
        records = text_fallback(&combined_text);
        if !records.is_empty() {
            let mut extraction = build_extraction(
                source,
                records,
                ExtractionMethod::TextFallback,
                pages,
                section_b_page,
                &combined_text,
                tuning,
            );
            extraction.note =
                Some("Extracted from raw text - manual review recommended".to_string());
            return extraction;
        }

        return Extraction::failed(
            ExtractionMethod::None,
            FailureKind::SectionNotLocated,
            "No activities found in Section B".to_string(),
        );
    }

    build_extraction(
        source,
        records,
        ExtractionMethod::PdfTable,
        pages,
        section_b_page,
        &combined_text,
        tuning,
    )
}

fn candidate_pages(section_b_page: usize, page_count: usize) -> Vec<usize> {
    let first = section_b_page.saturating_sub(1).max(1);
    let last = (section_b_page + 2).min(page_count);
    (first..=last).collect()
}

fn collect_text(source: &dyn PdfSource, pages: &[usize]) -> String {
    let mut combined = String::new();
    for &page in pages {
        match source.page_text(page) {
            Ok(text) => {
                combined.push_str(&text);
                combined.push('\n');
            }
            Err(error) => warn!(page, %error, "page text unavailable"),
        }
    }
    combined
}

fn build_extraction(
    source: &dyn PdfSource,
    mut records: Vec<ActivityRecord>,
    method: ExtractionMethod,
    pages: Vec<usize>,
    section_b_page: usize,
    combined_text: &str,
    tuning: &Tuning,
) -> Extraction {
    if validate::is_wrong_section(&records) {
        let mut extraction = Extraction::failed(
            method,
            FailureKind::WrongSection,
            "Extracted content belongs to a different form section".to_string(),
        );
        extraction.pages_searched = pages;
        return extraction;
    }

    let company_differs = segment::extract_company_differs(combined_text);
    let surplus_use = segment::extract_surplus_use(combined_text, tuning);
    let beneficiaries = beneficiaries_near(source, section_b_page);

    if let Some(first) = records.first_mut() {
        let extras = first.extras_mut();
        if !company_differs.is_empty() {
            extras.company_differs = Some(company_differs);
        }
        if !surplus_use.is_empty() {
            extras.surplus_use = Some(surplus_use);
        }
        if !beneficiaries.is_empty() {
            extras.beneficiaries = Some(beneficiaries);
        }
    }

    let mut extraction = Extraction::empty(method);
    extraction.success = true;
    extraction.activities = records;
    extraction.pages_searched = pages;
    extraction
}

/// Section A sits just before the Section B header; its beneficiaries line
/// can spill either side of the page break.
fn beneficiaries_near(source: &dyn PdfSource, section_b_page: usize) -> String {
    let first = section_b_page.saturating_sub(2).max(1);
    for page in (first..=section_b_page).rev() {
        let Ok(text) = source.page_text(page) else {
            continue;
        };
        let found = segment::extract_beneficiaries_from_text(&text);
        if !found.is_empty() {
            return found;
        }
        let found = segment::extract_beneficiaries(&text);
        if !found.is_empty() {
            return found;
        }
    }
    String::new()
}

/// Turn one recovered table into activity records. Rows above the header
/// row are form chrome; rows whose activity cell is itself a header or an
/// instruction are skipped.
fn parse_activities_table(table: &RecoveredTable) -> Vec<ActivityRecord> {
    let start = validate::find_header_row(&table.rows)
        .map(|index| index + 1)
        .unwrap_or(0);

    let mut records = Vec::new();
    for row in table.rows.iter().skip(start) {
        if row.len() < 2 {
            continue;
        }

        let activity = validate::clean_cell_text(Some(row[0].as_str()));
        let benefit = validate::clean_cell_text(Some(row[1].as_str()));
        if activity.is_empty() && benefit.is_empty() {
            continue;
        }
        if validate::is_header_or_instruction(&activity) {
            continue;
        }

        records.push(ActivityRecord::new(
            activity,
            benefit,
            table.source_page,
            Confidence::High,
        ));
    }

    records
}

/// Last resort for the digital path: everything between the Section B
/// header and the next lettered section, flattened into one record.
fn text_fallback(text: &str) -> Vec<ActivityRecord> {
    let Some(start) = TEXT_FALLBACK_START.find(text) else {
        return Vec::new();
    };

    let remaining = &text[start.end()..];
    let end = TEXT_FALLBACK_END
        .find(remaining)
        .map(|found| found.start())
        .unwrap_or(remaining.len());

    let content: Vec<&str> = remaining[..end]
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !validate::is_header_line(line))
        .collect();
    let content = content.join(" ");

    if content.trim().chars().count() < 20 {
        return Vec::new();
    }

    vec![ActivityRecord::new(
        content.trim().to_string(),
        String::new(),
        0,
        Confidence::Low,
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecoveredTable;
    use crate::pdftools::PageImage;
    use anyhow::bail;
    use std::collections::HashMap;

    struct FakePdf {
        pages: Vec<String>,
        tables: HashMap<usize, Vec<RecoveredTable>>,
    }

    impl FakePdf {
        fn new(pages: Vec<&str>) -> Self {
            Self {
                pages: pages.into_iter().map(str::to_string).collect(),
                tables: HashMap::new(),
            }
        }

        fn with_table(mut self, page: usize, rows: Vec<Vec<&str>>) -> Self {
            let rows = rows
                .into_iter()
                .map(|row| row.into_iter().map(str::to_string).collect())
                .collect();
            self.tables.entry(page).or_default().push(RecoveredTable {
                rows,
                source_page: page,
            });
            self
        }
    }

    impl PdfSource for FakePdf {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        fn page_text(&self, page_number: usize) -> anyhow::Result<String> {
            Ok(self
                .pages
                .get(page_number - 1)
                .cloned()
                .unwrap_or_default())
        }

        fn page_tables(
            &self,
            page_number: usize,
            strategy: TableStrategy,
        ) -> anyhow::Result<Vec<RecoveredTable>> {
            // Recovered rows surface on the final cascade stage, as they do
            // for a text-alignment backend.
            if strategy != TableStrategy::TextAlignment {
                return Ok(Vec::new());
            }
            Ok(self.tables.get(&page_number).cloned().unwrap_or_default())
        }

        fn render_page(&self, page_number: usize, _dpi: u32) -> anyhow::Result<PageImage> {
            bail!("no raster backend for page {page_number}")
        }
    }

    #[test]
    fn table_rows_become_high_confidence_records() {
        let pdf = FakePdf::new(vec![
            "cover page",
            "SECTION A",
            "SECTION B: Community Interest Statement",
            "more text",
        ])
        .with_table(
            3,
            vec![
                vec!["Activities", "How will the activity benefit the community?"],
                vec![
                    "Running a community cafe",
                    "Affordable meals for local residents",
                ],
                vec!["Free IT classes", "Reduced digital exclusion"],
            ],
        );

        let extraction = extract_section_b(&pdf, 3, &Tuning::default());
        assert!(extraction.success);
        assert_eq!(extraction.method, ExtractionMethod::PdfTable);
        assert_eq!(extraction.activities.len(), 2);
        assert_eq!(extraction.activities[0].activity, "Running a community cafe");
        assert_eq!(extraction.activities[0].confidence, Confidence::High);
        assert_eq!(extraction.activities[0].source_page, 3);
        assert_eq!(extraction.pages_searched, vec![2, 3, 4]);
    }

    #[test]
    fn extras_come_from_surrounding_text() {
        let pdf = FakePdf::new(vec![
            "The company's activities will provide benefit to: residents of Greater Manchester \
             SECTION B",
            "Our company differs from a general commercial company because profits stay local. \
             If the company makes any surplus it will be used for more free sessions. Section C",
        ])
        .with_table(
            2,
            vec![vec![
                "Delivering youth football coaching",
                "Improved health for young people",
            ]],
        );

        let extraction = extract_section_b(&pdf, 2, &Tuning::default());
        assert!(extraction.success);
        let extras = extraction.first_extras();
        assert_eq!(
            extras.beneficiaries.as_deref(),
            Some("residents of Greater Manchester")
        );
        assert!(
            extras
                .company_differs
                .as_deref()
                .unwrap_or("")
                .contains("profits stay local")
        );
        assert!(
            extras
                .surplus_use
                .as_deref()
                .unwrap_or("")
                .contains("more free sessions")
        );
    }

    #[test]
    fn duplicate_rows_across_pages_collapse() {
        let pdf = FakePdf::new(vec!["one", "two", "three"])
            .with_table(2, vec![vec!["Running a food bank", "Less food poverty"]])
            .with_table(3, vec![vec!["Running a food bank", "Less food poverty"]]);

        let extraction = extract_section_b(&pdf, 2, &Tuning::default());
        assert_eq!(extraction.activities.len(), 1);
    }

    #[test]
    fn raw_text_fallback_salvages_untabled_content() {
        let pdf = FakePdf::new(vec![
            "SECTION B: Community Interest Statement Activities and Related Benefit\n\
             Providing a community woodland and running conservation volunteering days\n\
             open to everyone in the parish\n\
             Section C: Company name",
        ]);

        let extraction = extract_section_b(&pdf, 1, &Tuning::default());
        assert!(extraction.success);
        assert_eq!(extraction.method, ExtractionMethod::TextFallback);
        assert_eq!(extraction.activities.len(), 1);
        assert!(extraction.activities[0].activity.contains("community woodland"));
        assert!(!extraction.activities[0].activity.contains("Company name"));
        assert_eq!(extraction.activities[0].confidence, Confidence::Low);
    }

    #[test]
    fn registration_form_rows_fail_as_wrong_section() {
        let pdf = FakePdf::new(vec!["page"]).with_table(
            1,
            vec![vec![
                "Proposed officers of the company",
                "For a secretary who is an individual, go to Section C1",
            ]],
        );

        let extraction = extract_section_b(&pdf, 1, &Tuning::default());
        assert!(!extraction.success);
        assert_eq!(extraction.failure, Some(FailureKind::WrongSection));
        assert!(extraction.activities.is_empty());
    }

    #[test]
    fn out_of_range_page_fails_cleanly() {
        let pdf = FakePdf::new(vec!["only page"]);
        let extraction = extract_section_b(&pdf, 9, &Tuning::default());
        assert!(!extraction.success);
        assert_eq!(extraction.failure, Some(FailureKind::SectionNotLocated));
    }
}
