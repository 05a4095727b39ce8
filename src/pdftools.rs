use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::model::{RecoveredTable, WordBox};

/// Resolved external tool commands. Built once at startup and passed into the
/// collaborators; nothing reads tool locations from ambient state afterwards.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub pdftotext: String,
    pub pdftoppm: String,
    pub pdfinfo: String,
    pub tesseract: String,
    pub ocr_lang: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            pdftotext: "pdftotext".to_string(),
            pdftoppm: "pdftoppm".to_string(),
            pdfinfo: "pdfinfo".to_string(),
            tesseract: "tesseract".to_string(),
            ocr_lang: "eng".to_string(),
        }
    }
}

impl ToolConfig {
    pub fn discover() -> Self {
        let config = Self::default();
        for tool in [
            &config.pdftotext,
            &config.pdftoppm,
            &config.pdfinfo,
            &config.tesseract,
        ] {
            if !command_available(tool) {
                debug!(tool = %tool, "external tool not found on PATH");
            }
        }
        config
    }

    pub fn ocr_available(&self) -> bool {
        command_available(&self.pdftoppm) && command_available(&self.tesseract)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    pub name: String,
    pub available: bool,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolReport {
    pub ocr_available: bool,
    pub tools: Vec<ToolStatus>,
}

pub fn tool_report(config: &ToolConfig) -> ToolReport {
    let tools: Vec<ToolStatus> = [
        (&config.pdftotext, "-v"),
        (&config.pdftoppm, "-v"),
        (&config.pdfinfo, "-v"),
        (&config.tesseract, "--version"),
    ]
    .into_iter()
    .map(|(tool, flag)| {
        let version = tool_version(tool, flag);
        ToolStatus {
            name: tool.clone(),
            available: version.is_some(),
            version,
        }
    })
    .collect();

    ToolReport {
        ocr_available: config.ocr_available(),
        tools,
    }
}

fn tool_version(program: &str, flag: &str) -> Option<String> {
    let output = Command::new(program).arg(flag).output().ok()?;
    // Poppler tools report their version on stderr.
    let text = if output.stdout.is_empty() {
        String::from_utf8_lossy(&output.stderr).to_string()
    } else {
        String::from_utf8_lossy(&output.stdout).to_string()
    };
    text.lines().next().map(|line| line.trim().to_string())
}

pub fn command_available(program: &str) -> bool {
    Command::new(program).arg("--version").output().is_ok()
        || Command::new(program).arg("-v").output().is_ok()
}

/// Table detection strategies, tried in cascade order by the digital path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStrategy {
    /// Ruled table grid from the page's vector line structure.
    Lattice,
    /// Line-based detection with relaxed snap/intersection tolerance.
    RelaxedLines,
    /// Column alignment of the text alone, no ruled lines required.
    TextAlignment,
}

/// A rasterized page written to a temporary file; removed on drop.
#[derive(Debug)]
pub struct PageImage {
    pub path: PathBuf,
    pub dpi: u32,
}

impl Drop for PageImage {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// The PDF collaborator: page count, native text, table recovery input, and
/// rasterization. A missing or corrupt file fails `open`; a readable document
/// with zero pages is not an error.
pub trait PdfSource {
    fn page_count(&self) -> usize;
    fn page_text(&self, page_number: usize) -> Result<String>;
    fn page_tables(&self, page_number: usize, strategy: TableStrategy) -> Result<Vec<RecoveredTable>>;
    fn render_page(&self, page_number: usize, dpi: u32) -> Result<PageImage>;
}

/// Output of layout-mode OCR: word boxes plus the raster width the engine
/// reported for the page, when it reported one.
#[derive(Debug, Clone, Default)]
pub struct RecognizedLayout {
    pub page_width: Option<i32>,
    pub words: Vec<WordBox>,
}

/// The OCR collaborator: flat text or word boxes for a rendered page.
pub trait OcrEngine {
    fn recognize(&self, image: &PageImage) -> Result<String>;
    fn recognize_layout(&self, image: &PageImage) -> Result<RecognizedLayout>;
}

/// Poppler-backed PDF source. The whole text layer is pulled once with
/// `pdftotext` and split on form feeds; `pdfinfo` supplies the true page
/// count since trailing image-only pages drop out of the text layer.
pub struct PopplerPdf {
    path: PathBuf,
    tools: ToolConfig,
    page_count: usize,
    pages: Vec<String>,
}

impl PopplerPdf {
    pub fn open(path: &Path, tools: &ToolConfig) -> Result<Self> {
        if !path.exists() {
            bail!("PDF not found: {}", path.display());
        }

        let page_count = page_count_with_pdfinfo(path, tools)?;
        let mut pages = extract_pages_with_pdftotext(path, tools)?;
        if pages.len() < page_count {
            pages.resize(page_count, String::new());
        }

        Ok(Self {
            path: path.to_path_buf(),
            tools: tools.clone(),
            page_count,
            pages,
        })
    }
}

impl PdfSource for PopplerPdf {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_text(&self, page_number: usize) -> Result<String> {
        if page_number == 0 || page_number > self.page_count {
            bail!(
                "page {} out of range for {} ({} pages)",
                page_number,
                self.path.display(),
                self.page_count
            );
        }
        Ok(self.pages.get(page_number - 1).cloned().unwrap_or_default())
    }

    fn page_tables(&self, page_number: usize, strategy: TableStrategy) -> Result<Vec<RecoveredTable>> {
        match strategy {
            // Poppler exposes no ruled-line geometry; the line strategies
            // yield nothing and the cascade falls through to alignment.
            TableStrategy::Lattice | TableStrategy::RelaxedLines => Ok(Vec::new()),
            TableStrategy::TextAlignment => {
                let layout = extract_page_layout_text(&self.path, page_number, &self.tools)?;
                Ok(split_layout_columns(&layout, page_number)
                    .map(|table| vec![table])
                    .unwrap_or_default())
            }
        }
    }

    fn render_page(&self, page_number: usize, dpi: u32) -> Result<PageImage> {
        let stem = self
            .path
            .file_stem()
            .and_then(|value| value.to_str())
            .unwrap_or("pdf");
        let safe_stem: String = stem
            .chars()
            .map(|character| {
                if character.is_ascii_alphanumeric() {
                    character
                } else {
                    '_'
                }
            })
            .collect();

        let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let output_root = std::env::temp_dir().join(format!(
            "cic36_ocr_{}_{}_{}_{}",
            safe_stem,
            std::process::id(),
            page_number,
            stamp
        ));
        let png_path = PathBuf::from(format!("{}.png", output_root.display()));

        let output = Command::new(&self.tools.pdftoppm)
            .arg("-f")
            .arg(page_number.to_string())
            .arg("-l")
            .arg(page_number.to_string())
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-singlefile")
            .arg("-png")
            .arg(&self.path)
            .arg(&output_root)
            .output()
            .with_context(|| format!("failed to execute pdftoppm for {}", self.path.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "pdftoppm returned non-zero exit status for {} page {}: {}",
                self.path.display(),
                page_number,
                stderr.trim()
            );
        }

        if !png_path.exists() {
            bail!(
                "pdftoppm did not produce expected image for {} page {}",
                self.path.display(),
                page_number
            );
        }

        Ok(PageImage {
            path: png_path,
            dpi,
        })
    }
}

fn page_count_with_pdfinfo(path: &Path, tools: &ToolConfig) -> Result<usize> {
    let output = Command::new(&tools.pdfinfo)
        .arg(path)
        .output()
        .with_context(|| format!("failed to execute pdfinfo for {}", path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdfinfo returned non-zero exit status for {}: {}",
            path.display(),
            stderr.trim()
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        if let Some(rest) = line.strip_prefix("Pages:") {
            return rest
                .trim()
                .parse::<usize>()
                .with_context(|| format!("failed to parse page count for {}", path.display()));
        }
    }

    bail!("pdfinfo output had no page count for {}", path.display())
}

fn extract_pages_with_pdftotext(path: &Path, tools: &ToolConfig) -> Result<Vec<String>> {
    let output = Command::new(&tools.pdftotext)
        .arg("-enc")
        .arg("UTF-8")
        .arg(path)
        .arg("-")
        .output()
        .with_context(|| format!("failed to execute pdftotext for {}", path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext returned non-zero exit status for {}: {}",
            path.display(),
            stderr.trim()
        );
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    let mut pages: Vec<String> = raw
        .split('\u{000C}')
        .map(|chunk| chunk.replace('\u{0000}', ""))
        .collect();

    while let Some(last_page) = pages.last() {
        if last_page.trim().is_empty() {
            pages.pop();
            continue;
        }
        break;
    }

    Ok(pages)
}

fn extract_page_layout_text(path: &Path, page_number: usize, tools: &ToolConfig) -> Result<String> {
    let output = Command::new(&tools.pdftotext)
        .arg("-enc")
        .arg("UTF-8")
        .arg("-layout")
        .arg("-f")
        .arg(page_number.to_string())
        .arg("-l")
        .arg(page_number.to_string())
        .arg(path)
        .arg("-")
        .output()
        .with_context(|| format!("failed to execute pdftotext -layout for {}", path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext -layout returned non-zero exit status for {} page {}: {}",
            path.display(),
            page_number,
            stderr.trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).replace('\u{0000}', ""))
}

/// Recover a two-column table from layout-preserved text by finding a
/// whitespace gutter shared by most content lines, then splitting every
/// line at it. Returns `None` when no stable gutter exists.
pub fn split_layout_columns(layout_text: &str, page_number: usize) -> Option<RecoveredTable> {
    let lines: Vec<&str> = layout_text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();
    if lines.len() < 3 {
        return None;
    }

    let widths: Vec<Vec<char>> = lines.iter().map(|line| line.chars().collect()).collect();
    let max_len = widths.iter().map(Vec::len).max().unwrap_or(0);
    if max_len < 20 {
        return None;
    }

    // A column index is part of the gutter when at least 80% of the content
    // lines are blank there (short lines count as blank past their end).
    let mut gutter = vec![true; max_len];
    for chars in &widths {
        for (index, slot) in gutter.iter_mut().enumerate() {
            if let Some(character) = chars.get(index)
                && !character.is_whitespace()
            {
                *slot = false;
            }
        }
    }

    // Find the widest run of gutter columns away from the margins.
    let margin = max_len / 10;
    let mut best: Option<(usize, usize)> = None;
    let mut run_start = None;
    for index in margin..max_len.saturating_sub(margin) {
        if gutter[index] {
            run_start.get_or_insert(index);
        } else if let Some(start) = run_start.take() {
            let len = index - start;
            if best.map(|(_, best_len)| len > best_len).unwrap_or(true) {
                best = Some((start, len));
            }
        }
    }
    if let Some(start) = run_start {
        let len = max_len.saturating_sub(margin) - start;
        if best.map(|(_, best_len)| len > best_len).unwrap_or(true) {
            best = Some((start, len));
        }
    }

    let (split_at, run_len) = best?;
    if run_len < 2 {
        return None;
    }

    let rows: Vec<Vec<String>> = lines
        .iter()
        .map(|line| {
            let chars: Vec<char> = line.chars().collect();
            let left: String = chars.iter().take(split_at).collect();
            let right: String = chars.iter().skip(split_at + run_len).collect();
            vec![left.trim().to_string(), right.trim().to_string()]
        })
        .filter(|cells| cells.iter().any(|cell| !cell.is_empty()))
        .collect();

    if rows.is_empty() {
        return None;
    }

    Some(RecoveredTable {
        rows,
        source_page: page_number,
    })
}

/// Tesseract-backed OCR engine. Layout mode parses the TSV output into word
/// boxes; linear mode returns the plain recognized text.
pub struct TesseractOcr {
    tools: ToolConfig,
}

impl TesseractOcr {
    pub fn new(tools: &ToolConfig) -> Self {
        Self {
            tools: tools.clone(),
        }
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &PageImage) -> Result<String> {
        let output = Command::new(&self.tools.tesseract)
            .arg(&image.path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.tools.ocr_lang)
            .arg("--psm")
            .arg("6")
            .output()
            .with_context(|| format!("failed to execute tesseract for {}", image.path.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "tesseract returned non-zero exit status for {}: {}",
                image.path.display(),
                stderr.trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .replace('\u{0000}', "")
            .trim()
            .to_string())
    }

    fn recognize_layout(&self, image: &PageImage) -> Result<RecognizedLayout> {
        let output = Command::new(&self.tools.tesseract)
            .arg(&image.path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.tools.ocr_lang)
            .arg("--psm")
            .arg("6")
            .arg("tsv")
            .output()
            .with_context(|| {
                format!("failed to execute tesseract tsv for {}", image.path.display())
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "tesseract tsv returned non-zero exit status for {}: {}",
                image.path.display(),
                stderr.trim()
            );
        }

        Ok(parse_tesseract_tsv(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Parse tesseract TSV output. Word rows are level 5; confidence comes back
/// as a float string or `-1` for non-word rows. The level-1 page row carries
/// the raster dimensions.
pub fn parse_tesseract_tsv(tsv: &str) -> RecognizedLayout {
    let mut layout = RecognizedLayout::default();

    for line in tsv.lines().skip(1) {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        let parse = |value: &str| value.trim().parse::<i32>().unwrap_or(0);

        if fields[0].trim() == "1" {
            let width = parse(fields[8]);
            if width > 0 {
                layout.page_width = Some(width);
            }
            continue;
        }
        if fields[0].trim() != "5" {
            continue;
        }

        let text = fields[11].trim();
        if text.is_empty() {
            continue;
        }

        let conf = fields[10]
            .trim()
            .parse::<f32>()
            .map(|value| value.round() as i32)
            .unwrap_or(-1);

        layout.words.push(WordBox {
            text: text.to_string(),
            left: parse(fields[6]),
            top: parse(fields[7]),
            width: parse(fields[8]),
            height: parse(fields[9]),
            conf,
        });
    }

    layout
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tesseract_tsv_keeps_word_rows_only() {
        let tsv = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n\
                   1\t1\t0\t0\t0\t0\t0\t0\t1000\t1400\t-1\t\n\
                   5\t1\t1\t1\t1\t1\t120\t80\t60\t20\t96.57\tSports\n\
                   5\t1\t1\t1\t1\t2\t200\t82\t80\t20\t91.03\tcoaching\n\
                   5\t1\t1\t1\t1\t3\t300\t82\t10\t20\t-1\t ";

        let layout = parse_tesseract_tsv(tsv);
        assert_eq!(layout.page_width, Some(1000));
        assert_eq!(layout.words.len(), 2);
        assert_eq!(layout.words[0].text, "Sports");
        assert_eq!(layout.words[0].conf, 97);
        assert_eq!(layout.words[1].left, 200);
    }

    #[test]
    fn layout_columns_split_at_shared_gutter() {
        let layout = "\
Running weekly sports sessions          The community will benefit from
for local young people                  improved health and fitness
open to all abilities                   and reduced social isolation";

        let table = split_layout_columns(layout, 3).expect("gutter expected");
        assert_eq!(table.source_page, 3);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].len(), 2);
        assert!(table.rows[0][0].starts_with("Running weekly"));
        assert!(table.rows[0][1].starts_with("The community"));
    }

    #[test]
    fn layout_columns_reject_single_column_text() {
        let layout = "\
This page is a single flowing paragraph of text without any
columnar structure at all, so no gutter should be detected
anywhere in the middle of these lines of prose text here.";

        assert!(split_layout_columns(layout, 1).is_none());
    }
}
