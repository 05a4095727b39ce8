//! Column recovery from layout-mode OCR word boxes.
//!
//! The Section B table is two side-by-side prose columns with no reliable
//! ruling in a scan. Word boxes are bucketed around the page midpoint and
//! each bucket is rebuilt into lines; linear OCR of the same page reads
//! across the gap and interleaves the columns, which is what this avoids.

use crate::config::Tuning;
use crate::model::WordBox;

/// Per-page result of layout analysis.
#[derive(Debug, Clone, Default)]
pub struct ColumnLayout {
    /// All words in reading order; used for header detection.
    pub linear_text: String,
    pub left_column: String,
    pub right_column: String,
    pub two_columns: bool,
    pub boundary: i32,
}

pub fn analyze_columns(words: &[WordBox], page_width: Option<i32>, tuning: &Tuning) -> ColumnLayout {
    let words: Vec<&WordBox> = words
        .iter()
        .filter(|word| word.conf >= tuning.min_word_confidence && !word.text.trim().is_empty())
        .collect();

    if words.is_empty() {
        return ColumnLayout::default();
    }

    // The boundary is half the raster width the OCR engine reported. The
    // word-extent midpoint only stands in when no page width came back; it
    // would bisect a page whose right column was left blank.
    let midpoint = match page_width.filter(|width| *width > 0) {
        Some(width) => width / 2,
        None => {
            let min_left = words.iter().map(|word| word.left).min().unwrap_or(0);
            let max_right = words
                .iter()
                .map(|word| word.left + word.width)
                .max()
                .unwrap_or(0);
            (min_left + max_right) / 2
        }
    };

    let (left_words, right_words): (Vec<&WordBox>, Vec<&WordBox>) = words
        .iter()
        .partition(|word| word.center_x() < midpoint);

    let left_mass: usize = left_words.iter().map(|word| word.text.chars().count()).sum();
    let right_mass: usize = right_words.iter().map(|word| word.text.chars().count()).sum();
    let total_mass = left_mass + right_mass;

    let two_columns = total_mass > 0 && {
        let left_ratio = left_mass as f64 / total_mass as f64;
        let right_ratio = right_mass as f64 / total_mass as f64;
        left_ratio > tuning.column_mass_floor && right_ratio > tuning.column_mass_floor
    };

    let linear_text = reconstruct_lines(&words, tuning.line_threshold).join("\n");

    let mut layout = ColumnLayout {
        linear_text,
        left_column: String::new(),
        right_column: String::new(),
        two_columns,
        boundary: midpoint,
    };

    if two_columns {
        layout.left_column = reconstruct_lines(&left_words, tuning.line_threshold).join("\n");
        layout.right_column = reconstruct_lines(&right_words, tuning.line_threshold).join("\n");
    } else {
        layout.left_column = layout.linear_text.clone();
    }

    layout
}

/// Group words into lines by vertical position and order each line left to
/// right. A new line starts when the top coordinate jumps past the threshold.
pub fn reconstruct_lines(words: &[&WordBox], line_threshold: i32) -> Vec<String> {
    if words.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<&WordBox> = words.to_vec();
    sorted.sort_by_key(|word| (word.top, word.left));

    let mut lines: Vec<String> = Vec::new();
    let mut current: Vec<&WordBox> = Vec::new();
    let mut current_top = sorted[0].top;

    for word in sorted {
        if (word.top - current_top).abs() > line_threshold {
            if !current.is_empty() {
                current.sort_by_key(|word| word.left);
                lines.push(join_words(&current));
            }
            current = vec![word];
            current_top = word.top;
        } else {
            current.push(word);
        }
    }

    if !current.is_empty() {
        current.sort_by_key(|word| word.left);
        lines.push(join_words(&current));
    }

    lines
}

fn join_words(words: &[&WordBox]) -> String {
    words
        .iter()
        .map(|word| word.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, left: i32, top: i32, conf: i32) -> WordBox {
        WordBox {
            text: text.to_string(),
            left,
            top,
            width: 60,
            height: 20,
            conf,
        }
    }

    #[test]
    fn balanced_columns_are_detected() {
        let words = vec![
            word("Running", 100, 100, 90),
            word("sports", 100, 130, 90),
            word("sessions", 100, 160, 90),
            word("Improved", 700, 100, 90),
            word("community", 700, 130, 90),
            word("health", 700, 160, 90),
        ];
        let layout = analyze_columns(&words, Some(800), &Tuning::default());
        assert!(layout.two_columns);
        assert!(layout.left_column.contains("Running"));
        assert!(layout.right_column.contains("health"));
        assert!(!layout.left_column.contains("Improved"));
    }

    #[test]
    fn lopsided_mass_is_single_column() {
        // Right side holds well under 15% of character mass.
        let mut words: Vec<WordBox> = (0..20)
            .map(|n| word("paragraph", 100, 100 + n * 30, 90))
            .collect();
        words.push(word("x", 700, 100, 90));
        let layout = analyze_columns(&words, Some(800), &Tuning::default());
        assert!(!layout.two_columns);
        assert!(layout.right_column.is_empty());
        assert!(layout.left_column.contains("paragraph"));
    }

    #[test]
    fn half_filled_page_is_single_column() {
        // Only the activities column was filled in; every word sits left of
        // the page midpoint, so the page must not read as two columns.
        let words: Vec<WordBox> = (0..50)
            .map(|n| word("activity", 100 + (n % 8) * 85, 100 + (n / 8) * 30, 90))
            .collect();
        let layout = analyze_columns(&words, Some(1700), &Tuning::default());
        assert!(!layout.two_columns);
        assert!(layout.right_column.is_empty());
        assert!(layout.left_column.contains("activity"));
    }

    #[test]
    fn extent_midpoint_stands_in_without_page_width() {
        let words = vec![
            word("Running", 100, 100, 90),
            word("sessions", 100, 130, 90),
            word("Improved", 700, 100, 90),
            word("health", 700, 130, 90),
        ];
        let layout = analyze_columns(&words, None, &Tuning::default());
        assert!(layout.two_columns);
        assert!(layout.right_column.contains("health"));
    }

    #[test]
    fn low_confidence_words_are_dropped() {
        let words = vec![
            word("kept", 100, 100, 80),
            word("noise", 700, 100, 5),
        ];
        let layout = analyze_columns(&words, Some(800), &Tuning::default());
        assert!(!layout.two_columns);
        assert_eq!(layout.linear_text, "kept");
    }

    #[test]
    fn lines_rebuild_in_reading_order() {
        let words = vec![
            word("second", 300, 102, 90),
            word("first", 100, 98, 90),
            word("below", 100, 150, 90),
        ];
        let refs: Vec<&WordBox> = words.iter().collect();
        let lines = reconstruct_lines(&refs, 15);
        assert_eq!(lines, vec!["first second".to_string(), "below".to_string()]);
    }

    #[test]
    fn empty_input_yields_default_layout() {
        let layout = analyze_columns(&[], Some(800), &Tuning::default());
        assert!(!layout.two_columns);
        assert!(layout.linear_text.is_empty());
    }
}
