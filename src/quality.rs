//! OCR output quality assessment.
//!
//! Crude but effective linguistic checks: recognizable English has a stable
//! vowel ratio, a predictable density of common words, and short consonant
//! runs. Garbled OCR and handwriting violate all three.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::OcrQuality;

const COMMON_WORDS: &[&str] = &[
    "the", "and", "for", "will", "community", "be", "to", "of", "is", "in", "that", "with", "by",
    "as", "are", "from",
];

const FORM_COMMON_WORDS: &[&str] = &[
    "the", "and", "for", "will", "community", "be", "to", "of", "is", "in", "that", "with", "by",
    "as", "are", "from", "company", "benefit", "activity", "activities", "section",
];

static CONSONANT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[bcdfghjklmnpqrstvwxyz]{6,}").expect("pattern must compile"));

static HANDWRITING_NOISE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"[bcdfghjklmnpqrstvwxyz]{5,}",
        r"[aeiou]{4,}",
        r"\|{2,}",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("pattern must compile"))
    .collect()
});

fn count_common_words(text_lower: &str, vocabulary: &[&str]) -> usize {
    vocabulary
        .iter()
        .filter(|word| {
            text_lower
                .split(|c: char| !c.is_ascii_alphanumeric())
                .any(|token| token == **word)
        })
        .count()
}

pub fn assess_quality(text: &str) -> OcrQuality {
    if text.trim().chars().count() < 50 {
        return OcrQuality::VeryLow;
    }

    let text_lower = text.to_lowercase();
    let vowels = text_lower.chars().filter(|c| "aeiou".contains(*c)).count();
    let consonants = text_lower
        .chars()
        .filter(|c| "bcdfghjklmnpqrstvwxyz".contains(*c))
        .count();
    let letters = vowels + consonants;
    if letters == 0 {
        return OcrQuality::VeryLow;
    }

    // English runs around 38% vowels.
    let vowel_ratio = vowels as f64 / letters as f64;
    let words_found = count_common_words(&text_lower, COMMON_WORDS);

    let special = text
        .chars()
        .filter(|c| "{}[]|\\<>~`^@#$%&*+=".contains(*c))
        .count();
    let special_ratio = special as f64 / text.chars().count() as f64;

    let consonant_runs = CONSONANT_RUN.find_iter(&text_lower).count();

    if !(0.15..=0.65).contains(&vowel_ratio)
        || words_found < 3
        || special_ratio > 0.1
        || consonant_runs > 3
    {
        return OcrQuality::VeryLow;
    }

    if !(0.25..=0.55).contains(&vowel_ratio)
        || words_found < 6
        || special_ratio > 0.05
        || consonant_runs > 1
    {
        return OcrQuality::Low;
    }

    if words_found >= 10 {
        return OcrQuality::Medium;
    }

    OcrQuality::Low
}

/// Handwriting OCRs into short fragments with few recognizable words.
pub fn is_likely_handwritten(text: &str) -> bool {
    if text.trim().chars().count() < 50 {
        return false;
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return false;
    }

    let short_words = words.iter().filter(|w| w.chars().count() <= 2).count();
    let short_ratio = short_words as f64 / words.len() as f64;

    let text_lower = text.to_lowercase();
    let words_found = count_common_words(&text_lower, FORM_COMMON_WORDS);

    // Printed form text yields roughly one common word per 100 characters.
    let expected_common = text.chars().count() as f64 / 100.0;

    if short_ratio > 0.4 && words_found < 5 {
        return true;
    }

    if expected_common > 2.0 && (words_found as f64) < expected_common * 0.3 {
        return true;
    }

    let noise: usize = HANDWRITING_NOISE
        .iter()
        .map(|pattern| pattern.find_iter(&text_lower).count())
        .sum();
    noise > 5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_very_low() {
        assert_eq!(assess_quality("a few words"), OcrQuality::VeryLow);
    }

    #[test]
    fn clean_form_prose_rates_medium() {
        let text = "The company will provide sports coaching for young people in the \
                    local community and the activities will benefit the community by \
                    improving health and wellbeing for all of the residents that take \
                    part, with sessions run by qualified coaches from the area.";
        assert_eq!(assess_quality(text), OcrQuality::Medium);
    }

    #[test]
    fn garbled_text_is_very_low() {
        let text = "xkcdqrtpl mnbvcxzq wrtplkjh qzxcvbnmr tplkghjw zxcqwrtv \
                    bnmklpjh qrtzxcvw mnbplkjh xzqwrtcv";
        assert_eq!(assess_quality(text), OcrQuality::VeryLow);
    }

    #[test]
    fn fragmented_text_reads_as_handwritten() {
        let text = "ab cd ef gh ij kl mn op qr st uv wx yz aa bb cc dd ee ff gg hh ii jj kk ll";
        assert!(is_likely_handwritten(text));
    }

    #[test]
    fn printed_prose_is_not_handwritten() {
        let text = "The company will run a community cafe and the activities will \
                    benefit the community by providing an affordable meeting place \
                    for local residents, with any surplus used to fund free sessions.";
        assert!(!is_likely_handwritten(text));
    }
}
