//! Compiled pattern tables for form detection and text cleanup.
//!
//! Everything here is tolerant of OCR damage by construction: flexible
//! whitespace, optional punctuation, and common character confusions
//! (I/1, B/8, it/if) baked into the patterns that run against scanned text.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .expect("pattern table entry must compile")
        })
        .collect()
}

fn compile_sensitive(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|pattern| Regex::new(pattern).expect("pattern table entry must compile"))
        .collect()
}

/// True when any pattern in the set matches.
pub fn matches_any(text: &str, set: &[Regex]) -> bool {
    set.iter().any(|pattern| pattern.is_match(text))
}

/// Byte offset of the earliest match start across the set.
pub fn earliest_start(text: &str, set: &[Regex]) -> Option<usize> {
    set.iter()
        .filter_map(|pattern| pattern.find(text).map(|found| found.start()))
        .min()
}

/// End offset of the first set member that matches, in set order.
pub fn first_end(text: &str, set: &[Regex]) -> Option<usize> {
    set.iter()
        .find_map(|pattern| pattern.find(text).map(|found| found.end()))
}

/// Remove every match of every pattern, in set order.
pub fn strip_all(text: &str, set: &[Regex]) -> String {
    let mut out = text.to_string();
    for pattern in set {
        out = pattern.replace_all(&out, "").into_owned();
    }
    out
}

// ---------------------------------------------------------------------------
// Form and section detection (native text layer)
// ---------------------------------------------------------------------------

pub static CIC36_PRIMARY: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"CIC\s*36",
        r"Form\s+CIC\s*36",
        r"Declarations?\s+on\s+Formation\s+of\s+a\s+Community\s+Interest\s+Company",
    ])
});

pub static CIC36_SECONDARY: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"Community\s+Interest\s+Statement",
        r"Declarations?\s+on\s+Formation",
    ])
});

pub static SECTION_B_PRIMARY: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"SECTION\s*B\s*[:\-\.]?\s*Community\s+Interest\s+Statement\s*[-–—]?\s*Activities\s*(?:&|and)\s*Related\s*Benefit",
        r"SCHEDULE\s*2\s*[:\-\.]?\s*Community\s+Interest\s+Statement",
        r"Section\s*B[:\s\-\.]+Community\s+Interest\s+Statement",
        r"Section\s*B[:\s\-\.]+Activities\s*(?:&|and)\s*Related\s*Benefit",
        r"SECTION\s*B\s*[:\-\.]?\s*COMPANY\s+ACTIVITIES",
        r"Section\s*B[:\s\-\.]+Company\s+Activities",
    ])
});

pub static SECTION_B_SECONDARY: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"Activities\s*(?:&|and)\s*Related\s*Benefit",
        r"What\s+activities\s+will\s+the\s+(?:company|CIC)\s+carry\s+out",
        r"How\s+will\s+(?:the\s+)?activit(?:y|ies)\s+benefit\s+the\s+community",
    ])
});

pub static SECTION_B_TABLE: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"Activities?\s*\|?\s*(?:How\s+will|Benefit)",
        r"Description\s+of\s+(?:the\s+)?Activities",
    ])
});

pub static EXCLUDE_SECTIONS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"Section\s*A[:\s]",
        r"Section\s*C[:\s]",
        r"Memorandum\s+of\s+Association",
        r"Articles\s+of\s+Association",
        r"Certificate\s+of\s+Incorporation",
        r"Statement\s+of\s+Compliance",
    ])
});

// ---------------------------------------------------------------------------
// Form start detection on OCR text
// ---------------------------------------------------------------------------

pub static FORM_START_HIGH: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"Declarations?\s+on\s+Formation\s+of\s+a\s+Community\s+Interest\s+Company",
        r"(?s)Declaration\s+on\s+Formation.*Community\s+Interest",
        r"Form\s+CIC\s*36",
    ])
});

/// "CIC 36" in a form-title position rather than a cross reference.
pub static FORM_START_MEDIUM: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?:^|\n)\s*CIC\s*36\b",
        r"\bCIC\s*36\s*(?:\n|$)",
    ])
});

pub static ARTICLES_MARKERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\[\s*Section\s+[A-Z]\s+CIC",
        r"Articles\s+of\s+Association",
        r"Memorandum\s+of\s+Association",
    ])
});

pub static SECTION_A_HEADERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"SECTION\s*A[:\s]+COMMUNITY\s+INTEREST\s+STATEMENT",
        r"Section\s*A[:\s]+Community\s+Interest\s+Statement",
        r"SECTION\s*A[:\s]+DECLARATIONS\s+ON\s+FORMATION",
        r"COMMUNITY\s+INTEREST\s+STATEMENT\s*[-–—]?\s*beneficiaries",
        r"SECT[I1]ON\s*A[:\s]+(?:COMMUNITY|DECLARATIONS)",
    ])
});

// ---------------------------------------------------------------------------
// Section B page detection on OCR text, tiered by confidence
// ---------------------------------------------------------------------------

pub static OCR_SECTION_B_PRIMARY: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?:SECT[I1]ON\s*[B8]|SCHEDULE\s*2)\s*[:\-\.]?\s*Community\s+Interest\s+Statement\s*[-–—]?\s*(?:Activities\s*(?:&|and)\s*Related\s*Benefit)?",
        r"SECT[I1]ON\s*[B8]\s*[:\-\.]?\s*COMPANY\s+ACTIVITIES",
        r"Sect[i1]on\s*[B8][:\s\-\.]+Company\s+Activities",
        r"SECT[I1]ON\s*[B8]\s*[:\-\.]",
    ])
});

pub static OCR_SECTION_B_FALLBACK: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"Section\s*[B8][:\s\-]+\s*Community\s+Interest",
        r"Activities\s+How\s+will\s+the\s+activity\s+benefit",
        r"(?s)Tell\s+us\s+here\s+what\s+the\s+company.*is\s+being\s+set\s+up\s+to\s+do",
        r"\(The\s+community\s+will\s+benefit\s+by",
        r"Community\s+Interest\s+Statement\s*[-–—]?\s*Activities",
    ])
});

/// Cross-column OCR reads jumble the header words; these catch the wreckage.
pub static OCR_SECTION_B_JUMBLED: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?s)SECTION.*Community\s+Interest.*B",
        r"(?s)Community\s+Interest.*SECTION.*B",
        r"(?s)activity\s+benefit.*community",
        r"(?s)benefit.*community.*activity",
        r"(?s)company.*set\s+up\s+to\s+do",
        r"(?s)set\s+up\s+to\s+do.*company",
    ])
});

pub static SECTION_C_MARKER: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"SECT[I1]ON\s*C\b", r"Section\s*C\b"]));

pub static SECTION_B_END_MARKERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"SECT[I1]ON\s*C\b",
        r"Section\s*C\b",
        r"SIGNATORIES",
        r"Declaration\s+of\s+compliance",
        r"CHECKLIST",
    ])
});

/// The surplus statement closes Section B content on continuation pages.
pub static SURPLUS_MARKERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"[I1]f\s+the\s+company\s+makes\s+any\s+surplus",
        r"Any\s+surplus\s+(?:gained|from\s+trading|will\s+be)",
        r"surplus\s+(?:it\s+)?will\s+be\s+(?:used|reinvested)",
    ])
});

// ---------------------------------------------------------------------------
// Content gates
// ---------------------------------------------------------------------------

/// IN01 registration-form content that shares the "Section B" heading.
pub static WRONG_SECTION: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"Application\s+to\s+register\s+a\s+company",
        r"Proposed\s+officers",
        r"appointment\s+of\s+a\s+secretary",
        r"For\s+a\s+secretary\s+who\s+is\s+an\s+individual",
        r"Private\s+companies\s+must\s+appoint",
        r"Public\s+companies\s+are\s+required",
        r"For\s+a\s+corporate\s+secretary",
        r"go\s+to\s+Section\s+[BC]\d",
    ])
});

pub static CIC36_CONTENT_MARKERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"community",
        r"benefit",
        r"activit",
        r"surplus",
        r"differs?\s+from",
    ])
});

pub static REFERENTIAL: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"please\s+see\s+attached",
        r"see\s+attached",
        r"refer\s+to\s+attached",
        r"as\s+per\s+attached",
        r"attached\s+(?:appendix|schedule|document)",
    ])
});

pub static STANDALONE_SECTION_B: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"Section\s*B\s*[:\-]?\s*(?:Community\s+Interest|Activities)",
        r"Community\s+Interest\s+Statement\s*[-–—]?\s*Activities",
        r"SECTION\s*B\b",
    ])
});

pub static STANDALONE_END: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[r"Section\s*C", r"Declaration", r"Signature", r"CHECKLIST"])
});

// ---------------------------------------------------------------------------
// Boilerplate stripping
// ---------------------------------------------------------------------------

/// All Section B boilerplate in application order. More specific legacy
/// patterns come first so they win before the general ones fire.
pub static SECTION_B_BOILERPLATE: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        // Legacy (circa 2006) instruction paragraphs
        r"(?s)Please\s+indicate\s+how\s+i[tf]\s+is\s+proposed\s+that\s+the\s+company.{0,30}activities\s+will\s+benefit\s+the\s+community.*?(?:community\s+interest\s+company|See\s+note\s+\d)[^)]*\)?\.?",
        r"(?s)Please\s+provide\s+as\s+much\s+detail\s+as\s+possible\s+to\s+enable\s+the\s+Regulator.*?(?:community\s+interest\s+company|See\s+note)[^)]*\)?\.?",
        r"(?s)to\s+enable\s+the\s+Regulator\s+to\s+make\s+a\s+properly\s+informed\s+decision.*?(?:community\s+interest\s+company|See\s+note)[^)]*\)?\.?",
        r"\(or\s+a\s+section\s+of\s+the\s+community\)",
        r"\(See\s+note\s+\d+\)\.?",
        // Modern form instruction paragraph
        r"(?s)Please\s+indicate\s+how\s+i[tf]\s+is\s+proposed\s+that\s+the\s+company.{0,30}activities\s+will\s+benefit\s+the\s+community.*?(?:individual|personal)\s*,?\s*gain\.?",
        r"(?s)Please\s+indicate\s+how\s+i[tf]\s+is\s+proposed.*?different\s+from\s+a\s+commercial\s+company\s+providing\s+similar[^.]*\.?",
        r"(?s)We\s+would\s+find\s+i[tf]\s+useful\s+if\s+you.*?for\s+(?:individual|personal)\s*,?\s*gain\.?",
        r"(?s)Please\s+provide\s+as\s+much\s+detail\s+as\s+possible.*?(?:set\s+up\s+to\s+do|being\s+set\s+up)[^.]*\.?",
        r"(?s)to\s+enable\s+the\s+CIC\s+Regulator\s+to\s+make\s+an\s+informed\s+decision.*?(?:community\s+interest|eligible)[^.]*\.?",
        r"(?:a\s+)?section\s+of\s+the\s+community\.\s*Please\s+provide\s+as\s+much\s+detail",
        r"eligible\s+to\s+become\s+a\s+community\s+interest\s+company[^.]*\.?",
        r"different\s+from\s+a\s+commercial\s+company\s+providing\s+similar\s+services[^.]*\.?",
        // OCR-mangled instruction fragments
        r"i[tf]\s+would\s+(?:be\s+)?(?:useful|think)\s+if\s+you[^.]*\.?",
        r"your\s+company\s+will\s+be\s+different\s+from\s+a[^.]*(?:products?|services?)[^.]*\.?",
        r"commercial\s+company\s+providing\s+similar[^.]*\.?",
        r"for\s+individual\s*,?\s*(?:or\s+)?personal\s+gain\.?",
        r"\.?\s*I[tf]\s+would\s+think\s+your\s+company[^.]*\.?",
        r"would\s+be\s+different\s+from\s+a\s+(?:commercial\s+)?company[^.]*\.?",
        r"^\.?\s*I[tf]\s+would\s+(?:be\s+)?(?:useful|think)[^.]{0,50}",
        r"^\.?\s*would\s+(?:be\s+)?(?:useful|think)[^.]{0,50}",
        // Column headers
        r"Activities\s*\(?\s*Please\s+provide\s+the\s+day\s+to\s+day\s+activities[^)]*\)?",
        r"\(Please\s+provide\s+the\s+day\s+to\s+day\s+activities[^)]*\)",
        r"(?s)Tell\s+us\s+here\s+what\s+the\s+company.*?is\s+being\s+set\s+up\s+to\s+do[^)]*\)?",
        r"How\s+will\s+the\s+activity\s+benefit\s+the\s+community\s*\??\s*\(?\s*The\s+community\s+will\s+benefit\s+by[^)]*\)?",
        r"\(The\s+community\s+will\s+benefit\s+by[^)]*\)",
        r"The\s+community\s+will\s+benefit\s+by\s*\.{0,3}\s*\)",
        r"Activities\s+How\s+each\s+activity\s+benefits\s+the\s+community",
        r"Activities\s+How\s+each\s+activity\s+benefits[^a-zA-Z]*",
        r"(?m)^How\s+each\s+activity\s+benefits\s+the\s+community\s*$",
        r"(?m)^\s*the\s+community\s*$",
        r"Activities\s+How\s+will\s+the\s+activity\s+benefit\s+the\s+community\s*\??",
        r"\(Tell\s+us\s+here\s+what\s+the\s+company\s*\(?The\s+community\s+will\s+benefit\s+by[^)]*\)?\s*\)?",
        r"\(Tell\s+us\s+here\s+what\s+the\s+company",
        r"is\s+being\s+set\s+up\s+to\s+do\)",
        r"\(The\s+community\s+will\s+benefit\s+by\.\.\.\)",
        r"Activities\s+How\s+will\b",
        r"How\s+will\s+the\s+activity\s+benefit\b",
        r"(?m)^\s*Activities\s*$",
        r"(?m)^\s*How\s+will\s*$",
        // Surplus instruction
        r"\(If\s+donating\s+to\s+a\s+non-nominated\s+Asset\s+Locked\s+Body[^)]*\)",
        r"(?s)If\s+donating\s+to\s+a\s+non-nominated.*?(?:rejected|Regulator)[^.]*\.?",
        r#"you\s+will\s+need\s+to\s+include\s+the\s+wording\s*['"]?with\s+the\s+consent[^.]*\.?"#,
        // Legacy "company differs" row label
        r"Our\s+company\s+differs\s+from\s+a\s+general\s+commercial\s+company\s+because[:\s]*\.{0,3}",
        r"Our\s+company\s+differs\s+from\s+a\s+(?:general\s+)?commercial\s+company\s+because",
        // Section headers
        r"SECTION\s+B\s*:\s*COMPANY\s+ACTIVITIES\s*",
        r"SECTION\s+B\s*:\s*Community\s+Interest\s+Statement\s*[-–—]?\s*Activities\s*(?:&|and)?\s*Related\s+Benefit\s*",
        r"Community\s+Interest\s+Statement\s*[-–—]?\s*Activities\s*(?:&|and)?\s*Related\s+Benefit\s*",
        // Other form chrome
        r"Please\s+continue\s+on\s+separate\s+sheet\s+if\s+necessary",
        r"(?s)COMPANY\s+NAME\s+.*?Community\s+Interest\s+Company\s*\]?",
        r"COMPANY\s+NAME\s+[^\n]+\s*\n?",
        r"The\s+company\s+name\s+will\s+need\s+to\s+be\s+consistent\s+throughout",
        r"Declarations?\s+on\s+Formation\s+of\s+a\s*\n?\s*Community\s+[Ii]nterest\s+Company",
        r"(?m)^\s*\]\s*$",
        r"Please\s+indicate\s+how\s+i[tf]\s+[1i]s\s+proposed\s+that\s+the\s+company.{0,30}activities\s+will\s+benefit[^.]*\.",
        r"Please\s+provide\s+as\s+much\s+detail\s+as\s+possible[^.]*\.",
        r"a\s+section\s+of\s+the\s+community\s*\.\s*",
    ])
});

// ---------------------------------------------------------------------------
// Linear OCR segmentation
// ---------------------------------------------------------------------------

pub static HEADER_END: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"is\s+being\s+set\s+up\s+to\s+do\s*\)",
        r"\(The\s+community\s+will\s+benefit\s+by[^)]*\)",
        r"The\s+community\s+will\s+benefit\s+by\s*\.{0,3}\s*\)",
    ])
});

pub static HEADER_END_SIMPLE: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"Activities\s+How\s+will",
        r"\(Tell\s+us\s+here\s+what\s+the\s+company",
        r"SECTION\s*B\s*[:\-\.]?\s*COMPANY\s+ACTIVITIES",
        r"Section\s*B[:\s\-\.]+Company\s+Activities",
    ])
});

pub static FORM_INSTRUCTIONS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?s)Please\s+indicate\s+how\s+it\s+is\s+proposed\s+that\s+the\s+activities.*?community[,.]?\s*",
        r"Please\s+indicate\s+how\s+it\s+is\s+proposed",
        r"Please\s+provide\s+as\s+much\s+detail\s+as\s+possible",
        r"to\s+enable\s+the\s+(?:CIC\s+)?Regulator\s+to\s+make\s+an?\s*(?:properly\s+)?informed\s+decision",
        r"to\s+enable\s+the\s+(?:CIC\s+)?Regulator",
        r"make\s+(?:a\s+properly\s+)?informed\s+decision\s+(?:about\s+)?(?:whether\s+)?",
        r"whether\s+your\s+(?:proposed\s+)?company\s+is\s+eligible",
        r"eligible\s+to\s+(?:be(?:come)?|become)\s+a\s+community\s+interest",
        r"would\s+(?:be\s+)?useful\s+if\s+you\s+were\s+to\s+explain",
        r"[Ii]t\s+would\s+(?:be\s+)?useful\s+if\s+you",
        r"different\s+from\s+a\s+commercial\s+company",
        r"providing\s+similar\s+services\s+or\s+products",
        r"individual\s*,?\s*(?:or\s+)?personal\s+gain",
        r"think\s+your\s+company\s+will\s+be\s+for\s+individual\s+or\s+personal\s+gain",
        r"COMPANY\s+NAME\b",
        r"that\s+the\s+company['’]?s\s+activities\s+will\s+benefit\s+the\s+community[,.]?\s*(?:or\s+a\s+section\s+of\s+the\s+community)?",
        r"or\s+a\s+section\s+of\s+the\s+community",
        r"Activities\s+How\s+will\s+the\s+activity\s+benefit\s+the\s+community\??\s*",
        r"How\s+will\s+the\s+activity\s+benefit\s+the\s+community\??\s*",
        r"\(Tell\s+us\s+here\s+what\s+the\s+company[^)]*\)",
        r"\(The\s+community\s+will\s+benefit\s+by[^)]*\)",
        r"\(Please\s+continue\s+on[^)]*\)",
        r"Version\s+\d+\s*[-–—]\s*Last\s+Updated\s+on\s+\d{2}/\d{2}/\d{4}",
        r"Version\s+\d+\s*[-–—]?\s*Last\s+Updated",
    ])
});

/// Leftover single-line fragments after instruction removal; matched against
/// trimmed lines.
pub static INSTRUCTION_FRAGMENTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"^[\s,\.]*that\s+the\s+company[\s,\.]*$",
        r"^[\s,\.]*a\s+section\s+of\s+the\s+community[\s,\.]*$",
        r"^[\s,\.]*SECTION\s+B[\s:,\.]*$",
        r"^[\s,\.]*Community\s+Interest\s+Statement[\s,\.—\-]*$",
    ])
});

/// Starts of new activity rows. The bare-dash delimiter requires a following
/// capital, folded into the match since lookahead is unavailable; callers
/// split at match starts, so the extra character stays with the row.
pub static ROW_DELIMITERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\n\s*\d+[\.\)\:]\s+",
        r"\n\s*[a-zA-Z][\.\)\:]\s+",
        r"\n\s*[•●○◦▪▸►]\s+",
        r"\n\s*[\-\*]\s+[A-Z]",
        r"\n\s*(?:General|Specific|Primary|Secondary|Main|Additional|Other)\s*:",
        r"\n\s*(?:i{1,3}|iv|vi{0,3}|ix|x)[\.\)]\s+",
    ])
});

pub static BENEFIT_MARKERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"The\s+community\s+will\s+benefit\s+by",
        r"community\s+will\s+benefit",
        r"will\s+benefit\s+the\s+community",
        r"This\s+will\s+(?:help|benefit|support|enable)",
        r"Benefits?\s*:",
    ])
});

pub static TABLE_BENEFIT_MARKERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"The\s+community\s+will\s+benefit\s+(?:by\s+)?",
        r"community\s+will\s+benefit\s+significantly",
        r"\|\s*(?:The\s+)?community",
    ])
});

pub static BENEFIT_SPLIT: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"The\s+community\s+will\s+benefit\s+(?:by\s+)?(?:significantly\s+)?(?:as\s+)?")
        .case_insensitive(true)
        .build()
        .expect("pattern table entry must compile")
});

pub static INTERLEAVED_BENEFIT_MID: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"^(.+?)\s+(The\s+community\s+will\s+benefit.*)$")
        .case_insensitive(true)
        .build()
        .expect("pattern table entry must compile")
});

pub static INTERLEAVED_BENEFIT_HINT: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"^(.{20,}?)\s+(having\s+access|young\s+people\s+will|significantly|towards\s+the)")
        .case_insensitive(true)
        .build()
        .expect("pattern table entry must compile")
});

pub static RIGHT_COLUMN_HINT: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"(community|benefit|impact|improve|regeneration)")
        .case_insensitive(true)
        .build()
        .expect("pattern table entry must compile")
});

pub static INTERLEAVED_TABLE_START: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\(The\s+community\s+will\s+benefit\s+by[^)]*\)",
        r"is\s+being\s+set\s+up\s+to\s+do\s*\)",
    ])
});

pub static INTERLEAVED_TABLE_END: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?:Our\s+)?company\s+differs\s+from\s+a?\s*general",
        r"differs\s+from\s+a\s+general\s+commercial",
        r"If\s+the\s+company\s+makes\s+any\s+surplus",
        r"company\s+makes\s+any\s+surplus",
        r"its\s+primary\s+aim\s+is\s+to",
        r"Section\s*C",
        r"SIGNATORIES",
        r"\(Please\s+continue\s+on",
    ])
});

// ---------------------------------------------------------------------------
// Secondary statements
// ---------------------------------------------------------------------------

pub static COMPANY_DIFFERS_START: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?:Our\s+)?company\s+differs\s+from\s+a\s+general\s+commercial\s+company\s+because\s*\.{0,3}\s*",
        r"differs\s+from\s+a\s+general\s+commercial\s+company\s+because\s*\.{0,3}\s*",
    ])
});

pub static COMPANY_DIFFERS_END: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"If\s+the\s+company\s+makes\s+any\s+surplus",
        r"company\s+makes\s+any\s+surplus",
        r"SECT[I1]ON\s*C\b",
        r"Section\s*C\b",
        r"SIGNATORIES",
    ])
});

pub static SURPLUS_START: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"If\s+the\s+company\s+makes\s+any\s+surplus\s+i[tf]\s+will\s+be\s+used\s+for\s*\.{0,3}\s*",
        r"company\s+makes\s+any\s+surplus\s+i[tf]\s+will\s+be\s+used\s+for\s*\.{0,3}\s*",
        r"surplus\s+i[tf]\s+will\s+be\s+used\s+for\s*\.{0,3}\s*",
        r"any\s+surplus\s+(?:it\s+)?will\s+be\s+used\s+for\s*\.{0,3}\s*",
        r"If\s+the\s+company\s+makes\s+any\s+surplus\s+i[tf]\s+will\s+be\s+reinvested\s*\.{0,3}\s*",
        r"any\s+surplus\s+(?:it\s+)?will\s+be\s+reinvested\s*\.{0,3}\s*",
        r"surplus\s+(?:it\s+)?will\s+be\s+reinvested\s*\.{0,3}\s*",
        r"Any\s+surplus\s+(?:gained|from\s+trading)\s+will\s+be\s+reinvested\s*\.{0,3}\s*",
        r"surplus\s+(?:gained|from\s+trading)\s+will\s+be\s*\.{0,3}\s*",
        r"any\s+surplus\s+(?:it\s+)?will\s+be\s+used\s+to\s+invest\s*\.{0,3}\s*",
        r"surplus\s+will\s+be\s+used\s+to\s+invest\s*\.{0,3}\s*",
        r"If\s+the\s+company\s+makes\s+any\s+surplus[,:]?\s*",
        r"surplus\s+(?:income|profits?)\s+will\s+be\s*\.{0,3}\s*",
        r"Any\s+surplus\s+(?:will\s+be|is)\s+(?:used|reinvested|invested)\s*",
    ])
});

pub static SURPLUS_END: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"SECT[I1]ON\s*C\b",
        r"Section\s*C\b",
        r"SIGNATORIES",
        r"CHECKLIST",
        r"\(Please\s+continue\s+on",
        // Activity content bleeding past the surplus statement
        r"\s+gives\s+(?:schools|communities|people)\s+",
        r"\s+(?:schools|communities)\s+(?:and|or)\s+(?:other|community)\s+",
        r"The\s+internet\s+tells\s+",
        r"young\s+people\s+(?:around|with)\s+the\s+",
        r"training\s+establishments\s+",
    ])
});

pub static SURPLUS_BOILERPLATE: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\(if donating or fundraising[^)]*\)",
        r"\(Please continue on separate[^)]*\)",
        r"COMPANY NAME\s*$",
        r"^\s*Il\.{0,3}\s*",
        r#"with the consent of the CIC Regulator['"]?\)?"#,
        r"\(?[Ii]f\s+donating\s+to\s+a\s+non[^}]*\}?",
        r"Asset\s+Locked\s+Body[^.]*(?:rejected|wording)[^.]*\.?",
        r"otherwise\s+your\s+application\s+will\s+be\s+rejected[^.]*",
        r"you\s+will\s+need\s+to\s+include\s+the\s+wording[^.]*",
        r"\(Please\s+continue\s+(?:on\s+)?separate\s+sheet[^)]*\)\.?",
        r"Version\s+\d+[^.]*(?:Last\s+Updated[^.]*)?",
        r"Last\s+Updated\s+(?:on\s+)?\d{2}/\d{2}/\d{4}",
        r"Peer\s+supporters?\s+will\s+support[^.]*",
        r"support\s+will\s+be\s+both\s+practical\s+and\s+emotional[^.]*",
        r"will\s+benefit\s+the\s+community\s+by\s+promoting[^.]*",
    ])
});

pub static SURPLUS_TRAILING: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\s*\(\s*\.\s*\)\s*$",
        r"\s*\(\s*\)\s*$",
        r"\s*\.\s*\(\s*\.\s*\)\s*$",
        r"\s*\(\s*\.\s*$",
        r"\s*[(\[\])\s]+$",
        r"\s*[—_\-]{3,}[\s\w]*$",
        r"\s*[-—_]{2,}\s*[a-z]{1,3}\s*$",
        r"\s*[nNeE]{2,}\s*$",
        r"\s*_\s*[a-z]\s*\|?\s*$",
        r"\s*Vseewtan.*$",
        r"\s*Nfeeete\s+ee.*$",
    ])
});

/// Case-sensitive on purpose: only genuine uppercase runs are garbage.
pub static SURPLUS_UPPER_GARBAGE: Lazy<Vec<Regex>> =
    Lazy::new(|| compile_sensitive(&[r"\s*[A-Z]{3,}\s+[A-Z]{3,}\s*$"]));

pub static BENEFICIARIES_BOILERPLATE_END: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"which\s+i[tf]\s+[i1]s\s+intended\s+that\s+the\s+company\s+will\s+benefit\s+below\s*\]?\s*",
        r"the\s+company\s+will\s+benefit\s+below\s*\]?\s*",
        r"will\s+benefit\s+below\s*\]?\s*[E\s]*",
        r"benefit\s+below\s*\]?\s*",
        r"declare\s+that\s+the\s+company\s+will\s+carry\s+on\s+its\s+activities\s+for\s+the\s+benefit\s+of\s+the\s+community,?\s+or\s+a\s+section\s+of\s+the\s+community\s*[.,\d]*\s*",
        r"activities\s+for\s+the\s+benefit\s+of\s+the\s+community,?\s+or\s+a\s+section\s+of\s+the\s+community\s*[.,\d]*\s*",
        r"declare\s+that\s+the\s+company\s+will\s+carry\s+on\s+its\s+activities\s+for\s+the\s+benefit\s+of\s+the\s+community\s*\.\s*",
        r"activities\s+for\s+the\s+benefit\s+of\s+the\s+community\s*\.\s*",
    ])
});

/// Unfilled form fields only: the prefix must carry its trailing dots.
pub static BENEFICIARIES_FALLBACK_START: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"The\s+company'?s?\s+activities\s+will\s+provide\s+benefit\s+to\s*\.{3,}\s*",
        r"activities\s+will\s+provide\s+benefit\s+to\s*\.{3,}\s*",
    ])
});

pub static BENEFICIARIES_SECTION_END: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"SECT[I1]ON\s*B\b",
        r"Section\s*B\b",
        r"Community\s+Interest\s+Statement\s*[-–—]?\s*Activities",
        r"COMPANY\s+ACTIVITIES",
    ])
});

pub static BENEFICIARIES_TRAILING: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\s*Page\s+\d+\s*(?:of\s+\d+)?.*$",
        r"\s*Please\s+continue\s+on\s+separate\s+sheet.*$",
        r"\s*CIC\s*36.*$",
        r"\s*COMPANIES\s+HOUSE.*$",
        r"\s*Declarations?\s+on\s+Formation\s+of\s+a.*$",
        r"\s*Community\s+[Ii]nterest\s+Company\s*$",
        r"\s*COMPANY\s+NAME\s+.*$",
        r"\s*COMPANY\s+NAME\s*$",
        r"\s*\[?[A-Z][a-z]+.*?CIC\s*$",
        r"\s*[A-Z]{2,}\s*\?\s*[A-Z]+\s*$",
        r"\s*ct\s+Wo\s*$",
        r"\s*E\s+MET\?DIGOI\s*$",
        r"\s+[A-Z]\s*$",
        r"\s+[A-Z]{1,2}\s*$",
    ])
});

pub static BENEFICIARIES_PREFIX: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"^(?:Pr\s+)?The\s+company[’']?s?\s+activities\s+will\s+provide\s+benefit\s+to\s*\.{0,5}\s*",
        r"^activities\s+will\s+provide\s+benefit\s+to\s*\.{0,5}\s*",
        r"^provide\s+benefit\s+to\s*\.{0,5}\s*",
    ])
});

// Electronic-path variants keyed to clean text rather than OCR output.
pub static BENEFICIARIES_TEXT_START: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"The\s+company'?s?\s+activities\s+will\s+provide\s+benefit\s+to\s*[.:]?\s*",
        r"activities\s+will\s+provide\s+benefit\s+to\s*[.:]?\s*",
        r"provide\s+benefit\s+to\s+the\s+following\s*:?\s*",
    ])
});

// ---------------------------------------------------------------------------
// Layout OCR column cleanup
// ---------------------------------------------------------------------------

pub static LAYOUT_COMMON_CLEANUP: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"SECTION\s*B\s*[:\-]?\s*",
        r"Community\s+Interest\s+Statement\s*[-–—]?\s*",
        r"Activities\s*(?:&|and)\s*Related\s*Benefit\s*",
        r"COMPANY\s+NAME\s*",
        r"Version\s+\d+\s*[-–—]?\s*Last\s+Updated[^\n]*",
        r"\(Please\s+continue\s+on[^)]*\)",
        r"a\s+section\s+of\s+the\s+community[.,]?\s*",
        r"to\s+enable\s+the\s+CIC\s+Regulator[^.]*\.?\s*",
        r"informed\s+decision\s+about[^.]*\.?\s*",
        r"eligible\s+to\s+become[^.]*\.?\s*",
        r"would\s+be\s+useful\s+if\s+you[^.]*\.?\s*",
        r"different\s+from\s+a\s+commercial[^.]*\.?\s*",
        r"for\s+individual[,]?\s*(?:or\s+)?personal\s+gain\.?\s*",
        r"\.?\s*[Ii][tf]\s+would\s+(?:be\s+)?(?:useful|think)[^.]*\.?\s*",
        r"your\s+company\s+will\s+be\s+different[^.]*\.?\s*",
        r"think\s+your\s+company[^.]*\.?\s*",
        r"company\s+providing\s+similar\s+services[^.]*\.?\s*",
        r"products?\s+for\s+individual[^.]*\.?\s*",
        r"^\s*\.\s*[Ii][tf]\s+would\s+",
        r"^\s*[Ii][tf]\s+would\s+think\s+",
    ])
});

pub static LAYOUT_ACTIVITY_CLEANUP: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"Activities\s*$",
        r"^\s*Activities\s*",
        r"\(Tell\s+us\s+here\s+what\s+the\s+company[^)]*\)",
        r"Tell\s+us\s+here\s+what\s+the\s+company[^.]*\.?\s*",
        r"is\s+being\s+set\s+up\s+to\s+do\.?\s*\)?\s*",
        r"\(Please\s+provide\s+the\s+day\s+to\s+day[^)]*\)",
        r"Please\s+provide\s+the\s+day\s+to\s+day[^.]*\.?\s*",
        r"Please\s+indicate\s+how\s+i[tf]\s+[i1]s\s+proposed[^.]*\.?\s*",
        r"Regulator\s+to\s+make\s+an\s+informed\s+decision[^.]*\.?\s*",
        r"become\s+a\s+community\s+interest\s+company[^.]*\.?\s*",
        r"Activities\s+How\s+will\s*",
        r"COMPANY\s+NAME\s+[A-Z][a-z]+\s*",
    ])
});

pub static LAYOUT_BENEFIT_CLEANUP: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"How\s+will\s+the\s+activity\s+benefit\s+the\s+community\??\s*",
        r"\(The\s+community\s+will\s+benefit\s+by[^)]*\)",
        r"The\s+community\s+will\s+benefit\s+by\s*\.{0,3}\s*\)\s*",
        r"company.?s?\s+activities\s+will\s+benefit\s+the\s+community[^.]*\.?\s*",
        r"much\s+detail\s+as\s+possible\s+to\s+enable[^.]*\.?\s*",
        r"whether\s+your\s+(?:proposed\s+)?company\s+[it]s\s+eligible[^.]*\.?\s*",
        r"be\s+useful\s+if\s+you\s+were\s+to\s+explain[^.]*\.?\s*",
        r"commercial\s+company\s+providing\s+similar[^.]*\.?\s*",
        r"the\s+activity\s+benefit\s+the\s+community\??\s*",
        r"[A-Z][a-z]+\s+[A-Z][a-z]+\s+CIC\s*[�\-]?\s*",
    ])
});

pub static LAYOUT_LEADING_BOILERPLATE: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?m)^\s*\.\s*[Ii][tf]\s+would\s+[^\n]*?\n*",
        r"(?m)^\s*[Ii][tf]\s+would\s+think\s+[^\n]*?\n*",
        r"(?m)^[^a-zA-Z]*[Ii][tf]\s+would\s+[^\n]*?\n*",
        r"(?m)^\s*\.\s+",
    ])
});

// ---------------------------------------------------------------------------
// Line and cell classification
// ---------------------------------------------------------------------------

pub static HEADER_LINE: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"^activities?\s*$",
        r"^benefits?\s*$",
        r"^section\s*[a-z]",
        r"^cic\s*\d+",
        r"^form\s+",
        r"^page\s+\d+",
        r"^companies\s+house",
        r"^how\s+will\s+the\s+activity",
        r"^\d+\s*$",
        r"^[\-_=]+$",
    ])
});

pub static INSTRUCTION_ONLY_START: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"^please\s+indicate",
        r"^please\s+provide",
        r"^a\s+section\s+of\s+the\s+community",
        r"^to\s+enable\s+the\s+(?:cic\s+)?regulator",
        r"^how\s+will\s+the\s+activity",
        r"^tell\s+us\s+here",
        r"^the\s+community\s+will\s+benefit\s+by\s*\.{0,3}\s*$",
        r"^it\s+would\s+(?:be\s+)?useful\s+if\s+you",
        r"^eligible\s+to\s+be(?:come)?\s+a\s+community",
        r"^that\s+the\s+company['’]?s\s+activities",
        r"^section\s*b\s*[:\-]?\s*community\s+interest",
    ])
});

pub static INSTRUCTION_ONLY_INDICATORS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"enable\s+the\s+(?:cic\s+)?regulator\s+to\s+make",
        r"informed\s+decision\s+about\s+whether",
        r"would\s+(?:be\s+)?useful\s+if\s+you\s+were\s+to\s+explain",
        r"think\s+your\s+company\s+will\s+be\s+for\s+individual",
        r"individual\s+or\s+personal\s+gain",
        r"different\s+from\s+a\s+commercial\s+company",
        r"company\s+name\s+section\s+b",
    ])
});

/// Cell-level header/instruction markers for table rows.
pub static CELL_HEADER: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"^activities?\s*$",
        r"^how\s+will",
        r"^describe\s+the",
        r"^please\s+(?:describe|explain|provide)",
        r"^section\s+[a-z]",
        r"^\d+\.\s*$",
        r"activit",
        r"benefit",
        r"community",
    ])
});

pub static CELL_INSTRUCTION: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"^please\s+(?:describe|explain|provide|enter)",
        r"^use\s+continuation\s+sheet",
        r"^see\s+guidance\s+notes",
        r"^if\s+necessary",
        r"page\s+\d+\s+of\s+\d+",
        r"^cic\s*36",
        r"^form\s+cic",
        r"companies\s+house",
        r"^\d{8}$",
    ])
});

/// Keywords a table header row carries; two or more marks the header.
pub static HEADER_ROW_KEYWORDS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"activit", r"benefit", r"how\s+will", r"community"]));

/// Fragments tesseract leaves in damaged cells.
pub const OCR_ARTIFACTS: &[&str] = &["\u{0000}", "[]", "}{", "@@", "##", "***", "\u{FFFD}", "|||", "___"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_b_header_variants_match() {
        let modern = "SECTION B: Community Interest Statement - Activities & Related Benefit";
        let schedule = "SCHEDULE 2. Community Interest Statement";
        let legacy = "SECTION B: COMPANY ACTIVITIES";
        assert!(matches_any(modern, &SECTION_B_PRIMARY));
        assert!(matches_any(schedule, &SECTION_B_PRIMARY));
        assert!(matches_any(legacy, &SECTION_B_PRIMARY));
    }

    #[test]
    fn ocr_confusions_are_tolerated() {
        assert!(matches_any("SECT1ON 8: COMPANY ACTIVITIES", &OCR_SECTION_B_PRIMARY));
        assert!(matches_any("1f the company makes any surplus", &SURPLUS_MARKERS));
    }

    #[test]
    fn exclusions_hit_adjacent_sections() {
        assert!(matches_any("Section C: Signatories", &EXCLUDE_SECTIONS));
        assert!(matches_any("Articles of Association of Example CIC", &EXCLUDE_SECTIONS));
        assert!(!matches_any("Section B: Community Interest Statement", &EXCLUDE_SECTIONS));
    }

    #[test]
    fn boilerplate_stripping_removes_instructions() {
        let text = "Activities (Please provide the day to day activities of the company)\n\
                    Running a community cafe open five days a week";
        let stripped = strip_all(text, &SECTION_B_BOILERPLATE);
        assert!(stripped.contains("community cafe"));
        assert!(!stripped.to_lowercase().contains("day to day activities"));
    }

    #[test]
    fn earliest_start_finds_first_boundary() {
        let text = "activity content here SIGNATORIES and then Section C";
        assert_eq!(earliest_start(text, &SECTION_B_END_MARKERS), Some(22));
    }
}
