//! Text helpers shared by the stores, search and contribution paths.
//!
//! Matching is done on a *folded* form: lower-cased with diacritics removed,
//! so "Înțelepciune", "INTELEPCIUNE" and "înţelepciune" (cedilla variant)
//! all compare equal.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::Proverb;

/// Keywords derived from a proverb's text never exceed this many entries.
pub const MAX_KEYWORDS: usize = 10;

/// Words of this many characters or fewer are not keywords.
const MIN_KEYWORD_EXCLUSIVE: usize = 3;

fn word_regex() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"[\p{L}\p{N}'’-]+").expect("static regex is valid"))
}

fn fold_char(c: char) -> Option<char> {
    let folded = match c {
        'ă' | 'â' | 'à' | 'á' | 'ä' | 'ã' | 'å' | 'ā' | 'ą' => 'a',
        'î' | 'ì' | 'í' | 'ï' | 'ī' | 'į' | 'ı' => 'i',
        'ș' | 'ş' | 'ś' | 'š' => 's',
        'ț' | 'ţ' | 'ť' => 't',
        'é' | 'è' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => 'e',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ő' | 'ø' | 'ō' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'ű' | 'ů' | 'ū' => 'u',
        'ç' | 'ć' | 'č' => 'c',
        'ñ' | 'ń' | 'ň' => 'n',
        'ý' | 'ÿ' => 'y',
        'ž' | 'ź' | 'ż' => 'z',
        'ł' => 'l',
        'đ' | 'ď' => 'd',
        'ř' => 'r',
        'ğ' => 'g',
        // Combining diacritical marks left over from decomposed input
        '\u{0300}'..='\u{036f}' => return None,
        other => other,
    };
    Some(folded)
}

/// Lower-case `input` and strip diacritics.
pub fn fold(input: &str) -> String {
    input.to_lowercase().chars().filter_map(fold_char).collect()
}

/// Derive keywords from proverb text: words longer than three characters,
/// lower-cased, first occurrence only, capped at [`MAX_KEYWORDS`].
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    word_regex()
        .find_iter(text)
        .map(|m| m.as_str().trim_matches(|c| c == '-' || c == '\'' || c == '’'))
        .filter(|w| w.chars().count() > MIN_KEYWORD_EXCLUSIVE)
        .map(str::to_lowercase)
        .filter(|w| seen.insert(w.clone()))
        .take(MAX_KEYWORDS)
        .collect()
}

/// Folded document searched by substring queries.
pub fn search_document(text: &str, meaning: &str, keywords: &[String]) -> String {
    let mut doc = String::with_capacity(text.len() + meaning.len() + 16 * keywords.len());
    doc.push_str(&fold(text));
    doc.push('\n');
    doc.push_str(&fold(meaning));
    for keyword in keywords {
        doc.push('\n');
        doc.push_str(&fold(keyword));
    }
    doc
}

pub fn proverb_search_document(proverb: &Proverb) -> String {
    search_document(&proverb.text, &proverb.meaning, &proverb.keywords)
}

/// Escape `%`, `_` and `\` so a folded needle can be embedded in a SQL LIKE pattern.
pub fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Cut to `max_chars` characters, appending `...` when anything was dropped.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
