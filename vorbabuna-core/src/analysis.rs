//! Keyword-scored analysis of a proverb: sentiment, wisdom, difficulty, tone,
//! themes, cultural relevance and readability.
//!
//! Marker words are matched as substrings of the accent-folded text.

use serde::Serialize;

use crate::models::Proverb;
use crate::text;

const POSITIVE_MARKERS: &[&str] = &[
    "bun", "fericit", "bucurie", "dragoste", "fericire", "noroc", "succes", "viață",
    "înțelepciune", "prietenie", "bogăție",
];

const NEGATIVE_MARKERS: &[&str] = &[
    "rău", "trist", "durere", "ură", "nenorocire", "ghinion", "eșec", "moarte", "prostie",
    "dușmănie", "sărăcie",
];

const TONES: &[(&str, &[&str])] = &[
    ("Optimist", &["soare", "lumina", "cer", "zi", "dimineata"]),
    ("Prudent", &["atent", "grijă", "caute", "gândește"]),
    ("Motivant", &["luptă", "muncă", "sforțare", "succes"]),
    ("Reflectiv", &["înțelepciune", "gând", "cunoaștere", "viață"]),
    ("Moral", &["bine", "rău", "drept", "cinste", "adevăr"]),
];

const THEMES: &[(&str, &[&str])] = &[
    ("Muncă", &["lucru", "muncă", "treabă", "sforțare"]),
    ("Cunoaștere", &["știe", "învață", "cunoaștere", "înțelepciune"]),
    ("Relații", &["prieten", "drag", "iubește", "oameni"]),
    ("Timp", &["timp", "ani", "zi", "viață"]),
    ("Bogăție", &["bani", "bogăție", "avere", "aur"]),
];

const CULTURAL_MARKERS: &[&str] = &[
    "român", "moș", "strămoș", "ie", "port", "cânt", "sat", "țară", "câmp", "munte", "râu",
];

const SYLLABLE_VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u', 'ă', 'â', 'î'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProverbAnalysis {
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    pub wisdom_score: u32,
    pub difficulty_level: Difficulty,
    pub emotional_tone: Vec<String>,
    pub themes: Vec<String>,
    pub cultural_relevance: u32,
    pub readability_score: f64,
}

pub fn analyze(proverb: &Proverb) -> ProverbAnalysis {
    let lowered = proverb.text.to_lowercase();
    let folded = text::fold(&proverb.text);
    let words: Vec<&str> = lowered.split_whitespace().collect();

    let sentiment_score = sentiment(&folded);
    ProverbAnalysis {
        sentiment_score,
        sentiment_label: sentiment_label(sentiment_score),
        wisdom_score: wisdom_score(proverb, words.len()),
        difficulty_level: difficulty(&words),
        emotional_tone: emotional_tone(&folded),
        themes: themes(&folded, proverb.category.as_deref()),
        cultural_relevance: cultural_relevance(&folded),
        readability_score: readability(&words),
    }
}

fn contains_marker(folded: &str, marker: &str) -> bool {
    folded.contains(&text::fold(marker))
}

/// +0.1 per positive marker, -0.1 per negative marker, clamped to [-1, 1].
pub fn sentiment(folded: &str) -> f64 {
    let positive = POSITIVE_MARKERS
        .iter()
        .filter(|m| contains_marker(folded, m))
        .count() as i32;
    let negative = NEGATIVE_MARKERS
        .iter()
        .filter(|m| contains_marker(folded, m))
        .count() as i32;
    (f64::from(positive - negative) / 10.0).clamp(-1.0, 1.0)
}

pub fn sentiment_label(score: f64) -> SentimentLabel {
    if score < -0.2 {
        SentimentLabel::Negative
    } else if score > 0.2 {
        SentimentLabel::Positive
    } else {
        SentimentLabel::Neutral
    }
}

fn wisdom_score(proverb: &Proverb, word_count: usize) -> u32 {
    let mut score: u32 = 50;
    if (10..=20).contains(&word_count) {
        score += 10;
    }
    if proverb.meaning.chars().count() > 20 {
        score += 15;
    }
    let category = proverb.category.as_deref().map(text::fold);
    if matches!(category.as_deref(), Some("filozofie") | Some("intelepciune")) {
        score += 10;
    }
    if proverb.popularity > 50 {
        score += 15;
    }
    score.min(100)
}

fn difficulty(words: &[&str]) -> Difficulty {
    if words.is_empty() {
        return Difficulty::Beginner;
    }
    let count = words.len() as f64;
    let lengths: Vec<usize> = words.iter().map(|w| w.chars().count()).collect();
    let avg_len = lengths.iter().sum::<usize>() as f64 / count;
    let complex_ratio = lengths.iter().filter(|&&l| l > 8).count() as f64 / count;

    if words.len() <= 10 && avg_len <= 6.0 && complex_ratio < 0.2 {
        Difficulty::Beginner
    } else if words.len() <= 15 && avg_len <= 7.0 && complex_ratio < 0.4 {
        Difficulty::Intermediate
    } else {
        Difficulty::Advanced
    }
}

fn emotional_tone(folded: &str) -> Vec<String> {
    let tones: Vec<String> = TONES
        .iter()
        .filter(|(_, markers)| markers.iter().any(|m| contains_marker(folded, m)))
        .map(|(tone, _)| tone.to_string())
        .collect();
    if tones.is_empty() {
        vec!["Neutru".to_string()]
    } else {
        tones
    }
}

fn themes(folded: &str, category: Option<&str>) -> Vec<String> {
    let mut themes: Vec<String> = category.map(str::to_string).into_iter().collect();
    for (theme, markers) in THEMES {
        if markers.iter().any(|m| contains_marker(folded, m)) && !themes.iter().any(|t| t == *theme) {
            themes.push(theme.to_string());
        }
    }
    themes
}

fn cultural_relevance(folded: &str) -> u32 {
    let hits = CULTURAL_MARKERS
        .iter()
        .filter(|m| contains_marker(folded, m))
        .count() as u32;
    (50 + 5 * hits).min(100)
}

/// `100 - 10 * syllables / words`, clamped to [0, 100].
fn readability(words: &[&str]) -> f64 {
    if words.is_empty() {
        return 100.0;
    }
    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();
    (100.0 - (syllables as f64 / words.len() as f64) * 10.0).clamp(0.0, 100.0)
}

/// Vowel groups in the word, at least one.
pub fn count_syllables(word: &str) -> usize {
    let mut count = 0;
    let mut prev_vowel = false;
    for c in word.to_lowercase().chars() {
        let vowel = SYLLABLE_VOWELS.contains(&c);
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }
    count.max(1)
}
