//! Text normalization, tokenization and term normalization

use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Glyphs that render as bullets but arrive as private-use symbol-font codes
const SYMBOL_FONT_BULLETS: &[char] = &['\u{F0B7}', '\u{F0A7}', '\u{F076}', '\u{F0D8}', '\u{F0FC}'];

pub struct TextProcessor {
    stop_words: HashSet<&'static str>,
    email_regex: Regex,
    phone_regex: Regex,
    whitespace_regex: Regex,
}

/// Text after normalization, plus the count of glyphs that could not be read
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOutput {
    pub text: String,
    pub unreadable_chars: usize,
}

/// A lowercased word with its byte span in the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    pub fn new() -> Self {
        let email_regex = Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
            .expect("Invalid email regex");

        let phone_regex = Regex::new(
            r"(?:\b(?:\+?1[-. ]?)?\(?[0-9]{3}\)?[-. ]?[0-9]{3}[-. ]?[0-9]{4}\b)|(?:\+[0-9]{1,3}[-. ]?[0-9]{2,4}[-. ]?[0-9]{3,4}[-. ]?[0-9]{3,4}\b)",
        )
        .expect("Invalid phone regex");

        let whitespace_regex = Regex::new(r"[ \t\u{00A0}]+").expect("Invalid whitespace regex");

        Self {
            stop_words: Self::create_stop_words(),
            email_regex,
            phone_regex,
            whitespace_regex,
        }
    }

    /// Normalize extracted text while keeping line breaks and bullet markers.
    ///
    /// Applies NFKC (splits ligatures such as "ﬁ"), folds typographic
    /// punctuation, drops unreadable glyphs, collapses intra-line whitespace
    /// and squeezes runs of blank lines down to one.
    pub fn normalize(&self, raw: &str) -> NormalizedOutput {
        let mut unreadable_chars = 0;
        let mut folded = String::with_capacity(raw.len());

        for c in raw.replace("\r\n", "\n").replace('\r', "\n").nfkc() {
            match Self::fold_char(c) {
                Some(c) => folded.push(c),
                None => unreadable_chars += 1,
            }
        }

        let mut lines: Vec<String> = Vec::new();
        let mut previous_blank = true;
        for line in folded.split('\n') {
            let collapsed = self.whitespace_regex.replace_all(line, " ");
            let trimmed = collapsed.trim();
            if trimmed.is_empty() {
                if !previous_blank {
                    lines.push(String::new());
                }
                previous_blank = true;
            } else {
                lines.push(trimmed.to_string());
                previous_blank = false;
            }
        }
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        NormalizedOutput {
            text: lines.join("\n"),
            unreadable_chars,
        }
    }

    fn fold_char(c: char) -> Option<char> {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => Some('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' => Some('"'),
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => Some('-'),
            '\u{2022}' | '\u{2023}' | '\u{2043}' | '\u{25CF}' => Some('•'),
            c if SYMBOL_FONT_BULLETS.contains(&c) => Some('•'),
            '\n' | '\t' => Some(c),
            '\u{FFFD}' => None,
            '\u{E000}'..='\u{F8FF}' => None,
            c if c.is_control() => None,
            c => Some(c),
        }
    }

    /// Split text into lowercased word tokens.
    ///
    /// Built on Unicode word boundaries, with `+` and `#` glued to the
    /// preceding word (`c++`, `c#`) and a leading dot glued to the following
    /// word (`.net`). Slashes and hyphens separate tokens.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut pending: Option<Token> = None;

        for (idx, segment) in text.split_word_bound_indices() {
            let is_word = segment.chars().any(|c| c.is_alphanumeric());

            if is_word {
                match pending.as_mut() {
                    Some(token) if token.end == idx && token.text == "." => {
                        token.text.push_str(&segment.to_lowercase());
                        token.end = idx + segment.len();
                    }
                    _ => {
                        Self::flush(&mut pending, &mut tokens);
                        pending = Some(Token {
                            text: segment.to_lowercase(),
                            start: idx,
                            end: idx + segment.len(),
                        });
                    }
                }
            } else if segment == "+" || segment == "#" {
                match pending.as_mut() {
                    Some(token) if token.end == idx && token.text != "." => {
                        token.text.push_str(segment);
                        token.end = idx + segment.len();
                    }
                    _ => Self::flush(&mut pending, &mut tokens),
                }
            } else if segment == "." {
                Self::flush(&mut pending, &mut tokens);
                pending = Some(Token {
                    text: ".".to_string(),
                    start: idx,
                    end: idx + 1,
                });
            } else {
                Self::flush(&mut pending, &mut tokens);
            }
        }
        Self::flush(&mut pending, &mut tokens);

        tokens
    }

    fn flush(pending: &mut Option<Token>, tokens: &mut Vec<Token>) {
        if let Some(token) = pending.take() {
            if token.text.chars().any(|c| c.is_alphanumeric()) {
                tokens.push(token);
            }
        }
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// Tokens that carry meaning: not stop words and not bare numbers
    pub fn content_tokens<'a>(&self, tokens: &'a [Token]) -> Vec<&'a Token> {
        tokens
            .iter()
            .filter(|t| !self.is_stop_word(&t.text))
            .filter(|t| t.text.chars().any(|c| c.is_alphabetic()))
            .collect()
    }

    /// Light suffix stemmer for plural and verb forms
    pub fn stem(&self, word: &str) -> String {
        if word.len() <= 3 || !word.chars().all(|c| c.is_ascii_alphabetic()) {
            return word.to_string();
        }

        if let Some(base) = word.strip_suffix("ies") {
            if base.len() >= 2 {
                return format!("{}y", base);
            }
        }
        if word.ends_with("sses") {
            return word[..word.len() - 2].to_string();
        }
        if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
            return word.to_string();
        }
        if let Some(base) = word.strip_suffix("ing") {
            if base.len() >= 4 {
                return base.to_string();
            }
        }
        if let Some(base) = word.strip_suffix("ed") {
            if base.len() >= 4 {
                return base.to_string();
            }
        }
        if let Some(base) = word.strip_suffix('s') {
            if base.len() >= 3 {
                return base.to_string();
            }
        }

        word.to_string()
    }

    pub fn contains_email(&self, text: &str) -> bool {
        self.email_regex.is_match(text)
    }

    pub fn contains_phone(&self, text: &str) -> bool {
        self.phone_regex.is_match(text)
    }

    fn create_stop_words() -> HashSet<&'static str> {
        [
            "a", "about", "above", "after", "again", "all", "also", "am", "an", "and", "any",
            "are", "as", "at", "be", "been", "being", "below", "between", "both", "but", "by",
            "can", "could", "did", "do", "does", "doing", "during", "each", "etc", "few", "for",
            "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
            "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
            "may", "me", "more", "most", "must", "my", "no", "nor", "not", "of", "off", "on",
            "once", "only", "or", "other", "our", "ours", "out", "over", "own", "per", "same",
            "she", "should", "so", "some", "such", "than", "that", "the", "their", "them",
            "then", "there", "these", "they", "this", "those", "through", "to", "too", "under",
            "until", "up", "us", "very", "via", "was", "we", "were", "what", "when", "where",
            "which", "while", "who", "whom", "why", "will", "with", "within", "would", "you",
            "your", "yours",
            // recruiting boilerplate
            "ability", "candidate", "candidates", "including", "looking", "plus", "preferred",
            "qualifications", "required", "requirements", "responsibilities", "role", "strong",
            "year", "years",
        ]
        .into_iter()
        .collect()
    }
}
