// Copyright 2025 Ragcheck (https://github.com/ragcheck)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Judgment extraction from raw judge text
//!
//! Judge models are asked for a single JSON line and routinely return
//! something else: fenced code blocks, surrounding prose, half-quoted
//! key-value soup. Extraction is an ordered strict-to-lenient strategy
//! chain; the first strategy that yields a judgment wins, and when all of
//! them fail the answer is `None`, never an error. A garbled judge must
//! not abort a test run.

use ragcheck_core::Judgment;
use regex::Regex;
use std::sync::OnceLock;

type Strategy = fn(&str) -> Option<Judgment>;

const STRATEGIES: &[Strategy] = &[parse_direct, parse_fenced, parse_embedded, salvage_fields];

/// Recover a structured judgment from arbitrary judge output.
///
/// Tries, in order: direct JSON parse, code-fence stripping, brace-matched
/// scan for an object embedded in prose, and key-value salvage.
pub fn extract_judgment(raw: &str) -> Option<Judgment> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    STRATEGIES.iter().find_map(|strategy| strategy(text))
}

/// Strategy 1: the whole text is a JSON object
fn parse_direct(text: &str) -> Option<Judgment> {
    serde_json::from_str(text).ok()
}

/// Strategy 2: a JSON object inside a Markdown code fence, with or without
/// a language tag
fn parse_fenced(text: &str) -> Option<Judgment> {
    let start = text.find("```")?;
    let mut body = &text[start + 3..];
    if let Some(rest) = body.strip_prefix("json").or_else(|| body.strip_prefix("JSON")) {
        body = rest;
    }
    let end = body.find("```")?;
    serde_json::from_str(body[..end].trim()).ok()
}

/// Strategy 3: first balanced `{...}` span in the text, nesting-aware
fn parse_embedded(text: &str) -> Option<Judgment> {
    serde_json::from_str(balanced_object_span(text)?).ok()
}

/// Slice out the first brace-balanced object span.
///
/// Braces and quotes inside JSON strings are non-structural, including
/// escaped quotes and backslashes, so depth is only tracked outside of
/// string state. Structural characters are all ASCII, which makes byte
/// scanning safe on multibyte text.
fn balanced_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in text.as_bytes().iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

struct SalvagePatterns {
    accuracy: Regex,
    relevance: Regex,
    hallucinated: Regex,
    logical: Regex,
}

fn salvage_patterns() -> &'static SalvagePatterns {
    static PATTERNS: OnceLock<SalvagePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| SalvagePatterns {
        accuracy: number_pattern("accuracy"),
        relevance: number_pattern("relevance"),
        hallucinated: bool_pattern("hallucinated"),
        logical: bool_pattern("logical"),
    })
}

// Tolerates missing quotes, `:` or `=`, stray whitespace, any casing.
fn number_pattern(key: &str) -> Regex {
    Regex::new(&format!(
        r#"(?i)"?{key}"?\s*[:=]\s*"?(-?\d+(?:\.\d+)?)"#
    ))
    .expect("salvage pattern is valid")
}

fn bool_pattern(key: &str) -> Regex {
    Regex::new(&format!(r#"(?i)"?{key}"?\s*[:=]\s*"?(true|false)"#))
        .expect("salvage pattern is valid")
}

fn salvage_number(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

fn salvage_bool(re: &Regex, text: &str) -> Option<bool> {
    Some(re.captures(text)?.get(1)?.as_str().eq_ignore_ascii_case("true"))
}

/// Strategy 4: last resort, independently fish each known key out of the
/// wreckage as a loose `key: value` pair
fn salvage_fields(text: &str) -> Option<Judgment> {
    let patterns = salvage_patterns();
    let judgment = Judgment {
        accuracy: salvage_number(&patterns.accuracy, text),
        relevance: salvage_number(&patterns.relevance, text),
        hallucinated: salvage_bool(&patterns.hallucinated, text),
        logical: salvage_bool(&patterns.logical, text),
        issues: Vec::new(),
    };
    if judgment.is_empty() {
        None
    } else {
        Some(judgment)
    }
}
