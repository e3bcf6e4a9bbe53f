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

//! Refusal detection
//!
//! Runs before every other check: a response that declines to answer is
//! scored zero and never reaches the pattern checks or the judge, so a
//! lenient judge cannot score a refusal back up.

use regex::RegexSet;
use std::sync::OnceLock;

/// Issue recorded on a refused response
pub const REFUSAL_ISSUE: &str = "Model refused to answer or said 'I don't know'";

const REFUSAL_PATTERNS: &[&str] = &[
    r"i don'?t know",
    r"cannot determine",
    r"no information available",
    r"unable to find",
    r"not enough context",
    r"don'?t have enough information",
    r"data does not contain",
];

fn refusal_set() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| {
        RegexSet::new(REFUSAL_PATTERNS.iter().map(|p| format!("(?i){p}")))
            .expect("refusal patterns are valid regexes")
    })
}

/// Whether the response is a refusal or non-answer
pub fn is_refusal(response: &str) -> bool {
    refusal_set().is_match(response)
}
