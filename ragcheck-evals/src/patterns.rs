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

//! Deterministic pattern checks over a response
//!
//! Required/forbidden terms are the hard constraints: they alone decide
//! `pattern_checks_passed`. The regex, numeric-range, and custom-predicate
//! checks are advisory and only contribute issue text.

use crate::EvalError;
use ragcheck_core::QuerySpec;
use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

/// Outcome of all pattern checks for one response
#[derive(Debug, Clone, Default)]
pub struct PatternReport {
    pub contains_required: Vec<String>,
    pub missing_required: Vec<String>,
    pub contains_forbidden: Vec<String>,
    pub pattern_checks_passed: bool,
    pub issues: Vec<String>,
}

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").expect("number pattern is valid"))
}

/// Run every pattern check without any network call.
///
/// The only hard failure is a `must_contain_pattern` that does not compile;
/// that is a broken spec, not a bad response.
pub fn run_checks(spec: &QuerySpec, response: &str) -> Result<PatternReport, EvalError> {
    let mut report = PatternReport::default();
    let response_lower = response.to_lowercase();

    for required in &spec.must_contain {
        if response_lower.contains(&required.to_lowercase()) {
            report.contains_required.push(required.clone());
        } else {
            report.missing_required.push(required.clone());
            report
                .issues
                .push(format!("Missing required term: '{required}'"));
        }
    }

    for forbidden in &spec.must_not_contain {
        if response_lower.contains(&forbidden.to_lowercase()) {
            report.contains_forbidden.push(forbidden.clone());
            report
                .issues
                .push(format!("Contains forbidden term: '{forbidden}'"));
        }
    }

    if let Some(pattern) = &spec.must_contain_pattern {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| EvalError::InvalidSpec(format!("bad pattern {pattern:?}: {e}")))?;
        if !re.is_match(response) {
            report
                .issues
                .push(format!("Missing required pattern: {pattern}"));
        }
    }

    if let Some((min, max)) = spec.expected_number_range {
        // Soft check: look at the first number only, commas stripped so
        // "1,234.5" reads as one value. No number found is not a failure.
        let stripped = response.replace(',', "");
        if let Some(m) = number_regex().find(&stripped) {
            if let Ok(found) = m.as_str().parse::<f64>() {
                if !(min..=max).contains(&found) {
                    report.issues.push(format!(
                        "Number {found} outside expected range [{min}, {max}]"
                    ));
                }
            }
        }
    }

    if let Some(validator) = &spec.custom_validator {
        match validator(response) {
            Ok(true) => {}
            Ok(false) => report.issues.push("Custom validation failed".to_string()),
            Err(e) => report.issues.push(format!("Custom validator error: {e}")),
        }
    }

    report.pattern_checks_passed =
        report.missing_required.is_empty() && report.contains_forbidden.is_empty();

    Ok(report)
}
