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

//! Verdict calculation
//!
//! Reduces the (possibly absent) extracted judgment plus the accumulated
//! issue list to one verdict and two 0-10 scores. A judge-flagged
//! hallucination is terminal and overrides any score.

use ragcheck_core::{Judgment, Verdict};

/// Score assumed when no judge evidence contradicts the pattern checks
pub(crate) const DEFAULT_SCORE: f64 = 10.0;

/// Issue recorded when the judge flags unsupported claims
const HALLUCINATION_ISSUE: &str = "AI detected potential hallucination";

/// Issue recorded when the judge flags unsound reasoning
const ILLOGICAL_ISSUE: &str = "AI detected illogical reasoning";

/// Fold the judgment into the issue list and compute the final verdict and
/// scores.
///
/// Judge scores are clamped into [0, 10] before any threshold is applied.
/// `NoAnswer` and `Error` are never produced here; refusals short-circuit
/// earlier and infrastructure failures are the evaluator's concern.
pub fn resolve(judgment: Option<&Judgment>, issues: &mut Vec<String>) -> (Verdict, f64, f64) {
    let mut accuracy = DEFAULT_SCORE;
    let mut relevance = DEFAULT_SCORE;

    if let Some(judgment) = judgment {
        if let Some(a) = judgment.accuracy {
            accuracy = a.clamp(0.0, 10.0);
        }
        if let Some(r) = judgment.relevance {
            relevance = r.clamp(0.0, 10.0);
        }
        if judgment.hallucinated == Some(true) {
            issues.push(HALLUCINATION_ISSUE.to_string());
        }
        if judgment.logical == Some(false) {
            issues.push(ILLOGICAL_ISSUE.to_string());
        }
        issues.extend(judgment.issues.iter().cloned());
    }

    let hallucinated = judgment.is_some_and(|j| j.hallucinated == Some(true));

    let verdict = if hallucinated {
        Verdict::Hallucinated
    } else if accuracy >= 7.0 && relevance >= 7.0 {
        if issues.is_empty() {
            Verdict::Accurate
        } else {
            Verdict::PartiallyAccurate
        }
    } else if accuracy >= 4.0 {
        Verdict::PartiallyAccurate
    } else {
        Verdict::Inaccurate
    };

    (verdict, accuracy, relevance)
}
