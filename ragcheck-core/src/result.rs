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

//! Evaluation results: per-response records and batch aggregates

use crate::judgment::Judgment;
use crate::query::QueryType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Responses longer than this are truncated before being stored on a
/// result; the full text is only ever needed for audit display.
pub const MAX_STORED_RESPONSE_CHARS: usize = 2000;

/// Final categorical judgment of a response's quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// Response is correct
    #[serde(rename = "accurate")]
    Accurate,

    /// Some correct, some issues
    #[serde(rename = "partial")]
    PartiallyAccurate,

    /// Response is wrong
    #[serde(rename = "inaccurate")]
    Inaccurate,

    /// Contains unsupported claims
    #[serde(rename = "hallucinated")]
    Hallucinated,

    /// Model refused to answer
    #[serde(rename = "no_answer")]
    NoAnswer,

    /// Evaluation infrastructure failed
    #[serde(rename = "error")]
    Error,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Accurate => "accurate",
            Verdict::PartiallyAccurate => "partial",
            Verdict::Inaccurate => "inaccurate",
            Verdict::Hallucinated => "hallucinated",
            Verdict::NoAnswer => "no_answer",
            Verdict::Error => "error",
        }
    }

    /// Whether a result with this verdict counts as passed
    pub fn is_pass(self) -> bool {
        matches!(self, Verdict::Accurate | Verdict::PartiallyAccurate)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of evaluating a single query response.
///
/// Created exactly once per (spec, response) pair; every field is computed
/// before the value is returned and nothing mutates it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub query: String,
    pub query_type: QueryType,

    /// Response text, truncated to [`MAX_STORED_RESPONSE_CHARS`]
    pub response: String,
    pub response_time_s: f64,

    pub verdict: Verdict,
    pub accuracy_score: f64,
    pub relevance_score: f64,

    /// Whether the hard pattern constraints (required/forbidden terms) held
    pub pattern_checks_passed: bool,
    pub contains_required: Vec<String>,
    pub missing_required: Vec<String>,
    pub contains_forbidden: Vec<String>,

    /// The judge's extracted verdict, kept for audit
    pub ai_evaluation: Option<Judgment>,

    /// Accumulated problems; entries are only ever appended
    pub issues: Vec<String>,
}

impl EvaluationResult {
    /// Whether this evaluation passed
    pub fn passed(&self) -> bool {
        self.verdict.is_pass()
    }
}

/// Aggregate over one named batch of evaluations against one data source.
///
/// A derived, disposable value: built by folding a finished list of
/// [`EvaluationResult`]s, with no identity beyond its name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub batch_name: String,
    pub data_source: String,

    pub total_queries: usize,
    pub passed_queries: usize,
    pub failed_queries: usize,

    pub total_time_s: f64,
    pub avg_response_time_s: f64,
    pub avg_accuracy_score: f64,
    pub avg_relevance_score: f64,

    pub results: Vec<EvaluationResult>,
}

impl BatchResult {
    /// Fold a finished list of results into batch statistics.
    ///
    /// Averages are arithmetic means over all results, passed or not. Must
    /// only be called once every contributing evaluation exists; there is
    /// no partial aggregation.
    pub fn from_results(
        batch_name: impl Into<String>,
        data_source: impl Into<String>,
        results: Vec<EvaluationResult>,
        total_time_s: f64,
    ) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed()).count();

        let mean = |f: fn(&EvaluationResult) -> f64| -> f64 {
            if total == 0 {
                0.0
            } else {
                results.iter().map(f).sum::<f64>() / total as f64
            }
        };

        Self {
            batch_name: batch_name.into(),
            data_source: data_source.into(),
            total_queries: total,
            passed_queries: passed,
            failed_queries: total - passed,
            total_time_s,
            avg_response_time_s: mean(|r| r.response_time_s),
            avg_accuracy_score: mean(|r| r.accuracy_score),
            avg_relevance_score: mean(|r| r.relevance_score),
            results,
        }
    }

    /// Pass rate in percent, `None` for an empty batch
    pub fn pass_rate(&self) -> Option<f64> {
        if self.total_queries == 0 {
            None
        } else {
            Some(self.passed_queries as f64 / self.total_queries as f64 * 100.0)
        }
    }
}

impl fmt::Display for BatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "batch {}: {}/{} passed ({}), avg accuracy {:.1}/10, avg relevance {:.1}/10, {:.1}s total",
            self.batch_name,
            self.passed_queries,
            self.total_queries,
            self.pass_rate()
                .map(|r| format!("{r:.1}%"))
                .unwrap_or_else(|| "N/A".to_string()),
            self.avg_accuracy_score,
            self.avg_relevance_score,
            self.total_time_s,
        )
    }
}
