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

//! # Ragcheck Evaluation Engine
//!
//! Decides, programmatically, whether a free-form RAG response is
//! acceptable. One evaluation is a pure transformation chain with a single
//! external call:
//!
//! refusal detection → pattern checks → AI judge → judgment extraction →
//! verdict calculation
//!
//! ## Features
//!
//! - **Deterministic pattern checks**: required/forbidden terms, regex,
//!   numeric range, custom predicates
//! - **LLM-as-judge**: semantic quality scored by a second model over HTTP
//! - **Layered judgment extraction**: strict-to-lenient parsing of the
//!   judge's untrusted output, from clean JSON down to key-value salvage
//! - **Graceful degradation**: a dead or garbled judge never aborts a run;
//!   evaluation falls back to pattern-only scoring
//! - **Batch reporting**: per-batch and per-query-type statistics
//!
//! ## Example
//!
//! ```rust,ignore
//! use ragcheck_core::{BatchResult, QuerySpec, QueryType};
//! use ragcheck_evals::{AccuracyEvaluator, HttpJudgeClient, JudgeConfig, Reporter};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let judge = Arc::new(HttpJudgeClient::new(JudgeConfig::default()));
//!     let evaluator = AccuracyEvaluator::new(judge);
//!
//!     let spec = QuerySpec::new("How many records?", QueryType::Aggregation)
//!         .with_must_contain(["100"]);
//!
//!     let result = evaluator
//!         .evaluate_response(&spec, "There are 100 records.", 1.2, None)
//!         .await;
//!
//!     let batch = BatchResult::from_results("smoke", "records.csv", vec![result], 1.2);
//!     Reporter::new("reports").write_batch_report(&batch).unwrap();
//! }
//! ```

use thiserror::Error;

pub mod evaluator;
pub mod extract;
pub mod judge;
pub mod patterns;
pub mod refusal;
pub mod report;
pub mod verdict;

pub use evaluator::AccuracyEvaluator;
pub use extract::extract_judgment;
pub use judge::{build_judge_prompt, HttpJudgeClient, JudgeClient, JudgeConfig, JudgeError};
pub use patterns::PatternReport;
pub use report::{BatchReport, QueryTypeStats, ReportError, Reporter, SummaryReport};

/// Hard failures of the evaluation infrastructure itself.
///
/// Response-quality problems are never represented here; they become issue
/// entries and verdicts on the result. The only thing that is allowed to
/// fail hard is a spec the evaluator cannot execute.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("invalid query spec: {0}")]
    InvalidSpec(String),
}
