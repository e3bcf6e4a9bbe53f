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

//! Ragcheck Core
//!
//! Fundamental data structures for the accuracy evaluation pipeline:
//! query specifications, judge verdicts, per-response evaluation results,
//! and batch aggregates. This crate holds no I/O and no async; everything
//! here is a plain, serializable value that the `ragcheck-evals` pipeline
//! produces or consumes.

pub mod judgment;
pub mod query;
pub mod result;
pub mod text;

pub use judgment::Judgment;
pub use query::{CustomValidator, QuerySpec, QueryType};
pub use result::{BatchResult, EvaluationResult, Verdict, MAX_STORED_RESPONSE_CHARS};
pub use text::truncate_chars;
