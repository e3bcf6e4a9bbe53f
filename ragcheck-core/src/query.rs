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

//! Query specifications: one test query plus its acceptance criteria

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Custom acceptance predicate over a response.
///
/// Returns `Ok(true)` when the response is acceptable, `Ok(false)` when it
/// fails the check, and `Err` with a description when the predicate itself
/// could not run. Failures of either kind become issue entries on the
/// evaluation result; they never abort an evaluation.
pub type CustomValidator = Arc<dyn Fn(&str) -> Result<bool, String> + Send + Sync>;

/// Categories of test queries, used for per-type quality breakdowns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryType {
    /// "What products are listed?"
    #[serde(rename = "content_lookup")]
    ContentLookup,

    /// "What is the total revenue?"
    #[serde(rename = "aggregation")]
    Aggregation,

    /// "What is the average margin %?"
    #[serde(rename = "calculation")]
    Calculation,

    /// "Which region has highest X but lowest Y?"
    #[serde(rename = "cross_field")]
    CrossFieldLogic,

    /// "How did Q4 compare to Q3?"
    #[serde(rename = "trend")]
    Trend,

    /// Multi-step reasoning required
    #[serde(rename = "complex")]
    ComplexReasoning,
}

impl QueryType {
    /// Wire name used in serialized reports
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::ContentLookup => "content_lookup",
            QueryType::Aggregation => "aggregation",
            QueryType::Calculation => "calculation",
            QueryType::CrossFieldLogic => "cross_field",
            QueryType::Trend => "trend",
            QueryType::ComplexReasoning => "complex",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Specification for a test query with validation criteria.
///
/// A spec is authored once per test case and treated as read-only: the
/// evaluation pipeline only ever borrows it. Specs are deserializable from
/// fixture data; the custom validator is the one field that can only be
/// attached in code.
#[derive(Clone, Serialize, Deserialize)]
pub struct QuerySpec {
    /// The natural-language query sent to the system under test
    pub query: String,

    /// Category of the query
    pub query_type: QueryType,

    /// Human-readable description for reports and logs
    #[serde(default)]
    pub description: String,

    /// Terms that must appear in the response (case-insensitive)
    #[serde(default)]
    pub must_contain: Vec<String>,

    /// Terms that must not appear in the response (case-insensitive)
    #[serde(default)]
    pub must_not_contain: Vec<String>,

    /// Regex the response must match (case-insensitive). Compiled at
    /// evaluation time; an invalid pattern is an infrastructure error.
    #[serde(default)]
    pub must_contain_pattern: Option<String>,

    /// Expected range for the first number found in the response
    #[serde(default)]
    pub expected_number_range: Option<(f64, f64)>,

    /// Custom acceptance predicate, attached in code only
    #[serde(skip)]
    pub custom_validator: Option<CustomValidator>,

    /// Whether to request an AI judgment for this query
    #[serde(default = "default_use_ai_eval")]
    pub use_ai_eval: bool,

    /// Upper bound the calling test expects for response latency
    #[serde(default = "default_max_response_time")]
    pub max_response_time: Duration,
}

fn default_use_ai_eval() -> bool {
    true
}

fn default_max_response_time() -> Duration {
    Duration::from_secs(90)
}

impl QuerySpec {
    /// Create a spec with default criteria: no pattern checks, AI
    /// evaluation enabled, 90s response time budget.
    pub fn new(query: impl Into<String>, query_type: QueryType) -> Self {
        Self {
            query: query.into(),
            query_type,
            description: String::new(),
            must_contain: Vec::new(),
            must_not_contain: Vec::new(),
            must_contain_pattern: None,
            expected_number_range: None,
            custom_validator: None,
            use_ai_eval: default_use_ai_eval(),
            max_response_time: default_max_response_time(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_must_contain<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.must_contain = terms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_must_not_contain<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.must_not_contain = terms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.must_contain_pattern = Some(pattern.into());
        self
    }

    pub fn with_number_range(mut self, min: f64, max: f64) -> Self {
        self.expected_number_range = Some((min, max));
        self
    }

    pub fn with_custom_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&str) -> Result<bool, String> + Send + Sync + 'static,
    {
        self.custom_validator = Some(Arc::new(validator));
        self
    }

    pub fn with_ai_eval(mut self, enabled: bool) -> Self {
        self.use_ai_eval = enabled;
        self
    }

    pub fn with_max_response_time(mut self, limit: Duration) -> Self {
        self.max_response_time = limit;
        self
    }
}

impl fmt::Debug for QuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySpec")
            .field("query", &self.query)
            .field("query_type", &self.query_type)
            .field("description", &self.description)
            .field("must_contain", &self.must_contain)
            .field("must_not_contain", &self.must_not_contain)
            .field("must_contain_pattern", &self.must_contain_pattern)
            .field("expected_number_range", &self.expected_number_range)
            .field("custom_validator", &self.custom_validator.as_ref().map(|_| "<fn>"))
            .field("use_ai_eval", &self.use_ai_eval)
            .field("max_response_time", &self.max_response_time)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_defaults() {
        let spec = QuerySpec::new("How many records?", QueryType::Aggregation);
        assert!(spec.use_ai_eval);
        assert_eq!(spec.max_response_time, Duration::from_secs(90));
        assert!(spec.must_contain.is_empty());
        assert!(spec.custom_validator.is_none());
    }

    #[test]
    fn test_query_type_wire_names() {
        let json = serde_json::to_string(&QueryType::CrossFieldLogic).unwrap();
        assert_eq!(json, "\"cross_field\"");

        let parsed: QueryType = serde_json::from_str("\"complex\"").unwrap();
        assert_eq!(parsed, QueryType::ComplexReasoning);
    }

    #[test]
    fn test_spec_from_fixture_json() {
        let spec: QuerySpec = serde_json::from_str(
            r#"{
                "query": "What is the total revenue?",
                "query_type": "aggregation",
                "must_contain": ["revenue"],
                "expected_number_range": [1000.0, 2000.0]
            }"#,
        )
        .unwrap();

        assert_eq!(spec.query_type, QueryType::Aggregation);
        assert_eq!(spec.must_contain, vec!["revenue".to_string()]);
        assert_eq!(spec.expected_number_range, Some((1000.0, 2000.0)));
        // Fields absent from the fixture fall back to defaults
        assert!(spec.use_ai_eval);
        assert!(spec.must_contain_pattern.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let spec = QuerySpec::new("Which region leads?", QueryType::CrossFieldLogic)
            .with_description("regional comparison")
            .with_must_contain(["North", "revenue"])
            .with_must_not_contain(["error"])
            .with_pattern(r"\d+%")
            .with_number_range(0.0, 100.0)
            .with_ai_eval(false);

        assert_eq!(spec.description, "regional comparison");
        assert_eq!(spec.must_contain.len(), 2);
        assert_eq!(spec.must_contain_pattern.as_deref(), Some(r"\d+%"));
        assert!(!spec.use_ai_eval);
    }
}
