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

//! The evaluation pipeline for one (spec, response) pair
//!
//! Each evaluation is a pure function of its inputs plus at most one
//! external judge call, so concurrent evaluations against different specs
//! are independent. The evaluator holds no mutable state; construct one per
//! test session and share it freely.

use crate::judge::{build_judge_prompt, JudgeClient};
use crate::{extract, patterns, refusal, verdict, EvalError};
use ragcheck_core::{
    truncate_chars, EvaluationResult, Judgment, QuerySpec, Verdict, MAX_STORED_RESPONSE_CHARS,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Evaluates RAG response accuracy using pattern checks and an AI judge.
pub struct AccuracyEvaluator {
    judge: Option<Arc<dyn JudgeClient>>,
}

impl AccuracyEvaluator {
    /// Evaluator with an AI judge attached
    pub fn new(judge: Arc<dyn JudgeClient>) -> Self {
        Self { judge: Some(judge) }
    }

    /// Pattern-checks-only evaluator; specs requesting AI evaluation
    /// degrade silently
    pub fn without_judge() -> Self {
        Self { judge: None }
    }

    /// Evaluate a single response against its query specification.
    ///
    /// Always returns a well-formed result: refusals, pattern violations,
    /// judge outages, and garbled judgments all resolve to verdicts and
    /// issue entries. The one hard failure, a spec whose regex does not
    /// compile, is reported as a [`Verdict::Error`] result rather than
    /// propagated, so evaluating a batch never aborts partway.
    pub async fn evaluate_response(
        &self,
        spec: &QuerySpec,
        response: &str,
        response_time_s: f64,
        data_context: Option<&str>,
    ) -> EvaluationResult {
        let mut result = EvaluationResult {
            query: spec.query.clone(),
            query_type: spec.query_type,
            response: truncate_chars(response, MAX_STORED_RESPONSE_CHARS),
            response_time_s,
            verdict: Verdict::Accurate,
            accuracy_score: verdict::DEFAULT_SCORE,
            relevance_score: verdict::DEFAULT_SCORE,
            pattern_checks_passed: true,
            contains_required: Vec::new(),
            missing_required: Vec::new(),
            contains_forbidden: Vec::new(),
            ai_evaluation: None,
            issues: Vec::new(),
        };

        // A refusal is scored zero before anything else runs; a lenient
        // judge never sees it.
        if refusal::is_refusal(response) {
            debug!(query = %spec.query, "response is a refusal");
            result.verdict = Verdict::NoAnswer;
            result.accuracy_score = 0.0;
            result.relevance_score = 0.0;
            result.issues.push(refusal::REFUSAL_ISSUE.to_string());
            return result;
        }

        let patterns = match patterns::run_checks(spec, response) {
            Ok(report) => report,
            Err(EvalError::InvalidSpec(msg)) => {
                warn!(query = %spec.query, %msg, "query spec is not executable");
                result.verdict = Verdict::Error;
                result.accuracy_score = 0.0;
                result.relevance_score = 0.0;
                result.pattern_checks_passed = false;
                result.issues.push(format!("Invalid query spec: {msg}"));
                return result;
            }
        };

        result.contains_required = patterns.contains_required;
        result.missing_required = patterns.missing_required;
        result.contains_forbidden = patterns.contains_forbidden;
        result.pattern_checks_passed = patterns.pattern_checks_passed;
        result.issues = patterns.issues;

        if spec.use_ai_eval {
            result.ai_evaluation = self.request_judgment(spec, response, data_context).await;
        }

        let (verdict, accuracy, relevance) =
            verdict::resolve(result.ai_evaluation.as_ref(), &mut result.issues);
        result.verdict = verdict;
        result.accuracy_score = accuracy;
        result.relevance_score = relevance;

        debug!(
            query = %spec.query,
            verdict = %result.verdict,
            accuracy = result.accuracy_score,
            relevance = result.relevance_score,
            "evaluation complete"
        );
        result
    }

    async fn request_judgment(
        &self,
        spec: &QuerySpec,
        response: &str,
        data_context: Option<&str>,
    ) -> Option<Judgment> {
        let judge = self.judge.as_ref()?;
        let prompt = build_judge_prompt(spec, response, data_context);

        match judge.judge(&prompt).await {
            Ok(raw) => {
                let judgment = extract::extract_judgment(&raw);
                if judgment.is_none() {
                    warn!(query = %spec.query, "no judgment extractable from judge output");
                }
                judgment
            }
            Err(e) => {
                warn!(query = %spec.query, error = %e, "AI evaluation unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::JudgeError;
    use async_trait::async_trait;
    use ragcheck_core::QueryType;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Judge returning a canned reply, remembering whether it was called
    struct MockJudge {
        reply: String,
        called: AtomicBool,
    }

    impl MockJudge {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                called: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl JudgeClient for MockJudge {
        async fn judge(&self, _prompt: &str) -> Result<String, JudgeError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    struct DeadJudge;

    #[async_trait]
    impl JudgeClient for DeadJudge {
        async fn judge(&self, _prompt: &str) -> Result<String, JudgeError> {
            Err(JudgeError::Api("status 503".to_string()))
        }
    }

    fn spec() -> QuerySpec {
        QuerySpec::new("How many records?", QueryType::Aggregation)
    }

    #[tokio::test]
    async fn test_refusal_short_circuits_everything() {
        let judge = Arc::new(MockJudge::new(
            r#"{"accuracy": 10, "relevance": 10, "hallucinated": false, "logical": true, "issues": []}"#,
        ));
        let evaluator = AccuracyEvaluator::new(judge.clone());
        let spec = spec().with_must_contain(["100"]);

        let result = evaluator
            .evaluate_response(&spec, "I don't have enough information to answer that.", 1.0, None)
            .await;

        assert_eq!(result.verdict, Verdict::NoAnswer);
        assert_eq!(result.accuracy_score, 0.0);
        assert_eq!(result.relevance_score, 0.0);
        assert_eq!(result.issues, vec![refusal::REFUSAL_ISSUE.to_string()]);
        // Neither pattern checks nor the judge ran
        assert!(result.missing_required.is_empty());
        assert!(!judge.called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_pattern_only_happy_path() {
        let judge = Arc::new(MockJudge::new("{}"));
        let evaluator = AccuracyEvaluator::new(judge.clone());
        let spec = spec().with_must_contain(["100"]).with_ai_eval(false);

        let result = evaluator
            .evaluate_response(&spec, "There are 100 records in the dataset.", 0.8, None)
            .await;

        assert_eq!(result.verdict, Verdict::Accurate);
        assert_eq!(result.accuracy_score, 10.0);
        assert_eq!(result.relevance_score, 10.0);
        assert!(result.pattern_checks_passed);
        assert!(result.ai_evaluation.is_none());
        assert!(!judge.called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_judge_scores_are_adopted() {
        let judge = Arc::new(MockJudge::new(
            r#"{"accuracy": 6, "relevance": 8, "hallucinated": false, "logical": true, "issues": ["total is stale"]}"#,
        ));
        let evaluator = AccuracyEvaluator::new(judge);

        let result = evaluator
            .evaluate_response(&spec(), "There are 100 records.", 1.0, Some("100 rows"))
            .await;

        assert_eq!(result.verdict, Verdict::PartiallyAccurate);
        assert_eq!(result.accuracy_score, 6.0);
        assert_eq!(result.relevance_score, 8.0);
        assert_eq!(result.issues, vec!["total is stale".to_string()]);
        assert!(result.ai_evaluation.is_some());
    }

    #[tokio::test]
    async fn test_hallucination_flag_is_terminal() {
        let judge = Arc::new(MockJudge::new(
            r#"{"accuracy": 10, "relevance": 10, "hallucinated": true, "logical": true, "issues": []}"#,
        ));
        let evaluator = AccuracyEvaluator::new(judge);

        let result = evaluator
            .evaluate_response(&spec(), "There are 9999 records.", 1.0, None)
            .await;

        assert_eq!(result.verdict, Verdict::Hallucinated);
        assert!(!result.passed());
    }

    #[tokio::test]
    async fn test_dead_judge_degrades_to_pattern_scores() {
        let evaluator = AccuracyEvaluator::new(Arc::new(DeadJudge));
        let spec = spec().with_must_contain(["100", "Q4"]);

        let result = evaluator
            .evaluate_response(&spec, "There are 100 records.", 1.0, None)
            .await;

        assert!(result.ai_evaluation.is_none());
        // Pattern defaults survive; the missing term still counts as an issue
        assert_eq!(result.accuracy_score, 10.0);
        assert_eq!(result.relevance_score, 10.0);
        assert_eq!(result.verdict, Verdict::PartiallyAccurate);
        assert_eq!(result.missing_required, vec!["Q4".to_string()]);
    }

    #[tokio::test]
    async fn test_garbled_judge_output_degrades() {
        let judge = Arc::new(MockJudge::new("the answer seems okay to me"));
        let evaluator = AccuracyEvaluator::new(judge);

        let result = evaluator
            .evaluate_response(&spec(), "There are 100 records.", 1.0, None)
            .await;

        assert!(result.ai_evaluation.is_none());
        assert_eq!(result.verdict, Verdict::Accurate);
    }

    #[tokio::test]
    async fn test_invalid_spec_regex_is_error_verdict() {
        let evaluator = AccuracyEvaluator::without_judge();
        let spec = spec().with_pattern("([unclosed");

        let result = evaluator
            .evaluate_response(&spec, "There are 100 records.", 1.0, None)
            .await;

        assert_eq!(result.verdict, Verdict::Error);
        assert_eq!(result.accuracy_score, 0.0);
        assert!(!result.pattern_checks_passed);
        assert!(result.issues[0].starts_with("Invalid query spec:"));
    }

    #[tokio::test]
    async fn test_stored_response_is_truncated() {
        let evaluator = AccuracyEvaluator::without_judge();
        let long_response = "a".repeat(MAX_STORED_RESPONSE_CHARS + 500);

        let result = evaluator
            .evaluate_response(&spec(), &long_response, 1.0, None)
            .await;

        assert_eq!(result.response.chars().count(), MAX_STORED_RESPONSE_CHARS);
    }

    #[tokio::test]
    async fn test_without_judge_ignores_ai_request() {
        let evaluator = AccuracyEvaluator::without_judge();
        let result = evaluator
            .evaluate_response(&spec(), "There are 100 records.", 1.0, None)
            .await;

        assert!(result.ai_evaluation.is_none());
        assert_eq!(result.verdict, Verdict::Accurate);
    }
}
