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

//! Structured reports over batch results
//!
//! A pure projection of [`BatchResult`] values into report documents plus
//! the file output; no scoring logic lives here. The per-query-type
//! breakdown answers "which query type is weakest" across batches.

use chrono::Utc;
use ragcheck_core::{BatchResult, EvaluationResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn pass_rate_text(passed: usize, total: usize) -> String {
    if total == 0 {
        "N/A".to_string()
    } else {
        format!("{:.1}%", passed as f64 / total as f64 * 100.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total_queries: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportTiming {
    pub total_time_s: f64,
    pub avg_response_time_s: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportQuality {
    pub avg_accuracy_score: f64,
    pub avg_relevance_score: f64,
}

/// Serialized form of one batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_name: String,
    pub data_source: String,
    pub summary: ReportSummary,
    pub timing: ReportTiming,
    pub quality: ReportQuality,
    pub results: Vec<EvaluationResult>,
    pub generated_at: String,
}

impl BatchReport {
    pub fn from_batch(batch: &BatchResult) -> Self {
        Self {
            batch_name: batch.batch_name.clone(),
            data_source: batch.data_source.clone(),
            summary: ReportSummary {
                total_queries: batch.total_queries,
                passed: batch.passed_queries,
                failed: batch.failed_queries,
                pass_rate: pass_rate_text(batch.passed_queries, batch.total_queries),
            },
            timing: ReportTiming {
                total_time_s: round2(batch.total_time_s),
                avg_response_time_s: round2(batch.avg_response_time_s),
            },
            quality: ReportQuality {
                avg_accuracy_score: round2(batch.avg_accuracy_score),
                avg_relevance_score: round2(batch.avg_relevance_score),
            },
            results: batch.results.clone(),
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Quality statistics for one query type across batches
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryTypeStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: String,
    pub avg_accuracy: f64,
    pub avg_response_time_s: f64,
}

/// Group every result in `batches` by query type and recompute the batch
/// statistics per type.
pub fn aggregate_by_type(batches: &[BatchResult]) -> BTreeMap<String, QueryTypeStats> {
    let mut by_type: BTreeMap<String, Vec<&EvaluationResult>> = BTreeMap::new();
    for batch in batches {
        for result in &batch.results {
            by_type
                .entry(result.query_type.as_str().to_string())
                .or_default()
                .push(result);
        }
    }

    by_type
        .into_iter()
        .map(|(query_type, results)| {
            let total = results.len();
            let passed = results.iter().filter(|r| r.passed()).count();
            let stats = QueryTypeStats {
                total,
                passed,
                failed: total - passed,
                pass_rate: pass_rate_text(passed, total),
                avg_accuracy: round2(
                    results.iter().map(|r| r.accuracy_score).sum::<f64>() / total as f64,
                ),
                avg_response_time_s: round2(
                    results.iter().map(|r| r.response_time_s).sum::<f64>() / total as f64,
                ),
            };
            (query_type, stats)
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct OverallStats {
    pub total_batches: usize,
    pub total_queries: usize,
    pub total_passed: usize,
    pub total_failed: usize,
    pub pass_rate: String,
    pub total_time_s: f64,
}

/// Cross-batch summary document
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub generated_at: String,
    pub overall: OverallStats,
    pub by_query_type: BTreeMap<String, QueryTypeStats>,
    pub batches: Vec<BatchReport>,
}

impl SummaryReport {
    pub fn from_batches(batches: &[BatchResult]) -> Self {
        let total_queries: usize = batches.iter().map(|b| b.total_queries).sum();
        let total_passed: usize = batches.iter().map(|b| b.passed_queries).sum();
        let total_time_s: f64 = batches.iter().map(|b| b.total_time_s).sum();

        Self {
            generated_at: Utc::now().to_rfc3339(),
            overall: OverallStats {
                total_batches: batches.len(),
                total_queries,
                total_passed,
                total_failed: total_queries - total_passed,
                pass_rate: pass_rate_text(total_passed, total_queries),
                total_time_s: round2(total_time_s),
            },
            by_query_type: aggregate_by_type(batches),
            batches: batches.iter().map(BatchReport::from_batch).collect(),
        }
    }
}

/// Writes report documents as timestamped JSON files
pub struct Reporter {
    output_dir: PathBuf,
}

impl Reporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write one batch report, returning the path written
    pub fn write_batch_report(&self, batch: &BatchResult) -> Result<PathBuf, ReportError> {
        let report = BatchReport::from_batch(batch);
        let path = self.output_dir.join(format!(
            "batch_{}_{}.json",
            batch.batch_name,
            Utc::now().format("%Y%m%d_%H%M%S")
        ));
        self.write(&path, &report)?;
        info!(path = %path.display(), "wrote batch report");
        Ok(path)
    }

    /// Write a summary report across all batches, returning the path written
    pub fn write_summary_report(&self, batches: &[BatchResult]) -> Result<PathBuf, ReportError> {
        let report = SummaryReport::from_batches(batches);
        let path = self.output_dir.join(format!(
            "summary_{}.json",
            Utc::now().format("%Y%m%d_%H%M%S")
        ));
        self.write(&path, &report)?;
        info!(path = %path.display(), "wrote summary report");
        Ok(path)
    }

    fn write<T: Serialize>(&self, path: &Path, report: &T) -> Result<(), ReportError> {
        fs::create_dir_all(&self.output_dir)?;
        fs::write(path, serde_json::to_vec_pretty(report)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragcheck_core::{QueryType, Verdict};

    fn result(
        query_type: QueryType,
        verdict: Verdict,
        accuracy: f64,
        time_s: f64,
    ) -> EvaluationResult {
        EvaluationResult {
            query: "q".to_string(),
            query_type,
            response: "r".to_string(),
            response_time_s: time_s,
            verdict,
            accuracy_score: accuracy,
            relevance_score: accuracy,
            pattern_checks_passed: true,
            contains_required: Vec::new(),
            missing_required: Vec::new(),
            contains_forbidden: Vec::new(),
            ai_evaluation: None,
            issues: Vec::new(),
        }
    }

    fn sample_batch() -> BatchResult {
        BatchResult::from_results(
            "sales",
            "fixtures/sales.csv",
            vec![
                result(QueryType::Aggregation, Verdict::Accurate, 9.0, 2.0),
                result(QueryType::Aggregation, Verdict::Inaccurate, 2.0, 4.0),
                result(QueryType::Trend, Verdict::PartiallyAccurate, 7.0, 3.0),
            ],
            9.0,
        )
    }

    #[test]
    fn test_batch_report_shape() {
        let report = BatchReport::from_batch(&sample_batch());
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["batch_name"], "sales");
        assert_eq!(value["summary"]["total_queries"], 3);
        assert_eq!(value["summary"]["passed"], 2);
        assert_eq!(value["summary"]["failed"], 1);
        assert_eq!(value["summary"]["pass_rate"], "66.7%");
        assert_eq!(value["timing"]["total_time_s"], 9.0);
        assert_eq!(value["timing"]["avg_response_time_s"], 3.0);
        assert_eq!(value["quality"]["avg_accuracy_score"], 6.0);
        assert_eq!(value["results"].as_array().unwrap().len(), 3);
        // Verdicts serialize as their wire strings
        assert_eq!(value["results"][0]["verdict"], "accurate");
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_empty_batch_pass_rate_is_na() {
        let batch = BatchResult::from_results("empty", "none", Vec::new(), 0.0);
        let report = BatchReport::from_batch(&batch);
        assert_eq!(report.summary.pass_rate, "N/A");
    }

    #[test]
    fn test_aggregate_by_type() {
        let stats = aggregate_by_type(&[sample_batch()]);

        let aggregation = &stats["aggregation"];
        assert_eq!(aggregation.total, 2);
        assert_eq!(aggregation.passed, 1);
        assert_eq!(aggregation.pass_rate, "50.0%");
        assert_eq!(aggregation.avg_accuracy, 5.5);
        assert_eq!(aggregation.avg_response_time_s, 3.0);

        let trend = &stats["trend"];
        assert_eq!(trend.total, 1);
        assert_eq!(trend.passed, 1);
        assert!(!stats.contains_key("calculation"));
    }

    #[test]
    fn test_summary_report_overall_counts() {
        let batches = vec![sample_batch(), sample_batch()];
        let report = SummaryReport::from_batches(&batches);

        assert_eq!(report.overall.total_batches, 2);
        assert_eq!(report.overall.total_queries, 6);
        assert_eq!(report.overall.total_passed, 4);
        assert_eq!(report.overall.total_failed, 2);
        assert_eq!(report.overall.pass_rate, "66.7%");
        assert_eq!(report.overall.total_time_s, 18.0);
        assert_eq!(report.batches.len(), 2);
    }

    #[test]
    fn test_reporter_writes_batch_file() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = Reporter::new(dir.path());

        let path = reporter.write_batch_report(&sample_batch()).unwrap();

        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("batch_sales_"));
        assert!(name.ends_with(".json"));

        let written: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(written["summary"]["total_queries"], 3);
    }

    #[test]
    fn test_reporter_writes_summary_file() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = Reporter::new(dir.path().join("nested"));

        let path = reporter.write_summary_report(&[sample_batch()]).unwrap();

        assert!(path.exists());
        let written: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(written["overall"]["total_batches"], 1);
        assert!(written["by_query_type"]["aggregation"]["total"].is_number());
    }
}
