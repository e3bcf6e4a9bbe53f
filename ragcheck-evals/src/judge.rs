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

//! AI judge client
//!
//! Sends a judging prompt to an external LLM endpoint and returns its raw
//! text. The caller treats any failure here as "judgment unavailable" and
//! degrades to pattern-only scoring; nothing in this module retries.

use async_trait::async_trait;
use ragcheck_core::{truncate_chars, QuerySpec};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Response chars included in the judging prompt
const PROMPT_RESPONSE_CHARS: usize = 1500;

/// Data-context chars included in the judging prompt
const PROMPT_CONTEXT_CHARS: usize = 800;

/// Errors from judge clients
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("judge endpoint error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Trait for judge clients used by the evaluator.
///
/// The single suspension point of the pipeline; implementations must bound
/// the call with a timeout rather than blocking indefinitely.
#[async_trait]
pub trait JudgeClient: Send + Sync {
    /// Send a judging prompt and return the judge's raw text
    async fn judge(&self, prompt: &str) -> Result<String, JudgeError>;
}

/// Configuration for [`HttpJudgeClient`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeConfig {
    /// Generation endpoint of the judge service
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Output budget for the judgment; a single JSON line fits easily
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Low temperature keeps judgments near-deterministic
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Per-call timeout, separate from any outer test timeout
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:9000/llm/generate".to_string()
}

fn default_max_tokens() -> u32 {
    200
}

fn default_temperature() -> f64 {
    0.1
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout: default_timeout(),
        }
    }
}

#[derive(Serialize)]
struct JudgeRequest<'a> {
    prompt: &'a str,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize)]
struct JudgeReply {
    #[serde(default)]
    response: String,
}

/// Judge client over the `POST {prompt, max_tokens, temperature}` →
/// `{response}` endpoint contract
pub struct HttpJudgeClient {
    config: JudgeConfig,
    client: reqwest::Client,
}

impl HttpJudgeClient {
    pub fn new(config: JudgeConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl JudgeClient for HttpJudgeClient {
    async fn judge(&self, prompt: &str) -> Result<String, JudgeError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .timeout(self.config.timeout)
            .json(&JudgeRequest {
                prompt,
                max_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(JudgeError::Api(format!(
                "status {} from {}",
                response.status(),
                self.config.endpoint
            )));
        }

        let reply: JudgeReply = response.json().await?;
        Ok(reply.response)
    }
}

/// Build the judging prompt for one (spec, response) pair.
///
/// Ends with a literal example of the exact output shape; the extractor
/// copes when the judge ignores it.
pub fn build_judge_prompt(spec: &QuerySpec, response: &str, data_context: Option<&str>) -> String {
    let context_block = data_context
        .map(|c| {
            format!(
                "DATA CONTEXT (for reference): {}\n\n",
                truncate_chars(c, PROMPT_CONTEXT_CHARS)
            )
        })
        .unwrap_or_default();

    format!(
        "You are evaluating a data analysis response for accuracy.\n\
         \n\
         ORIGINAL QUERY: {query}\n\
         QUERY TYPE: {query_type}\n\
         \n\
         RESPONSE TO EVALUATE:\n\
         {response}\n\
         \n\
         {context_block}\
         Evaluate the response on these criteria:\n\
         1. ACCURACY (1-10): Is the response factually correct? Does it use real data?\n\
         2. RELEVANCE (1-10): Does it directly answer the question asked?\n\
         3. HALLUCINATION: Does it make claims not supported by data? (true/false)\n\
         4. LOGICAL: Is the reasoning/calculation logical? (true/false)\n\
         \n\
         Return ONLY valid JSON (no markdown, no explanation):\n\
         {{\"accuracy\": 8, \"relevance\": 9, \"hallucinated\": false, \"logical\": true, \"issues\": []}}\n",
        query = spec.query,
        query_type = spec.query_type,
        response = truncate_chars(response, PROMPT_RESPONSE_CHARS),
    )
}
