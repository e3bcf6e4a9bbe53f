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

//! Structured judgment recovered from a judge model's raw text

use serde::{Deserialize, Serialize};

/// A judge's structured verdict over one response.
///
/// Judge models are asked for
/// `{"accuracy": 8, "relevance": 9, "hallucinated": false, "logical": true, "issues": []}`
/// but do not reliably produce it, so every field is optional: whatever
/// subset the extractor recovers is kept, and downstream code pattern-matches
/// on the present fields rather than assuming a full object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    /// Factual accuracy on the judge's 1-10 scale
    #[serde(default)]
    pub accuracy: Option<f64>,

    /// Relevance to the original question on the judge's 1-10 scale
    #[serde(default)]
    pub relevance: Option<f64>,

    /// Whether the judge flagged unsupported claims
    #[serde(default)]
    pub hallucinated: Option<bool>,

    /// Whether the judge considered the reasoning sound
    #[serde(default)]
    pub logical: Option<bool>,

    /// Free-form problems the judge reported
    #[serde(default)]
    pub issues: Vec<String>,
}

impl Judgment {
    /// True when no field was recovered at all
    pub fn is_empty(&self) -> bool {
        self.accuracy.is_none()
            && self.relevance.is_none()
            && self.hallucinated.is_none()
            && self.logical.is_none()
            && self.issues.is_empty()
    }
}
