// SPDX-License-Identifier: Apache-2.0

//! The scoring engine: maps a complete answer set to three dimension
//! scores and three ordinal classifications. Pure, deterministic, no I/O.

#![forbid(unsafe_code)]

use rural_esg_model::{
    catalog, AnswerSet, Classification, Dimension, MAX_RESPONSE, MIN_RESPONSE,
};
use serde::{Deserialize, Serialize};

pub const CRATE_NAME: &str = "rural-esg-score";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    MissingAnswer(u16),
    UnknownQuestion(u16),
    ResponseOutOfRange { question: u16, response: u8 },
}

impl std::fmt::Display for ScoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreError::MissingAnswer(id) => {
                write!(f, "incomplete submission: missing answer for question {id}")
            }
            ScoreError::UnknownQuestion(id) => write!(f, "unknown question id: {id}"),
            ScoreError::ResponseOutOfRange { question, response } => write!(
                f,
                "response for question {question} must be between {MIN_RESPONSE} and {MAX_RESPONSE}, got {response}"
            ),
        }
    }
}

impl std::error::Error for ScoreError {}

/// Inclusive classification band over a dimension's summed score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub min: u32,
    pub max: u32,
    pub classification: Classification,
}

const fn band(min: u32, max: u32, classification: Classification) -> Band {
    Band {
        min,
        max,
        classification,
    }
}

pub const ENVIRONMENTAL_BANDS: [Band; 3] = [
    band(25, 42, Classification::Reativa),
    band(43, 59, Classification::Normativa),
    band(60, 75, Classification::Proativa),
];

pub const SOCIAL_BANDS: [Band; 3] = [
    band(8, 14, Classification::Reativa),
    band(15, 20, Classification::Normativa),
    band(21, 24, Classification::Proativa),
];

pub const GOVERNANCE_BANDS: [Band; 3] = [
    band(8, 14, Classification::Reativa),
    band(15, 20, Classification::Normativa),
    band(21, 24, Classification::Proativa),
];

#[must_use]
pub fn bands_for(dimension: Dimension) -> &'static [Band; 3] {
    match dimension {
        Dimension::Environmental => &ENVIRONMENTAL_BANDS,
        Dimension::Social => &SOCIAL_BANDS,
        Dimension::Governance => &GOVERNANCE_BANDS,
    }
}

/// Classify a dimension score against its fixed bands.
///
/// The PROATIVA band is checked first, then NORMATIVA, with REATIVA as
/// the fallback. The bands partition each dimension's reachable range,
/// so the fallback only matters if that invariant were ever broken.
#[must_use]
pub fn classify(dimension: Dimension, score: u32) -> Classification {
    let [reactive, normative, proactive] = bands_for(dimension);
    debug_assert_eq!(reactive.classification, Classification::Reativa);
    if score >= proactive.min && score <= proactive.max {
        Classification::Proativa
    } else if score >= normative.min && score <= normative.max {
        Classification::Normativa
    } else {
        Classification::Reativa
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionResult {
    pub score: u32,
    pub classification: Classification,
}

/// The three (score, classification) pairs produced by one scoring pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scorecard {
    pub environmental: DimensionResult,
    pub social: DimensionResult,
    pub governance: DimensionResult,
}

impl Scorecard {
    #[must_use]
    pub fn dimension(&self, dimension: Dimension) -> DimensionResult {
        match dimension {
            Dimension::Environmental => self.environmental,
            Dimension::Social => self.social,
            Dimension::Governance => self.governance,
        }
    }
}

fn sum_dimension(answers: &AnswerSet, dimension: Dimension) -> Result<u32, ScoreError> {
    let mut sum = 0_u32;
    for id in catalog::dimension_question_ids(dimension) {
        let response = answers.response(id).ok_or(ScoreError::MissingAnswer(id))?;
        if !(MIN_RESPONSE..=MAX_RESPONSE).contains(&response) {
            return Err(ScoreError::ResponseOutOfRange {
                question: id,
                response,
            });
        }
        sum += u32::from(response);
    }
    Ok(sum)
}

/// Score a complete answer set.
///
/// `AnswerSet` construction already guarantees completeness; the checks
/// here keep the scoring contract independent of who built the input.
pub fn score_answers(answers: &AnswerSet) -> Result<Scorecard, ScoreError> {
    for (&id, _) in answers.as_map() {
        if catalog::question_by_id(id).is_none() {
            return Err(ScoreError::UnknownQuestion(id));
        }
    }
    let mut results = [DimensionResult {
        score: 0,
        classification: Classification::Reativa,
    }; 3];
    for (slot, dimension) in results.iter_mut().zip(Dimension::ALL) {
        let score = sum_dimension(answers, dimension)?;
        *slot = DimensionResult {
            score,
            classification: classify(dimension, score),
        };
    }
    let [environmental, social, governance] = results;
    Ok(Scorecard {
        environmental,
        social,
        governance,
    })
}

#[cfg(test)]
mod score_tests;
