// SPDX-License-Identifier: Apache-2.0

use crate::answers::AnswerSet;
use crate::dimension::Classification;
use crate::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PROPERTY_NAME_MAX_LEN: usize = 256;

pub fn parse_property_name(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError("property name must not be empty".to_string()));
    }
    if trimmed.len() > PROPERTY_NAME_MAX_LEN {
        return Err(ValidationError(format!(
            "property name exceeds max length {PROPERTY_NAME_MAX_LEN}"
        )));
    }
    Ok(trimmed.to_string())
}

/// A submission ready to be persisted. Scores and classifications are the
/// server-computed values; the store trusts them as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvaluation {
    pub property_name: String,
    pub answers: AnswerSet,
    pub environmental_score: u32,
    pub social_score: u32,
    pub governance_score: u32,
    pub environmental_classification: Classification,
    pub social_classification: Classification,
    pub governance_classification: Classification,
}

/// One persisted questionnaire submission. Append-only; never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: i64,
    pub property_name: String,
    pub submission_date: DateTime<Utc>,
    pub answers: AnswerSet,
    pub environmental_score: u32,
    pub social_score: u32,
    pub governance_score: u32,
    pub environmental_classification: Classification,
    pub social_classification: Classification,
    pub governance_classification: Classification,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EvaluationStats {
    pub total_evaluations: u64,
    pub unique_properties: u64,
    pub avg_environmental_score: i64,
    pub this_month: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity-provider claims applied on every successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertUser {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
}
