// SPDX-License-Identifier: Apache-2.0

use crate::errors::ApiError;
use chrono::{DateTime, Utc};
use rural_esg_model::{
    parse_property_name, AnswerSet, Classification, Evaluation, EvaluationStats, NewEvaluation,
    Question, User,
};
use rural_esg_score::score_answers;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Submission body. Scores and classifications are accepted for shape
/// compatibility with the original client contract, then verified against
/// the server-side recomputation — never trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateEvaluationDto {
    pub property_name: String,
    pub answers: BTreeMap<u16, u8>,
    pub environmental_score: u32,
    pub social_score: u32,
    pub governance_score: u32,
    pub environmental_classification: String,
    pub social_classification: String,
    pub governance_classification: String,
}

fn field_error(field: &str, reason: impl std::fmt::Display) -> Value {
    json!({"field": field, "reason": reason.to_string()})
}

fn mismatch(field: &str, expected: impl Serialize, got: impl Serialize) -> Value {
    json!({
        "field": field,
        "reason": "inconsistent with submitted answers",
        "expected": expected,
        "got": got,
    })
}

impl CreateEvaluationDto {
    /// Validate the submission and produce the record to persist.
    ///
    /// The scorecard is recomputed from the answers; any client-submitted
    /// score or classification that disagrees is reported as a field
    /// error, and the persisted values are always the server's.
    pub fn validate(self) -> Result<NewEvaluation, ApiError> {
        let property_name = parse_property_name(&self.property_name)
            .map_err(|e| ApiError::validation_failed(json!([field_error("propertyName", e)])))?;
        let answers = AnswerSet::from_map(self.answers)
            .map_err(|e| ApiError::validation_failed(json!([field_error("answers", e)])))?;
        let card = score_answers(&answers)
            .map_err(|e| ApiError::validation_failed(json!([field_error("answers", e)])))?;

        let mut field_errors: Vec<Value> = Vec::new();
        let score_fields = [
            ("environmentalScore", self.environmental_score, card.environmental.score),
            ("socialScore", self.social_score, card.social.score),
            ("governanceScore", self.governance_score, card.governance.score),
        ];
        for (field, got, expected) in score_fields {
            if got != expected {
                field_errors.push(mismatch(field, expected, got));
            }
        }
        let classification_fields = [
            (
                "environmentalClassification",
                &self.environmental_classification,
                card.environmental.classification,
            ),
            (
                "socialClassification",
                &self.social_classification,
                card.social.classification,
            ),
            (
                "governanceClassification",
                &self.governance_classification,
                card.governance.classification,
            ),
        ];
        for (field, got, expected) in classification_fields {
            match Classification::parse(got) {
                Ok(parsed) if parsed == expected => {}
                Ok(_) => field_errors.push(mismatch(field, expected.as_str(), got)),
                Err(e) => field_errors.push(field_error(field, e)),
            }
        }
        if !field_errors.is_empty() {
            return Err(ApiError::validation_failed(Value::Array(field_errors)));
        }

        Ok(NewEvaluation {
            property_name,
            answers,
            environmental_score: card.environmental.score,
            social_score: card.social.score,
            governance_score: card.governance.score,
            environmental_classification: card.environmental.classification,
            social_classification: card.social.classification,
            governance_classification: card.governance.classification,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EvaluationDto {
    pub id: i64,
    pub property_name: String,
    pub submission_date: DateTime<Utc>,
    pub answers: BTreeMap<u16, u8>,
    pub environmental_score: u32,
    pub social_score: u32,
    pub governance_score: u32,
    pub environmental_classification: Classification,
    pub social_classification: Classification,
    pub governance_classification: Classification,
    pub created_at: DateTime<Utc>,
}

impl From<Evaluation> for EvaluationDto {
    fn from(record: Evaluation) -> Self {
        Self {
            id: record.id,
            property_name: record.property_name,
            submission_date: record.submission_date,
            answers: record.answers.into_inner(),
            environmental_score: record.environmental_score,
            social_score: record.social_score,
            governance_score: record.governance_score,
            environmental_classification: record.environmental_classification,
            social_classification: record.social_classification,
            governance_classification: record.governance_classification,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StatsDto {
    pub total_evaluations: u64,
    pub unique_properties: u64,
    pub avg_environmental_score: i64,
    pub this_month: u64,
}

impl From<EvaluationStats> for StatsDto {
    fn from(stats: EvaluationStats) -> Self {
        Self {
            total_evaluations: stats.total_evaluations,
            unique_properties: stats.unique_properties,
            avg_environmental_score: stats.avg_environmental_score,
            this_month: stats.this_month,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserDto {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            profile_image_url: user.profile_image_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestionDto {
    pub id: u16,
    pub dimension: rural_esg_model::Dimension,
    pub text: String,
}

impl From<&Question> for QuestionDto {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id,
            dimension: question.dimension,
            text: question.text.to_string(),
        }
    }
}
