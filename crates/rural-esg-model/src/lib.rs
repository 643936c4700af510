// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

pub mod answers;
pub mod catalog;
pub mod dimension;
pub mod evaluation;

pub use answers::{AnswerSet, MAX_RESPONSE, MIN_RESPONSE};
pub use catalog::{
    question_by_id, questions, Question, ENVIRONMENTAL_QUESTION_COUNT, GOVERNANCE_QUESTION_COUNT,
    QUESTION_COUNT, SOCIAL_QUESTION_COUNT,
};
pub use dimension::{Classification, Dimension};
pub use evaluation::{
    parse_property_name, Evaluation, EvaluationStats, NewEvaluation, UpsertUser, User,
    PROPERTY_NAME_MAX_LEN,
};

pub const CRATE_NAME: &str = "rural-esg-model";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}
