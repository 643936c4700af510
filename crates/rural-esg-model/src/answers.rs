// SPDX-License-Identifier: Apache-2.0

use crate::catalog::{question_by_id, questions};
use crate::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MIN_RESPONSE: u8 = 1;
pub const MAX_RESPONSE: u8 = 3;

/// A complete, validated set of questionnaire responses.
///
/// Construction enforces the scoring contract: one response per catalog
/// question, each valued 1..=3, no unknown question ids. An incomplete
/// submission is an error, never a defaulted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<u16, u8>);

impl AnswerSet {
    pub fn from_map(raw: BTreeMap<u16, u8>) -> Result<Self, ValidationError> {
        for (&id, &response) in &raw {
            if question_by_id(id).is_none() {
                return Err(ValidationError(format!("unknown question id: {id}")));
            }
            if !(MIN_RESPONSE..=MAX_RESPONSE).contains(&response) {
                return Err(ValidationError(format!(
                    "response for question {id} must be between {MIN_RESPONSE} and {MAX_RESPONSE}, got {response}"
                )));
            }
        }
        for question in questions() {
            if !raw.contains_key(&question.id) {
                return Err(ValidationError(format!(
                    "incomplete submission: missing answer for question {}",
                    question.id
                )));
            }
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn response(&self, id: u16) -> Option<u8> {
        self.0.get(&id).copied()
    }

    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<u16, u8> {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> BTreeMap<u16, u8> {
        self.0
    }
}
