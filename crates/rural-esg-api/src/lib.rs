// SPDX-License-Identifier: Apache-2.0

//! The wire contract: DTOs, error envelope and query-parameter parsing.
//! Field names follow the original JSON contract (camelCase).

#![forbid(unsafe_code)]

pub mod dto;
pub mod errors;
pub mod params;

pub use dto::{
    CreateEvaluationDto, EvaluationDto, QuestionDto, StatsDto, UserDto,
};
pub use errors::{map_error, ApiError, ApiErrorCode};
pub use params::{parse_list_evaluations_params, ListEvaluationsParams, Period};

pub const CRATE_NAME: &str = "rural-esg-api";
pub const API_VERSION: &str = "v1";
