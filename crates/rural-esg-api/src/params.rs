// SPDX-License-Identifier: Apache-2.0

use crate::errors::ApiError;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use std::collections::BTreeMap;

/// Date restriction for evaluation listings. Cutoffs are calendar-based,
/// not rolling windows: `Month` means the first instant of the current
/// month, `Quarter` the first of the month three calendar months prior,
/// `Year` January 1st of the current year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    All,
    Month,
    Quarter,
    Year,
}

fn month_start(year: i32, month: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()
}

impl Period {
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        match raw {
            "all" => Ok(Period::All),
            "month" => Ok(Period::Month),
            "quarter" => Ok(Period::Quarter),
            "year" => Ok(Period::Year),
            other => Err(ApiError::invalid_param("period", other)),
        }
    }

    /// `None` means no date restriction.
    #[must_use]
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Period::All => None,
            Period::Month => month_start(now.year(), now.month()),
            Period::Quarter => {
                let months = i64::from(now.year()) * 12 + i64::from(now.month0()) - 3;
                let year = months.div_euclid(12) as i32;
                let month0 = months.rem_euclid(12) as u32;
                month_start(year, month0 + 1)
            }
            Period::Year => month_start(now.year(), 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListEvaluationsParams {
    pub search: Option<String>,
    pub period: Period,
}

pub fn parse_list_evaluations_params(
    query: &BTreeMap<String, String>,
) -> Result<ListEvaluationsParams, ApiError> {
    let search = query
        .get("search")
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
        .map(str::to_string);
    let period = match query.get("period") {
        Some(raw) => Period::parse(raw)?,
        None => Period::All,
    };
    Ok(ListEvaluationsParams { search, period })
}
