// SPDX-License-Identifier: Apache-2.0

use crate::{escape_like, format_timestamp, parse_timestamp, SqliteStore, StoreError};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use rural_esg_model::{AnswerSet, Classification, Evaluation, EvaluationStats, NewEvaluation};
use rusqlite::{types::Value, Connection};
use std::collections::BTreeMap;

const EVALUATION_COLUMNS: &str = "id, property_name, submission_date, answers, \
     environmental_score, social_score, governance_score, \
     environmental_classification, social_classification, governance_classification, \
     created_at";

/// Listing filter. `cutoff` is precomputed by the caller (see the api
/// crate's period handling); `None` means no date restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationFilter {
    pub search: Option<String>,
    pub cutoff: Option<DateTime<Utc>>,
}

struct RawEvaluationRow {
    id: i64,
    property_name: String,
    submission_date: String,
    answers: String,
    environmental_score: u32,
    social_score: u32,
    governance_score: u32,
    environmental_classification: String,
    social_classification: String,
    governance_classification: String,
    created_at: String,
}

fn read_raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvaluationRow> {
    Ok(RawEvaluationRow {
        id: row.get(0)?,
        property_name: row.get(1)?,
        submission_date: row.get(2)?,
        answers: row.get(3)?,
        environmental_score: row.get(4)?,
        social_score: row.get(5)?,
        governance_score: row.get(6)?,
        environmental_classification: row.get(7)?,
        social_classification: row.get(8)?,
        governance_classification: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn parse_classification(raw: &str) -> Result<Classification, StoreError> {
    Classification::parse(raw).map_err(|e| StoreError(e.0))
}

fn decode_row(raw: RawEvaluationRow) -> Result<Evaluation, StoreError> {
    let answer_map: BTreeMap<u16, u8> = serde_json::from_str(&raw.answers)
        .map_err(|e| StoreError(format!("malformed answers column: {e}")))?;
    let answers = AnswerSet::from_map(answer_map).map_err(|e| StoreError(e.0))?;
    Ok(Evaluation {
        id: raw.id,
        property_name: raw.property_name,
        submission_date: parse_timestamp(&raw.submission_date)?,
        answers,
        environmental_score: raw.environmental_score,
        social_score: raw.social_score,
        governance_score: raw.governance_score,
        environmental_classification: parse_classification(&raw.environmental_classification)?,
        social_classification: parse_classification(&raw.social_classification)?,
        governance_classification: parse_classification(&raw.governance_classification)?,
        created_at: parse_timestamp(&raw.created_at)?,
    })
}

fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Evaluation>, StoreError> {
    let sql = format!("SELECT {EVALUATION_COLUMNS} FROM evaluations WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map([id], read_raw_row)?;
    match rows.next() {
        Some(raw) => Ok(Some(decode_row(raw?)?)),
        None => Ok(None),
    }
}

fn start_of_current_month(now: DateTime<Utc>) -> Result<DateTime<Utc>, StoreError> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .ok_or_else(|| StoreError("cannot compute start of month".to_string()))
}

impl SqliteStore {
    /// Insert one evaluation; the server assigns `submission_date` and
    /// `created_at` from `now` and returns the stored record.
    pub fn create_evaluation(
        &self,
        new: &NewEvaluation,
        now: DateTime<Utc>,
    ) -> Result<Evaluation, StoreError> {
        let answers_json = serde_json::to_string(new.answers.as_map())
            .map_err(|e| StoreError(format!("cannot encode answers: {e}")))?;
        let stamp = format_timestamp(now);
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO evaluations (
                   property_name, submission_date, answers,
                   environmental_score, social_score, governance_score,
                   environmental_classification, social_classification,
                   governance_classification, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    new.property_name,
                    stamp,
                    answers_json,
                    new.environmental_score,
                    new.social_score,
                    new.governance_score,
                    new.environmental_classification.as_str(),
                    new.social_classification.as_str(),
                    new.governance_classification.as_str(),
                    stamp,
                ],
            )?;
            let id = conn.last_insert_rowid();
            get_by_id(conn, id)?
                .ok_or_else(|| StoreError("inserted evaluation not readable".to_string()))
        })
    }

    /// Records ordered by submission date descending (id breaks ties for
    /// rows sharing a second).
    pub fn list_evaluations(
        &self,
        filter: &EvaluationFilter,
    ) -> Result<Vec<Evaluation>, StoreError> {
        let mut sql = format!("SELECT {EVALUATION_COLUMNS} FROM evaluations");
        let mut where_parts: Vec<&str> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(search) = &filter.search {
            where_parts.push("property_name LIKE ?1 ESCAPE '!'");
            params.push(Value::Text(format!("%{}%", escape_like(search))));
        }
        if let Some(cutoff) = filter.cutoff {
            where_parts.push(if params.is_empty() {
                "submission_date >= ?1"
            } else {
                "submission_date >= ?2"
            });
            params.push(Value::Text(format_timestamp(cutoff)));
        }
        if !where_parts.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_parts.join(" AND "));
        }
        sql.push_str(" ORDER BY submission_date DESC, id DESC");

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let raw_rows = stmt
                .query_map(rusqlite::params_from_iter(params.iter()), read_raw_row)?
                .collect::<Result<Vec<_>, _>>()?;
            raw_rows.into_iter().map(decode_row).collect()
        })
    }

    pub fn get_evaluation(&self, id: i64) -> Result<Option<Evaluation>, StoreError> {
        self.with_conn(|conn| get_by_id(conn, id))
    }

    pub fn evaluation_stats(&self, now: DateTime<Utc>) -> Result<EvaluationStats, StoreError> {
        let month_start = format_timestamp(start_of_current_month(now)?);
        self.with_conn(|conn| {
            let (total, unique, avg_env): (u64, u64, Option<f64>) = conn.query_row(
                "SELECT COUNT(*), COUNT(DISTINCT property_name), AVG(environmental_score)
                 FROM evaluations",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;
            let this_month: u64 = conn.query_row(
                "SELECT COUNT(*) FROM evaluations WHERE submission_date >= ?1",
                [&month_start],
                |row| row.get(0),
            )?;
            Ok(EvaluationStats {
                total_evaluations: total,
                unique_properties: unique,
                avg_environmental_score: avg_env.map_or(0, |v| v.round() as i64),
                this_month,
            })
        })
    }
}
