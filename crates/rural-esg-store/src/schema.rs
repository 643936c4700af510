// SPDX-License-Identifier: Apache-2.0

/// Applied on every open; all statements are idempotent.
pub(crate) const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS sessions (
  sid    TEXT PRIMARY KEY,
  sess   TEXT NOT NULL,
  expire TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_sessions_expire ON sessions(expire);

CREATE TABLE IF NOT EXISTS users (
  id                TEXT PRIMARY KEY,
  email             TEXT UNIQUE,
  first_name        TEXT,
  last_name         TEXT,
  profile_image_url TEXT,
  created_at        TEXT NOT NULL,
  updated_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS evaluations (
  id                            INTEGER PRIMARY KEY AUTOINCREMENT,
  property_name                 TEXT NOT NULL,
  submission_date               TEXT NOT NULL,
  answers                       TEXT NOT NULL,
  environmental_score           INTEGER NOT NULL,
  social_score                  INTEGER NOT NULL,
  governance_score              INTEGER NOT NULL,
  environmental_classification  TEXT NOT NULL,
  social_classification         TEXT NOT NULL,
  governance_classification     TEXT NOT NULL,
  created_at                    TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_evaluations_submission_date
  ON evaluations(submission_date);
";
