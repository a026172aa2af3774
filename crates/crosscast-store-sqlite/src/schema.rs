//! SQL schema for the crosscast SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS shows (
    show_id         INTEGER PRIMARY KEY,   -- upstream catalog id
    name            TEXT NOT NULL,
    poster_path     TEXT,
    popularity_rank INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS people (
    person_id           INTEGER PRIMARY KEY,  -- upstream catalog id
    name                TEXT NOT NULL,
    profile_path        TEXT,
    -- Derived by the eligibility pass; never written by ingestion.
    distinct_show_count INTEGER NOT NULL DEFAULT 0,
    is_eligible         INTEGER NOT NULL DEFAULT 0
);

-- One row per (show, person). Re-ingestion merges episode counts by
-- per-field maximum and reclassifies kind from the merged counts.
CREATE TABLE IF NOT EXISTS appearances (
    show_id             INTEGER NOT NULL REFERENCES shows(show_id),
    person_id           INTEGER NOT NULL REFERENCES people(person_id),
    episode_count       INTEGER,
    guest_episode_count INTEGER,
    kind                TEXT,                 -- 'main' | 'guest' | 'both' | NULL
    PRIMARY KEY (show_id, person_id)
);

CREATE TABLE IF NOT EXISTS daily_puzzles (
    puzzle_id    TEXT PRIMARY KEY,
    puzzle_date  TEXT NOT NULL UNIQUE,  -- ISO 8601 calendar date
    seed         TEXT NOT NULL,         -- attempt label that produced the grid
    row_show_ids TEXT NOT NULL,         -- JSON array of 3 show ids
    col_show_ids TEXT NOT NULL,         -- JSON array of 3 show ids
    created_at   TEXT NOT NULL          -- ISO 8601 UTC
);

-- Cells follow their puzzle: replacing a date's puzzle deletes the old
-- header and the cascade removes its cells.
CREATE TABLE IF NOT EXISTS daily_cells (
    puzzle_id    TEXT NOT NULL REFERENCES daily_puzzles(puzzle_id)
                 ON DELETE CASCADE,
    row_idx      INTEGER NOT NULL CHECK (row_idx BETWEEN 0 AND 2),
    col_idx      INTEGER NOT NULL CHECK (col_idx BETWEEN 0 AND 2),
    answer_count INTEGER NOT NULL,
    PRIMARY KEY (puzzle_id, row_idx, col_idx)
);

CREATE VIEW IF NOT EXISTS eligible_appearances AS
    SELECT a.show_id, a.person_id
    FROM appearances a
    JOIN people p ON p.person_id = a.person_id
    WHERE p.is_eligible = 1;

CREATE INDEX IF NOT EXISTS appearances_person_idx ON appearances(person_id);
CREATE INDEX IF NOT EXISTS people_eligible_idx    ON people(is_eligible);

PRAGMA user_version = 1;
";
