//! Clip repository
//!
//! Owns clip records and the play-count increment. The increment is a
//! single conditional UPDATE against the store, so correctness under
//! concurrent stream requests does not depend on any in-process lock
//! and holds across multiple service instances sharing the database.

use crate::{Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Clip record: one short audio asset plus its play counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub genre: String,
    pub duration: String,
    pub audio_url: String,
    pub play_count: i64,
    pub created_at: NaiveDateTime,
}

/// Fields required to create a new clip (already validated at the
/// HTTP boundary)
#[derive(Debug, Clone)]
pub struct NewClip {
    pub title: String,
    pub description: Option<String>,
    pub genre: String,
    pub duration: String,
    pub audio_url: String,
}

/// Listing options: optional genre filter plus offset pagination
#[derive(Debug, Clone)]
pub struct ListFilter {
    pub genre: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

/// Aggregate library statistics
#[derive(Debug, Clone, Serialize)]
pub struct LibraryStats {
    pub total_clips: i64,
    pub total_plays: i64,
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_played: Option<MostPlayed>,
}

/// Most-played clip summary for [`LibraryStats`]
#[derive(Debug, Clone, Serialize)]
pub struct MostPlayed {
    pub id: i64,
    pub title: String,
    pub play_count: i64,
}

const CLIP_COLUMNS: &str =
    "id, title, description, genre, duration, audio_url, play_count, created_at";

fn map_clip(row: &SqliteRow) -> Clip {
    Clip {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        genre: row.get("genre"),
        duration: row.get("duration"),
        audio_url: row.get("audio_url"),
        play_count: row.get("play_count"),
        created_at: row.get("created_at"),
    }
}

/// Load a single clip by id
pub async fn get_clip(pool: &SqlitePool, clip_id: i64) -> Result<Clip> {
    let row = sqlx::query(&format!("SELECT {} FROM clips WHERE id = ?", CLIP_COLUMNS))
        .bind(clip_id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(map_clip(&row)),
        None => Err(Error::NotFound(format!("clip {}", clip_id))),
    }
}

/// List clips in stable creation order (ascending id)
pub async fn list_clips(pool: &SqlitePool, filter: &ListFilter) -> Result<Vec<Clip>> {
    let rows = match &filter.genre {
        Some(genre) => {
            sqlx::query(&format!(
                "SELECT {} FROM clips WHERE genre = ? COLLATE NOCASE ORDER BY id LIMIT ? OFFSET ?",
                CLIP_COLUMNS
            ))
            .bind(genre)
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(&format!(
                "SELECT {} FROM clips ORDER BY id LIMIT ? OFFSET ?",
                CLIP_COLUMNS
            ))
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows.iter().map(map_clip).collect())
}

/// Insert a new clip and return the stored record
pub async fn create_clip(pool: &SqlitePool, new: &NewClip) -> Result<Clip> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO clips (title, description, genre, duration, audio_url)
        VALUES (?, ?, ?, ?, ?)
        RETURNING {}
        "#,
        CLIP_COLUMNS
    ))
    .bind(&new.title)
    .bind(&new.description)
    .bind(&new.genre)
    .bind(&new.duration)
    .bind(&new.audio_url)
    .fetch_one(pool)
    .await?;

    Ok(map_clip(&row))
}

/// Atomically increment a clip's play count and return the new count
///
/// One statement performs the read, the arithmetic, and the write
/// inside the store. There is no read-before-write round trip, so
/// concurrent increments for the same id cannot lose updates, and
/// increments for different ids contend only on the store's normal
/// write lock. A missing id matches no row: nothing is created and
/// nothing else is touched.
pub async fn increment_play_count(pool: &SqlitePool, clip_id: i64) -> Result<i64> {
    let new_count: Option<i64> = sqlx::query_scalar(
        "UPDATE clips SET play_count = play_count + 1 WHERE id = ? RETURNING play_count",
    )
    .bind(clip_id)
    .fetch_optional(pool)
    .await?;

    new_count.ok_or_else(|| Error::NotFound(format!("clip {}", clip_id)))
}

/// Most-played clips, highest count first (ties break on creation order)
pub async fn popular_clips(pool: &SqlitePool, limit: i64) -> Result<Vec<Clip>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM clips ORDER BY play_count DESC, id ASC LIMIT ?",
        CLIP_COLUMNS
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_clip).collect())
}

/// Aggregate totals across the whole library
pub async fn library_stats(pool: &SqlitePool) -> Result<LibraryStats> {
    let (total_clips, total_plays): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(play_count), 0) FROM clips")
            .fetch_one(pool)
            .await?;

    let genres: Vec<String> =
        sqlx::query_scalar("SELECT DISTINCT genre FROM clips ORDER BY genre")
            .fetch_all(pool)
            .await?;

    let most_played = if total_clips > 0 {
        let (id, title, play_count): (i64, String, i64) = sqlx::query_as(
            "SELECT id, title, play_count FROM clips ORDER BY play_count DESC, id ASC LIMIT 1",
        )
        .fetch_one(pool)
        .await?;

        Some(MostPlayed {
            id,
            title,
            play_count,
        })
    } else {
        None
    };

    Ok(LibraryStats {
        total_clips,
        total_plays,
        genres,
        most_played,
    })
}
