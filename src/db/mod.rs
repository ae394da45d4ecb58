//! Database access and initialization

pub mod clips;
pub mod retry;

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Initialize database connection pool and create tables if needed
///
/// Connections use WAL journal mode (concurrent readers with one
/// writer) and a bounded busy timeout so lock waits fail as transient
/// errors instead of hanging.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .min_connections(1)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Migrations (idempotent - safe to call multiple times)
    create_clips_table(&pool).await?;
    seed_clips(&pool).await?;

    Ok(pool)
}

/// Create the clips table
///
/// Stores clip metadata and the play counter. The counter only moves
/// through the atomic increment in [`clips::increment_play_count`].
pub async fn create_clips_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS clips (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            genre TEXT NOT NULL,
            duration TEXT NOT NULL,
            audio_url TEXT NOT NULL,
            play_count INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (play_count >= 0),
            CHECK (length(title) > 0),
            CHECK (length(audio_url) > 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_clips_genre ON clips(genre)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_clips_play_count ON clips(play_count)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Sample clips inserted on first run: (id, title, description, genre, duration, audio_url)
const SEED_CLIPS: &[(i64, &str, &str, &str, &str, &str)] = &[
    (
        1,
        "Ocean Waves",
        "Relaxing ocean wave sounds for meditation",
        "ambient",
        "30s",
        "https://www2.cs.uic.edu/~i101/SoundFiles/BabyElephantWalk60.wav",
    ),
    (
        2,
        "Urban Beat",
        "Modern electronic beat with urban vibes",
        "electronic",
        "45s",
        "https://www2.cs.uic.edu/~i101/SoundFiles/CantinaBand60.wav",
    ),
    (
        3,
        "Acoustic Guitar",
        "Gentle acoustic guitar melody",
        "acoustic",
        "60s",
        "https://www2.cs.uic.edu/~i101/SoundFiles/ImperialMarch60.wav",
    ),
    (
        4,
        "Rain Forest",
        "Nature sounds from tropical rainforest",
        "ambient",
        "40s",
        "https://www2.cs.uic.edu/~i101/SoundFiles/PinkPanther60.wav",
    ),
    (
        5,
        "Synthwave Dream",
        "Retro synthwave with dreamy atmosphere",
        "electronic",
        "55s",
        "https://www2.cs.uic.edu/~i101/SoundFiles/StarWars60.wav",
    ),
    (
        6,
        "Jazz Piano",
        "Smooth jazz piano improvisation",
        "jazz",
        "35s",
        "https://www2.cs.uic.edu/~i101/SoundFiles/taunt.wav",
    ),
];

/// Seed the clips table with sample data on first run
///
/// Uses INSERT OR IGNORE with fixed ids so concurrent initialization
/// by multiple service instances cannot double-seed.
async fn seed_clips(pool: &SqlitePool) -> Result<()> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clips")
        .fetch_one(pool)
        .await?;

    if existing > 0 {
        return Ok(());
    }

    for (id, title, description, genre, duration, audio_url) in SEED_CLIPS {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO clips (id, title, description, genre, duration, audio_url)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(genre)
        .bind(duration)
        .bind(audio_url)
        .execute(pool)
        .await?;
    }

    info!("Seeded clips table with {} sample clips", SEED_CLIPS.len());
    Ok(())
}
