//! Clip catalog handlers
//!
//! Listing, creation, and stats views over the clip repository.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::clips::{Clip, ListFilter, NewClip};
use crate::{db, AppState, Error, Result};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Filter by genre (case-insensitive)
    pub genre: Option<String>,

    /// Number of clips to skip (pagination)
    #[serde(default)]
    pub skip: i64,

    /// Maximum number of clips to return
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    #[serde(default = "default_popular_limit")]
    pub limit: i64,
}

fn default_popular_limit() -> i64 {
    5
}

#[derive(Debug, Deserialize)]
pub struct CreateClipRequest {
    pub title: String,
    pub description: Option<String>,
    pub genre: String,
    pub duration: String,
    pub audio_url: String,
}

impl CreateClipRequest {
    /// Boundary validation, applied before anything touches storage
    fn validate(&self) -> Result<NewClip> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidInput("title must not be empty".to_string()));
        }
        if self.genre.trim().is_empty() {
            return Err(Error::InvalidInput("genre must not be empty".to_string()));
        }
        if self.duration.trim().is_empty() {
            return Err(Error::InvalidInput("duration must not be empty".to_string()));
        }

        let audio_url = self.audio_url.trim();
        if audio_url.is_empty() {
            return Err(Error::InvalidInput(
                "audio_url must not be empty".to_string(),
            ));
        }
        // Audio sources are http(s) URLs or local file paths
        if let Some((scheme, _)) = audio_url.split_once("://") {
            if scheme != "http" && scheme != "https" {
                return Err(Error::InvalidInput(format!(
                    "unsupported audio source scheme: {}",
                    scheme
                )));
            }
        }

        Ok(NewClip {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            genre: self.genre.trim().to_string(),
            duration: self.duration.trim().to_string(),
            audio_url: audio_url.to_string(),
        })
    }
}

/// Per-clip stats view
#[derive(Debug, Serialize)]
pub struct ClipStats {
    pub id: i64,
    pub title: String,
    pub play_count: i64,
    pub description: Option<String>,
    pub genre: String,
    pub duration: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /clips - list clips in stable creation order
pub async fn list_clips(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Clip>>> {
    let filter = ListFilter {
        genre: query.genre,
        skip: query.skip.max(0),
        limit: query.limit.clamp(0, 1000),
    };

    let clips = db::clips::list_clips(&state.db, &filter).await?;
    Ok(Json(clips))
}

/// GET /clips/:id - single clip
pub async fn get_clip(
    State(state): State<AppState>,
    Path(clip_id): Path<i64>,
) -> Result<Json<Clip>> {
    let clip = db::clips::get_clip(&state.db, clip_id).await?;
    Ok(Json(clip))
}

/// POST /clips - create a new clip
pub async fn create_clip(
    State(state): State<AppState>,
    Json(request): Json<CreateClipRequest>,
) -> Result<Json<Clip>> {
    let new_clip = request.validate()?;

    let clip = db::clips::create_clip(&state.db, &new_clip).await?;
    info!(clip_id = clip.id, title = %clip.title, genre = %clip.genre, "Created clip");

    Ok(Json(clip))
}

/// GET /clips/:id/stats - play-count stats for one clip
pub async fn clip_stats(
    State(state): State<AppState>,
    Path(clip_id): Path<i64>,
) -> Result<Json<ClipStats>> {
    let clip = db::clips::get_clip(&state.db, clip_id).await?;

    Ok(Json(ClipStats {
        id: clip.id,
        title: clip.title,
        play_count: clip.play_count,
        description: clip.description,
        genre: clip.genre,
        duration: clip.duration,
    }))
}

/// GET /clips/popular - most-played clips
pub async fn popular_clips(
    State(state): State<AppState>,
    Query(query): Query<PopularQuery>,
) -> Result<Json<Vec<Clip>>> {
    let clips = db::clips::popular_clips(&state.db, query.limit.clamp(1, 100)).await?;
    Ok(Json(clips))
}

/// GET /stats - aggregate library statistics
pub async fn library_stats(
    State(state): State<AppState>,
) -> Result<Json<db::clips::LibraryStats>> {
    let stats = db::clips::library_stats(&state.db).await?;
    Ok(Json(stats))
}
