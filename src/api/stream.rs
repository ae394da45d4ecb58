//! Stream delivery handler
//!
//! Serves the audio bytes for a clip and bumps its play counter. The
//! counter moves through one atomic conditional UPDATE; delivery of
//! the bytes (redirect or chunked file body) happens after the
//! increment and is not transactionally coupled to it.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use std::io::ErrorKind;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::info;

use crate::db::retry::retry_on_lock;
use crate::{db, metrics, AppState, Error, Result};

/// Maximum total wait for the increment under store contention
const INCREMENT_MAX_WAIT_MS: u64 = 5000;

/// Local file source, opened before the increment so a clip whose
/// audio is missing never inflates its play count
struct LocalSource {
    file: File,
    length: u64,
    content_type: &'static str,
}

/// GET /clips/:id/stream - increment the play count, then deliver audio
///
/// http(s) sources answer with a redirect to the upstream bytes;
/// local paths answer with a chunked file body. A failed increment is
/// surfaced as an error response, never swallowed, even though the
/// audio itself would have been deliverable.
pub async fn stream_clip(
    State(state): State<AppState>,
    Path(clip_id): Path<i64>,
) -> Result<Response> {
    let clip = db::clips::get_clip(&state.db, clip_id).await?;

    // Confirm the stream can begin before counting the play
    let local = if is_remote(&clip.audio_url) {
        None
    } else {
        Some(open_local_source(&clip.audio_url, clip_id).await?)
    };

    let new_count = retry_on_lock("increment play count", INCREMENT_MAX_WAIT_MS, || {
        db::clips::increment_play_count(&state.db, clip_id)
    })
    .await
    .map_err(|err| {
        metrics::record_stream_error("increment_failed");
        err
    })?;

    metrics::record_stream(clip_id, new_count);
    info!(clip_id, play_count = new_count, title = %clip.title, "Streaming clip");

    match local {
        None => redirect_response(&clip.audio_url),
        Some(source) => file_response(source),
    }
}

fn is_remote(audio_url: &str) -> bool {
    audio_url.starts_with("http://") || audio_url.starts_with("https://")
}

async fn open_local_source(path: &str, clip_id: i64) -> Result<LocalSource> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            metrics::record_stream_error("source_missing");
            return Err(Error::NotFound(format!(
                "audio source for clip {}",
                clip_id
            )));
        }
        Err(err) => {
            metrics::record_stream_error("source_unreadable");
            return Err(err.into());
        }
    };

    let length = file.metadata().await?.len();

    Ok(LocalSource {
        file,
        length,
        content_type: content_type_for(path),
    })
}

/// Content type from the file extension; unknown extensions fall back
/// to a generic byte stream
fn content_type_for(path: &str) -> &'static str {
    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    }
}

fn redirect_response(audio_url: &str) -> Result<Response> {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, audio_url)
        .body(Body::empty())
        .map_err(|err| Error::Internal(format!("failed to build redirect response: {}", err)))
}

fn file_response(source: LocalSource) -> Result<Response> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, source.content_type)
        .header(header::CONTENT_LENGTH, source.length)
        .body(Body::from_stream(ReaderStream::new(source.file)))
        .map_err(|err| Error::Internal(format!("failed to build stream response: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_detection() {
        assert!(is_remote("https://example.com/a.wav"));
        assert!(is_remote("http://example.com/a.wav"));
        assert!(!is_remote("/var/lib/clipstream/audio/a.wav"));
        assert!(!is_remote("relative/a.wav"));
    }

    #[test]
    fn test_content_type_mapping() {
        assert_eq!(content_type_for("/audio/a.wav"), "audio/wav");
        assert_eq!(content_type_for("/audio/a.MP3"), "audio/mpeg");
        assert_eq!(content_type_for("/audio/a.flac"), "audio/flac");
        assert_eq!(content_type_for("/audio/a"), "application/octet-stream");
        assert_eq!(content_type_for("/audio/a.xyz"), "application/octet-stream");
    }
}
