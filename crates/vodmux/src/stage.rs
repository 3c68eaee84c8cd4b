//! Staging fetched media into the transcoder's virtual filesystem.

use std::io;

use tracing::debug;

use crate::acquire::Segment;
use crate::engine::TranscodeEngine;
use crate::error::ConvertError;
use crate::events::{ConvertEvent, Progress};

/// Virtual path the video branch playlist is written to.
pub const VIDEO_PLAYLIST_PATH: &str = "/video.m3u8";
/// Virtual path the audio branch playlist is written to.
pub const AUDIO_PLAYLIST_PATH: &str = "/audio.m3u8";

/// Writes one branch's segments and playlist into the engine filesystem.
///
/// Segments keep their playlist names, rooted at `/`; the playlist itself
/// goes to `playlist_path` last. The first failed write aborts the stage;
/// earlier writes are left in place.
pub async fn stage_stream(
    engine: &dyn TranscodeEngine,
    segments: &[Segment],
    playlist: &str,
    playlist_path: &str,
    progress: &Progress,
) -> Result<(), ConvertError> {
    for segment in segments {
        let path = virtual_path(&segment.name);
        progress.emit(ConvertEvent::StagingFile { path: path.clone() });
        ensure_ancestor_dirs(engine, &path).await?;
        engine
            .write_file(&path, &segment.data)
            .await
            .map_err(|source| ConvertError::stage_write(&path, source))?;
        debug!(path = %path, size = segment.data.len(), "staged segment");
    }

    progress.emit(ConvertEvent::WritingPlaylist {
        path: playlist_path.to_string(),
    });
    engine
        .write_file(playlist_path, playlist.as_bytes())
        .await
        .map_err(|source| ConvertError::stage_write(playlist_path, source))?;
    Ok(())
}

/// Roots a playlist-relative name at `/`.
fn virtual_path(name: &str) -> String {
    if name.starts_with('/') {
        name.to_string()
    } else {
        format!("/{name}")
    }
}

/// Creates missing ancestors of `path` from the root downward. Existence
/// is probed with `list_dir`; a directory that appears during creation is
/// fine, any other creation failure is not.
async fn ensure_ancestor_dirs(
    engine: &dyn TranscodeEngine,
    path: &str,
) -> Result<(), ConvertError> {
    for dir in ancestor_dirs(path) {
        if engine.list_dir(&dir).await.is_ok() {
            continue;
        }
        match engine.create_dir(&dir).await {
            Ok(()) => debug!(dir = %dir, "created staging directory"),
            Err(source) if source.kind() == io::ErrorKind::AlreadyExists => {}
            Err(source) => return Err(ConvertError::stage_write(&dir, source)),
        }
    }
    Ok(())
}

/// Ancestor directories of a rooted virtual path, shallowest first:
/// `/a/b/c.ts` yields `/a` then `/a/b`.
fn ancestor_dirs(path: &str) -> Vec<String> {
    let components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
    let mut dirs = Vec::new();
    let mut current = String::new();
    for component in &components[..components.len().saturating_sub(1)] {
        current.push('/');
        current.push_str(component);
        dirs.push(current.clone());
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_rooted() {
        assert_eq!(virtual_path("seg1.ts"), "/seg1.ts");
        assert_eq!(virtual_path("video/seg1.ts"), "/video/seg1.ts");
        assert_eq!(virtual_path("/already/rooted.ts"), "/already/rooted.ts");
    }

    #[test]
    fn ancestors_come_shallowest_first() {
        assert_eq!(ancestor_dirs("/a/b/c.ts"), vec!["/a", "/a/b"]);
        assert_eq!(ancestor_dirs("/seg1.ts"), Vec::<String>::new());
    }
}
