//! Remux argument construction and invocation.

use bytes::Bytes;
use tracing::debug;

use crate::engine::TranscodeEngine;
use crate::error::ConvertError;
use crate::events::{ConvertEvent, Progress};
use crate::stage::{AUDIO_PLAYLIST_PATH, VIDEO_PLAYLIST_PATH};

/// Name of the produced file inside the engine filesystem.
pub const OUTPUT_PATH: &str = "output.mp4";

/// Argument vector for one remux run.
///
/// Single input: every stream is copied. Two inputs: the video stream is
/// copied and the audio stream is re-encoded to AAC. `aac_adtstoasc`
/// rewrites ADTS audio framing into the form the MP4 container expects.
pub fn remux_args(has_audio: bool) -> Vec<String> {
    let mut args: Vec<String> = ["-allowed_extensions", "ALL", "-i", VIDEO_PLAYLIST_PATH]
        .map(String::from)
        .to_vec();
    if has_audio {
        args.extend(["-i", AUDIO_PLAYLIST_PATH, "-c:v", "copy", "-c:a", "aac"].map(String::from));
    } else {
        args.extend(["-c", "copy"].map(String::from));
    }
    args.extend(["-bsf:a", "aac_adtstoasc", OUTPUT_PATH].map(String::from));
    args
}

/// Runs the transcoder over the staged playlists and reads the produced
/// file back. Both an engine failure and a failed read-back surface as
/// [`ConvertError::Remux`].
pub async fn remux(
    engine: &dyn TranscodeEngine,
    has_audio: bool,
    progress: &Progress,
) -> Result<Bytes, ConvertError> {
    let args = remux_args(has_audio);
    progress.emit(ConvertEvent::Remuxing);
    debug!(args = ?args, "invoking transcoder");
    engine
        .exec(&args)
        .await
        .map_err(|source| ConvertError::Remux { source })?;
    engine
        .read_file(OUTPUT_PATH)
        .await
        .map_err(|source| ConvertError::Remux { source })
}
