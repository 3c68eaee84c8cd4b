//! Progress reporting for a conversion flow.

use std::fmt;
use std::sync::Arc;

/// Steps a conversion flow reports as it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertEvent {
    /// A manifest is being fetched during resolution.
    FetchingManifest { url: String },
    /// A video rendition was chosen from a master playlist.
    VideoRenditionSelected { resolution: String, bandwidth: u64 },
    /// An alternate audio rendition was found and will be resolved.
    AudioRenditionFound { url: String },
    /// A branch bottomed out at a media playlist.
    MediaPlaylistReached { url: String },
    /// The initialization segment is being fetched.
    FetchingInitSegment { name: String },
    /// A media segment is being fetched; `index` is zero-based.
    FetchingSegment {
        name: String,
        index: usize,
        total: usize,
    },
    /// A fetched file is being written into the transcoder filesystem.
    StagingFile { path: String },
    /// A branch playlist is being written into the transcoder filesystem.
    WritingPlaylist { path: String },
    /// The transcoder is remuxing the staged streams.
    Remuxing,
    /// The output file was produced.
    Completed { output_size: usize },
}

impl fmt::Display for ConvertEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchingManifest { url } => write!(f, "Fetching manifest: {url}"),
            Self::VideoRenditionSelected {
                resolution,
                bandwidth,
            } => write!(f, "Selected video rendition {resolution} @ {bandwidth} bps"),
            Self::AudioRenditionFound { url } => write!(f, "Found audio rendition: {url}"),
            Self::MediaPlaylistReached { url } => write!(f, "Reached media playlist: {url}"),
            Self::FetchingInitSegment { name } => write!(f, "Fetching init segment {name}"),
            Self::FetchingSegment { name, index, total } => {
                write!(f, "Fetching segment {}/{total}: {name}", index + 1)
            }
            Self::StagingFile { path } => write!(f, "Staging {path}"),
            Self::WritingPlaylist { path } => write!(f, "Writing playlist {path}"),
            Self::Remuxing => write!(f, "Remuxing streams"),
            Self::Completed { output_size } => {
                write!(f, "Conversion finished, {output_size} bytes produced")
            }
        }
    }
}

/// Callback invoked with each [`ConvertEvent`].
pub type ProgressFn = dyn Fn(ConvertEvent) + Send + Sync;

/// Cloneable handle the flow emits progress through; a no-op when no
/// callback is installed.
#[derive(Clone, Default)]
pub struct Progress(Option<Arc<ProgressFn>>);

impl Progress {
    pub fn new(callback: impl Fn(ConvertEvent) + Send + Sync + 'static) -> Self {
        Self(Some(Arc::new(callback)))
    }

    pub fn emit(&self, event: ConvertEvent) {
        if let Some(callback) = &self.0 {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn emit_forwards_to_the_installed_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let progress = Progress::new(move |event| sink.lock().unwrap().push(event.to_string()));

        progress.emit(ConvertEvent::Remuxing);
        progress.emit(ConvertEvent::Completed { output_size: 7 });

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                "Remuxing streams".to_string(),
                "Conversion finished, 7 bytes produced".to_string(),
            ]
        );
    }

    #[test]
    fn emit_without_callback_is_a_no_op() {
        Progress::default().emit(ConvertEvent::Remuxing);
    }

    #[test]
    fn segment_event_renders_one_based_position() {
        let event = ConvertEvent::FetchingSegment {
            name: "seg3.ts".to_string(),
            index: 2,
            total: 5,
        };
        assert_eq!(event.to_string(), "Fetching segment 3/5: seg3.ts");
    }
}
