//! HLS manifest to playable MP4 conversion.
//!
//! Given a `.m3u8` URL, the engine resolves master playlists down to leaf
//! media playlists (selecting the best video rendition and the first
//! alternate audio track), downloads every referenced segment, stages the
//! lot into a transcoding engine's virtual filesystem and remuxes it into
//! a single MP4.

pub mod acquire;
pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod events;
pub mod fetch;
pub mod manifest;
pub mod remux;
pub mod resolve;
pub mod select;
pub mod stage;
pub mod url_utils;

pub use acquire::{Segment, SegmentReferences, acquire, segment_references};
pub use config::{
    ConvertConfig, DEFAULT_RELAY_ENDPOINT, DEFAULT_USER_AGENT, EngineConfig, FetchConfig,
    RelayConfig,
};
pub use convert::Converter;
pub use engine::{FfmpegEngine, TranscodeEngine};
pub use error::ConvertError;
pub use events::{ConvertEvent, Progress, ProgressFn};
pub use fetch::{Fetcher, HttpFetcher};
pub use manifest::{
    AudioRendition, Manifest, ManifestKind, Resolution, VideoRendition, audio_rendition, classify,
    video_renditions,
};
pub use remux::{OUTPUT_PATH, remux, remux_args};
pub use resolve::{ManifestResolver, ResolvedMedia, ResolvedStream};
pub use select::{select_audio, select_video};
pub use stage::{AUDIO_PLAYLIST_PATH, VIDEO_PLAYLIST_PATH, stage_stream};
