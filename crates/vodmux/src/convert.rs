//! Top-level conversion flow.

use std::sync::Arc;

use bytes::Bytes;
use tracing::info;

use crate::acquire;
use crate::config::ConvertConfig;
use crate::engine::TranscodeEngine;
use crate::error::ConvertError;
use crate::events::{ConvertEvent, Progress};
use crate::fetch::Fetcher;
use crate::remux;
use crate::resolve::ManifestResolver;
use crate::stage::{self, AUDIO_PLAYLIST_PATH, VIDEO_PLAYLIST_PATH};
use crate::url_utils;

/// One-shot HLS to MP4 converter.
///
/// Each call to [`Converter::convert`] resolves, downloads, stages and
/// remuxes a single manifest URL, sequentially and without retries; the
/// first failure aborts the whole request.
pub struct Converter {
    fetcher: Arc<dyn Fetcher>,
    engine: Arc<dyn TranscodeEngine>,
    config: ConvertConfig,
    progress: Progress,
}

impl Converter {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        engine: Arc<dyn TranscodeEngine>,
        config: ConvertConfig,
    ) -> Self {
        Self {
            fetcher,
            engine,
            config,
            progress: Progress::default(),
        }
    }

    /// Installs a progress callback for subsequent conversions.
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Converts the manifest at `url` into a playable MP4 and returns its
    /// bytes.
    pub async fn convert(&self, url: &str) -> Result<Bytes, ConvertError> {
        let root = url_utils::parse(url)?;
        info!(url = %root, use_proxy = self.config.use_proxy, "starting conversion");

        let resolver = ManifestResolver::new(self.fetcher.as_ref(), self.config.use_proxy);
        let media = resolver.resolve(&root, &self.progress).await?;

        let video_segments = acquire::acquire(
            self.fetcher.as_ref(),
            &media.video,
            self.config.use_proxy,
            &self.progress,
        )
        .await?;
        let audio_segments = match &media.audio {
            Some(stream) => Some(
                acquire::acquire(
                    self.fetcher.as_ref(),
                    stream,
                    self.config.use_proxy,
                    &self.progress,
                )
                .await?,
            ),
            None => None,
        };

        stage::stage_stream(
            self.engine.as_ref(),
            &video_segments,
            &media.video.playlist,
            VIDEO_PLAYLIST_PATH,
            &self.progress,
        )
        .await?;
        if let (Some(stream), Some(segments)) = (&media.audio, &audio_segments) {
            stage::stage_stream(
                self.engine.as_ref(),
                segments,
                &stream.playlist,
                AUDIO_PLAYLIST_PATH,
                &self.progress,
            )
            .await?;
        }

        let output =
            remux::remux(self.engine.as_ref(), media.audio.is_some(), &self.progress).await?;
        info!(size = output.len(), "conversion finished");
        self.progress.emit(ConvertEvent::Completed {
            output_size: output.len(),
        });
        Ok(output)
    }
}
