//! Recursive descent from a root manifest URL to leaf media playlists.

use std::collections::HashSet;

use tracing::{debug, info};
use url::Url;

use crate::error::ConvertError;
use crate::events::{ConvertEvent, Progress};
use crate::fetch::Fetcher;
use crate::manifest::{self, Manifest, ManifestKind};
use crate::select;
use crate::url_utils;

/// A branch fully descended to its leaf media playlist.
#[derive(Debug, Clone)]
pub struct ResolvedStream {
    pub final_url: Url,
    /// Always a media manifest; descent does not stop on a master.
    pub playlist: String,
}

/// Outcome of resolving a root manifest URL.
#[derive(Debug, Clone)]
pub struct ResolvedMedia {
    pub video: ResolvedStream,
    pub audio: Option<ResolvedStream>,
}

/// Walks master playlists down to media playlists, selecting one video
/// rendition per hop and resolving the first alternate audio track found
/// along the way as its own branch.
pub struct ManifestResolver<'a> {
    fetcher: &'a dyn Fetcher,
    use_proxy: bool,
}

impl<'a> ManifestResolver<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, use_proxy: bool) -> Self {
        Self { fetcher, use_proxy }
    }

    pub async fn resolve(
        &self,
        root: &Url,
        progress: &Progress,
    ) -> Result<ResolvedMedia, ConvertError> {
        let (video, audio) = self.resolve_branch(root.clone(), true, progress).await?;
        Ok(ResolvedMedia { video, audio })
    }

    /// Descends one branch. `follow_audio` is set only for the video
    /// branch; audio declared by masters inside the audio branch is
    /// ignored. Revisiting a URL within one branch is a resolution loop.
    async fn resolve_branch(
        &self,
        start: Url,
        follow_audio: bool,
        progress: &Progress,
    ) -> Result<(ResolvedStream, Option<ResolvedStream>), ConvertError> {
        let mut visited: HashSet<Url> = HashSet::new();
        let mut audio = None;
        let mut url = start;

        loop {
            if !visited.insert(url.clone()) {
                return Err(ConvertError::ResolutionLoop {
                    url: url.to_string(),
                });
            }

            progress.emit(ConvertEvent::FetchingManifest {
                url: url.to_string(),
            });
            let text = self.fetcher.fetch_text(&url, self.use_proxy).await?;
            let fetched = Manifest::new(url, text);

            if fetched.kind() == ManifestKind::Media {
                debug!(url = %fetched.url, "reached media playlist");
                progress.emit(ConvertEvent::MediaPlaylistReached {
                    url: fetched.url.to_string(),
                });
                return Ok((
                    ResolvedStream {
                        final_url: fetched.url,
                        playlist: fetched.text,
                    },
                    audio,
                ));
            }

            let renditions = manifest::video_renditions(&fetched.text)?;
            let selected = select::select_video(renditions)?;
            info!(
                resolution = %selected.resolution,
                bandwidth = selected.bandwidth,
                "descending into video rendition"
            );
            progress.emit(ConvertEvent::VideoRenditionSelected {
                resolution: selected.resolution.to_string(),
                bandwidth: selected.bandwidth,
            });
            let next = url_utils::resolve(&selected.uri, &fetched.url)?;

            if follow_audio
                && audio.is_none()
                && let Some(rendition) =
                    select::select_audio(manifest::audio_rendition(&fetched.text)?)
            {
                let audio_url = url_utils::resolve(&rendition.uri, &fetched.url)?;
                progress.emit(ConvertEvent::AudioRenditionFound {
                    url: audio_url.to_string(),
                });
                let (stream, _) = Box::pin(self.resolve_branch(audio_url, false, progress)).await?;
                audio = Some(stream);
            }

            url = next;
        }
    }
}
