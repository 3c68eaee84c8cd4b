//! Sequential segment download for one resolved branch.

use bytes::Bytes;
use tracing::debug;
use url::Url;

use crate::error::ConvertError;
use crate::events::{ConvertEvent, Progress};
use crate::fetch::Fetcher;
use crate::manifest::attribute_value;
use crate::resolve::ResolvedStream;
use crate::url_utils;

const MAP_TAG: &str = "#EXT-X-MAP:";

/// One fetched media segment, named as the playlist wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub data: Bytes,
}

/// References a media playlist makes, split into the optional
/// initialization segment and the ordered media segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentReferences {
    pub init: Option<String>,
    pub media: Vec<String>,
}

/// Scans a media playlist for everything that has to be fetched.
///
/// Any non-empty line not starting with `#` is a media segment reference,
/// kept verbatim in playlist order. The first map directive carrying a
/// `URI` attribute contributes the init reference; one without a `URI`
/// has nothing to fetch and is skipped.
pub fn segment_references(playlist: &str) -> SegmentReferences {
    let mut references = SegmentReferences::default();
    for line in playlist.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(attributes) = line.strip_prefix(MAP_TAG) {
            if references.init.is_none()
                && let Some(uri) = attribute_value(attributes, "URI")
            {
                references.init = Some(uri.to_string());
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        references.media.push(line.to_string());
    }
    references
}

/// Fetches every segment of `stream`, init segment first, in playlist
/// order. The first failed fetch aborts the whole acquisition; nothing
/// partial is returned.
pub async fn acquire(
    fetcher: &dyn Fetcher,
    stream: &ResolvedStream,
    use_proxy: bool,
    progress: &Progress,
) -> Result<Vec<Segment>, ConvertError> {
    let base = url_utils::directory_of(&stream.final_url)?;
    debug!(playlist = %stream.final_url, base = %base, "derived segment base URL");

    let references = segment_references(&stream.playlist);
    let mut segments =
        Vec::with_capacity(references.media.len() + usize::from(references.init.is_some()));

    if let Some(init) = &references.init {
        progress.emit(ConvertEvent::FetchingInitSegment { name: init.clone() });
        segments.push(fetch_segment(fetcher, &base, init, use_proxy).await?);
    }

    let total = references.media.len();
    for (index, name) in references.media.iter().enumerate() {
        progress.emit(ConvertEvent::FetchingSegment {
            name: name.clone(),
            index,
            total,
        });
        segments.push(fetch_segment(fetcher, &base, name, use_proxy).await?);
    }

    Ok(segments)
}

async fn fetch_segment(
    fetcher: &dyn Fetcher,
    base: &Url,
    name: &str,
    use_proxy: bool,
) -> Result<Segment, ConvertError> {
    let url = url_utils::resolve(name, base)?;
    let data = fetcher
        .fetch_bytes(&url, use_proxy)
        .await
        .map_err(|source| ConvertError::SegmentFetch {
            name: name.to_string(),
            url: url.to_string(),
            source: Box::new(source),
        })?;
    debug!(name = %name, size = data.len(), "fetched segment");
    Ok(Segment {
        name: name.to_string(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_keep_playlist_order_and_raw_names() {
        let playlist = "#EXTM3U\n\
#EXT-X-TARGETDURATION:6\n\
#EXTINF:6.0,\n\
video/seg1.ts\n\
#EXTINF:6.0,\n\
video/seg2.ts\n\
\n\
#EXTINF:4.2,\n\
video/seg3.ts\n\
#EXT-X-ENDLIST\n";
        let references = segment_references(playlist);
        assert_eq!(references.init, None);
        assert_eq!(
            references.media,
            vec!["video/seg1.ts", "video/seg2.ts", "video/seg3.ts"]
        );
    }

    #[test]
    fn map_directive_contributes_the_init_reference() {
        let playlist = "#EXTM3U\n\
#EXT-X-MAP:URI=\"init.mp4\"\n\
#EXTINF:6.0,\n\
seg1.m4s\n";
        let references = segment_references(playlist);
        assert_eq!(references.init.as_deref(), Some("init.mp4"));
        assert_eq!(references.media, vec!["seg1.m4s"]);
    }

    #[test]
    fn only_the_first_map_directive_counts() {
        let playlist = "#EXT-X-MAP:URI=\"first.mp4\"\n#EXT-X-MAP:URI=\"second.mp4\"\nseg.m4s\n";
        let references = segment_references(playlist);
        assert_eq!(references.init.as_deref(), Some("first.mp4"));
    }

    #[test]
    fn map_directive_without_uri_is_skipped() {
        let playlist = "#EXT-X-MAP:BYTERANGE=\"720@0\"\nseg.m4s\n";
        let references = segment_references(playlist);
        assert_eq!(references.init, None);
        assert_eq!(references.media, vec!["seg.m4s"]);
    }

    #[test]
    fn padded_segment_lines_yield_clean_names() {
        let playlist = "#EXTM3U\r\n\
#EXTINF:6.0,\r\n\
seg1.ts\r\n\
#EXTINF:6.0,\n\
  seg2.ts \t\n";
        let references = segment_references(playlist);
        assert_eq!(references.media, vec!["seg1.ts", "seg2.ts"]);
    }
}
