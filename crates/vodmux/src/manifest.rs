//! Line-oriented `.m3u8` manifest parsing.
//!
//! Only the subset of the format the conversion flow needs is interpreted:
//! master/media classification, stream-info renditions, and the first
//! alternate audio track. Segment references are scanned by the acquirer;
//! everything else in a playlist passes through untouched.

use std::fmt;

use url::Url;

use crate::error::ConvertError;

/// Marker whose presence anywhere in a manifest makes it a master playlist.
const STREAM_INF_MARKER: &str = "#EXT-X-STREAM-INF";
const STREAM_INF_TAG: &str = "#EXT-X-STREAM-INF:";
const MEDIA_TAG: &str = "#EXT-X-MEDIA:";

/// One fetched `.m3u8` document and the URL it came from.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub url: Url,
    pub text: String,
}

impl Manifest {
    pub fn new(url: Url, text: String) -> Self {
        Self { url, text }
    }

    pub fn kind(&self) -> ManifestKind {
        classify(&self.text)
    }
}

/// Whether a manifest lists renditions (master) or segments (media).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    Master,
    Media,
}

/// Video frame size advertised by a rendition. Dimensions beyond `u32`
/// do not parse and surface as a malformed manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Sentinel for renditions that advertise no resolution; ranks below
    /// every real one.
    pub const UNKNOWN: Resolution = Resolution {
        width: 1,
        height: 1,
    };

    /// Pixel count, widened so the product of two `u32` dimensions cannot
    /// overflow.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Video entry of a master playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRendition {
    pub resolution: Resolution,
    pub bandwidth: u64,
    /// Reference as written, relative to the declaring manifest's URL.
    pub uri: String,
}

/// Alternate audio entry of a master playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioRendition {
    pub uri: String,
}

/// A manifest is a master playlist iff it advertises stream renditions.
pub fn classify(text: &str) -> ManifestKind {
    if text.contains(STREAM_INF_MARKER) {
        ManifestKind::Master
    } else {
        ManifestKind::Media
    }
}

/// Extracts every video rendition of a master playlist, in file order.
///
/// Bandwidth prefers `AVERAGE-BANDWIDTH` over `BANDWIDTH` when both are
/// present; a stream-info line with neither, or with an unparsable
/// attribute, is malformed. The rendition URI is the next non-empty line
/// after the stream-info line.
pub fn video_renditions(text: &str) -> Result<Vec<VideoRendition>, ConvertError> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut renditions = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let Some(attributes) = line.strip_prefix(STREAM_INF_TAG) else {
            continue;
        };

        let bandwidth_value = attribute_value(attributes, "AVERAGE-BANDWIDTH")
            .or_else(|| attribute_value(attributes, "BANDWIDTH"))
            .ok_or_else(|| {
                ConvertError::malformed_manifest("stream-info line without a bandwidth attribute")
            })?;
        let bandwidth = bandwidth_value.parse::<u64>().map_err(|_| {
            ConvertError::malformed_manifest(format!("unparsable bandwidth `{bandwidth_value}`"))
        })?;

        let resolution = match attribute_value(attributes, "RESOLUTION") {
            Some(value) => parse_resolution(value).ok_or_else(|| {
                ConvertError::malformed_manifest(format!("unparsable resolution `{value}`"))
            })?,
            None => Resolution::UNKNOWN,
        };

        let uri = lines[index + 1..]
            .iter()
            .find(|candidate| !candidate.is_empty())
            .filter(|candidate| !candidate.starts_with('#'))
            .ok_or_else(|| {
                ConvertError::malformed_manifest("stream-info line without a following URI line")
            })?;

        renditions.push(VideoRendition {
            resolution,
            bandwidth,
            uri: (*uri).to_string(),
        });
    }

    Ok(renditions)
}

/// Finds the first declared alternate audio track of a master playlist.
pub fn audio_rendition(text: &str) -> Result<Option<AudioRendition>, ConvertError> {
    for line in text.lines() {
        let Some(attributes) = line.trim().strip_prefix(MEDIA_TAG) else {
            continue;
        };
        if attribute_value(attributes, "TYPE") != Some("AUDIO") {
            continue;
        }
        let uri = attribute_value(attributes, "URI").ok_or_else(|| {
            ConvertError::malformed_manifest("alternate audio line without a URI attribute")
        })?;
        return Ok(Some(AudioRendition {
            uri: uri.to_string(),
        }));
    }
    Ok(None)
}

/// Looks up one attribute in an `ATTR=VALUE,...` list, unquoting the value.
pub(crate) fn attribute_value<'a>(attributes: &'a str, name: &str) -> Option<&'a str> {
    for part in split_attributes(attributes) {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        if !key.trim().eq_ignore_ascii_case(name) {
            continue;
        }
        let value = value.trim();
        return Some(
            value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value),
        );
    }
    None
}

/// Splits an attribute list on commas, keeping quoted values intact.
fn split_attributes(attributes: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = Vec::new();
    let mut in_quotes = false;
    let mut start = 0usize;
    for (idx, ch) in attributes.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(attributes[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    if start < attributes.len() {
        parts.push(attributes[start..].trim());
    }
    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

fn parse_resolution(value: &str) -> Option<Resolution> {
    let (width, height) = value.split_once(['x', 'X'])?;
    Some(Resolution {
        width: width.trim().parse().ok()?,
        height: height.trim().parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "#EXTM3U\n\
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"aud\",NAME=\"English\",DEFAULT=YES,URI=\"audio/en.m3u8\"\n\
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"aud\",NAME=\"French\",URI=\"audio/fr.m3u8\"\n\
#EXT-X-STREAM-INF:BANDWIDTH=5000000,AVERAGE-BANDWIDTH=4500000,RESOLUTION=1920x1080,CODECS=\"avc1.64001f,mp4a.40.2\"\n\
1080p/video.m3u8\n\
#EXT-X-STREAM-INF:BANDWIDTH=2500000,RESOLUTION=1280x720\n\
720p/video.m3u8\n";

    const MEDIA: &str = "#EXTM3U\n\
#EXT-X-TARGETDURATION:6\n\
#EXTINF:6.0,\n\
seg1.ts\n\
#EXTINF:6.0,\n\
seg2.ts\n";

    #[test]
    fn classify_detects_master_and_media() {
        assert_eq!(classify(MASTER), ManifestKind::Master);
        assert_eq!(classify(MEDIA), ManifestKind::Media);
        assert_eq!(classify(""), ManifestKind::Media);
    }

    #[test]
    fn manifest_kind_reflects_text() {
        let url = Url::parse("https://host/master.m3u8").unwrap();
        let manifest = Manifest::new(url, MASTER.to_string());
        assert_eq!(manifest.kind(), ManifestKind::Master);
    }

    #[test]
    fn extracts_renditions_in_file_order() {
        let renditions = video_renditions(MASTER).unwrap();
        assert_eq!(renditions.len(), 2);
        assert_eq!(renditions[0].uri, "1080p/video.m3u8");
        assert_eq!(
            renditions[0].resolution,
            Resolution {
                width: 1920,
                height: 1080
            }
        );
        assert_eq!(renditions[1].uri, "720p/video.m3u8");
        assert_eq!(renditions[1].bandwidth, 2500000);
    }

    #[test]
    fn average_bandwidth_is_preferred_over_plain() {
        let renditions = video_renditions(MASTER).unwrap();
        assert_eq!(renditions[0].bandwidth, 4500000);
    }

    #[test]
    fn quoted_codec_list_does_not_break_attribute_scanning() {
        let line = "BANDWIDTH=1000,CODECS=\"avc1.64001f,mp4a.40.2\",RESOLUTION=640x360";
        assert_eq!(attribute_value(line, "BANDWIDTH"), Some("1000"));
        assert_eq!(attribute_value(line, "CODECS"), Some("avc1.64001f,mp4a.40.2"));
        assert_eq!(attribute_value(line, "RESOLUTION"), Some("640x360"));
    }

    #[test]
    fn missing_resolution_defaults_to_sentinel() {
        let master = "#EXT-X-STREAM-INF:BANDWIDTH=64000\naudio-only.m3u8\n";
        let renditions = video_renditions(master).unwrap();
        assert_eq!(renditions[0].resolution, Resolution::UNKNOWN);
        assert_eq!(renditions[0].resolution.area(), 1);
    }

    #[test]
    fn missing_bandwidth_is_malformed() {
        let master = "#EXT-X-STREAM-INF:RESOLUTION=1920x1080\nvideo.m3u8\n";
        let err = video_renditions(master).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedManifest { .. }));
    }

    #[test]
    fn unparsable_resolution_is_malformed() {
        let master = "#EXT-X-STREAM-INF:BANDWIDTH=1000,RESOLUTION=wide\nvideo.m3u8\n";
        let err = video_renditions(master).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedManifest { .. }));
    }

    #[test]
    fn resolution_beyond_u32_range_is_malformed() {
        let master = "#EXTM3U\n\
#EXT-X-STREAM-INF:BANDWIDTH=1000,RESOLUTION=4294967296x4294967296\n\
huge.m3u8\n\
#EXT-X-STREAM-INF:BANDWIDTH=2000,RESOLUTION=1920x1080\n\
1080p.m3u8\n";
        let err = video_renditions(master).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedManifest { .. }));
    }

    #[test]
    fn uri_line_skips_blank_lines() {
        let master = "#EXT-X-STREAM-INF:BANDWIDTH=1000\n\n  \nvideo.m3u8\n";
        let renditions = video_renditions(master).unwrap();
        assert_eq!(renditions[0].uri, "video.m3u8");
    }

    #[test]
    fn stream_info_without_uri_line_is_malformed() {
        let master = "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1000\n";
        let err = video_renditions(master).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedManifest { .. }));
    }

    #[test]
    fn directive_in_place_of_uri_line_is_malformed() {
        let master = "#EXT-X-STREAM-INF:BANDWIDTH=1000\n#EXT-X-STREAM-INF:BANDWIDTH=2000\n";
        let err = video_renditions(master).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedManifest { .. }));
    }

    #[test]
    fn first_declared_audio_track_wins() {
        let audio = audio_rendition(MASTER).unwrap().unwrap();
        assert_eq!(audio.uri, "audio/en.m3u8");
    }

    #[test]
    fn no_audio_track_returns_none() {
        assert!(audio_rendition(MEDIA).unwrap().is_none());
    }

    #[test]
    fn subtitle_tracks_are_not_audio() {
        let master = "#EXT-X-MEDIA:TYPE=SUBTITLES,URI=\"subs/en.m3u8\"\n\
#EXT-X-MEDIA:TYPE=AUDIO,URI=\"audio/en.m3u8\"\n\
#EXT-X-STREAM-INF:BANDWIDTH=1000\nvideo.m3u8\n";
        let audio = audio_rendition(master).unwrap().unwrap();
        assert_eq!(audio.uri, "audio/en.m3u8");
    }

    #[test]
    fn audio_track_without_uri_is_malformed() {
        let master = "#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"aud\"\n";
        let err = audio_rendition(master).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedManifest { .. }));
    }
}
