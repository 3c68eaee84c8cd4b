//! Rendition ranking and selection.

use std::cmp::Reverse;

use tracing::debug;

use crate::error::ConvertError;
use crate::manifest::{AudioRendition, VideoRendition};

/// Picks the best video rendition: largest resolution area first, higher
/// bandwidth breaking ties. The sort is stable, so fully tied renditions
/// keep their declaration order and the first declared one wins.
pub fn select_video(mut renditions: Vec<VideoRendition>) -> Result<VideoRendition, ConvertError> {
    if renditions.is_empty() {
        return Err(ConvertError::NoRenditionsFound);
    }
    renditions.sort_by_key(|r| Reverse((r.resolution.area(), r.bandwidth)));
    let selected = renditions.swap_remove(0);
    debug!(
        resolution = %selected.resolution,
        bandwidth = selected.bandwidth,
        uri = %selected.uri,
        "selected video rendition"
    );
    Ok(selected)
}

/// Audio selection is pass-through: the first declared track, if any.
pub fn select_audio(audio: Option<AudioRendition>) -> Option<AudioRendition> {
    audio
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Resolution;

    fn rendition(width: u32, height: u32, bandwidth: u64, uri: &str) -> VideoRendition {
        VideoRendition {
            resolution: Resolution { width, height },
            bandwidth,
            uri: uri.to_string(),
        }
    }

    #[test]
    fn largest_area_wins_regardless_of_input_order() {
        let hd = rendition(1920, 1080, 2_000_000, "1080p.m3u8");
        let sd = rendition(1280, 720, 5_000_000, "720p.m3u8");

        let first = select_video(vec![hd.clone(), sd.clone()]).unwrap();
        let second = select_video(vec![sd, hd.clone()]).unwrap();
        assert_eq!(first, hd);
        assert_eq!(second, hd);
    }

    #[test]
    fn bandwidth_breaks_area_ties() {
        let low = rendition(1280, 720, 2_500_000, "low.m3u8");
        let high = rendition(1280, 720, 4_000_000, "high.m3u8");

        let selected = select_video(vec![low, high.clone()]).unwrap();
        assert_eq!(selected, high);
    }

    #[test]
    fn full_ties_keep_declaration_order() {
        let first = rendition(1280, 720, 3_000_000, "first.m3u8");
        let second = rendition(1280, 720, 3_000_000, "second.m3u8");

        let selected = select_video(vec![first.clone(), second]).unwrap();
        assert_eq!(selected, first);
    }

    #[test]
    fn extreme_dimensions_rank_without_overflowing() {
        let huge = rendition(u32::MAX, u32::MAX, 1_000, "huge.m3u8");
        let hd = rendition(1920, 1080, 9_000_000, "1080p.m3u8");

        let selected = select_video(vec![hd, huge.clone()]).unwrap();
        assert_eq!(selected, huge);
    }

    #[test]
    fn unknown_resolution_ranks_below_real_ones() {
        let unknown = VideoRendition {
            resolution: Resolution::UNKNOWN,
            bandwidth: 9_000_000,
            uri: "unknown.m3u8".to_string(),
        };
        let real = rendition(640, 360, 500_000, "360p.m3u8");

        let selected = select_video(vec![unknown, real.clone()]).unwrap();
        assert_eq!(selected, real);
    }

    #[test]
    fn empty_rendition_list_is_a_distinct_error() {
        let err = select_video(Vec::new()).unwrap_err();
        assert!(matches!(err, ConvertError::NoRenditionsFound));
    }

    #[test]
    fn audio_selection_is_pass_through() {
        let track = AudioRendition {
            uri: "audio.m3u8".to_string(),
        };
        assert_eq!(select_audio(Some(track.clone())), Some(track));
        assert_eq!(select_audio(None), None);
    }
}
