/// Failure of a conversion flow, one variant per stage that can fail.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("invalid URL `{input}`: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("request failed for {url}: {source}")]
    Network {
        url: String,
        source: reqwest::Error,
    },

    #[error("malformed manifest: {reason}")]
    MalformedManifest { reason: String },

    #[error("master playlist declares no video renditions")]
    NoRenditionsFound,

    #[error("manifest resolution revisited {url}")]
    ResolutionLoop { url: String },

    #[error("failed to fetch segment `{name}` from {url}: {source}")]
    SegmentFetch {
        name: String,
        url: String,
        source: Box<ConvertError>,
    },

    #[error("failed to stage `{path}`: {source}")]
    StageWrite {
        path: String,
        source: std::io::Error,
    },

    #[error("remux failed: {source}")]
    Remux { source: std::io::Error },

    #[error("configuration error: {reason}")]
    Configuration { reason: String },
}

impl ConvertError {
    pub fn invalid_url(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    pub fn malformed_manifest(reason: impl Into<String>) -> Self {
        Self::MalformedManifest {
            reason: reason.into(),
        }
    }

    pub fn stage_write(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::StageWrite {
            path: path.into(),
            source,
        }
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}
