use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36";

/// Relay endpoint used when no override is configured.
pub const DEFAULT_RELAY_ENDPOINT: &str = "https://api.fsh.plus/file";

/// HTTP client options for manifest and segment fetching.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Connection timeout (time to establish initial connection)
    pub connect_timeout: Duration,

    /// Read timeout (maximum time between receiving data chunks)
    pub read_timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// Relay service fetches are routed through when proxying is enabled.
///
/// The relay answers `GET <endpoint>?url=<url-encoded target>` with the
/// target's body unchanged.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Endpoint without a query string; the `url` parameter is appended.
    pub endpoint: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_RELAY_ENDPOINT.to_owned(),
        }
    }
}

/// Options for one conversion flow.
#[derive(Debug, Clone, Default)]
pub struct ConvertConfig {
    pub fetch: FetchConfig,

    pub relay: RelayConfig,

    /// Route every fetch through the relay endpoint.
    pub use_proxy: bool,
}

/// Transcoding engine options.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path to the ffmpeg binary.
    pub ffmpeg_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
        }
    }
}
