use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

/// Root configuration, extracted once per run from the process environment.
///
/// Platform sections are optional: a section that is present enables the
/// corresponding publisher, an absent section disables it.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub generator: GeneratorConfig,
    pub content: ContentConfig,
    pub drive: DriveConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub youtube: Option<YouTubeConfig>,
    #[serde(default)]
    pub facebook: Option<FacebookConfig>,
    #[serde(default)]
    pub instagram: Option<InstagramConfig>,
    #[serde(default)]
    pub threads: Option<ThreadsConfig>,
    #[serde(default)]
    pub run: RunConfig,
}

/// Text-generation service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// API key for the generation service.
    pub api_key: String,
    /// Model identifier (e.g. "gemini-1.5-flash").
    pub model: String,
    /// API base URL override.
    #[serde(default = "default_generator_api_base")]
    pub api_base: String,
    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

fn default_generator_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

/// Content steering parameters fed into quote generation.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    /// Candidate tone adjectives, comma-delimited in the environment.
    #[serde(deserialize_with = "csv_list")]
    pub adjectives: Vec<String>,
    /// Candidate themes, comma-delimited in the environment.
    #[serde(deserialize_with = "csv_list")]
    pub themes: Vec<String>,
    /// Target language tag (e.g. "en", "fr").
    pub language: String,
}

/// Shared-drive asset source configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveConfig {
    /// Service-account credentials as a JSON string.
    pub service_account_json: String,
    /// Link to (or raw id of) the shared folder holding the assets.
    pub folder_link: String,
    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

/// Object-store configuration for the archive uploader.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub access_key: String,
    pub secret_key: String,
    /// Bucket region/zone identifier.
    pub region: String,
    pub bucket: String,
    /// Custom endpoint for S3-compatible stores.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Public base URL under which uploaded objects are reachable.
    /// URL-based publishers require this to locate the video remotely.
    #[serde(default)]
    pub public_url: Option<String>,
}

/// YouTube publishing configuration (direct upload protocol).
#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    /// Numeric YouTube category ("People & Blogs" by default).
    #[serde(default = "default_youtube_category")]
    pub category_id: u32,
    #[serde(default = "default_youtube_privacy")]
    pub privacy_status: String,
}

fn default_youtube_category() -> u32 {
    22
}

fn default_youtube_privacy() -> String {
    "public".to_string()
}

/// Facebook page publishing configuration (chunked upload session protocol).
#[derive(Debug, Clone, Deserialize)]
pub struct FacebookConfig {
    #[serde(default = "default_graph_version")]
    pub api_version: String,
    pub page_id: String,
    pub page_token: String,
}

/// Instagram publishing configuration (URL-based remote-fetch protocol).
#[derive(Debug, Clone, Deserialize)]
pub struct InstagramConfig {
    #[serde(default = "default_graph_version")]
    pub api_version: String,
    pub user_id: String,
    pub access_token: String,
}

/// Threads publishing configuration (URL-based remote-fetch protocol).
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadsConfig {
    #[serde(default = "default_threads_version")]
    pub api_version: String,
    pub user_id: String,
    pub access_token: String,
}

fn default_graph_version() -> String {
    "v19.0".to_string()
}

fn default_threads_version() -> String {
    "v1.0".to_string()
}

/// Run-level parameters of the pipeline itself.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Working directory holding the inter-stage files.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    /// Exact duration of the composed video, independent of track length.
    #[serde(default = "default_video_duration")]
    pub video_duration_secs: u64,
    /// Inclusive lower bound of the audio track number range.
    #[serde(default = "default_track_min")]
    pub track_min: u32,
    /// Inclusive upper bound of the audio track number range.
    #[serde(default = "default_track_max")]
    pub track_max: u32,
    /// Object name the composed video is archived under.
    #[serde(default = "default_archive_object")]
    pub archive_object: String,
    /// Maximum attempts for retryable external-collaborator failures.
    #[serde(default = "default_retry_attempts")]
    pub retry_max_attempts: u32,
    /// Base delay for exponential backoff between attempts.
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            video_duration_secs: default_video_duration(),
            track_min: default_track_min(),
            track_max: default_track_max(),
            archive_object: default_archive_object(),
            retry_max_attempts: default_retry_attempts(),
            retry_base_delay_ms: default_retry_base_delay(),
        }
    }
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_video_duration() -> u64 {
    55
}

fn default_track_min() -> u32 {
    101
}

fn default_track_max() -> u32 {
    113
}

fn default_archive_object() -> String {
    "output_video_tn.mp4".to_string()
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_base_delay() -> u64 {
    1000
}

/// Deserialize a comma-delimited string into a list, trimming whitespace
/// and dropping empty segments.
fn csv_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct CsvHolder {
        #[serde(deserialize_with = "csv_list")]
        values: Vec<String>,
    }

    #[test]
    fn test_csv_list_splits_and_trims() {
        let holder: CsvHolder =
            serde_json::from_str(r#"{"values": "calm, bold ,quiet"}"#).unwrap();
        assert_eq!(holder.values, vec!["calm", "bold", "quiet"]);
    }

    #[test]
    fn test_csv_list_drops_empty_segments() {
        let holder: CsvHolder = serde_json::from_str(r#"{"values": "hope,,"}"#).unwrap();
        assert_eq!(holder.values, vec!["hope"]);
    }

    #[test]
    fn test_run_config_defaults() {
        let run = RunConfig::default();
        assert_eq!(run.video_duration_secs, 55);
        assert_eq!(run.track_min, 101);
        assert_eq!(run.track_max, 113);
        assert_eq!(run.archive_object, "output_video_tn.mp4");
        assert_eq!(run.retry_max_attempts, 3);
    }
}
