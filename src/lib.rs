pub mod config;
mod error;
pub mod fetcher;
pub mod locator;
pub mod models;
pub mod normalizer;
pub mod page_text;
pub mod selector;
pub mod time;

pub use config::ExtractorConfig;
pub use error::{FailureKind, Result, TranscriptError};
pub use fetcher::{CaptionPayloadFetcher, HttpClient, HttpResponse, ReqwestClient};
pub use locator::{AmbientConfig, EmbeddedConfigLocator};
pub use models::{
    CaptionEvent, CaptionPayload, CaptionTrack, PlayerConfig, Segment, Transcript,
    TranscriptLine, TranscriptMode, TranscriptReply,
};
pub use normalizer::{clean_text, TranscriptNormalizer};
pub use selector::{CaptionTrackSelector, SelectionStep, TrackSelection};
pub use time::format_millis;

use regex::Regex;
use std::future::Future;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info};

const WATCH_URL: &str = "https://www.youtube.com/watch?v={video_id}";

static WATCH_PAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)youtube\.com/watch").expect("valid watch page regex"));

/// Where the watch page comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    /// Fetch the page from this URL.
    Url(String),
    /// Page markup the caller already has.
    Markup(String),
}

impl PageSource {
    /// Build a source for a video ID or any supported YouTube URL.
    pub fn video(url_or_id: &str) -> Result<Self> {
        let video_id = extract_video_id(url_or_id)?;
        Ok(PageSource::Url(watch_url(&video_id)))
    }
}

pub fn watch_url(video_id: &str) -> String {
    WATCH_URL.replace("{video_id}", video_id)
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == 11
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Extract video ID from YouTube URL
pub fn extract_video_id(url_or_id: &str) -> Result<String> {
    let input = url_or_id.trim();

    if is_video_id(input) {
        return Ok(input.to_string());
    }

    let invalid = || {
        TranscriptError::InvalidVideoId(format!(
            "{} (YouTube video IDs must be 11 characters, or a valid YouTube URL)",
            url_or_id
        ))
    };

    // Accept URLs with or without protocol
    let url_str = if input.starts_with("http://") || input.starts_with("https://") {
        input.to_string()
    } else if input.contains("youtube.com") || input.contains("youtu.be") {
        format!("https://{}", input)
    } else {
        return Err(invalid());
    };

    let url = url::Url::parse(&url_str).map_err(|_| invalid())?;
    let host = url.host_str().unwrap_or_default();
    if !(host.contains("youtube.com") || host.contains("youtu.be")) {
        return Err(invalid());
    }

    // Standard watch URL: ?v=VIDEO_ID
    if let Some((_, id)) = url.query_pairs().find(|(k, _)| k == "v") {
        if is_video_id(&id) {
            return Ok(id.into_owned());
        }
    }

    let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();
    let candidate = match (host, segments.as_slice()) {
        // Short URL: youtu.be/VIDEO_ID
        ("youtu.be", [id, ..]) => Some(*id),
        // Embed URL: youtube.com/embed/VIDEO_ID
        (_, ["embed", id, ..]) => Some(*id),
        _ => None,
    };

    candidate
        .filter(|id| is_video_id(id))
        .map(|id| id.to_string())
        .ok_or_else(invalid)
}

/// Turns a watch page into a flat or timestamped transcript.
pub struct TranscriptExtractor {
    fetcher: CaptionPayloadFetcher,
    locator: EmbeddedConfigLocator,
    config: ExtractorConfig,
}

impl TranscriptExtractor {
    pub fn new() -> Result<Self> {
        Self::with_config(ExtractorConfig::default())
    }

    pub fn with_config(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        let client = ReqwestClient::new(&config)?;
        Ok(Self::with_client(Arc::new(client), config))
    }

    /// Use a custom network layer.
    pub fn with_client(client: Arc<dyn HttpClient>, config: ExtractorConfig) -> Self {
        Self {
            fetcher: CaptionPayloadFetcher::new(client),
            locator: EmbeddedConfigLocator::default(),
            config,
        }
    }

    /// Fall back to an already-parsed configuration when the markup yields none.
    pub fn with_ambient_config(mut self, ambient: Arc<dyn AmbientConfig>) -> Self {
        self.locator = EmbeddedConfigLocator::new(Some(ambient));
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Plain transcript text in (or translated to) `preferred_lang`.
    pub async fn get_transcript(&self, page: &PageSource, preferred_lang: &str) -> Result<String> {
        self.extract(page, preferred_lang, TranscriptMode::Flat)
            .await
            .map(|t| t.to_string())
    }

    /// `[MM:SS] text` lines in (or translated to) `preferred_lang`.
    pub async fn get_timestamped_transcript(
        &self,
        page: &PageSource,
        preferred_lang: &str,
    ) -> Result<String> {
        self.extract(page, preferred_lang, TranscriptMode::Timed)
            .await
            .map(|t| t.to_string())
    }

    pub async fn extract(
        &self,
        page: &PageSource,
        preferred_lang: &str,
        mode: TranscriptMode,
    ) -> Result<Transcript> {
        config::validate_language(preferred_lang)?;
        info!(
            "Attempting to get {:?} transcript for language: {}",
            mode, preferred_lang
        );
        self.with_deadline(self.run(page, preferred_lang, mode)).await
    }

    /// Caption tracks the page advertises.
    pub async fn list_tracks(&self, page: &PageSource) -> Result<Vec<CaptionTrack>> {
        self.with_deadline(async {
            let player_config = self.load_player_config(page).await?;
            Ok::<_, TranscriptError>(player_config.caption_tracks())
        })
        .await
    }

    /// Readable body text of any page, for pages without captions.
    pub async fn page_text(&self, page: &PageSource) -> Result<String> {
        self.with_deadline(async {
            let markup = match page {
                PageSource::Url(url) => self.fetcher.fetch_page(url).await?,
                PageSource::Markup(markup) => markup.clone(),
            };
            page_text::page_text(&markup)
        })
        .await
    }

    async fn run(
        &self,
        page: &PageSource,
        preferred_lang: &str,
        mode: TranscriptMode,
    ) -> Result<Transcript> {
        let player_config = self.load_player_config(page).await?;

        let tracks = player_config.caption_tracks();
        if tracks.is_empty() {
            info!("No caption tracks found in player configuration");
        } else {
            debug!("Found {} caption tracks", tracks.len());
        }

        let selection = CaptionTrackSelector::select(&tracks, preferred_lang)?;
        let fetch_url = selection.fetch_url(preferred_lang);
        info!(
            "Selected track: {}{} via {:?}, URL: {}",
            selection
                .track
                .display_name()
                .or(selection.track.language_code.as_deref())
                .unwrap_or("Unknown"),
            if selection.track.is_generated() {
                " (auto-generated)"
            } else {
                ""
            },
            selection.step,
            fetch_url
        );

        let payload = self.fetcher.fetch(&fetch_url).await?;
        let transcript = TranscriptNormalizer::normalize(&payload, mode)?;
        info!("Transcript extracted and cleaned successfully");
        Ok(transcript)
    }

    async fn load_player_config(&self, page: &PageSource) -> Result<PlayerConfig> {
        let markup = match page {
            PageSource::Url(url) => {
                if !WATCH_PAGE.is_match(url) {
                    return Err(TranscriptError::NotAVideoPage(url.clone()));
                }
                self.fetcher.fetch_page(url).await?
            }
            PageSource::Markup(markup) => markup.clone(),
        };
        self.locator.locate(&markup)
    }

    /// Run `fut` under the configured deadline; on expiry it is dropped unfinished.
    async fn with_deadline<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        let deadline = Duration::from_secs(self.config.timeout_secs);
        tokio::time::timeout(deadline, fut)
            .await
            .map_err(|_| TranscriptError::Timeout(deadline))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id_direct() {
        assert_eq!(extract_video_id("dQw4w9WgXcQ").unwrap(), "dQw4w9WgXcQ");
        assert_eq!(extract_video_id("  dQw4w9WgXcQ ").unwrap(), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_extract_video_id_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_video_id("youtube.com/watch?v=dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_extract_video_id_short_url_with_query() {
        assert_eq!(
            extract_video_id("https://youtu.be/_NuH3D4SN-c?si=VSFea_rMwtaiR8Q7").unwrap(),
            "_NuH3D4SN-c"
        );
    }

    #[test]
    fn test_extract_video_id_embed_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_extract_video_id_invalid() {
        assert!(extract_video_id("not-a-valid-id").is_err());
        assert!(extract_video_id("https://example.com/watch?v=dQw4w9WgXcQ").is_err());
        assert!(extract_video_id("https://www.youtube.com/watch?v=short").is_err());
    }

    #[test]
    fn test_page_source_video() {
        assert_eq!(
            PageSource::video("https://youtu.be/dQw4w9WgXcQ").unwrap(),
            PageSource::Url("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string())
        );
    }
}
