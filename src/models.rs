use crate::error::{FailureKind, Result, TranscriptError};
use crate::time::format_millis;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The page's embedded player configuration (`ytInitialPlayerResponse`).
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig(serde_json::Value);

impl PlayerConfig {
    /// Wrap a parsed configuration, rejecting null/false and empty objects or arrays.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        let usable = match &value {
            serde_json::Value::Null | serde_json::Value::Bool(false) => false,
            serde_json::Value::Object(map) => !map.is_empty(),
            serde_json::Value::Array(arr) => !arr.is_empty(),
            serde_json::Value::String(s) => !s.is_empty(),
            _ => true,
        };
        usable.then_some(Self(value))
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }

    /// Caption tracks under `captions.playerCaptionsTracklistRenderer.captionTracks`.
    /// Entries that are not track objects are skipped.
    pub fn caption_tracks(&self) -> Vec<CaptionTrack> {
        self.0
            .get("captions")
            .and_then(|c| c.get("playerCaptionsTracklistRenderer"))
            .and_then(|r| r.get("captionTracks"))
            .and_then(|ct| ct.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|track| serde_json::from_value(track.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn video_title(&self) -> Option<&str> {
        self.0
            .get("videoDetails")
            .and_then(|d| d.get("title"))
            .and_then(|t| t.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub vss_id: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub name: Option<TrackName>,
    #[serde(default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackName {
    #[serde(default)]
    pub simple_text: Option<String>,
    #[serde(default)]
    pub runs: Option<Vec<TextRun>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    #[serde(default)]
    pub text: String,
}

impl CaptionTrack {
    pub fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    pub fn vss_id_starts_with(&self, prefix: &str) -> bool {
        self.vss_id
            .as_deref()
            .map(|id| id.starts_with(prefix))
            .unwrap_or(false)
    }

    /// A non-empty base URL, if the track carries one.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref().filter(|u| !u.is_empty())
    }

    pub fn display_name(&self) -> Option<&str> {
        let name = self.name.as_ref()?;
        name.simple_text.as_deref().or_else(|| {
            name.runs
                .as_ref()
                .and_then(|runs| runs.first())
                .map(|r| r.text.as_str())
        })
    }
}

impl fmt::Display for CaptionTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lang = self.language_code.as_deref().unwrap_or("unknown");
        write!(f, "{} ({})", self.display_name().unwrap_or(lang), lang)?;
        if self.is_generated() {
            write!(f, " [auto-generated]")?;
        }
        Ok(())
    }
}

/// A json3 caption document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptionPayload {
    #[serde(default)]
    pub events: Option<Vec<CaptionEvent>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionEvent {
    #[serde(default)]
    pub t_start_ms: Option<f64>,
    #[serde(default)]
    pub segs: Option<Vec<Segment>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default)]
    pub utf8: String,
}

impl CaptionEvent {
    /// Segment text joined with single spaces, `None` when the event has no `segs`.
    pub fn joined_text(&self) -> Option<String> {
        self.segs.as_ref().map(|segs| {
            segs.iter()
                .map(|s| s.utf8.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptMode {
    #[default]
    Flat,
    Timed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub start_ms: u64,
    pub text: String,
}

impl fmt::Display for TranscriptLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", format_millis(self.start_ms), self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcript {
    Flat(String),
    Timed(Vec<TranscriptLine>),
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transcript::Flat(text) => f.write_str(text),
            Transcript::Timed(lines) => {
                for (i, line) in lines.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "{}", line)?;
                }
                Ok(())
            }
        }
    }
}

/// Success-or-failure reply handed across the caller boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
}

impl TranscriptReply {
    pub fn from_result(result: Result<String>) -> Self {
        match result {
            Ok(transcript) => Self {
                success: true,
                transcript: Some(transcript),
                error: None,
                kind: None,
            },
            Err(e) => Self::failure(&e),
        }
    }

    pub fn failure(error: &TranscriptError) -> Self {
        Self {
            success: false,
            transcript: None,
            error: Some(error.to_string()),
            kind: Some(error.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_player_config_rejects_empty() {
        assert!(PlayerConfig::from_value(json!(null)).is_none());
        assert!(PlayerConfig::from_value(json!(false)).is_none());
        assert!(PlayerConfig::from_value(json!({})).is_none());
        assert!(PlayerConfig::from_value(json!({"captions": {}})).is_some());
    }

    #[test]
    fn test_caption_tracks_from_config() {
        let config = PlayerConfig::from_value(json!({
            "captions": {
                "playerCaptionsTracklistRenderer": {
                    "captionTracks": [
                        {
                            "baseUrl": "https://example.com/a",
                            "vssId": ".en",
                            "languageCode": "en",
                            "name": {"simpleText": "English"}
                        },
                        "not a track",
                        {
                            "baseUrl": "https://example.com/b",
                            "vssId": "a.es",
                            "languageCode": "es",
                            "name": {"runs": [{"text": "Spanish (auto-generated)"}]},
                            "kind": "asr"
                        }
                    ]
                }
            },
            "videoDetails": {"title": "A video"}
        }))
        .unwrap();

        let tracks = config.caption_tracks();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].display_name(), Some("English"));
        assert!(!tracks[0].is_generated());
        assert_eq!(tracks[1].display_name(), Some("Spanish (auto-generated)"));
        assert!(tracks[1].is_generated());
        assert_eq!(config.video_title(), Some("A video"));
    }

    #[test]
    fn test_caption_tracks_missing_renderer() {
        let config = PlayerConfig::from_value(json!({"captions": {}})).unwrap();
        assert!(config.caption_tracks().is_empty());
    }

    #[test]
    fn test_track_display() {
        let track = CaptionTrack {
            language_code: Some("en".to_string()),
            kind: Some("asr".to_string()),
            ..Default::default()
        };
        assert_eq!(track.to_string(), "en (en) [auto-generated]");
    }

    #[test]
    fn test_timed_transcript_display() {
        let transcript = Transcript::Timed(vec![
            TranscriptLine {
                start_ms: 0,
                text: "Hello".to_string(),
            },
            TranscriptLine {
                start_ms: 5000,
                text: "World".to_string(),
            },
        ]);
        assert_eq!(transcript.to_string(), "[00:00] Hello\n[00:05] World");
    }

    #[test]
    fn test_reply_serialization() {
        let ok = TranscriptReply::from_result(Ok("Hello".to_string()));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"success": true, "transcript": "Hello"})
        );

        let failed = TranscriptReply::from_result(Err(TranscriptError::EmptyTranscript));
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["kind"], json!("empty_transcript"));
        assert!(value.get("transcript").is_none());
    }
}
