use crate::error::{Result, TranscriptError};
use crate::models::{CaptionPayload, Transcript, TranscriptLine, TranscriptMode};
use crate::time::millis_from_f64;
use regex::Regex;
use std::sync::LazyLock;

// Music notes, quotes, runs of periods, <tags>, {annotations} and [annotations].
static NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)♪|['"‘’“”]|\.{2,}|<.*?>|\{.*?\}|\[.*?\]"#).expect("valid noise regex")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Strip caption noise from `text` and collapse whitespace.
///
/// Removal is repeated until nothing matches, so cleaning a cleaned string is a no-op.
pub fn clean_text(text: &str) -> String {
    let mut current = text.replace('\n', " ");
    loop {
        let stripped = NOISE.replace_all(&current, "");
        if stripped == current {
            break;
        }
        current = stripped.into_owned();
    }
    WHITESPACE.replace_all(&current, " ").trim().to_string()
}

pub struct TranscriptNormalizer;

impl TranscriptNormalizer {
    pub fn normalize(payload: &CaptionPayload, mode: TranscriptMode) -> Result<Transcript> {
        let events = payload
            .events
            .as_ref()
            .ok_or(TranscriptError::EmptyTranscript)?;

        match mode {
            TranscriptMode::Flat => {
                let joined = events
                    .iter()
                    .map(|event| event.joined_text().unwrap_or_default())
                    .collect::<Vec<_>>()
                    .join(" ");
                Ok(Transcript::Flat(clean_text(&joined)))
            }
            TranscriptMode::Timed => {
                let mut lines = Vec::new();
                for event in events {
                    let (Some(start), Some(text)) = (event.t_start_ms, event.joined_text()) else {
                        continue;
                    };
                    let text = clean_text(&text);
                    if text.is_empty() {
                        continue;
                    }
                    lines.push(TranscriptLine {
                        start_ms: millis_from_f64(start)?,
                        text,
                    });
                }

                if lines.is_empty() {
                    return Err(TranscriptError::EmptyTranscript);
                }
                Ok(Transcript::Timed(lines))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> CaptionPayload {
        serde_json::from_str(json).unwrap()
    }

    const HELLO_WORLD: &str = r#"{"events":[
        {"tStartMs":0,"segs":[{"utf8":"Hello"}]},
        {"tStartMs":5000,"segs":[{"utf8":"World <i>loud</i>"}]}
    ]}"#;

    #[test]
    fn test_clean_text_rules() {
        assert_eq!(clean_text("♪ la la ♪"), "la la");
        assert_eq!(clean_text("it's \"quoted\" ‘so’ “very”"), "its quoted so very");
        assert_eq!(clean_text("wait... what.."), "wait what");
        assert_eq!(clean_text("one. two."), "one. two.");
        assert_eq!(clean_text("[Music] hi {\\an8} <b>there</b>"), "hi there");
        assert_eq!(clean_text("line one\nline two\n"), "line one line two");
        assert_eq!(clean_text("  lots \t of   space "), "lots of space");
        assert_eq!(clean_text("[multi\nline]kept"), "kept");
    }

    #[test]
    fn test_clean_text_idempotent() {
        let samples = [
            "a.<i>.b",
            "[Applause] ♪ We're   <c>no</c> strangers... to love",
            "{x}.{y}.",
            "plain text",
        ];
        for sample in samples {
            let once = clean_text(sample);
            assert_eq!(clean_text(&once), once, "not idempotent for {:?}", sample);
        }
        assert_eq!(clean_text("a.<i>.b"), "ab");
    }

    #[test]
    fn test_timed_mode() {
        let transcript =
            TranscriptNormalizer::normalize(&payload(HELLO_WORLD), TranscriptMode::Timed).unwrap();
        assert_eq!(transcript.to_string(), "[00:00] Hello\n[00:05] World");
    }

    #[test]
    fn test_flat_mode() {
        let transcript =
            TranscriptNormalizer::normalize(&payload(HELLO_WORLD), TranscriptMode::Flat).unwrap();
        assert_eq!(transcript, Transcript::Flat("Hello World".to_string()));
    }

    #[test]
    fn test_segments_joined_with_space() {
        let p = payload(r#"{"events":[{"tStartMs":1000,"segs":[{"utf8":"a"},{"utf8":"b"}]}]}"#);
        assert_eq!(
            TranscriptNormalizer::normalize(&p, TranscriptMode::Timed)
                .unwrap()
                .to_string(),
            "[00:01] a b"
        );
    }

    #[test]
    fn test_timed_without_segs_is_empty() {
        let p = payload(r#"{"events":[{"tStartMs":0}]}"#);
        assert!(matches!(
            TranscriptNormalizer::normalize(&p, TranscriptMode::Timed),
            Err(TranscriptError::EmptyTranscript)
        ));
    }

    #[test]
    fn test_timed_discards_empty_and_untimed_events() {
        let p = payload(
            r#"{"events":[
                {"tStartMs":0,"segs":[{"utf8":"[Music]"}]},
                {"segs":[{"utf8":"no time"}]},
                {"tStartMs":3723000,"segs":[{"utf8":"late\nline"}]},
                {"tStartMs":2000,"segs":[{"utf8":"earlier"}]}
            ]}"#,
        );
        let transcript = TranscriptNormalizer::normalize(&p, TranscriptMode::Timed).unwrap();
        assert_eq!(
            transcript.to_string(),
            "[01:02:03] late line\n[00:02] earlier"
        );
    }

    #[test]
    fn test_timed_rejects_negative_start() {
        let p = payload(r#"{"events":[{"tStartMs":-5,"segs":[{"utf8":"x"}]}]}"#);
        assert!(matches!(
            TranscriptNormalizer::normalize(&p, TranscriptMode::Timed),
            Err(TranscriptError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_flat_without_events_fails() {
        let p = payload(r#"{}"#);
        assert!(matches!(
            TranscriptNormalizer::normalize(&p, TranscriptMode::Flat),
            Err(TranscriptError::EmptyTranscript)
        ));
    }

    #[test]
    fn test_flat_with_no_text_is_empty_string() {
        let p = payload(r#"{"events":[{"tStartMs":0},{"segs":[{"utf8":"♪♪"}]}]}"#);
        assert_eq!(
            TranscriptNormalizer::normalize(&p, TranscriptMode::Flat).unwrap(),
            Transcript::Flat(String::new())
        );
    }

    #[test]
    fn test_flat_cleans_across_events() {
        // A bracket opened in one event and closed in the next is removed as one span.
        let p = payload(
            r#"{"events":[{"segs":[{"utf8":"keep [drop"}]},{"segs":[{"utf8":"this] too"}]}]}"#,
        );
        assert_eq!(
            TranscriptNormalizer::normalize(&p, TranscriptMode::Flat).unwrap(),
            Transcript::Flat("keep too".to_string())
        );
    }
}
