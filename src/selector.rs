use crate::error::{Result, TranscriptError};
use crate::models::CaptionTrack;
use tracing::debug;

/// Which rule picked the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStep {
    /// Human-authored track in the preferred language (`.<lang>`).
    PreferredLanguage,
    /// Any human-authored track (`.`).
    AnyHumanAuthored,
    /// Auto-generated track in the preferred language (`a.<lang>`).
    AutoGenerated,
    /// First track in the list.
    FirstAvailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackSelection {
    pub url: String,
    pub needs_translation_param: bool,
    pub step: SelectionStep,
    pub track: CaptionTrack,
}

impl TrackSelection {
    /// The json3 fetch URL, with `tlang` added when the track needs translating.
    pub fn fetch_url(&self, preferred_lang: &str) -> String {
        let tlang = self.needs_translation_param.then_some(preferred_lang);
        build_fetch_url(&self.url, tlang)
    }
}

pub fn build_fetch_url(base_url: &str, tlang: Option<&str>) -> String {
    let base = base_url.replace("&fmt=srv3", "");
    match tlang {
        Some(lang) => format!("{}&fmt=json3&tlang={}", base, lang),
        None => format!("{}&fmt=json3", base),
    }
}

pub struct CaptionTrackSelector;

impl CaptionTrackSelector {
    pub fn select(tracks: &[CaptionTrack], preferred_lang: &str) -> Result<TrackSelection> {
        if tracks.is_empty() {
            return Err(TranscriptError::NoCaptionTrack(
                "the video has no caption tracks".to_string(),
            ));
        }

        let find = |prefix: &str| {
            tracks
                .iter()
                .find(|t| t.vss_id_starts_with(prefix) && t.base_url().is_some())
        };

        let exact = format!(".{}", preferred_lang);
        let auto = format!("a.{}", preferred_lang);

        if let Some(track) = find(&exact) {
            return Ok(Self::selection(track, SelectionStep::PreferredLanguage, false));
        }

        debug!(
            "No exact match for {} ({}). Trying fallbacks.",
            preferred_lang, exact
        );

        let auto_match = find(&auto);

        if let Some(track) = find(".") {
            return Ok(Self::selection(
                track,
                SelectionStep::AnyHumanAuthored,
                auto_match.is_none(),
            ));
        }

        if let Some(track) = auto_match {
            return Ok(Self::selection(track, SelectionStep::AutoGenerated, false));
        }

        // Step 3 did not match, so no auto-generated track in the preferred language exists.
        match tracks.first().filter(|t| t.base_url().is_some()) {
            Some(track) => Ok(Self::selection(track, SelectionStep::FirstAvailable, true)),
            None => Err(TranscriptError::NoCaptionTrack(
                "no caption track has a usable base URL".to_string(),
            )),
        }
    }

    fn selection(track: &CaptionTrack, step: SelectionStep, needs_tlang: bool) -> TrackSelection {
        TrackSelection {
            url: track.base_url().unwrap_or_default().to_string(),
            needs_translation_param: needs_tlang,
            step,
            track: track.clone(),
        }
    }
}
