use crate::error::{Result, TranscriptError};

/// Format a millisecond offset as `MM:SS`, or `HH:MM:SS` once it reaches an hour.
pub fn format_millis(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Like [`format_millis`], for offsets taken straight from JSON numbers.
pub fn format_millis_f64(ms: f64) -> Result<String> {
    Ok(format_millis(millis_from_f64(ms)?))
}

pub(crate) fn millis_from_f64(ms: f64) -> Result<u64> {
    if !ms.is_finite() || ms < 0.0 {
        return Err(TranscriptError::InvalidTimestamp(ms));
    }
    Ok(ms.floor() as u64)
}
