//! Locating the player configuration embedded in a watch page.
//!
//! The page does not embed the configuration in a contractually stable way, so
//! several extraction strategies are tried in order and the first one that
//! yields a usable object wins.

use crate::error::{Result, TranscriptError};
use crate::models::PlayerConfig;
use scraper::{Html, Selector};
use std::ops::Range;
use std::sync::Arc;
use tracing::debug;

/// Text immediately preceding the configuration object in the page source.
pub const SPLIT_MARKER: &str = "ytInitialPlayerResponse = ";
/// Statement that follows the configuration assignment in the page source.
pub const STATEMENT_TERMINATOR: &str = ";var";
/// Assignment literal identifying the script element that carries the configuration.
pub const SCRIPT_ASSIGNMENT: &str = "var ytInitialPlayerResponse = {";

/// One way of pulling the configuration out of page markup.
pub trait ConfigStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, markup: &str) -> Option<serde_json::Value>;
}

/// Access to a configuration object the runtime already parsed, e.g. one read
/// from a live document instead of from markup.
pub trait AmbientConfig: Send + Sync {
    fn player_config(&self) -> Option<serde_json::Value>;
}

impl<F> AmbientConfig for F
where
    F: Fn() -> Option<serde_json::Value> + Send + Sync,
{
    fn player_config(&self) -> Option<serde_json::Value> {
        self()
    }
}

/// Split the markup on [`SPLIT_MARKER`] and parse up to the next [`STATEMENT_TERMINATOR`].
pub struct SplitMarker;

impl ConfigStrategy for SplitMarker {
    fn name(&self) -> &'static str {
        "split-marker"
    }

    fn extract(&self, markup: &str) -> Option<serde_json::Value> {
        let (_, rest) = markup.split_once(SPLIT_MARKER)?;
        let candidate = rest
            .split_once(STATEMENT_TERMINATOR)
            .map(|(json, _)| json)
            .unwrap_or(rest);

        if candidate.is_empty() {
            return None;
        }

        serde_json::from_str(candidate)
            .map_err(|e| debug!("split-marker candidate is not valid JSON: {}", e))
            .ok()
    }
}

/// Find the script element containing [`SCRIPT_ASSIGNMENT`] and cut the object out of it.
pub struct ScriptTagScan;

impl ScriptTagScan {
    /// Byte range of the configuration object inside a serialized script element.
    ///
    /// The closing boundary is the first of: `;</script>`, the last `;` before
    /// `</script>`, or one past the last `}` before the script ends.
    fn object_span(script: &str) -> Option<Range<usize>> {
        let assignment = script.find(SCRIPT_ASSIGNMENT)?;
        let start = assignment + script[assignment..].find('{')?;
        let body = &script[start..];

        let script_end = body.find("</script>").unwrap_or(body.len());

        let candidates = [
            body.find(";</script>"),
            body[..script_end].rfind(';'),
            body[..script_end].rfind('}').map(|i| i + 1),
        ];

        candidates
            .into_iter()
            .flatten()
            .find(|&end| end > 0)
            .map(|end| start..start + end)
    }
}

impl ConfigStrategy for ScriptTagScan {
    fn name(&self) -> &'static str {
        "script-tag"
    }

    fn extract(&self, markup: &str) -> Option<serde_json::Value> {
        let document = Html::parse_document(markup);
        let selector = Selector::parse("script").ok()?;

        let script = document
            .select(&selector)
            .map(|element| element.html())
            .find(|html| html.contains(SCRIPT_ASSIGNMENT))?;

        let Some(span) = Self::object_span(&script) else {
            debug!("could not determine JSON boundaries inside script tag");
            return None;
        };

        serde_json::from_str(&script[span])
            .map_err(|e| debug!("script-tag candidate is not valid JSON: {}", e))
            .ok()
    }
}

/// Use a configuration the runtime already exposes, ignoring the markup.
pub struct AmbientGlobal(pub Arc<dyn AmbientConfig>);

impl ConfigStrategy for AmbientGlobal {
    fn name(&self) -> &'static str {
        "ambient-global"
    }

    fn extract(&self, _markup: &str) -> Option<serde_json::Value> {
        self.0.player_config()
    }
}

pub struct EmbeddedConfigLocator {
    strategies: Vec<Box<dyn ConfigStrategy>>,
}

impl Default for EmbeddedConfigLocator {
    fn default() -> Self {
        Self::new(None)
    }
}

impl EmbeddedConfigLocator {
    pub fn new(ambient: Option<Arc<dyn AmbientConfig>>) -> Self {
        let mut strategies: Vec<Box<dyn ConfigStrategy>> =
            vec![Box::new(SplitMarker), Box::new(ScriptTagScan)];
        if let Some(ambient) = ambient {
            strategies.push(Box::new(AmbientGlobal(ambient)));
        }
        Self { strategies }
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ConfigStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn locate(&self, markup: &str) -> Result<PlayerConfig> {
        for strategy in &self.strategies {
            match strategy.extract(markup).and_then(PlayerConfig::from_value) {
                Some(config) => {
                    debug!("located player configuration via {}", strategy.name());
                    return Ok(config);
                }
                None => debug!("strategy {} found no usable configuration", strategy.name()),
            }
        }
        Err(TranscriptError::ConfigNotFound)
    }
}
