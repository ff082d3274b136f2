use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::ResponseError;
use crate::models::{AnalysisResult, Direction, Elliott, Fibonacci, VisualIndicator};

/// Wire shape of the analysis verdict. Field names follow the service
/// contract; the optional sub-objects stay raw until validated.
#[derive(Debug, Deserialize)]
pub struct RawAnalysis {
    #[serde(rename = "direcao")]
    pub direction: Direction,
    #[serde(rename = "probabilidade")]
    pub probability: String,
    #[serde(rename = "indicador_visual")]
    pub visual_indicator: VisualIndicator,
    #[serde(rename = "analise_resumida")]
    pub summary: String,
    #[serde(default)]
    pub fibonacci: Option<Value>,
    #[serde(default)]
    pub elliott: Option<Value>,
}

impl RawAnalysis {
    /// Final schema gate: either a complete result or an error, never a
    /// partially populated one.
    pub fn validate(self) -> Result<AnalysisResult, ResponseError> {
        if self.probability.trim().is_empty() {
            return Err(ResponseError::SchemaMismatch("probability is empty".into()));
        }
        if self.summary.trim().is_empty() {
            return Err(ResponseError::SchemaMismatch("summary is empty".into()));
        }

        Ok(AnalysisResult {
            direction: self.direction,
            probability: self.probability,
            visual_indicator: self.visual_indicator,
            summary: self.summary,
            fibonacci: subsection::<Fibonacci>("fibonacci", self.fibonacci),
            elliott: subsection::<Elliott>("elliott", self.elliott),
        })
    }
}

/// Optional sub-objects must match their field set exactly; anything else is
/// treated as absent rather than half-filled.
fn subsection<T: serde::de::DeserializeOwned>(name: &str, value: Option<Value>) -> Option<T> {
    let value = value?;
    if value.is_null() {
        return None;
    }
    match serde_json::from_value::<T>(value) {
        Ok(section) => Some(section),
        Err(e) => {
            warn!("dropping {name} section, field set mismatch: {e}");
            None
        }
    }
}
