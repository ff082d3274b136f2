use serde::{Deserialize, Serialize};

/// Trading bias returned by the analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "COMPRA")]
    Buy,
    #[serde(rename = "VENDA")]
    Sell,
    #[serde(rename = "INDEFINIDO")]
    Undefined,
}

/// UI-facing arrow state. The service reports this separately from
/// `Direction`; renderers must never re-derive one from the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualIndicator {
    #[serde(rename = "SETA_VERDE_CIMA")]
    UpArrow,
    #[serde(rename = "SETA_VERMELHA_BAIXO")]
    DownArrow,
    #[serde(rename = "NEUTRO")]
    Neutral,
}

impl VisualIndicator {
    pub fn glyph(&self) -> &'static str {
        match self {
            VisualIndicator::UpArrow => "▲",
            VisualIndicator::DownArrow => "▼",
            VisualIndicator::Neutral => "●",
        }
    }

    /// Verdict caption shown next to the glyph. Driven by the indicator
    /// alone, by contract.
    pub fn caption(&self) -> &'static str {
        match self {
            VisualIndicator::UpArrow => "BUY",
            VisualIndicator::DownArrow => "SELL",
            VisualIndicator::Neutral => "UNDEFINED",
        }
    }
}

/// Fibonacci retracement reading. All four fields or the section is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fibonacci {
    #[serde(rename = "nivel_atual")]
    pub current_level: String,
    #[serde(rename = "suporte_chave")]
    pub key_support: String,
    #[serde(rename = "resistencia_chave")]
    pub key_resistance: String,
    #[serde(rename = "projecao")]
    pub projection: String,
}

/// Elliott wave reading. All four fields or the section is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Elliott {
    #[serde(rename = "padrao_atual")]
    pub current_pattern: String,
    #[serde(rename = "onda_atual")]
    pub current_wave: String,
    #[serde(rename = "fase")]
    pub phase: String,
    #[serde(rename = "proximo_movimento")]
    pub next_move: String,
}

/// Validated verdict for one analyzed chart image. Produced exactly once per
/// completed analysis; never partially populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub direction: Direction,
    pub probability: String,
    pub visual_indicator: VisualIndicator,
    pub summary: String,
    pub fibonacci: Option<Fibonacci>,
    pub elliott: Option<Elliott>,
}
