use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
}

#[derive(Debug, Display, Error)]
pub enum ProviderError {
    #[display("request to {provider} failed")]
    Request { provider: String },
    #[display("failed to parse response from {provider}")]
    ResponseParse { provider: String },
    #[display("{provider} rejected the request with code {code}")]
    Api { provider: String, code: String },
    #[display("request to {provider} timed out")]
    Timeout { provider: String },
}

#[derive(Debug, Display, Error)]
pub enum IndicatorError {
    #[display("invalid parameter: {name}")]
    InvalidParameter { name: String },
}

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[display("invalid symbol \"{input}\"")]
    InvalidSymbol { input: String },
    #[display("market data unavailable for {symbol}")]
    DataUnavailable { symbol: String },
    #[display("insufficient history for {symbol}: need {required}, got {available}")]
    InsufficientHistory {
        symbol: String,
        required: usize,
        available: usize,
    },
}

impl AnalysisError {
    /// Short machine-friendly name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidSymbol { .. } => "invalid_symbol",
            Self::DataUnavailable { .. } => "data_unavailable",
            Self::InsufficientHistory { .. } => "insufficient_history",
        }
    }
}
