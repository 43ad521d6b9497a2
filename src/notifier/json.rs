use error_stack::Report;
use serde_json::{Value, json};

use crate::error::AnalysisError;
use crate::model::SignalResult;
use crate::notifier::Notifier;

/// Writes one JSON document per line to stdout.
pub struct JsonNotifier;

impl Notifier for JsonNotifier {
    fn notify(&self, result: &SignalResult) {
        match serde_json::to_string(result) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::error!(error = %e, symbol = %result.symbol, "failed to encode result"),
        }
    }

    fn notify_failure(&self, input: &str, report: &Report<AnalysisError>) {
        tracing::warn!(symbol = input, error = ?report, "analysis failed");
        println!("{}", failure_document(input, report.current_context()));
    }
}

fn failure_document(input: &str, error: &AnalysisError) -> Value {
    json!({
        "symbol": input.trim(),
        "error": error.kind(),
        "message": error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IndicatorSet, Signal, Trend};

    #[test]
    fn result_serializes_with_camel_case_fields() {
        let result = SignalResult {
            symbol: "ARBUSDT".into(),
            price: 1.25,
            entry: 1.24625,
            take_profit: 1.279899,
            stop_loss: 1.202631,
            trend: Trend::Down,
            strong_trend: false,
            indicators: IndicatorSet {
                atr: 0.0125,
                ema_short: 1.24,
                ema_long: 1.26,
                rsi: 61.5,
            },
            signal: Signal::Wait,
            confidence: 55.0,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["takeProfit"], 1.279899);
        assert_eq!(value["stopLoss"], 1.202631);
        assert_eq!(value["strongTrend"], false);
        assert_eq!(value["indicators"]["emaShort"], 1.24);
        assert_eq!(value["signal"], "WAIT");
        assert_eq!(value["trend"], "DOWN");
    }

    #[test]
    fn failure_document_carries_kind() {
        let doc = failure_document(
            " xyz ",
            &AnalysisError::DataUnavailable {
                symbol: "XYZUSDT".into(),
            },
        );
        assert_eq!(doc["symbol"], "xyz");
        assert_eq!(doc["error"], "data_unavailable");
        assert_eq!(doc["message"], "market data unavailable for XYZUSDT");
    }
}
