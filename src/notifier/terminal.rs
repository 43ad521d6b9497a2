use error_stack::Report;

use crate::error::AnalysisError;
use crate::model::{SignalResult, Trend};
use crate::notifier::Notifier;

pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, result: &SignalResult) {
        println!("{}", render_result(result));
    }

    fn notify_failure(&self, input: &str, report: &Report<AnalysisError>) {
        tracing::warn!(symbol = input, error = ?report, "analysis failed");
        println!("{}", render_failure(input, report.current_context()));
    }
}

pub fn render_result(result: &SignalResult) -> String {
    let trend = match result.trend {
        Trend::Up => "UP (rising)",
        Trend::Down => "DOWN (falling)",
    };

    format!(
        "{symbol} analysis\n\
         \n\
         Price: {price}\n\
         Entry: {entry}\n\
         TP (+2.7%): {tp}\n\
         SL (-3.5%): {sl}\n\
         \n\
         Trend: {trend}\n\
         Strong trend: {strong}\n\
         RSI14: {rsi}\n\
         ATR: {atr}\n\
         EMA7 / EMA25: {ema_short} / {ema_long}\n\
         \n\
         Signal: {signal}\n\
         Confidence: {confidence}%",
        symbol = result.symbol,
        price = result.price,
        entry = result.entry,
        tp = result.take_profit,
        sl = result.stop_loss,
        strong = if result.strong_trend { "yes" } else { "no" },
        rsi = result.indicators.rsi,
        atr = result.indicators.atr,
        ema_short = result.indicators.ema_short,
        ema_long = result.indicators.ema_long,
        signal = result.signal,
        confidence = result.confidence,
    )
}

pub fn render_failure(input: &str, error: &AnalysisError) -> String {
    let hint = match error {
        AnalysisError::InvalidSymbol { .. } => "Check the symbol, e.g. SOLUSDT or ARB.",
        AnalysisError::DataUnavailable { .. } => "Market data could not be fetched, try again.",
        AnalysisError::InsufficientHistory { .. } => "Not enough candle history for this market.",
    };
    format!("Analysis failed for {}: {error}\n{hint}", input.trim())
}
