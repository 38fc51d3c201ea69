// Engine main entry point: computes the chart overlay for a daily-bar CSV file
use anyhow::{bail, Context};
use engine::config::settings::IndicatorSettings;
use engine::data::csv_parser::DailyCsvParser;
use engine::indicators::signals::{
    bollinger_signals, ma_crosses, macd_crosses, rsi_signals, DEFAULT_LONG_WINDOW, DEFAULT_OVERBOUGHT,
    DEFAULT_OVERSOLD, DEFAULT_SHORT_WINDOW,
};
use engine::indicators::{DEFAULT_BAND_WINDOW, DEFAULT_NUM_STD, DEFAULT_RSI_PERIOD};
use engine::services::build_overlay;
use shared::models::BarSeries;
use shared::utils::format_price;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean JSON. Filter with RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (csv_path, settings_path) = match args.as_slice() {
        [csv] => (csv, None),
        [csv, settings] => (csv, Some(settings)),
        _ => bail!("usage: stockdash-engine <bars.csv> [settings.json]"),
    };

    let settings = match settings_path {
        Some(path) => IndicatorSettings::load_from_file(path)?,
        None => IndicatorSettings::load_default()?,
    };

    let bars = BarSeries::new(
        DailyCsvParser::load_bars_from_csv(csv_path).with_context(|| format!("loading bars from {}", csv_path))?,
    );
    info!(path = %csv_path, bars = bars.len(), "Computing indicators");

    let overlay = build_overlay(&bars, &settings)?;

    for signal in ma_crosses(&bars, DEFAULT_SHORT_WINDOW, DEFAULT_LONG_WINDOW, settings.signal_threshold)? {
        info!(
            date = %signal.date,
            kind = ?signal.kind,
            fast = %format_price(signal.fast),
            slow = %format_price(signal.slow),
            "MA cross"
        );
    }
    for signal in macd_crosses(&bars, &overlay.macd)? {
        info!(date = %signal.date, kind = ?signal.kind, dif = %format_price(signal.fast), "MACD cross");
    }
    for signal in rsi_signals(&bars, DEFAULT_RSI_PERIOD, DEFAULT_OVERSOLD, DEFAULT_OVERBOUGHT)? {
        info!(date = %signal.date, side = ?signal.side, rsi = %format_price(signal.value), "RSI level");
    }
    for signal in bollinger_signals(&bars, DEFAULT_BAND_WINDOW, DEFAULT_NUM_STD)? {
        info!(
            date = %signal.date,
            side = ?signal.side,
            close = %format_price(signal.value),
            band = %format_price(signal.level),
            "Bollinger band touch"
        );
    }

    println!("{}", serde_json::to_string_pretty(&overlay)?);
    Ok(())
}
