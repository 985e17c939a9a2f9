use fade_core::{Bar, ConfidenceTier, Direction, Signal};
use indicators::IndicatorSet;
use plotly::common::{Line, Marker, MarkerSymbol, Mode};
use plotly::layout::{Axis, RangeSlider};
use plotly::{Bar as BarTrace, Candlestick, Layout, Plot, Scatter};

const COLOR_EMA_FAST: &str = "#f2a900";
const COLOR_EMA_SLOW: &str = "#6a4c93";
const COLOR_VWAP: &str = "#457b9d";
const COLOR_BAND: &str = "#adb5bd";
const COLOR_BB: &str = "#b197fc";
const COLOR_VOLUME: &str = "#8d99ae";
const COLOR_RSI: &str = "#2a9d8f";
const COLOR_ZSCORE: &str = "#e76f51";
const COLOR_GAP: &str = "#264653";
const COLOR_GUIDE: &str = "#ced4da";
const COLOR_LONG: &str = "#2d6a4f";
const COLOR_SHORT: &str = "#c1121f";

fn axis_stamp(bar: &Bar) -> String {
    bar.timestamp.format("%Y-%m-%d %H:%M").to_string()
}

/// Keep only the points where the series has a value, paired with their x
/// labels, so warmup gaps do not plot as zeroes.
fn line_points(x: &[String], series: &[Option<f64>]) -> (Vec<String>, Vec<f64>) {
    x.iter()
        .zip(series.iter())
        .filter_map(|(ts, v)| v.map(|v| (ts.clone(), v)))
        .unzip()
}

fn guide_line(x: &[String], level: f64, name: &str) -> Box<Scatter<String, f64>> {
    let (Some(first), Some(last)) = (x.first(), x.last()) else {
        return Scatter::new(Vec::new(), Vec::new()).name(name);
    };
    Scatter::new(vec![first.clone(), last.clone()], vec![level, level])
        .mode(Mode::Lines)
        .name(name)
        .line(Line::new().color(COLOR_GUIDE).width(1.0).dash(plotly::common::DashType::Dot))
        .show_legend(false)
}

fn marker_size(tier: ConfidenceTier) -> usize {
    match tier {
        ConfidenceTier::Tier1 => 8,
        ConfidenceTier::Tier2 => 11,
        ConfidenceTier::Tier3 => 14,
    }
}

/// Assemble the five-pane dashboard: price with overlays and signal markers,
/// then volume, RSI, Z-score, and overnight gap, all sharing one x axis.
pub fn build_dashboard(
    symbol: &str,
    bars: &[Bar],
    set: &IndicatorSet,
    signals: &[Signal],
) -> Plot {
    let x: Vec<String> = bars.iter().map(axis_stamp).collect();

    let mut plot = Plot::new();

    // Pane 1: candlesticks, EMAs, VWAP, ATR envelope
    let candles = Candlestick::new(
        x.clone(),
        bars.iter().map(|b| b.open).collect(),
        bars.iter().map(|b| b.high).collect(),
        bars.iter().map(|b| b.low).collect(),
        bars.iter().map(|b| b.close).collect(),
    )
    .name(symbol);
    plot.add_trace(Box::new(candles));

    for (series, name, color) in [
        (&set.ema_fast, "EMA 20", COLOR_EMA_FAST),
        (&set.ema_slow, "EMA 50", COLOR_EMA_SLOW),
        (&set.vwap, "VWAP", COLOR_VWAP),
    ] {
        let (lx, ly) = line_points(&x, series);
        plot.add_trace(
            Scatter::new(lx, ly)
                .mode(Mode::Lines)
                .name(name)
                .line(Line::new().color(color).width(1.2)),
        );
    }

    // ATR envelope around the close: close +/- 2 ATR
    for (sign, name) in [(1.0, "+2 ATR"), (-1.0, "-2 ATR")] {
        let band: Vec<Option<f64>> = bars
            .iter()
            .zip(set.atr.iter())
            .map(|(b, atr)| atr.map(|a| b.close + sign * 2.0 * a))
            .collect();
        let (lx, ly) = line_points(&x, &band);
        plot.add_trace(
            Scatter::new(lx, ly)
                .mode(Mode::Lines)
                .name(name)
                .line(Line::new().color(COLOR_BAND).width(0.8))
                .show_legend(false),
        );
    }

    // Bollinger envelope (20, 2)
    for (series, name) in [(&set.bb_upper, "BB Upper"), (&set.bb_lower, "BB Lower")] {
        let (lx, ly) = line_points(&x, series);
        plot.add_trace(
            Scatter::new(lx, ly)
                .mode(Mode::Lines)
                .name(name)
                .line(
                    Line::new()
                        .color(COLOR_BB)
                        .width(0.8)
                        .dash(plotly::common::DashType::Dash),
                ),
        );
    }

    // Signal markers at the entry price, sized by confidence tier
    for direction in [Direction::Long, Direction::Short] {
        let subset: Vec<&Signal> = signals.iter().filter(|s| s.direction == direction).collect();
        if subset.is_empty() {
            continue;
        }
        let sx: Vec<String> = subset
            .iter()
            .map(|s| s.timestamp.format("%Y-%m-%d %H:%M").to_string())
            .collect();
        let sy: Vec<f64> = subset.iter().map(|s| s.entry).collect();
        let sizes: Vec<usize> = subset.iter().map(|s| marker_size(s.tier)).collect();
        let text: Vec<String> = subset
            .iter()
            .map(|s| format!("{} {} - {}", s.kind.to_label(), s.direction.to_label(), s.reason))
            .collect();
        let (symbol_shape, color, name) = match direction {
            Direction::Long => (MarkerSymbol::TriangleUp, COLOR_LONG, "Long signals"),
            Direction::Short => (MarkerSymbol::TriangleDown, COLOR_SHORT, "Short signals"),
        };
        plot.add_trace(
            Scatter::new(sx, sy)
                .mode(Mode::Markers)
                .name(name)
                .text_array(text)
                .marker(
                    Marker::new()
                        .symbol(symbol_shape)
                        .color(color)
                        .size_array(sizes),
                ),
        );
    }

    // Pane 2: volume with its moving average
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
    plot.add_trace(
        BarTrace::new(x.clone(), volumes)
            .name("Volume")
            .marker(Marker::new().color(COLOR_VOLUME))
            .y_axis("y2"),
    );
    let (vx, vy) = line_points(&x, &set.volume_ma);
    plot.add_trace(
        Scatter::new(vx, vy)
            .mode(Mode::Lines)
            .name("Volume MA 20")
            .line(Line::new().color(COLOR_GAP).width(1.0))
            .y_axis("y2"),
    );

    // Pane 3: RSI with the 30/70 guides
    let (rx, ry) = line_points(&x, &set.rsi);
    plot.add_trace(
        Scatter::new(rx, ry)
            .mode(Mode::Lines)
            .name("RSI 14")
            .line(Line::new().color(COLOR_RSI).width(1.2))
            .y_axis("y3"),
    );
    plot.add_trace(guide_line(&x, 70.0, "RSI 70").y_axis("y3"));
    plot.add_trace(guide_line(&x, 30.0, "RSI 30").y_axis("y3"));

    // Pane 4: rolling Z-score with the +/-2 cutoffs
    let (zx, zy) = line_points(&x, &set.z_score);
    plot.add_trace(
        Scatter::new(zx, zy)
            .mode(Mode::Lines)
            .name("Z-score")
            .line(Line::new().color(COLOR_ZSCORE).width(1.2))
            .y_axis("y4"),
    );
    plot.add_trace(guide_line(&x, 2.0, "+2").y_axis("y4"));
    plot.add_trace(guide_line(&x, -2.0, "-2").y_axis("y4"));

    // Pane 5: overnight gap with the intraday reversal moves on top
    let (gx, gy) = line_points(&x, &set.gap_pct);
    plot.add_trace(
        BarTrace::new(gx, gy)
            .name("Gap %")
            .marker(Marker::new().color(COLOR_GAP))
            .y_axis("y5"),
    );
    for (series, name, color) in [
        (&set.morning_reversal_pct, "Morning Reversal %", COLOR_LONG),
        (&set.evening_reversal_pct, "Evening Reversal %", COLOR_SHORT),
    ] {
        let (lx, ly) = line_points(&x, series);
        plot.add_trace(
            Scatter::new(lx, ly)
                .mode(Mode::Lines)
                .name(name)
                .line(Line::new().color(color).width(1.0))
                .y_axis("y5"),
        );
    }

    let layout = Layout::new()
        .title(format!("{symbol} fade dashboard"))
        .height(1100)
        .x_axis(
            Axis::new()
                .range_slider(RangeSlider::new().visible(false))
                .anchor("y5"),
        )
        .y_axis(Axis::new().title("Price").domain(&[0.44, 1.0]))
        .y_axis2(Axis::new().title("Volume").domain(&[0.32, 0.42]))
        .y_axis3(Axis::new().title("RSI").domain(&[0.21, 0.31]))
        .y_axis4(Axis::new().title("Z").domain(&[0.10, 0.20]))
        .y_axis5(Axis::new().title("Gap %").domain(&[0.0, 0.09]));
    plot.set_layout(layout);
    plot
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use fade_core::SignalKind;
    use indicators::IndicatorConfig;

    fn sample() -> (Vec<Bar>, IndicatorSet) {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
        let bars: Vec<Bar> = (0..80)
            .map(|i| {
                let base = 100.0 + (i as f64 * 0.4).sin() * 5.0;
                Bar {
                    timestamp: start + Duration::hours(i as i64),
                    open: base,
                    high: base + 2.0,
                    low: base - 2.0,
                    close: base + 0.8,
                    volume: 1_000_000.0,
                }
            })
            .collect();
        let set = IndicatorSet::compute(&bars, &IndicatorConfig::default());
        (bars, set)
    }

    #[test]
    fn dashboard_contains_all_panes() {
        let (bars, set) = sample();
        let plot = build_dashboard("QQQ", &bars, &set, &[]);
        let html = plot.to_html();

        for name in [
            "EMA 20",
            "EMA 50",
            "VWAP",
            "BB Upper",
            "BB Lower",
            "Volume",
            "RSI 14",
            "Z-score",
            "Gap %",
            "Morning Reversal %",
            "Evening Reversal %",
        ] {
            assert!(html.contains(name), "missing trace {name}");
        }
    }

    #[test]
    fn signals_render_as_marker_traces() {
        let (bars, set) = sample();
        let signal = Signal {
            timestamp: bars[40].timestamp,
            kind: SignalKind::GapFade,
            direction: Direction::Short,
            tier: ConfidenceTier::Tier2,
            entry: bars[40].open,
            stop: bars[40].open + 4.0,
            target: bars[40].open - 8.0,
            reason: "Gap up fade (+1.40%)".into(),
            model_probability: None,
        };
        let plot = build_dashboard("QQQ", &bars, &set, &[signal]);
        let html = plot.to_html();
        assert!(html.contains("Short signals"));
        assert!(!html.contains("Long signals"));
    }

    #[test]
    fn empty_signal_list_still_builds() {
        let (bars, set) = sample();
        let plot = build_dashboard("QQQ", &bars, &set, &[]);
        assert!(!plot.to_html().is_empty());
    }
}
