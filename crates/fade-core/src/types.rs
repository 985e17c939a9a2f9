use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Trade direction for an emitted signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn to_label(&self) -> &'static str {
        match self {
            Direction::Long => "Buy",
            Direction::Short => "Sell",
        }
    }
}

/// Which rule produced a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    MeanReversion,
    GapFade,
    ExtremeFade,
    MorningReversal,
    EveningReversal,
}

impl SignalKind {
    pub const ALL: [SignalKind; 5] = [
        SignalKind::MeanReversion,
        SignalKind::GapFade,
        SignalKind::ExtremeFade,
        SignalKind::MorningReversal,
        SignalKind::EveningReversal,
    ];

    pub fn to_label(&self) -> &'static str {
        match self {
            SignalKind::MeanReversion => "Mean Reversion",
            SignalKind::GapFade => "Gap Fade",
            SignalKind::ExtremeFade => "Extreme Fade",
            SignalKind::MorningReversal => "Morning Reversal",
            SignalKind::EveningReversal => "Evening Reversal",
        }
    }
}

/// Confidence tier, ordered from weakest to strongest.
///
/// Assigned from the threshold-excess ratio of the rule that fired: the
/// further past its thresholds a setup is, the higher the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfidenceTier {
    Tier1,
    Tier2,
    Tier3,
}

impl ConfidenceTier {
    /// Map a threshold-excess ratio (observed / threshold, >= 1.0 when the
    /// rule fired) to a tier. Boundaries are fixed constants.
    pub fn from_excess(ratio: f64) -> Self {
        if ratio >= 1.5 {
            ConfidenceTier::Tier3
        } else if ratio >= 1.2 {
            ConfidenceTier::Tier2
        } else {
            ConfidenceTier::Tier1
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            ConfidenceTier::Tier1 => "Tier 1",
            ConfidenceTier::Tier2 => "Tier 2",
            ConfidenceTier::Tier3 => "Tier 3",
        }
    }
}

/// A trade signal generated from one bar + indicator snapshot.
/// Immutable once emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub timestamp: DateTime<Utc>,
    pub kind: SignalKind,
    pub direction: Direction,
    pub tier: ConfidenceTier,
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
    pub reason: String,
    /// Probability of a favorable next-bar move, filled by the predictor
    /// when the prediction step is enabled.
    #[serde(default)]
    pub model_probability: Option<f64>,
}

/// Bar interval requested from the quote API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    Minute5,
    Minute15,
    Hour1,
    Day1,
}

impl Timeframe {
    /// (multiplier, timespan) pair for the aggregates endpoint
    pub fn to_query(&self) -> (u32, &'static str) {
        match self {
            Timeframe::Minute5 => (5, "minute"),
            Timeframe::Minute15 => (15, "minute"),
            Timeframe::Hour1 => (1, "hour"),
            Timeframe::Day1 => (1, "day"),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "5m" => Some(Timeframe::Minute5),
            "15m" => Some(Timeframe::Minute15),
            "1h" => Some(Timeframe::Hour1),
            "1d" => Some(Timeframe::Day1),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(ConfidenceTier::from_excess(1.0), ConfidenceTier::Tier1);
        assert_eq!(ConfidenceTier::from_excess(1.19), ConfidenceTier::Tier1);
        assert_eq!(ConfidenceTier::from_excess(1.2), ConfidenceTier::Tier2);
        assert_eq!(ConfidenceTier::from_excess(1.5), ConfidenceTier::Tier3);
        assert_eq!(ConfidenceTier::from_excess(4.0), ConfidenceTier::Tier3);
    }

    #[test]
    fn tier_monotonic_in_excess() {
        let mut prev = ConfidenceTier::from_excess(1.0);
        let mut ratio = 1.0;
        while ratio < 3.0 {
            let tier = ConfidenceTier::from_excess(ratio);
            assert!(tier >= prev, "tier dropped at excess ratio {ratio}");
            prev = tier;
            ratio += 0.01;
        }
    }

    #[test]
    fn timeframe_parse_roundtrip() {
        assert_eq!(Timeframe::parse("1d"), Some(Timeframe::Day1));
        assert_eq!(Timeframe::parse("1h"), Some(Timeframe::Hour1));
        assert_eq!(Timeframe::parse("2w"), None);
        assert_eq!(Timeframe::Day1.to_query(), (1, "day"));
    }
}
