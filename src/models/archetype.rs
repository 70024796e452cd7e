//! Strategy archetypes and the risk families they belong to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Family of strategy types sharing the same risk-profile assumptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchetypeFamily {
    /// Income-generating or hedged (covered calls, wheel, DCA, rebalancing)
    Income,
    /// Spreads and other defined-risk structures, pairs and arbitrage
    Spread,
    /// Directional, leveraged or event-driven plays
    Directional,
    /// Everything else, including unrecognized tags
    Default,
}

impl ArchetypeFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchetypeFamily::Income => "income",
            ArchetypeFamily::Spread => "spread",
            ArchetypeFamily::Directional => "directional",
            ArchetypeFamily::Default => "default",
        }
    }
}

/// Strategy type tag supplied by the caller.
///
/// Unrecognized tags are kept verbatim in [`StrategyArchetype::Other`] so they
/// round-trip through storage unchanged; they resolve to the default family.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StrategyArchetype {
    CoveredCalls,
    Straddle,
    IronCondor,
    Wheel,
    SpotGrid,
    FuturesGrid,
    InfinityGrid,
    SmartRebalance,
    Dca,
    Orb,
    LongCall,
    LongStraddle,
    LongCondor,
    IronButterfly,
    ShortCall,
    ShortStraddle,
    LongButterfly,
    ShortPut,
    ShortStrangle,
    ShortPutVertical,
    OptionCollar,
    ShortCallVertical,
    BrokenWingButterfly,
    MeanReversion,
    MomentumBreakout,
    PairsTrading,
    Scalping,
    SwingTrading,
    Arbitrage,
    NewsBasedTrading,
    Other(String),
}

impl StrategyArchetype {
    /// Every recognized archetype, in catalog order.
    pub const KNOWN: [StrategyArchetype; 30] = [
        StrategyArchetype::CoveredCalls,
        StrategyArchetype::Straddle,
        StrategyArchetype::IronCondor,
        StrategyArchetype::Wheel,
        StrategyArchetype::SpotGrid,
        StrategyArchetype::FuturesGrid,
        StrategyArchetype::InfinityGrid,
        StrategyArchetype::SmartRebalance,
        StrategyArchetype::Dca,
        StrategyArchetype::Orb,
        StrategyArchetype::LongCall,
        StrategyArchetype::LongStraddle,
        StrategyArchetype::LongCondor,
        StrategyArchetype::IronButterfly,
        StrategyArchetype::ShortCall,
        StrategyArchetype::ShortStraddle,
        StrategyArchetype::LongButterfly,
        StrategyArchetype::ShortPut,
        StrategyArchetype::ShortStrangle,
        StrategyArchetype::ShortPutVertical,
        StrategyArchetype::OptionCollar,
        StrategyArchetype::ShortCallVertical,
        StrategyArchetype::BrokenWingButterfly,
        StrategyArchetype::MeanReversion,
        StrategyArchetype::MomentumBreakout,
        StrategyArchetype::PairsTrading,
        StrategyArchetype::Scalping,
        StrategyArchetype::SwingTrading,
        StrategyArchetype::Arbitrage,
        StrategyArchetype::NewsBasedTrading,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            StrategyArchetype::CoveredCalls => "covered_calls",
            StrategyArchetype::Straddle => "straddle",
            StrategyArchetype::IronCondor => "iron_condor",
            StrategyArchetype::Wheel => "wheel",
            StrategyArchetype::SpotGrid => "spot_grid",
            StrategyArchetype::FuturesGrid => "futures_grid",
            StrategyArchetype::InfinityGrid => "infinity_grid",
            StrategyArchetype::SmartRebalance => "smart_rebalance",
            StrategyArchetype::Dca => "dca",
            StrategyArchetype::Orb => "orb",
            StrategyArchetype::LongCall => "long_call",
            StrategyArchetype::LongStraddle => "long_straddle",
            StrategyArchetype::LongCondor => "long_condor",
            StrategyArchetype::IronButterfly => "iron_butterfly",
            StrategyArchetype::ShortCall => "short_call",
            StrategyArchetype::ShortStraddle => "short_straddle",
            StrategyArchetype::LongButterfly => "long_butterfly",
            StrategyArchetype::ShortPut => "short_put",
            StrategyArchetype::ShortStrangle => "short_strangle",
            StrategyArchetype::ShortPutVertical => "short_put_vertical",
            StrategyArchetype::OptionCollar => "option_collar",
            StrategyArchetype::ShortCallVertical => "short_call_vertical",
            StrategyArchetype::BrokenWingButterfly => "broken_wing_butterfly",
            StrategyArchetype::MeanReversion => "mean_reversion",
            StrategyArchetype::MomentumBreakout => "momentum_breakout",
            StrategyArchetype::PairsTrading => "pairs_trading",
            StrategyArchetype::Scalping => "scalping",
            StrategyArchetype::SwingTrading => "swing_trading",
            StrategyArchetype::Arbitrage => "arbitrage",
            StrategyArchetype::NewsBasedTrading => "news_based_trading",
            StrategyArchetype::Other(tag) => tag,
        }
    }

    /// Risk family used to pick base metric ranges.
    pub fn family(&self) -> ArchetypeFamily {
        match self {
            StrategyArchetype::CoveredCalls
            | StrategyArchetype::Wheel
            | StrategyArchetype::Dca
            | StrategyArchetype::SmartRebalance => ArchetypeFamily::Income,

            StrategyArchetype::IronCondor
            | StrategyArchetype::LongButterfly
            | StrategyArchetype::BrokenWingButterfly
            | StrategyArchetype::OptionCollar
            | StrategyArchetype::PairsTrading
            | StrategyArchetype::Arbitrage => ArchetypeFamily::Spread,

            StrategyArchetype::LongCall
            | StrategyArchetype::ShortCall
            | StrategyArchetype::LongStraddle
            | StrategyArchetype::ShortStraddle
            | StrategyArchetype::Scalping
            | StrategyArchetype::NewsBasedTrading => ArchetypeFamily::Directional,

            _ => ArchetypeFamily::Default,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, StrategyArchetype::Other(_))
    }
}

impl From<&str> for StrategyArchetype {
    /// Exact match only; any other spelling is kept verbatim as `Other`.
    fn from(s: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|known| known.as_str() == s)
            .cloned()
            .unwrap_or_else(|| StrategyArchetype::Other(s.to_string()))
    }
}

impl From<String> for StrategyArchetype {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<StrategyArchetype> for String {
    fn from(archetype: StrategyArchetype) -> Self {
        match archetype {
            StrategyArchetype::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for StrategyArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
