use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CroupierError, Result};

/// Gear quality band. Catalog files and constant tables are keyed by the
/// lowercase name.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Mid,
    Top,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Low, Tier::Mid, Tier::Top];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::Mid => "mid",
            Tier::Top => "top",
        }
    }

    /// Outcome weights used when re-rolling a category tier. Walked in this
    /// order, so the first entry is also the most likely one.
    fn reroll_odds(self) -> [(Tier, f64); 3] {
        match self {
            Tier::Low => [(Tier::Low, 93.0), (Tier::Mid, 6.0), (Tier::Top, 1.0)],
            Tier::Mid => [(Tier::Mid, 92.0), (Tier::Low, 6.0), (Tier::Top, 2.0)],
            Tier::Top => [(Tier::Top, 92.0), (Tier::Mid, 6.0), (Tier::Low, 2.0)],
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = CroupierError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Tier::Low),
            "mid" => Ok(Tier::Mid),
            "top" => Ok(Tier::Top),
            _ => Err(CroupierError::InvalidTier(s.to_string())),
        }
    }
}

impl TryFrom<u8> for Tier {
    type Error = CroupierError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Tier::Low),
            1 => Ok(Tier::Mid),
            2 => Ok(Tier::Top),
            _ => Err(CroupierError::InvalidTier(code.to_string())),
        }
    }
}

/// Re-roll the effective tier of one gear category.
///
/// Draws uniformly from [0, 100) and returns the first outcome whose
/// cumulative weight exceeds the draw. The last outcome catches rounding.
pub fn randomize_tier<R: Rng + ?Sized>(tier: Tier, rng: &mut R) -> Tier {
    let odds = tier.reroll_odds();
    let roll = rng.gen::<f64>() * 100.0;
    let mut cumulative = 0.0;
    for (outcome, weight) in odds {
        cumulative += weight;
        if roll < cumulative {
            return outcome;
        }
    }
    odds[odds.len() - 1].0
}

/// One loadout order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub tier: Tier,
    pub needs_gun: bool,
}

impl Request {
    pub fn new(tier: Tier, needs_gun: bool) -> Self {
        Self { tier, needs_gun }
    }

    /// Resolve the trader's container offer that was bought into the loadout
    /// it stands for.
    pub fn from_offer_id(offer_id: &str) -> Result<Self> {
        TRADER_OFFERS
            .iter()
            .find(|offer| offer.id == offer_id)
            .map(|offer| offer.request)
            .ok_or_else(|| CroupierError::UnknownOffer(offer_id.to_string()))
    }
}

#[derive(Copy, Clone, Debug)]
pub struct TraderOffer {
    pub id: &'static str,
    pub request: Request,
}

pub const TRADER_OFFERS: &[TraderOffer] = &[
    TraderOffer {
        id: "676e7094c10d4e01865d8112",
        request: Request { tier: Tier::Low, needs_gun: false },
    },
    TraderOffer {
        id: "676e6e7c2e39b0c7ab1e7109",
        request: Request { tier: Tier::Low, needs_gun: true },
    },
    TraderOffer {
        id: "676e6ebec1ad34f0d56e6fce",
        request: Request { tier: Tier::Mid, needs_gun: false },
    },
    TraderOffer {
        id: "676e6e8180f50661c07bb6ec",
        request: Request { tier: Tier::Mid, needs_gun: true },
    },
    TraderOffer {
        id: "676e6eaac5568a5d867b4b5d",
        request: Request { tier: Tier::Top, needs_gun: false },
    },
    TraderOffer {
        id: "676e70994154237666a572d7",
        request: Request { tier: Tier::Top, needs_gun: true },
    },
];
