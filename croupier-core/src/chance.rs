use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

use crate::catalog::{CatalogEntry, Constants};
use crate::tier::Tier;

/// Resolve how many "tickets" an entry gets in the draw for `tier`.
///
/// A per-tier override keyed by item name wins, then the entry's own
/// positive weight, then 1.
pub fn resolve_chance<T: CatalogEntry>(item: &T, tier: Tier, constants: &Constants) -> f64 {
    if let Some(chance) = constants
        .chance_multiplier
        .get(&tier)
        .and_then(|overrides| overrides.get(item.name()))
    {
        return *chance;
    }
    match item.weight() {
        Some(weight) if weight > 0.0 => weight,
        _ => 1.0,
    }
}

/// Expand candidates into a frequency pool.
///
/// Each entry appears `floor(chance)` times, plus once more with probability
/// equal to the fractional part.
pub fn align_chances<'a, T, R>(
    items: &[&'a T],
    tier: Tier,
    constants: &Constants,
    rng: &mut R,
) -> Vec<&'a T>
where
    T: CatalogEntry,
    R: Rng + ?Sized,
{
    let mut pool = Vec::new();
    for &item in items {
        let chance = resolve_chance(item, tier, constants).max(0.0);
        let fraction = chance.fract();
        if fraction > 0.0 && rng.gen::<f64>() < fraction {
            pool.push(item);
        }
        for _ in 0..chance.floor() as usize {
            pool.push(item);
        }
    }
    pool
}

/// Keep entries tagged with `color`; fall back to the whole pool when none
/// match.
pub fn prefer_color<'a, T: CatalogEntry>(pool: Vec<&'a T>, color: Option<&str>) -> Vec<&'a T> {
    let Some(color) = color else {
        return pool;
    };
    let tinted: Vec<&'a T> = pool.iter().copied().filter(|item| item.has_tag(color)).collect();
    if tinted.is_empty() {
        pool
    } else {
        tinted
    }
}

/// Uniform pick; `None` on an empty pool.
pub fn select_random<'a, T, R: Rng + ?Sized>(pool: &[&'a T], rng: &mut R) -> Option<&'a T> {
    pool.choose(rng).copied()
}

/// Integer-weighted draw over a key table. Equivalent to expanding each key
/// `weight` times and picking one element uniformly.
pub fn weighted_key<'a, R: Rng + ?Sized>(
    table: &'a BTreeMap<String, u32>,
    rng: &mut R,
) -> Option<&'a str> {
    let total: u64 = table.values().map(|&w| u64::from(w)).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.gen_range(0..total);
    for (key, &weight) in table {
        let weight = u64::from(weight);
        if roll < weight {
            return Some(key);
        }
        roll -= weight;
    }
    None
}

/// One colour for the whole loadout.
pub fn pick_color<'a, R: Rng + ?Sized>(
    constants: &'a Constants,
    tier: Tier,
    rng: &mut R,
) -> Option<&'a str> {
    constants
        .colors
        .get(&tier)
        .and_then(|table| weighted_key(table, rng))
}

pub fn pick_gun_class<'a, R: Rng + ?Sized>(
    constants: &'a Constants,
    tier: Tier,
    rng: &mut R,
) -> Option<&'a str> {
    constants
        .gun_class_multiplier
        .get(&tier)
        .and_then(|table| weighted_key(table, rng))
}

/// Imperfect stockpile: the full count 40% of the time, one short 30%,
/// two short 20%, nothing 10%.
pub fn randomize_count<R: Rng + ?Sized>(max: i32, rng: &mut R) -> u32 {
    if max <= 0 {
        return 0;
    }
    let roll = rng.gen::<f64>();
    let count = if roll < 0.4 {
        max
    } else if roll < 0.7 {
        (max - 1).max(1)
    } else if roll < 0.9 {
        (max - 2).max(0)
    } else {
        0
    };
    count as u32
}
