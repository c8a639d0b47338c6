//! Places spare magazines and loose items into the chest rig grid, with the
//! backpack's single designated slot as overflow.
//!
//! The backpack is an unbounded sink: nothing placed there is capacity
//! checked. Whatever fits nowhere is counted as unplaced rather than
//! reported as an error.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::Magazine;

#[derive(Debug, Clone)]
pub struct Chestrig {
    pub id: String,
    /// Remaining capacity per grid slot, in rig order.
    pub grid: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct Backpack {
    pub id: String,
    pub slot: String,
}

/// Where a placed thing ended up.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Spot {
    /// Zero-based grid index.
    Chestrig(usize),
    Backpack,
}

#[derive(Debug)]
pub struct Packed<T> {
    pub placed: Vec<(T, Spot)>,
    pub unplaced: usize,
}

impl<T> Default for Packed<T> {
    fn default() -> Self {
        Self {
            placed: Vec::new(),
            unplaced: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Containers {
    chestrig: Option<Chestrig>,
    backpack: Option<Backpack>,
}

impl Containers {
    pub fn new(chestrig: Option<Chestrig>, backpack: Option<Backpack>) -> Self {
        Self { chestrig, backpack }
    }

    pub fn grid(&self) -> &[u32] {
        self.chestrig.as_ref().map(|c| c.grid.as_slice()).unwrap_or(&[])
    }

    fn grid_mut(&mut self) -> Option<&mut Vec<u32>> {
        self.chestrig.as_mut().map(|c| &mut c.grid)
    }

    pub fn has_backpack(&self) -> bool {
        self.backpack.is_some()
    }

    /// Parent id and slot id a node at `spot` hangs from.
    pub fn location(&self, spot: Spot) -> Option<(&str, String)> {
        match spot {
            Spot::Chestrig(index) => self
                .chestrig
                .as_ref()
                .map(|c| (c.id.as_str(), (index + 1).to_string())),
            Spot::Backpack => self
                .backpack
                .as_ref()
                .map(|b| (b.id.as_str(), b.slot.clone())),
        }
    }

    /// Exact capacity match first, otherwise the first slot with room.
    pub fn free_slot(&self, size: u32) -> Option<usize> {
        let grid = self.grid();
        grid.iter()
            .position(|&cap| cap == size)
            .or_else(|| grid.iter().position(|&cap| cap >= size))
    }

    fn take(&mut self, index: usize, size: u32) {
        if let Some(cap) = self.grid_mut().and_then(|g| g.get_mut(index)) {
            *cap = cap.saturating_sub(size);
        }
    }

    /// Place one loose item: chest rig if anything fits, else the backpack.
    pub fn place_item(&mut self, size: u32) -> Option<Spot> {
        if let Some(index) = self.free_slot(size) {
            self.take(index, size);
            return Some(Spot::Chestrig(index));
        }
        self.backpack.as_ref().map(|_| Spot::Backpack)
    }

    /// Distribute `count` spare magazines drawn from `pool`.
    pub fn pack_magazines<'m, R: Rng + ?Sized>(
        &mut self,
        pool: &[&'m Magazine],
        count: u32,
        rng: &mut R,
    ) -> Packed<&'m Magazine> {
        let mut packed = Packed::default();
        let mut left = count as usize;
        if left == 0 {
            return packed;
        }
        if pool.is_empty() {
            packed.unplaced = left;
            return packed;
        }

        let small: Vec<&'m Magazine> = pool.iter().copied().filter(|m| m.slots <= 2).collect();
        let large_fits = pool
            .iter()
            .any(|m| m.slots >= 3 && self.grid().contains(&m.slots));

        if small.is_empty() && !large_fits {
            // Only bulky magazines and nowhere in the rig to take them.
            for _ in 0..left {
                if let Some(&mag) = pool.choose(rng) {
                    if self.has_backpack() {
                        packed.placed.push((mag, Spot::Backpack));
                    } else {
                        packed.unplaced += 1;
                    }
                }
            }
            return packed;
        }

        for size in [4, 3] {
            let sized: Vec<&'m Magazine> = pool.iter().copied().filter(|m| m.slots == size).collect();
            let open = self.grid().iter().filter(|&&cap| cap == size).count();
            if sized.is_empty() {
                continue;
            }
            for _ in 0..open {
                if left == 0 {
                    break;
                }
                let Some(index) = self.grid().iter().position(|&cap| cap == size) else {
                    break;
                };
                if let Some(&mag) = sized.choose(rng) {
                    // A bulky magazine takes the whole slot.
                    if let Some(cap) = self.grid_mut().and_then(|g| g.get_mut(index)) {
                        *cap = 0;
                    }
                    packed.placed.push((mag, Spot::Chestrig(index)));
                    left -= 1;
                }
            }
        }

        if !small.is_empty() {
            while left > 0 {
                left -= 1;
                let Some(&mag) = small.choose(rng) else {
                    break;
                };
                match self.free_slot(mag.slots) {
                    Some(index) => {
                        self.take(index, mag.slots);
                        packed.placed.push((mag, Spot::Chestrig(index)));
                    }
                    None => packed.unplaced += 1,
                }
            }
        }

        packed.unplaced += left;
        if packed.unplaced > 0 {
            debug!("{} spare magazines found no room", packed.unplaced);
        }
        packed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn mag(id: &str, slots: u32) -> Magazine {
        Magazine {
            id: id.to_string(),
            slots,
            cartridges: 30,
            preferred: false,
        }
    }

    fn rig(grid: &[u32]) -> Option<Chestrig> {
        Some(Chestrig {
            id: "rig".into(),
            grid: grid.to_vec(),
        })
    }

    fn pack() -> Option<Backpack> {
        Some(Backpack {
            id: "pack".into(),
            slot: "main".into(),
        })
    }

    #[test]
    fn small_items_stay_in_the_rig() {
        let mut containers = Containers::new(rig(&[4, 3, 2]), pack());
        let spots: Vec<Spot> = (0..3).filter_map(|_| containers.place_item(1)).collect();

        assert_eq!(spots.len(), 3);
        assert!(spots.iter().all(|s| matches!(s, Spot::Chestrig(_))));
        assert_eq!(containers.grid().iter().sum::<u32>(), 9 - 3);
    }

    #[test]
    fn exact_fit_is_preferred_over_first_fit() {
        let mut containers = Containers::new(rig(&[4, 2, 1]), None);
        assert_eq!(containers.place_item(1), Some(Spot::Chestrig(2)));
        assert_eq!(containers.place_item(2), Some(Spot::Chestrig(1)));
        assert_eq!(containers.place_item(2), Some(Spot::Chestrig(0)));
        assert_eq!(containers.grid(), &[2, 0, 0]);
    }

    #[test]
    fn items_overflow_into_backpack_or_drop() {
        let mut with_pack = Containers::new(rig(&[1]), pack());
        assert_eq!(with_pack.place_item(2), Some(Spot::Backpack));
        assert_eq!(
            with_pack.location(Spot::Backpack),
            Some(("pack", "main".to_string()))
        );

        let mut without = Containers::new(rig(&[1]), None);
        assert_eq!(without.place_item(2), None);
        assert_eq!(without.place_item(1), Some(Spot::Chestrig(0)));
        assert_eq!(without.location(Spot::Chestrig(0)), Some(("rig", "1".to_string())));
    }

    #[test]
    fn bulky_magazines_take_whole_slots() {
        let mut rng = StdRng::seed_from_u64(1);
        let drum = mag("drum", 4);
        let mut containers = Containers::new(rig(&[4, 4, 2]), pack());

        let packed = containers.pack_magazines(&[&drum], 3, &mut rng);

        assert_eq!(packed.placed.len(), 2);
        assert_eq!(packed.unplaced, 1);
        assert_eq!(containers.grid(), &[0, 0, 2]);
    }

    #[test]
    fn bulky_only_pool_without_matching_slot_goes_to_backpack() {
        let mut rng = StdRng::seed_from_u64(2);
        let long = mag("long", 3);
        let mut containers = Containers::new(rig(&[2, 2, 1]), pack());

        let packed = containers.pack_magazines(&[&long], 3, &mut rng);

        assert_eq!(packed.placed.len(), 3);
        assert!(packed.placed.iter().all(|(_, spot)| *spot == Spot::Backpack));
        assert_eq!(containers.grid(), &[2, 2, 1]);

        let mut no_pack = Containers::new(rig(&[2]), None);
        let packed = no_pack.pack_magazines(&[&long], 2, &mut rng);
        assert!(packed.placed.is_empty());
        assert_eq!(packed.unplaced, 2);
    }

    #[test]
    fn small_magazines_fill_leftover_space() {
        let mut rng = StdRng::seed_from_u64(3);
        let stick = mag("stick", 2);
        let mut containers = Containers::new(rig(&[3, 2, 1]), pack());

        let packed = containers.pack_magazines(&[&stick], 4, &mut rng);

        // 2 -> slot 1 exactly, then slot 0 (3 -> 1), then nothing fits.
        assert_eq!(packed.placed.len(), 2);
        assert_eq!(packed.placed[0].1, Spot::Chestrig(1));
        assert_eq!(packed.placed[1].1, Spot::Chestrig(0));
        assert_eq!(packed.unplaced, 2);
        assert_eq!(containers.grid(), &[1, 0, 1]);
    }

    #[test]
    fn mixed_pool_uses_bulky_slots_then_small_space() {
        let mut rng = StdRng::seed_from_u64(4);
        let drum = mag("drum", 4);
        let stick = mag("stick", 1);
        let mut containers = Containers::new(rig(&[4, 1, 1]), None);

        let packed = containers.pack_magazines(&[&drum, &stick], 3, &mut rng);

        assert_eq!(packed.placed.len(), 3);
        assert_eq!(packed.placed[0], (&drum, Spot::Chestrig(0)));
        assert_eq!(packed.unplaced, 0);
        assert_eq!(containers.grid(), &[0, 0, 0]);
    }

    #[test]
    fn empty_pool_places_nothing() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut containers = Containers::new(rig(&[2]), pack());
        let packed = containers.pack_magazines(&[], 2, &mut rng);
        assert!(packed.placed.is_empty());
        assert_eq!(packed.unplaced, 2);
    }
}
