//! Primary weapon and side arm: preset attachments, a loaded magazine,
//! spare magazines in the rig and a loose ammo stack.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::{for_tier, Magazine, TierMap, WeaponItem};
use crate::chance::{align_chances, pick_gun_class, randomize_count, select_random};
use crate::node::{Upd, SLOT_CARTRIDGES, SLOT_MAGAZINE};
use crate::packer::Containers;
use crate::roulette::{Roulette, Stowable};
use crate::tier::{randomize_tier, Tier};

impl<'a, R: Rng + ?Sized> Roulette<'a, R> {
    pub(crate) fn arm(
        &mut self,
        tier: Tier,
        parent: &str,
        containers: &mut Containers,
        stash: &mut Vec<Stowable<'a>>,
    ) {
        let catalog = self.catalog;
        let gun_tier = randomize_tier(tier, &mut *self.rng);

        let Some(gun) = self.pick_gun(&catalog.guns, gun_tier) else {
            debug!("no {gun_tier} gun available");
            return;
        };
        if !self.fit_weapon(gun, parent, containers, stash) {
            return;
        }

        // One level only: the side arm's own flag is ignored.
        if gun.needs_side_weapon {
            match self.pick_gun(&catalog.side_guns, gun_tier) {
                Some(side) => {
                    self.fit_weapon(side, parent, containers, stash);
                }
                None => debug!("{} wants a side arm but none is available", gun.gear.name),
            }
        }
    }

    fn pick_gun(&mut self, guns: &'a TierMap<WeaponItem>, tier: Tier) -> Option<&'a WeaponItem> {
        let catalog = self.catalog;
        let class = pick_gun_class(&catalog.constants, tier, &mut *self.rng);
        let candidates = self.valid.retain_entries(for_tier(guns, tier));

        let of_class: Vec<&'a WeaponItem> = match class {
            Some(class) => candidates
                .iter()
                .copied()
                .filter(|gun| gun.gun_class == class)
                .collect(),
            None => Vec::new(),
        };
        let candidates = if of_class.is_empty() { candidates } else { of_class };

        let pool = align_chances(&candidates, tier, &catalog.constants, &mut *self.rng);
        let gun = select_random(&pool, &mut *self.rng);
        debug!(
            "{tier} gun class {:?}: {:?}",
            class,
            gun.map(|g| g.gear.name.as_str())
        );
        gun
    }

    /// Returns false when the gun has no preset to build it from.
    fn fit_weapon(
        &mut self,
        gun: &'a WeaponItem,
        parent: &str,
        containers: &mut Containers,
        stash: &mut Vec<Stowable<'a>>,
    ) -> bool {
        let Some(preset) = gun.presets.choose(&mut *self.rng) else {
            debug!("{} has no presets, skipping", gun.gear.name);
            return false;
        };

        let weapon_id = self.mint_id();
        self.compose_modular(&gun.gear.id, &preset.mods, parent, Some(weapon_id.clone()));

        let valid = self.valid;
        let ammo = valid.retain_ids(&gun.ammo);
        let mags: Vec<&'a Magazine> = preset.mags.iter().filter(|m| valid.contains(&m.id)).collect();

        self.load_magazine(&mags, &weapon_id, &ammo);

        let spare = containers.pack_magazines(&mags, gun.mags_count, &mut *self.rng);
        self.dropped += spare.unplaced;
        for (mag, spot) in spare.placed {
            if let Some((holder, slot)) = containers.location(spot) {
                let holder = holder.to_string();
                self.emit_magazine(mag, &holder, &slot, &ammo, mag.cartridges);
            }
        }

        if let Some(&round) = ammo.choose(&mut *self.rng) {
            let count = randomize_count(gun.ammo_count, &mut *self.rng);
            if count > 0 {
                stash.push(Stowable {
                    tpl: round.as_str(),
                    slots: 1,
                    count,
                });
            }
        }
        true
    }

    /// The magazine seated in the weapon. Preferred magazines win when any
    /// are known.
    ///
    /// Rounds come from `randomize_count` but stay within `1..=cartridges`:
    /// its zero outcome is lifted to one round so a seated magazine is never
    /// empty. A magazine with no capacity gets no cartridges at all.
    fn load_magazine(&mut self, mags: &[&'a Magazine], weapon_id: &str, ammo: &[&'a String]) {
        let preferred: Vec<&'a Magazine> = mags.iter().copied().filter(|m| m.preferred).collect();
        let pool = if preferred.is_empty() { mags } else { preferred.as_slice() };

        let Some(mag) = select_random(pool, &mut *self.rng) else {
            debug!("no known magazine for weapon {weapon_id}");
            return;
        };
        let rounds = match mag.cartridges {
            0 => 0,
            capacity => randomize_count(capacity as i32, &mut *self.rng).clamp(1, capacity),
        };
        self.emit_magazine(mag, weapon_id, SLOT_MAGAZINE, ammo, rounds);
    }

    fn emit_magazine(
        &mut self,
        mag: &Magazine,
        parent: &str,
        slot: &str,
        ammo: &[&'a String],
        rounds: u32,
    ) {
        let mag_id = self.mint_id();
        self.push_node(mag_id.clone(), &mag.id, parent, slot, Upd::stack(1));

        if rounds == 0 {
            return;
        }
        if let Some(round) = select_random(ammo, &mut *self.rng) {
            let id = self.mint_id();
            self.push_node(id, round, &mag_id, SLOT_CARTRIDGES, Upd::stack(rounds));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{Catalog, Magazine};
    use crate::node::{SLOT_CARTRIDGES, SLOT_MAGAZINE};
    use crate::registry::ValidItems;
    use crate::roulette::Roulette;
    use rand::{rngs::StdRng, SeedableRng};

    fn mag(id: &str, cartridges: u32) -> Magazine {
        Magazine {
            id: id.to_string(),
            slots: 2,
            cartridges,
            preferred: false,
        }
    }

    #[test]
    fn seated_magazine_rounds_stay_within_capacity() {
        let catalog = Catalog::default();
        let valid = ValidItems::default();
        let round = "ammo_9".to_string();
        let five = mag("mag_5", 5);

        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut roulette = Roulette::new(&catalog, &valid, &mut rng);
            roulette.load_magazine(&[&five], "weapon", &[&round]);
            let items = roulette.items();

            assert_eq!(items.len(), 2);
            assert_eq!(items[0].slot_id, SLOT_MAGAZINE);
            assert_eq!(items[1].slot_id, SLOT_CARTRIDGES);
            let rounds = items[1].upd.stack_objects_count;
            assert!((1..=5).contains(&rounds), "seed {seed}: {rounds} rounds");
        }
    }

    #[test]
    fn magazine_without_capacity_gets_no_cartridges() {
        let catalog = Catalog::default();
        let valid = ValidItems::default();
        let round = "ammo_9".to_string();
        let empty = mag("mag_0", 0);
        let mut rng = StdRng::seed_from_u64(7);

        let mut roulette = Roulette::new(&catalog, &valid, &mut rng);
        roulette.load_magazine(&[&empty], "weapon", &[&round]);
        let items = roulette.items();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].tpl, "mag_0");
        assert_eq!(items[0].parent_id, "weapon");
    }
}
