//! Loadout assembly: one spin produces one complete, parent-linked item list.

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{for_tier, Catalog, GearItem, TierMap};
use crate::chance::{align_chances, pick_color, prefer_color, select_random};
use crate::node::{GeneratedNode, IdMint, Repairable, Upd, SLOT_MAIN};
use crate::packer::{Backpack, Chestrig, Containers};
use crate::registry::ValidItems;
use crate::tier::{randomize_tier, Request, Tier};

/// One generated loadout. Top-level items hang from `root_id`, which is not
/// itself part of `items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loadout {
    pub root_id: String,
    pub items: Vec<GeneratedNode>,
    /// Magazines and loose items the containers had no room for.
    pub dropped: usize,
}

/// Something queued for the chest rig / backpack after the gear is chosen.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Stowable<'a> {
    pub tpl: &'a str,
    pub slots: u32,
    pub count: u32,
}

pub struct Roulette<'a, R: Rng + ?Sized> {
    pub(crate) catalog: &'a Catalog,
    pub(crate) valid: &'a ValidItems,
    pub(crate) rng: &'a mut R,
    ids: IdMint,
    items: Vec<GeneratedNode>,
    pub(crate) dropped: usize,
}

impl<'a, R: Rng + ?Sized> Roulette<'a, R> {
    pub fn new(catalog: &'a Catalog, valid: &'a ValidItems, rng: &'a mut R) -> Self {
        Self {
            catalog,
            valid,
            rng,
            ids: IdMint::new(),
            items: Vec::new(),
            dropped: 0,
        }
    }

    pub(crate) fn mint_id(&mut self) -> String {
        self.ids.mint(&mut *self.rng)
    }

    pub(crate) fn push_node(&mut self, id: String, tpl: &str, parent: &str, slot: &str, upd: Upd) {
        self.items.push(GeneratedNode {
            id,
            tpl: tpl.to_string(),
            parent_id: parent.to_string(),
            slot_id: slot.to_string(),
            upd,
        });
    }

    /// Nodes emitted so far.
    pub fn items(&self) -> &[GeneratedNode] {
        &self.items
    }

    pub fn spin(mut self, request: Request) -> Loadout {
        let catalog = self.catalog;
        let tier = request.tier;
        let root_id = self.mint_id();

        let color = pick_color(&catalog.constants, tier, &mut *self.rng);
        debug!("spinning {tier} loadout (gun: {}), color {:?}", request.needs_gun, color);

        // Accessories only come with headwear.
        if let Some(helmet) = self.pick_gear(&catalog.gear.headwear, tier, color) {
            self.compose_modular(&helmet.id, &helmet.mods, &root_id, None);
            self.add_accessory(&catalog.gear.headsets, tier, &root_id, helmet.blocks_headset);
            self.add_accessory(&catalog.gear.facemasks, tier, &root_id, helmet.blocks_facecover);
            self.add_accessory(&catalog.gear.eyewear, tier, &root_id, helmet.blocks_eyewear);
        }

        let mut backpack_space = None;
        if let Some(backpack) = self.pick_gear(&catalog.gear.backpacks, tier, color) {
            let id = self.mint_id();
            let upd = Upd {
                stack_objects_count: 1,
                repairable: Some(Repairable::default()),
            };
            self.push_node(id.clone(), &backpack.id, &root_id, SLOT_MAIN, upd);
            self.attach_mods(&id, &backpack.mods);
            backpack_space = backpack.slot.clone().map(|slot| Backpack { id, slot });
        }

        let chestrig = self.pick_gear(&catalog.gear.chestrigs, tier, color);
        let chestrig_space = chestrig.map(|rig| Chestrig {
            id: self.compose_modular(&rig.id, &rig.mods, &root_id, None),
            grid: rig.grid.clone(),
        });

        if chestrig.map_or(false, |rig| rig.armored) {
            debug!("chest rig is armored, skipping body armor");
        } else if let Some(armor) = self.pick_gear(&catalog.gear.armor, tier, color) {
            self.compose_modular(&armor.id, &armor.mods, &root_id, None);
        }

        let mut containers = Containers::new(chestrig_space, backpack_space);
        let mut stash = Vec::new();

        if request.needs_gun {
            self.arm(tier, &root_id, &mut containers, &mut stash);
        }
        self.roll_various(tier, &mut stash);
        self.stow(stash, &mut containers);

        Loadout {
            root_id,
            items: self.items,
            dropped: self.dropped,
        }
    }

    /// Re-roll the category tier, then validity filter, chance-weight,
    /// colour filter and draw.
    fn pick_gear(
        &mut self,
        category: &'a TierMap<GearItem>,
        tier: Tier,
        color: Option<&str>,
    ) -> Option<&'a GearItem> {
        let catalog = self.catalog;
        let gear_tier = randomize_tier(tier, &mut *self.rng);
        let candidates = self.valid.retain_entries(for_tier(category, gear_tier));
        let pool = align_chances(&candidates, gear_tier, &catalog.constants, &mut *self.rng);
        let pool = prefer_color(pool, color);
        let picked = select_random(&pool, &mut *self.rng);
        debug!(
            "{gear_tier} gear pick from {} candidates: {:?}",
            candidates.len(),
            picked.map(|g| g.name.as_str())
        );
        picked
    }

    /// Headsets, face covers, eyewear: plain ids, uniform pick, skipped when
    /// the chosen headwear blocks them.
    fn add_accessory(&mut self, ids: &'a TierMap<String>, tier: Tier, parent: &str, blocked: bool) {
        if blocked {
            return;
        }
        let pool = self.valid.retain_ids(for_tier(ids, tier));
        if let Some(tpl) = select_random(&pool, &mut *self.rng) {
            let id = self.mint_id();
            self.push_node(id, tpl, parent, SLOT_MAIN, Upd::stack(1));
        }
    }

    /// One tier re-roll covers every group: the groups to walk are those of
    /// the rolled tier, so the roll has to come first.
    fn roll_various(&mut self, tier: Tier, stash: &mut Vec<Stowable<'a>>) {
        let catalog = self.catalog;
        let various_tier = randomize_tier(tier, &mut *self.rng);
        for group in for_tier(&catalog.various, various_tier) {
            let roll = self.rng.gen::<f64>() * 100.0;
            if roll > group.chance {
                continue;
            }
            let choices: Vec<_> = group.items.iter().collect();
            if let Some(item) = select_random(&choices, &mut *self.rng) {
                stash.push(Stowable {
                    tpl: &item.id,
                    slots: item.slots,
                    count: 1,
                });
            }
        }
    }

    fn stow(&mut self, stash: Vec<Stowable<'a>>, containers: &mut Containers) {
        for item in stash {
            if !self.valid.contains(item.tpl) {
                continue;
            }
            let spot = containers.place_item(item.slots);
            match spot.and_then(|spot| containers.location(spot)) {
                Some((parent, slot)) => {
                    let parent = parent.to_string();
                    let id = self.mint_id();
                    self.push_node(id, item.tpl, &parent, &slot, Upd::stack(item.count));
                }
                None => {
                    debug!("no room for {}", item.tpl);
                    self.dropped += 1;
                }
            }
        }
    }
}
