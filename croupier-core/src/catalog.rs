//! Tiered item definitions and the weight tables that drive selection.
//!
//! The catalog is read from a directory of JSON files once and is immutable
//! afterwards. A file that is missing or fails to parse leaves its category
//! empty; the generator treats empty categories as "nothing to pick".

use log::{debug, warn};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::tier::Tier;

/// Per-tier lists, keyed by `low` / `mid` / `top` in the data files.
pub type TierMap<T> = BTreeMap<Tier, Vec<T>>;

/// Borrow the list for `tier`, or an empty slice when the tier was never
/// loaded.
pub fn for_tier<T>(map: &TierMap<T>, tier: Tier) -> &[T] {
    map.get(&tier).map(Vec::as_slice).unwrap_or(&[])
}

/// Common view over everything that goes through weighted selection.
pub trait CatalogEntry {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn weight(&self) -> Option<f64>;
    fn tags(&self) -> &[String];

    fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| t == tag)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GearItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub mods: Vec<ModSlot>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub blocks_headset: bool,
    #[serde(default)]
    pub blocks_facecover: bool,
    #[serde(default)]
    pub blocks_eyewear: bool,
    #[serde(default)]
    pub armored: bool,
    /// Overflow slot id, backpacks only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    /// Slot capacities, chest rigs only.
    #[serde(default)]
    pub grid: Vec<u32>,
}

impl CatalogEntry for GearItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn weight(&self) -> Option<f64> {
        self.weight
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Attachment point on an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModSlot {
    #[serde(rename = "type")]
    pub slot: String,
    /// `null` entries are legitimate picks that leave the slot empty.
    #[serde(default)]
    pub items: Vec<Option<ModCandidate>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModCandidate {
    Id(String),
    Inline {
        #[serde(alias = "Id")]
        id: String,
        #[serde(default, alias = "Mods")]
        mods: Vec<ModSlot>,
    },
}

impl ModCandidate {
    pub fn id(&self) -> &str {
        match self {
            ModCandidate::Id(id) => id,
            ModCandidate::Inline { id, .. } => id,
        }
    }

    pub fn mods(&self) -> &[ModSlot] {
        match self {
            ModCandidate::Id(_) => &[],
            ModCandidate::Inline { mods, .. } => mods,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponItem {
    #[serde(flatten)]
    pub gear: GearItem,
    #[serde(rename = "class", default)]
    pub gun_class: String,
    #[serde(default)]
    pub ammo: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caliber: Option<String>,
    #[serde(default)]
    pub ammo_count: i32,
    #[serde(default)]
    pub mags_count: u32,
    #[serde(default)]
    pub needs_side_weapon: bool,
    #[serde(default)]
    pub presets: Vec<WeaponPreset>,
}

impl CatalogEntry for WeaponItem {
    fn id(&self) -> &str {
        &self.gear.id
    }

    fn name(&self) -> &str {
        &self.gear.name
    }

    fn weight(&self) -> Option<f64> {
        self.gear.weight
    }

    fn tags(&self) -> &[String] {
        &self.gear.tags
    }
}

/// One complete attachment loadout for a weapon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeaponPreset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub mags: Vec<Magazine>,
    #[serde(default)]
    pub mods: Vec<ModSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Magazine {
    pub id: String,
    /// Physical size in chest rig cells, 1 to 4.
    pub slots: u32,
    pub cartridges: u32,
    #[serde(default, alias = "preffered")]
    pub preferred: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariousItemGroup {
    #[serde(default)]
    pub items: Vec<VariousItem>,
    /// Percent, 0 to 100.
    #[serde(default)]
    pub chance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariousItem {
    pub id: String,
    #[serde(default = "one_slot")]
    pub slots: u32,
}

fn one_slot() -> u32 {
    1
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constants {
    #[serde(default)]
    pub colors: BTreeMap<Tier, BTreeMap<String, u32>>,
    #[serde(default)]
    pub chance_multiplier: BTreeMap<Tier, HashMap<String, f64>>,
    #[serde(default)]
    pub gun_class_multiplier: BTreeMap<Tier, BTreeMap<String, u32>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutfitGear {
    #[serde(default)]
    pub armor: TierMap<GearItem>,
    #[serde(default)]
    pub backpacks: TierMap<GearItem>,
    #[serde(default)]
    pub chestrigs: TierMap<GearItem>,
    #[serde(default)]
    pub headwear: TierMap<GearItem>,
    #[serde(default)]
    pub eyewear: TierMap<String>,
    #[serde(default)]
    pub headsets: TierMap<String>,
    #[serde(default)]
    pub facemasks: TierMap<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub constants: Constants,
    #[serde(default)]
    pub guns: TierMap<WeaponItem>,
    #[serde(default)]
    pub side_guns: TierMap<WeaponItem>,
    #[serde(default)]
    pub various: TierMap<VariousItemGroup>,
    #[serde(default)]
    pub gear: OutfitGear,
}

/// The shared catalog and the data directory it was read from.
static SHARED: OnceCell<(PathBuf, Arc<Catalog>)> = OnceCell::new();

fn join_candidate(base: &Path, candidate: &str) -> PathBuf {
    let mut path = base.to_path_buf();
    for part in candidate.split(['/', '\\']) {
        if !part.is_empty() {
            path.push(part);
        }
    }
    path
}

/// Accept either the mod root (with a `data/` folder) or the data folder
/// itself.
pub fn resolve_data_dir(base: &Path) -> PathBuf {
    for candidate in ["data/constants.json", "constants.json"] {
        let path = join_candidate(base, candidate);
        if path.exists() {
            if let Some(parent) = path.parent() {
                return parent.to_path_buf();
            }
        }
    }
    let nested = base.join("data");
    if nested.is_dir() {
        nested
    } else {
        base.to_path_buf()
    }
}

fn read_json<T: DeserializeOwned + Default>(path: &Path) -> T {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!("catalog file {} unavailable ({err}), using empty set", path.display());
            return T::default();
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(err) => {
            warn!("catalog file {} failed to parse ({err}), using empty set", path.display());
            T::default()
        }
    }
}

fn read_tiered<T: DeserializeOwned>(dir: &Path, file: &str) -> TierMap<T> {
    Tier::ALL
        .iter()
        .map(|&tier| {
            let list: Vec<T> = read_json(&dir.join(tier.as_str()).join(file));
            (tier, list)
        })
        .collect()
}

impl Catalog {
    /// Load every category under `base`. Never fails: unreadable categories
    /// come back empty and are reported through the log.
    pub fn load(base: &Path) -> Catalog {
        let dir = resolve_data_dir(base);
        debug!("loading catalog from {}", dir.display());

        let catalog = Catalog {
            constants: read_json(&dir.join("constants.json")),
            guns: read_tiered(&dir, "guns.json"),
            side_guns: read_tiered(&dir, "side.json"),
            various: read_tiered(&dir, "various.json"),
            gear: OutfitGear {
                armor: read_tiered(&dir, "armors.json"),
                backpacks: read_tiered(&dir, "backpacks.json"),
                chestrigs: read_tiered(&dir, "chestrigs.json"),
                headwear: read_tiered(&dir, "headwear.json"),
                eyewear: read_json(&dir.join("eyewear.json")),
                headsets: read_json(&dir.join("headsets.json")),
                facemasks: read_json(&dir.join("facemasks.json")),
            },
        };

        debug!(
            "catalog loaded: {} guns, {} side arms, {} template ids",
            catalog.guns.values().map(Vec::len).sum::<usize>(),
            catalog.side_guns.values().map(Vec::len).sum::<usize>(),
            catalog.template_ids().len(),
        );
        catalog
    }

    /// Process-wide catalog. The first caller loads it from `base`; later
    /// callers get the same instance whatever path they pass, with a warning
    /// when that path points at another data directory.
    pub fn shared(base: &Path) -> Arc<Catalog> {
        let requested = resolve_data_dir(base);
        let (loaded_from, catalog) =
            SHARED.get_or_init(|| (requested.clone(), Arc::new(Catalog::load(base))));
        if *loaded_from != requested {
            warn!(
                "catalog already loaded from {}, ignoring {}",
                loaded_from.display(),
                requested.display()
            );
        }
        Arc::clone(catalog)
    }

    /// Data directory of the shared catalog, if one has been loaded.
    pub fn shared_source() -> Option<&'static Path> {
        SHARED.get().map(|(dir, _)| dir.as_path())
    }

    /// Every template id the catalog can emit, nested mods and ammo included.
    pub fn template_ids(&self) -> BTreeSet<String> {
        let mut ids = BTreeSet::new();

        let gear_lists = [
            &self.gear.armor,
            &self.gear.backpacks,
            &self.gear.chestrigs,
            &self.gear.headwear,
        ];
        for item in gear_lists.iter().flat_map(|map| map.values().flatten()) {
            ids.insert(item.id.clone());
            collect_mod_ids(&item.mods, &mut ids);
        }

        for id_lists in [&self.gear.eyewear, &self.gear.headsets, &self.gear.facemasks] {
            ids.extend(id_lists.values().flatten().cloned());
        }

        for gun in self.guns.values().chain(self.side_guns.values()).flatten() {
            ids.insert(gun.gear.id.clone());
            ids.extend(gun.ammo.iter().cloned());
            collect_mod_ids(&gun.gear.mods, &mut ids);
            for preset in &gun.presets {
                ids.extend(preset.mags.iter().map(|m| m.id.clone()));
                collect_mod_ids(&preset.mods, &mut ids);
            }
        }

        for group in self.various.values().flatten() {
            ids.extend(group.items.iter().map(|i| i.id.clone()));
        }

        ids
    }
}

fn collect_mod_ids(slots: &[ModSlot], ids: &mut BTreeSet<String>) {
    for candidate in slots.iter().flat_map(|s| s.items.iter().flatten()) {
        ids.insert(candidate.id().to_string());
        collect_mod_ids(candidate.mods(), ids);
    }
}
