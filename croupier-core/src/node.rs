use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const SLOT_MAIN: &str = "main";
pub const SLOT_MAGAZINE: &str = "mod_magazine";
pub const SLOT_CARTRIDGES: &str = "cartridges";

/// One inventory entry of a generated loadout, in the host's item shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedNode {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_tpl")]
    pub tpl: String,
    #[serde(rename = "parentId")]
    pub parent_id: String,
    #[serde(rename = "slotId")]
    pub slot_id: String,
    pub upd: Upd,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Upd {
    pub stack_objects_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repairable: Option<Repairable>,
}

impl Upd {
    pub fn stack(count: u32) -> Self {
        Self {
            stack_objects_count: count,
            repairable: None,
        }
    }
}

/// Durability marker. Left empty so the host fills in template defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Repairable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub durability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_durability: Option<f64>,
}

/// Hands out 24-hex-digit ids, never the same one twice.
#[derive(Debug, Default)]
pub struct IdMint {
    issued: HashSet<String>,
}

impl IdMint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        loop {
            let id = format!("{:08x}{:016x}", rng.gen::<u32>(), rng.gen::<u64>());
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }

    pub fn issued(&self) -> usize {
        self.issued.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn ids_are_object_id_shaped_and_unique() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut mint = IdMint::new();
        let ids: Vec<String> = (0..500).map(|_| mint.mint(&mut rng)).collect();

        for id in &ids {
            assert_eq!(id.len(), 24);
            assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
        assert_eq!(mint.issued(), 500);
    }

    #[test]
    fn node_serializes_in_host_shape() {
        let node = GeneratedNode {
            id: "a".into(),
            tpl: "b".into(),
            parent_id: "c".into(),
            slot_id: SLOT_MAIN.into(),
            upd: Upd {
                stack_objects_count: 1,
                repairable: Some(Repairable::default()),
            },
        };
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "_id": "a",
                "_tpl": "b",
                "parentId": "c",
                "slotId": "main",
                "upd": { "StackObjectsCount": 1, "Repairable": {} }
            })
        );
    }
}
