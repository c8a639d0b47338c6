//! Modular composition: an item node plus the attachment tree hanging off it.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::{ModCandidate, ModSlot};
use crate::node::{Upd, SLOT_MAIN};
use crate::roulette::Roulette;

impl<'a, R: Rng + ?Sized> Roulette<'a, R> {
    /// Emit `tpl` under `parent` at the main slot, then its attachments.
    ///
    /// `id` lets the caller fix the node id up front (weapons get one so
    /// magazines can be hung off them afterwards). Returns the node id.
    pub fn compose_modular(
        &mut self,
        tpl: &str,
        mods: &[ModSlot],
        parent: &str,
        id: Option<String>,
    ) -> String {
        let id = id.unwrap_or_else(|| self.mint_id());
        self.push_node(id.clone(), tpl, parent, SLOT_MAIN, Upd::stack(1));
        self.attach_mods(&id, mods);
        id
    }

    pub(crate) fn attach_mods(&mut self, parent: &str, mods: &[ModSlot]) {
        for slot in mods {
            if let Some(candidate) = self.select_mod_candidate(&slot.items) {
                let id = self.mint_id();
                self.push_node(id.clone(), candidate.id(), parent, &slot.slot, Upd::stack(1));
                self.attach_mods(&id, candidate.mods());
            }
        }
    }

    /// Uniform pick among the candidates the registry knows. `null`
    /// candidates stay in the draw and leave the slot empty when picked.
    fn select_mod_candidate<'c>(
        &mut self,
        items: &'c [Option<ModCandidate>],
    ) -> Option<&'c ModCandidate> {
        let valid = self.valid;
        let known: Vec<&'c Option<ModCandidate>> = items
            .iter()
            .filter(|c| c.as_ref().map_or(true, |c| valid.contains(c.id())))
            .collect();
        known.choose(&mut *self.rng).and_then(|c| c.as_ref())
    }
}
