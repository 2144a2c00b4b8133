//! Symbol pool resolution
//!
//! Turns a script selection plus category toggles into the flat candidate set
//! used for spawning tiles and drawing distractors.

use serde::Serialize;

use crate::dictionary::{Category, CharacterEntry, Dictionary, Script};

/// Which symbol subsets are in play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryFlags {
    pub base: bool,
    pub voiced: bool,
    pub combo: bool,
}

impl Default for CategoryFlags {
    fn default() -> Self {
        Self {
            base: true,
            voiced: false,
            combo: false,
        }
    }
}

impl CategoryFlags {
    pub const NONE: CategoryFlags = CategoryFlags {
        base: false,
        voiced: false,
        combo: false,
    };

    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Base => self.base,
            Category::Voiced => self.voiced,
            Category::Combo => self.combo,
        }
    }

    pub fn toggle(&mut self, category: Category) {
        match category {
            Category::Base => self.base = !self.base,
            Category::Voiced => self.voiced = !self.voiced,
            Category::Combo => self.combo = !self.combo,
        }
    }
}

/// Concatenate the enabled categories for `script` in base, voiced, combo order.
///
/// Returns an empty pool when every flag is off; callers decide what that means.
pub fn resolve(
    dictionary: &dyn Dictionary,
    script: Script,
    flags: CategoryFlags,
) -> Vec<CharacterEntry> {
    Category::ALL
        .iter()
        .filter(|c| flags.is_enabled(**c))
        .flat_map(|c| dictionary.entries(script, *c).iter().copied())
        .collect()
}

/// Base category of the default script
pub fn default_pool(dictionary: &dyn Dictionary) -> Vec<CharacterEntry> {
    dictionary
        .entries(Script::default(), Category::Base)
        .to_vec()
}

/// Like [`resolve`], but never empty as long as the default pool isn't
pub fn resolve_or_default(
    dictionary: &dyn Dictionary,
    script: Script,
    flags: CategoryFlags,
) -> Vec<CharacterEntry> {
    let pool = resolve(dictionary, script, flags);
    if pool.is_empty() {
        log::debug!("Empty pool for {:?}, falling back to default", flags);
        default_pool(dictionary)
    } else {
        pool
    }
}
