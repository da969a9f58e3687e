//! In-memory content catalog implementing the engine's oracle traits.

use std::collections::BTreeMap;

use rpg_core::{
    EnemyOracle, EnemyTemplate, ItemDef, ItemKind, ItemOracle, PlayerOracle, PlayerTemplate,
    SpellDef, SpellOracle, normalize_id,
};

/// Structural problems in loaded content.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Two records collapse to the same normalized id.
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    /// A record references an id no catalog defines.
    #[error("{referer} references unknown {kind}: {id}")]
    UnknownReference {
        kind: &'static str,
        id: String,
        referer: String,
    },
}

/// All content tables for one game, keyed by normalized id.
///
/// Built once at startup from loaded tables and treated as immutable; the
/// engine reads it through the oracle traits. Lookups tolerate hyphen and
/// underscore id spellings.
#[derive(Clone, Debug, Default)]
pub struct ContentCatalog {
    enemies: BTreeMap<String, EnemyTemplate>,
    spells: BTreeMap<String, SpellDef>,
    items: BTreeMap<String, ItemDef>,
    player: Option<PlayerTemplate>,
}

impl ContentCatalog {
    /// Assembles a catalog, rejecting records whose normalized ids collide.
    pub fn new(
        enemies: Vec<EnemyTemplate>,
        spells: Vec<SpellDef>,
        items: Vec<ItemDef>,
        player: Option<PlayerTemplate>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self {
            player,
            ..Self::default()
        };
        for enemy in enemies {
            let key = normalize_id(&enemy.id);
            if catalog.enemies.insert(key.clone(), enemy).is_some() {
                return Err(CatalogError::DuplicateId {
                    kind: "enemy",
                    id: key,
                });
            }
        }
        for spell in spells {
            let key = normalize_id(&spell.id);
            if catalog.spells.insert(key.clone(), spell).is_some() {
                return Err(CatalogError::DuplicateId {
                    kind: "spell",
                    id: key,
                });
            }
        }
        for item in items {
            let key = normalize_id(&item.id);
            if catalog.items.insert(key.clone(), item).is_some() {
                return Err(CatalogError::DuplicateId {
                    kind: "item",
                    id: key,
                });
            }
        }
        Ok(catalog)
    }

    pub fn set_player(&mut self, player: PlayerTemplate) {
        self.player = Some(player);
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    pub fn spell_count(&self) -> usize {
        self.spells.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Cross-table reference check: enemy drops, player spellbook, and
    /// player equipment must all resolve against the loaded tables.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (key, enemy) in &self.enemies {
            for drop in &enemy.drops {
                if !self.items.contains_key(&normalize_id(&drop.item_id)) {
                    return Err(CatalogError::UnknownReference {
                        kind: "item",
                        id: drop.item_id.clone(),
                        referer: format!("enemy {key}"),
                    });
                }
            }
        }
        if let Some(player) = &self.player {
            for spell_id in &player.spells {
                if !self.spells.contains_key(&normalize_id(spell_id)) {
                    return Err(CatalogError::UnknownReference {
                        kind: "spell",
                        id: spell_id.clone(),
                        referer: "player spellbook".to_owned(),
                    });
                }
            }
            for (slot, item_id) in &player.equipped {
                let equipment = self
                    .items
                    .get(&normalize_id(item_id))
                    .filter(|item| matches!(item.kind, ItemKind::Equipment { .. }));
                if equipment.is_none() {
                    return Err(CatalogError::UnknownReference {
                        kind: "equipment",
                        id: item_id.clone(),
                        referer: format!("player {slot} slot"),
                    });
                }
            }
        }
        Ok(())
    }
}

impl EnemyOracle for ContentCatalog {
    fn enemy(&self, id: &str) -> Option<EnemyTemplate> {
        self.enemies.get(&normalize_id(id)).cloned()
    }
}

impl SpellOracle for ContentCatalog {
    fn spell(&self, id: &str) -> Option<SpellDef> {
        self.spells.get(&normalize_id(id)).cloned()
    }
}

impl ItemOracle for ContentCatalog {
    fn item(&self, id: &str) -> Option<ItemDef> {
        self.items.get(&normalize_id(id)).cloned()
    }
}

impl PlayerOracle for ContentCatalog {
    fn base_template(&self) -> PlayerTemplate {
        self.player.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy(raw: &str) -> EnemyTemplate {
        serde_json::from_str(raw).unwrap()
    }

    fn spell(raw: &str) -> SpellDef {
        serde_json::from_str(raw).unwrap()
    }

    fn item(raw: &str) -> ItemDef {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn lookups_fold_id_punctuation() {
        let catalog = ContentCatalog::new(
            vec![enemy(r#"{ "id": "dire-wolf" }"#)],
            vec![spell(r#"{ "id": "fire-bolt", "kind": "damage" }"#)],
            Vec::new(),
            None,
        )
        .unwrap();

        assert!(catalog.enemy("dire_wolf").is_some());
        assert!(catalog.enemy("dire-wolf").is_some());
        assert!(catalog.spell("fire_bolt").is_some());
        assert!(catalog.spell("frost_bolt").is_none());
    }

    #[test]
    fn colliding_normalized_ids_are_rejected() {
        let err = ContentCatalog::new(
            Vec::new(),
            vec![
                spell(r#"{ "id": "fire-bolt", "kind": "damage" }"#),
                spell(r#"{ "id": "fire_bolt", "kind": "damage" }"#),
            ],
            Vec::new(),
            None,
        )
        .unwrap_err();

        assert_eq!(
            err,
            CatalogError::DuplicateId {
                kind: "spell",
                id: "fire_bolt".to_owned(),
            }
        );
    }

    #[test]
    fn validate_flags_dangling_drop_reference() {
        let catalog = ContentCatalog::new(
            vec![enemy(
                r#"{ "id": "rat", "drops": [{ "item_id": "rat_tail" }] }"#,
            )],
            Vec::new(),
            Vec::new(),
            None,
        )
        .unwrap();

        let err = catalog.validate().unwrap_err();
        assert!(matches!(
            err,
            CatalogError::UnknownReference { kind: "item", .. }
        ));
    }

    #[test]
    fn validate_requires_equipped_ids_to_be_equipment() {
        let potion = item(r#"{ "id": "potion", "effect": "restore_hp", "amount": 10 }"#);
        let player: PlayerTemplate =
            serde_json::from_str(r#"{ "equipped": { "weapon": "potion" } }"#).unwrap();

        let catalog =
            ContentCatalog::new(Vec::new(), Vec::new(), vec![potion], Some(player)).unwrap();
        assert!(matches!(
            catalog.validate().unwrap_err(),
            CatalogError::UnknownReference { kind: "equipment", .. }
        ));
    }

    #[test]
    fn missing_player_template_falls_back_to_default() {
        let catalog = ContentCatalog::default();
        assert_eq!(catalog.base_template().name, "Hero");
        assert_eq!(catalog.base_template().level, 1);
    }
}
