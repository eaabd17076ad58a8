//! Data loading utilities for Questvale.
//!
//! The monster archetype table and the shop catalog ship as JSON assets and
//! are embedded at compile time for builds without a filesystem.

use std::fmt;

use common::{GameError, GameResult};
use serde::{Deserialize, Serialize};

/// Monster species known to the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterKind {
    Goblin,
    Vulture,
    Troll,
}

impl fmt::Display for MonsterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MonsterKind::Goblin => "Goblin",
            MonsterKind::Vulture => "Vulture",
            MonsterKind::Troll => "Troll",
        };
        f.write_str(name)
    }
}

/// Monster template with inclusive stat ranges.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Archetype {
    pub name: MonsterKind,
    pub description: String,
    pub health: (i32, i32),
    pub power: (i32, i32),
    pub bounty: (i32, i32),
}

/// Kind of gear item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GearKind {
    /// Adds damage while equipped and wears down with every attack.
    Weapon,
    /// Single use item activated during a fight.
    Consumable,
}

/// Gear as listed in the shop catalog.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GearTemplate {
    pub name: String,
    pub kind: GearKind,
    #[serde(default)]
    pub max_durability: Option<i32>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Potion listing with its price range.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PotionListing {
    pub name: String,
    pub price: (f64, f64),
}

/// Everything the shop can put on offer.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Catalog {
    pub potions: Vec<PotionListing>,
    pub gear: Vec<GearTemplate>,
    /// Inclusive price range shared by all gear.
    pub gear_price: (i32, i32),
    /// How many times each gear entry appears in the offer pool.
    pub gear_weight: usize,
}

/// Loads the archetype table from the given JSON file path.
pub fn load_archetypes(path: &str) -> GameResult<Vec<Archetype>> {
    let data = std::fs::read_to_string(path)?;
    parse_archetypes(&data)
}

/// Loads the archetype table embedded at compile time.
pub fn load_archetypes_embedded() -> GameResult<Vec<Archetype>> {
    parse_archetypes(include_str!("../../../assets/monsters.json"))
}

/// Loads the shop catalog from the given JSON file path.
pub fn load_catalog(path: &str) -> GameResult<Catalog> {
    let data = std::fs::read_to_string(path)?;
    parse_catalog(&data)
}

/// Loads the shop catalog embedded at compile time.
pub fn load_catalog_embedded() -> GameResult<Catalog> {
    parse_catalog(include_str!("../../../assets/shop.json"))
}

fn parse_archetypes(data: &str) -> GameResult<Vec<Archetype>> {
    let archetypes: Vec<Archetype> =
        serde_json::from_str(data).map_err(|e| GameError::Parse(e.to_string()))?;
    if archetypes.is_empty() {
        return Err(GameError::Parse("archetype table is empty".into()));
    }
    for a in &archetypes {
        for (label, (lo, hi)) in [("health", a.health), ("power", a.power), ("bounty", a.bounty)] {
            if lo > hi || lo < 0 {
                return Err(GameError::Parse(format!(
                    "{} {} range {}..={} is invalid",
                    a.name, label, lo, hi
                )));
            }
        }
    }
    log::debug!("loaded {} monster archetypes", archetypes.len());
    Ok(archetypes)
}

fn parse_catalog(data: &str) -> GameResult<Catalog> {
    let catalog: Catalog =
        serde_json::from_str(data).map_err(|e| GameError::Parse(e.to_string()))?;
    if catalog.potions.len() + catalog.gear.len() < 2 {
        // an offer always shows two distinct entries
        return Err(GameError::Parse("catalog needs at least two entries".into()));
    }
    let (lo, hi) = catalog.gear_price;
    if lo <= 0 || lo > hi {
        return Err(GameError::Parse(format!("gear price range {}..={} is invalid", lo, hi)));
    }
    for p in &catalog.potions {
        if p.price.0 < 1.0 || p.price.0 > p.price.1 {
            return Err(GameError::Parse(format!("{} price range is invalid", p.name)));
        }
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_sample_data() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets/monsters.json");
        let types = load_archetypes(path).expect("archetypes");
        assert_eq!(types.len(), 3);
    }

    #[test]
    fn parse_failure_when_empty() {
        let res = parse_archetypes("[]");
        assert!(matches!(res, Err(GameError::Parse(_))));
    }

    #[test]
    fn parse_failure_on_garbage() {
        assert!(matches!(parse_archetypes("{nope"), Err(GameError::Parse(_))));
        assert!(matches!(parse_catalog(""), Err(GameError::Parse(_))));
    }

    #[test]
    fn parse_simple_archetype() {
        let json = r#"[{"name": "Troll", "description": "big", "health": [1, 2], "power": [3, 4], "bounty": [5, 6]}]"#;
        let types = parse_archetypes(json).expect("archetypes");
        assert_eq!(types[0].name, MonsterKind::Troll);
        assert_eq!(types[0].power, (3, 4));
    }

    #[test]
    fn inverted_range_rejected() {
        let json = r#"[{"name": "Troll", "description": "", "health": [9, 2], "power": [3, 4], "bounty": [5, 6]}]"#;
        assert!(matches!(parse_archetypes(json), Err(GameError::Parse(_))));
    }

    #[test]
    fn embedded_archetypes_match_table() {
        let types = load_archetypes_embedded().expect("archetypes");
        let vulture = types.iter().find(|a| a.name == MonsterKind::Vulture).unwrap();
        assert_eq!(vulture.health, (1, 3));
        assert_eq!(vulture.bounty, (1000, 1500));
        let troll = types.iter().find(|a| a.name == MonsterKind::Troll).unwrap();
        assert_eq!(troll.health, (100, 150));
    }

    #[test]
    fn embedded_catalog_loads() {
        let catalog = load_catalog_embedded().expect("catalog");
        assert_eq!(catalog.potions.len(), 6);
        assert_eq!(catalog.gear_price, (50, 150));
        assert_eq!(catalog.gear_weight, 3);
        let sword = catalog.gear.iter().find(|g| g.name == "Iron Sword").unwrap();
        assert_eq!(sword.kind, GearKind::Weapon);
        assert_eq!(sword.max_durability, Some(10));
        let gem = catalog.gear.iter().find(|g| g.name == "Magic Gem").unwrap();
        assert_eq!(gem.kind, GearKind::Consumable);
        assert!(gem.max_durability.is_none());
    }

    #[test]
    fn load_catalog_from_path() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets/shop.json");
        assert!(load_catalog(path).is_ok());
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(load_catalog("/no/such/shop.json"), Err(GameError::Io(_))));
    }

    #[test]
    fn kind_display_names() {
        assert_eq!(MonsterKind::Goblin.to_string(), "Goblin");
        assert_eq!(MonsterKind::Vulture.to_string(), "Vulture");
    }
}
