//! JSON save files.

use std::collections::BTreeMap;

use bestiary::RosterEntry;
use bracket_lib::prelude::RandomNumberGenerator;
use common::{GameError, GameResult, Point};
use inventory::{Gear, Inventory, PlayerStatus};
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::session::GameSession;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemsRecord {
    #[serde(default)]
    pub potions: BTreeMap<String, u32>,
    #[serde(default)]
    pub gear: Vec<Gear>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub hp: i32,
    pub luck: f64,
    #[serde(default)]
    pub equipped_weapon: Option<Gear>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapState {
    pub player_pos: Point,
    pub town_pos: Point,
    #[serde(default)]
    pub monsters: Vec<RosterEntry>,
}

/// Everything persisted between sessions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    pub gold: i32,
    pub items: ItemsRecord,
    pub player_status: StatusRecord,
    pub player_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_state: Option<MapState>,
}

impl GameSession {
    /// Flat snapshot of the session.
    pub fn snapshot(&self) -> SaveFile {
        SaveFile {
            gold: self.gold(),
            items: ItemsRecord {
                potions: self.inventory.potions().clone(),
                gear: self.inventory.gear().to_vec(),
            },
            player_status: StatusRecord {
                hp: self.status.hp(),
                luck: self.status.luck,
                equipped_weapon: self.inventory.equipped_weapon().cloned(),
            },
            player_name: self.player_name.clone(),
            map_state: Some(MapState {
                player_pos: self.player_pos(),
                town_pos: self.map().town(),
                monsters: self.roster().to_vec(),
            }),
        }
    }

    /// Rebuilds a session from a snapshot.
    ///
    /// A snapshot without a map gets a fresh map with `monsters` monsters.
    pub fn from_snapshot(save: SaveFile, rng: RandomNumberGenerator, monsters: usize) -> GameResult<Self> {
        let inventory = Inventory::restore(
            save.items.potions,
            save.items.gear,
            save.player_status.equipped_weapon.as_ref(),
        );
        let status = PlayerStatus::new(save.player_status.hp, save.player_status.luck);
        let map_state = match save.map_state {
            Some(state) => {
                let map = mapgen::with_town(state.town_pos)
                    .map_err(|e| GameError::SaveCorrupt(e.to_string()))?;
                if !map.in_bounds(state.player_pos) {
                    return Err(GameError::SaveCorrupt("player is off the map".into()));
                }
                if state.monsters.iter().any(|m| !map.in_bounds(m.pos)) {
                    return Err(GameError::SaveCorrupt("monster is off the map".into()));
                }
                Some((map, state.player_pos, state.monsters))
            }
            None => None,
        };
        GameSession::from_parts(save.player_name, save.gold, inventory, status, map_state, monsters, rng)
    }

    /// Writes the session to `path` as pretty JSON.
    pub fn save(&self, path: &str) -> GameResult<()> {
        let data = serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| GameError::Parse(e.to_string()))?;
        std::fs::write(path, data)?;
        log::info!("saved game to {}", path);
        Ok(())
    }

    /// Reads a session from `path`.
    pub fn load(path: &str, rng: RandomNumberGenerator, monsters: usize) -> GameResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => GameError::SaveMissing(path.to_string()),
            _ => GameError::Io(e),
        })?;
        let save: SaveFile =
            serde_json::from_str(&data).map_err(|e| GameError::SaveCorrupt(e.to_string()))?;
        let session = Self::from_snapshot(save, rng, monsters)?;
        log::info!("loaded game for {} from {}", session.player_name, path);
        Ok(session)
    }
}

/// Loads the configured save, or starts a new game if it is missing or broken.
///
/// The load failure, if any, is returned alongside the new session so the
/// caller can tell the player.
pub fn load_or_new(config: &GameConfig) -> GameResult<(GameSession, Option<GameError>)> {
    let path = &config.game.save_path;
    match GameSession::load(path, config.rng(), config.game.monsters) {
        Ok(session) => Ok((session, None)),
        Err(e) if e.is_save_failure() => {
            log::warn!("could not load {}: {}, starting a new game", path, e);
            let session = GameSession::new_with_rng(&config.player.name, config.rng(), config.game.monsters)?;
            Ok((session, Some(e)))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data::{GearKind, GearTemplate};

    fn sword() -> Gear {
        Gear::from_template(&GearTemplate {
            name: "Iron Sword".into(),
            kind: GearKind::Weapon,
            max_durability: Some(10),
            note: None,
        })
    }

    fn temp_path(dir: &tempfile::TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    fn config_for(path: &str) -> GameConfig {
        let mut cfg = GameConfig::default();
        cfg.game.save_path = path.to_string();
        cfg.game.seed = Some(3);
        cfg
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "save.json");
        let mut game = GameSession::new("Tester", 9, 3).unwrap();
        game.inventory.add_potion("Health Potion", 2);
        game.inventory.add_gear(sword());
        game.inventory.add_gear(sword());
        game.inventory.equip_weapon("iron sword").unwrap();
        game.inventory.wear_equipped();
        game.status.set_hp(17);
        game.save(&path).unwrap();

        let loaded = GameSession::load(&path, RandomNumberGenerator::seeded(1), 3).unwrap();
        assert_eq!(loaded.snapshot(), game.snapshot());
        assert_eq!(loaded.inventory.equipped_weapon().and_then(|g| g.current_durability), Some(9));
    }

    #[test]
    fn snapshot_uses_documented_keys() {
        let game = GameSession::new("Tester", 9, 1).unwrap();
        let value = serde_json::to_value(game.snapshot()).unwrap();
        for key in ["gold", "items", "player_status", "player_name", "map_state"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert!(value["player_status"]["equipped_weapon"].is_null());
        assert!(value["map_state"]["town_pos"].is_array());
    }

    #[test]
    fn missing_map_state_generates_map() {
        let json = r#"{
            "gold": 120,
            "items": {"potions": {"Health Potion": 1}, "gear": []},
            "player_status": {"hp": 12, "luck": 0.1, "equipped_weapon": null},
            "player_name": "Old Timer"
        }"#;
        let save: SaveFile = serde_json::from_str(json).unwrap();
        let game = GameSession::from_snapshot(save, RandomNumberGenerator::seeded(5), 2).unwrap();
        assert_eq!(game.gold(), 120);
        assert_eq!(game.status.hp(), 12);
        assert_eq!(game.roster().len(), 2);
        assert!(game.in_town());
    }

    #[test]
    fn gear_without_ids_is_reassigned() {
        let json = r#"{
            "gold": 0,
            "items": {"potions": {}, "gear": [
                {"name": "Iron Sword", "kind": "weapon", "max_durability": 10, "current_durability": 4},
                {"name": "Iron Sword", "kind": "weapon", "max_durability": 10, "current_durability": 10}
            ]},
            "player_status": {"hp": 30, "luck": 0.1, "equipped_weapon":
                {"name": "Iron Sword", "kind": "weapon", "max_durability": 10, "current_durability": 10}},
            "player_name": "Old Timer"
        }"#;
        let save: SaveFile = serde_json::from_str(json).unwrap();
        let game = GameSession::from_snapshot(save, RandomNumberGenerator::seeded(5), 0).unwrap();
        let gear = game.inventory.gear();
        assert_ne!(gear[0].id, gear[1].id);
        let equipped = game.inventory.equipped_weapon().unwrap();
        assert_eq!(equipped.id, gear[1].id);
    }

    #[test]
    fn saved_hp_is_clamped_on_load() {
        let mut save = GameSession::new("Tester", 9, 0).unwrap().snapshot();
        save.player_status.hp = 99;
        let game = GameSession::from_snapshot(save.clone(), RandomNumberGenerator::seeded(1), 0).unwrap();
        assert_eq!(game.status.hp(), inventory::MAX_HP);
        save.player_status.hp = -4;
        let game = GameSession::from_snapshot(save, RandomNumberGenerator::seeded(1), 0).unwrap();
        assert_eq!(game.status.hp(), 0);
        assert!(game.is_defeated());
    }

    #[test]
    fn off_map_position_is_corrupt() {
        let mut save = GameSession::new("Tester", 9, 0).unwrap().snapshot();
        if let Some(state) = save.map_state.as_mut() {
            state.player_pos = Point::new(500, 500);
        }
        let err = GameSession::from_snapshot(save, RandomNumberGenerator::seeded(1), 0).err();
        assert!(matches!(err, Some(GameError::SaveCorrupt(_))));
    }

    #[test]
    fn load_missing_file_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "nope.json");
        let err = GameSession::load(&path, RandomNumberGenerator::seeded(1), 1).err();
        assert!(matches!(err, Some(GameError::SaveMissing(_))));
    }

    #[test]
    fn load_or_new_falls_back_on_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let (game, err) = load_or_new(&config_for(&path)).unwrap();
        assert!(matches!(err, Some(GameError::SaveCorrupt(_))));
        assert_eq!(game.player_name, "Adventurer");
        assert!(game.in_town());
    }

    #[test]
    fn load_or_new_uses_existing_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "good.json");
        let mut game = GameSession::new("Keeper", 4, 2).unwrap();
        game.inventory.add_potion("Defense Potion", 3);
        game.save(&path).unwrap();
        let (loaded, err) = load_or_new(&config_for(&path)).unwrap();
        assert!(err.is_none());
        assert_eq!(loaded.player_name, "Keeper");
        assert_eq!(loaded.inventory.potion_count("Defense Potion"), 3);
    }
}
