//! The game session: gold, inventory, vitals, map and the session RNG.

use bestiary::{monster_at, respawn, spawn_roster, wander, Bestiary, RosterEntry};
use bracket_lib::prelude::RandomNumberGenerator;
use combat::{Action, CombatState, Encounter, TurnReport};
use common::{GameError, GameResult, Point};
use data::Catalog;
use economy::{generate_offer, PurchaseReceipt, ShopOffer};
use inventory::{Gear, Inventory, PlayerStatus};
use mapgen::Map;

/// Gold charged for a night at the inn.
pub const REST_COST: i32 = 5;
/// Inclusive range of a new player's purse.
pub const STARTING_GOLD: (i32, i32) = (100, 300);
/// Monsters roaming a fresh map.
pub const DEFAULT_MONSTERS: usize = 4;

/// Result of trying to rest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestOutcome {
    Rested { cost: i32 },
    CannotAfford { cost: i32, gold: i32 },
}

/// Result of one step on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveEvent {
    Moved,
    /// The step would leave the map.
    Blocked,
    ReachedTown,
    /// A living monster occupies the target cell; the player did not move.
    Encounter(usize),
}

/// How a finished fight ended for the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FightOutcome {
    Won { bounty: i32 },
    Lost,
    Fled,
}

/// A fight in progress, tied to a roster slot unless it is a random encounter.
#[derive(Clone, Debug)]
pub struct Fight {
    pub encounter: Encounter,
    roster_idx: Option<usize>,
    target: Point,
}

impl Fight {
    pub fn state(&self) -> CombatState {
        self.encounter.state()
    }

    pub fn roster_idx(&self) -> Option<usize> {
        self.roster_idx
    }
}

/// A single player's game.
pub struct GameSession {
    pub player_name: String,
    gold: i32,
    pub inventory: Inventory,
    pub status: PlayerStatus,
    map: Map,
    player_pos: Point,
    roster: Vec<RosterEntry>,
    bestiary: Bestiary,
    catalog: Catalog,
    rng: RandomNumberGenerator,
}

impl GameSession {
    /// Starts a fresh game with a random purse and a new roster.
    pub fn new(player_name: &str, seed: u64, monsters: usize) -> GameResult<Self> {
        Self::new_with_rng(player_name, RandomNumberGenerator::seeded(seed), monsters)
    }

    pub fn new_with_rng(player_name: &str, mut rng: RandomNumberGenerator, monsters: usize) -> GameResult<Self> {
        let bestiary = Bestiary::embedded()?;
        let catalog = data::load_catalog_embedded()?;
        let map = mapgen::generate()?;
        let player_pos = map.town();
        let roster = spawn_roster(&map, &bestiary, &mut rng, monsters, player_pos)?;
        let gold = rng.range(STARTING_GOLD.0, STARTING_GOLD.1 + 1);
        log::info!("new game for {} with {} gold", player_name, gold);
        Ok(Self {
            player_name: player_name.to_string(),
            gold,
            inventory: Inventory::default(),
            status: PlayerStatus::default(),
            map,
            player_pos,
            roster,
            bestiary,
            catalog,
            rng,
        })
    }

    /// Assembles a session from restored parts.
    ///
    /// Without a saved map a fresh one is generated and populated with
    /// `monsters` new monsters; the player starts in town.
    pub(crate) fn from_parts(
        player_name: String,
        gold: i32,
        inventory: Inventory,
        status: PlayerStatus,
        map_state: Option<(Map, Point, Vec<RosterEntry>)>,
        monsters: usize,
        mut rng: RandomNumberGenerator,
    ) -> GameResult<Self> {
        let bestiary = Bestiary::embedded()?;
        let (map, player_pos, roster) = match map_state {
            Some((map, pos, roster)) => {
                let pos = map.clamp(pos);
                (map, pos, roster)
            }
            None => {
                log::info!("save has no map, generating a new one");
                let map = mapgen::generate()?;
                let pos = map.town();
                let roster = spawn_roster(&map, &bestiary, &mut rng, monsters, pos)?;
                (map, pos, roster)
            }
        };
        Ok(Self {
            player_name,
            gold: gold.max(0),
            inventory,
            status,
            map,
            player_pos,
            roster,
            bestiary,
            catalog: data::load_catalog_embedded()?,
            rng,
        })
    }

    pub fn gold(&self) -> i32 {
        self.gold
    }

    pub fn player_pos(&self) -> Point {
        self.player_pos
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    pub fn in_town(&self) -> bool {
        self.player_pos == self.map.town()
    }

    pub fn is_defeated(&self) -> bool {
        self.status.is_defeated()
    }

    /// Rests at the inn for [`REST_COST`] gold.
    pub fn rest(&mut self) -> RestOutcome {
        self.rest_with_cost(REST_COST)
    }

    /// Restores full HP for `cost` gold, or does nothing if the purse is short.
    pub fn rest_with_cost(&mut self, cost: i32) -> RestOutcome {
        let cost = cost.max(0);
        if self.gold < cost {
            log::info!("cannot afford rest: {} < {}", self.gold, cost);
            return RestOutcome::CannotAfford { cost, gold: self.gold };
        }
        self.gold -= cost;
        self.status.restore_full();
        log::info!("rested for {} gold", cost);
        RestOutcome::Rested { cost }
    }

    /// Rolls a new pair of shop entries.
    pub fn visit_shop(&mut self) -> GameResult<ShopOffer> {
        generate_offer(&mut self.rng, &self.catalog)
    }

    /// Buys from `offer`, updating gold and inventory.
    pub fn buy(&mut self, offer: &ShopOffer, choice: &str, qty: i32) -> GameResult<PurchaseReceipt> {
        let receipt = economy::buy(offer, choice, qty, self.gold, &mut self.inventory)?;
        self.gold = receipt.remaining_gold;
        Ok(receipt)
    }

    /// Equips the first weapon called `name`.
    pub fn equip(&mut self, name: &str) -> GameResult<Gear> {
        self.inventory
            .equip_weapon(name)
            .ok_or_else(|| GameError::UnknownItem(name.to_string()))
    }

    /// Steps the player by `delta`. Monsters wander after every step taken.
    pub fn move_player(&mut self, delta: Point) -> MoveEvent {
        let target = self.map.clamp(self.player_pos.offset(delta));
        if target == self.player_pos {
            return MoveEvent::Blocked;
        }
        if let Some(idx) = monster_at(&self.roster, target) {
            log::debug!("step onto monster {} at ({}, {})", idx, target.x, target.y);
            return MoveEvent::Encounter(idx);
        }
        self.player_pos = target;
        wander(&self.map, &mut self.roster, &mut self.rng, self.player_pos);
        if self.in_town() {
            MoveEvent::ReachedTown
        } else {
            MoveEvent::Moved
        }
    }

    /// Starts a fight against roster monster `idx`.
    pub fn begin_fight(&self, idx: usize) -> GameResult<Fight> {
        let entry = self
            .roster
            .get(idx)
            .filter(|m| m.alive)
            .ok_or(GameError::InvalidOperation)?;
        Ok(Fight {
            encounter: Encounter::new(entry.monster.clone()),
            roster_idx: Some(idx),
            target: entry.pos,
        })
    }

    /// Starts a fight against a freshly generated monster.
    pub fn random_encounter(&mut self) -> Fight {
        let monster = self.bestiary.generate(&mut self.rng);
        Fight {
            encounter: Encounter::new(monster),
            roster_idx: None,
            target: self.player_pos,
        }
    }

    /// Resolves one player action in `fight`.
    pub fn fight_turn(&mut self, fight: &mut Fight, action: &Action) -> GameResult<TurnReport> {
        fight
            .encounter
            .update(action, &mut self.inventory, &mut self.status, &mut self.rng)
    }

    /// Settles a finished fight: pays the bounty and updates the roster.
    pub fn finish_fight(&mut self, fight: Fight) -> GameResult<FightOutcome> {
        let outcome = match fight.state() {
            CombatState::Victory => {
                let bounty = fight.encounter.reward();
                self.gold = self.gold.saturating_add(bounty);
                if let Some(idx) = fight.roster_idx {
                    if let Some(entry) = self.roster.get_mut(idx) {
                        entry.alive = false;
                    }
                    self.player_pos = fight.target;
                    respawn(&self.map, &mut self.roster, idx, &self.bestiary, &mut self.rng, self.player_pos)?;
                }
                FightOutcome::Won { bounty }
            }
            CombatState::Fled => {
                if let Some(entry) = fight.roster_idx.and_then(|i| self.roster.get_mut(i)) {
                    entry.monster.health = fight.encounter.monster.health;
                }
                FightOutcome::Fled
            }
            CombatState::Defeat => FightOutcome::Lost,
            CombatState::EncounterStart | CombatState::PlayerTurn => {
                return Err(GameError::InvalidOperation);
            }
        };
        log::info!("fight finished: {:?}", outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
impl GameSession {
    pub(crate) fn set_gold(&mut self, gold: i32) {
        self.gold = gold;
    }

    pub(crate) fn clear_roster(&mut self) {
        self.roster.clear();
    }

    /// Keeps a single monster and moves it to `pos`.
    pub(crate) fn place_monster(&mut self, pos: Point) {
        self.roster.truncate(1);
        if let Some(m) = self.roster.first_mut() {
            m.pos = pos;
            m.alive = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventory::MAX_HP;

    fn session() -> GameSession {
        GameSession::new("Tester", 42, DEFAULT_MONSTERS).unwrap()
    }

    #[test]
    fn new_session_starts_in_town_with_purse() {
        let s = session();
        assert!(s.in_town());
        assert!((STARTING_GOLD.0..=STARTING_GOLD.1).contains(&s.gold()));
        assert_eq!(s.status.hp(), MAX_HP);
        assert_eq!(s.roster().len(), DEFAULT_MONSTERS);
        assert!(s.roster().iter().all(|m| m.pos != s.player_pos()));
    }

    #[test]
    fn same_seed_same_session() {
        let a = session();
        let b = session();
        assert_eq!(a.gold(), b.gold());
        assert_eq!(a.roster(), b.roster());
    }

    #[test]
    fn rest_restores_hp_and_charges() {
        let mut s = session();
        s.gold = 20;
        s.status.set_hp(3);
        assert_eq!(s.rest(), RestOutcome::Rested { cost: REST_COST });
        assert_eq!(s.status.hp(), MAX_HP);
        assert_eq!(s.gold(), 15);
    }

    #[test]
    fn rest_without_gold_is_noop() {
        let mut s = session();
        s.gold = 4;
        s.status.set_hp(3);
        assert_eq!(s.rest(), RestOutcome::CannotAfford { cost: 5, gold: 4 });
        assert_eq!(s.status.hp(), 3);
        assert_eq!(s.gold(), 4);
    }

    #[test]
    fn buying_updates_gold_and_inventory() {
        let mut s = session();
        s.gold = 1000;
        let offer = s.visit_shop().unwrap();
        let entry = offer.entries[0].clone();
        let receipt = s.buy(&offer, entry.item.name(), 2).unwrap();
        assert_eq!(receipt.bought, 2);
        assert_eq!(s.gold(), 1000 - 2 * entry.unit_price());
    }

    #[test]
    fn buying_unknown_item_keeps_gold() {
        let mut s = session();
        let gold = s.gold();
        let offer = s.visit_shop().unwrap();
        assert!(matches!(s.buy(&offer, "Banana", 1), Err(GameError::UnknownItem(_))));
        assert_eq!(s.gold(), gold);
    }

    #[test]
    fn equip_outside_combat() {
        let mut s = session();
        assert!(matches!(s.equip("Iron Sword"), Err(GameError::UnknownItem(_))));
        let catalog = data::load_catalog_embedded().unwrap();
        let sword = catalog.gear.iter().find(|g| g.name == "Iron Sword").unwrap();
        s.inventory.add_gear(Gear::from_template(sword));
        assert_eq!(s.equip("iron sword").unwrap().name, "Iron Sword");
        assert!(s.inventory.equipped_weapon().is_some());
    }

    #[test]
    fn movement_is_clamped_to_map() {
        let mut s = session();
        s.roster.clear();
        s.player_pos = Point::new(0, 0);
        assert_eq!(s.move_player(Point::new(-1, 0)), MoveEvent::Blocked);
        assert_eq!(s.player_pos(), Point::new(0, 0));
        assert_eq!(s.move_player(Point::new(1, 0)), MoveEvent::Moved);
        assert_eq!(s.player_pos(), Point::new(1, 0));
    }

    #[test]
    fn stepping_back_into_town_is_reported() {
        let mut s = session();
        s.roster.clear();
        let town = s.map().town();
        s.player_pos = Point::new(town.x + 1, town.y);
        assert_eq!(s.move_player(Point::new(-1, 0)), MoveEvent::ReachedTown);
        assert!(s.in_town());
    }

    #[test]
    fn stepping_onto_monster_starts_encounter() {
        let mut s = session();
        let town = s.map().town();
        let next = Point::new(town.x + 1, town.y);
        s.roster.truncate(1);
        s.roster[0].pos = next;
        assert_eq!(s.move_player(Point::new(1, 0)), MoveEvent::Encounter(0));
        assert_eq!(s.player_pos(), town);
    }

    #[test]
    fn victory_pays_bounty_and_respawns() {
        let mut s = session();
        let mut fight = s.begin_fight(0).unwrap();
        fight.encounter.monster.health = 1;
        let bounty = fight.encounter.monster.bounty;
        let gold = s.gold();
        let report = s.fight_turn(&mut fight, &Action::Attack).unwrap();
        assert_eq!(report.state, CombatState::Victory);
        let target = fight.target;
        assert_eq!(s.finish_fight(fight).unwrap(), FightOutcome::Won { bounty });
        assert_eq!(s.gold(), gold + bounty);
        assert_eq!(s.player_pos(), target);
        assert!(s.roster()[0].alive);
        assert_ne!(s.roster()[0].pos, s.player_pos());
    }

    #[test]
    fn fleeing_keeps_wounded_monster() {
        let mut s = session();
        let start = s.player_pos();
        let mut fight = s.begin_fight(0).unwrap();
        fight.encounter.monster.health = 1;
        s.fight_turn(&mut fight, &Action::Run).unwrap();
        let gold = s.gold();
        assert_eq!(s.finish_fight(fight).unwrap(), FightOutcome::Fled);
        assert_eq!(s.gold(), gold);
        assert_eq!(s.player_pos(), start);
        assert_eq!(s.roster()[0].monster.health, 1);
    }

    #[test]
    fn unfinished_fight_cannot_be_settled() {
        let mut s = session();
        let fight = s.begin_fight(0).unwrap();
        assert!(matches!(s.finish_fight(fight), Err(GameError::InvalidOperation)));
    }

    #[test]
    fn dead_roster_slot_cannot_be_fought() {
        let mut s = session();
        s.roster[0].alive = false;
        assert!(s.begin_fight(0).is_err());
        assert!(s.begin_fight(99).is_err());
    }

    #[test]
    fn random_encounter_has_no_roster_slot() {
        let mut s = session();
        let fight = s.random_encounter();
        assert_eq!(fight.roster_idx(), None);
        assert_eq!(fight.state(), CombatState::EncounterStart);
    }

    #[test]
    fn defeat_is_reported() {
        let mut s = session();
        s.status.set_hp(0);
        let mut fight = s.random_encounter();
        s.fight_turn(&mut fight, &Action::Attack).unwrap();
        assert_eq!(s.finish_fight(fight).unwrap(), FightOutcome::Lost);
        assert!(s.is_defeated());
    }
}
