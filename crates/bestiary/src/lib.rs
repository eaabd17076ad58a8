//! Monster generation and the roster of monsters roaming the map.
use bracket_lib::prelude::RandomNumberGenerator;
use common::{GameError, GameResult, Point};
use data::{Archetype, MonsterKind};
use mapgen::Map;
use serde::{Deserialize, Serialize};

/// A monster instance with rolled stats.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub name: MonsterKind,
    pub description: String,
    pub health: i32,
    pub power: i32,
    pub bounty: i32,
}

impl Monster {
    /// Returns whether the monster still has health left.
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Applies `damage`, never dropping health below zero.
    pub fn take_damage(&mut self, damage: i32) {
        self.health = (self.health - damage.max(0)).max(0);
    }
}

/// Validated archetype table.
#[derive(Clone, Debug)]
pub struct Bestiary {
    archetypes: Vec<Archetype>,
}

impl Bestiary {
    /// Wraps a non-empty archetype table.
    pub fn new(archetypes: Vec<Archetype>) -> GameResult<Self> {
        if archetypes.is_empty() {
            return Err(GameError::InvalidOperation);
        }
        Ok(Self { archetypes })
    }

    /// Loads the archetypes shipped with the game.
    pub fn embedded() -> GameResult<Self> {
        Self::new(data::load_archetypes_embedded()?)
    }

    /// All archetypes in table order.
    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    /// Picks an archetype uniformly and rolls each stat independently.
    pub fn generate(&self, rng: &mut RandomNumberGenerator) -> Monster {
        let idx = rng.range(0, self.archetypes.len());
        let archetype = &self.archetypes[idx];
        let monster = Monster {
            name: archetype.name,
            description: archetype.description.clone(),
            health: roll(rng, archetype.health),
            power: roll(rng, archetype.power),
            bounty: roll(rng, archetype.bounty),
        };
        log::debug!(
            "generated {} hp={} power={} bounty={}",
            monster.name,
            monster.health,
            monster.power,
            monster.bounty
        );
        monster
    }
}

/// Uniform draw from an inclusive range.
fn roll(rng: &mut RandomNumberGenerator, (lo, hi): (i32, i32)) -> i32 {
    rng.range(lo, hi + 1)
}

/// A monster placed on the map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(flatten)]
    pub monster: Monster,
    pub pos: Point,
    pub alive: bool,
}

/// Places `count` monsters on free grass cells, never on `player` or each other.
pub fn spawn_roster(
    map: &Map,
    bestiary: &Bestiary,
    rng: &mut RandomNumberGenerator,
    count: usize,
    player: Point,
) -> GameResult<Vec<RosterEntry>> {
    let mut roster: Vec<RosterEntry> = Vec::with_capacity(count);
    for _ in 0..count {
        let mut occupied: Vec<Point> = roster.iter().map(|m| m.pos).collect();
        occupied.push(player);
        let pos = pick_free_cell(map, rng, &occupied)?;
        roster.push(RosterEntry {
            monster: bestiary.generate(rng),
            pos,
            alive: true,
        });
    }
    log::info!("spawned {} monsters", roster.len());
    Ok(roster)
}

fn pick_free_cell(map: &Map, rng: &mut RandomNumberGenerator, occupied: &[Point]) -> GameResult<Point> {
    let cells = map.free_cells(occupied);
    if cells.is_empty() {
        return Err(GameError::InvalidOperation);
    }
    Ok(cells[rng.range(0, cells.len())])
}

/// Index of the living monster standing on `pt`.
pub fn monster_at(roster: &[RosterEntry], pt: Point) -> Option<usize> {
    roster.iter().position(|m| m.alive && m.pos == pt)
}

/// Moves every living monster one random step.
///
/// Steps off the map, onto the town, onto the player or onto another
/// monster are skipped, so a monster never walks into a fight by itself.
pub fn wander(map: &Map, roster: &mut [RosterEntry], rng: &mut RandomNumberGenerator, player: Point) {
    for i in 0..roster.len() {
        if !roster[i].alive {
            continue;
        }
        let dx = rng.range(-1, 2);
        let dy = rng.range(-1, 2);
        let next = map.clamp(roster[i].pos.offset(Point::new(dx, dy)));
        let blocked = next == map.town()
            || next == player
            || roster
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && other.alive && other.pos == next);
        if !blocked {
            roster[i].pos = next;
        }
    }
}

/// Replaces the monster at `idx` with a fresh one on a free cell.
pub fn respawn(
    map: &Map,
    roster: &mut [RosterEntry],
    idx: usize,
    bestiary: &Bestiary,
    rng: &mut RandomNumberGenerator,
    player: Point,
) -> GameResult<()> {
    let mut occupied: Vec<Point> = roster
        .iter()
        .enumerate()
        .filter(|(j, m)| *j != idx && m.alive)
        .map(|(_, m)| m.pos)
        .collect();
    occupied.push(player);
    let pos = pick_free_cell(map, rng, &occupied)?;
    let entry = roster.get_mut(idx).ok_or(GameError::InvalidOperation)?;
    entry.monster = bestiary.generate(rng);
    entry.pos = pos;
    entry.alive = true;
    log::info!("a {} appears at ({}, {})", entry.monster.name, pos.x, pos.y);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapgen::{generate, TileKind};

    fn bestiary() -> Bestiary {
        Bestiary::embedded().expect("bestiary")
    }

    #[test]
    fn empty_table_rejected() {
        assert!(Bestiary::new(Vec::new()).is_err());
    }

    #[test]
    fn stats_within_archetype_ranges() {
        let b = bestiary();
        let mut rng = RandomNumberGenerator::seeded(7);
        for _ in 0..200 {
            let m = b.generate(&mut rng);
            let a = b.archetypes().iter().find(|a| a.name == m.name).unwrap();
            assert!(m.health >= a.health.0 && m.health <= a.health.1);
            assert!(m.power >= a.power.0 && m.power <= a.power.1);
            assert!(m.bounty >= a.bounty.0 && m.bounty <= a.bounty.1);
            assert_eq!(m.description, a.description);
        }
    }

    #[test]
    fn every_archetype_appears() {
        let b = bestiary();
        let mut rng = RandomNumberGenerator::seeded(3);
        let mut seen = Vec::new();
        for _ in 0..300 {
            let m = b.generate(&mut rng);
            if !seen.contains(&m.name) {
                seen.push(m.name);
            }
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn same_seed_same_monster() {
        let b = bestiary();
        let mut a = RandomNumberGenerator::seeded(42);
        let mut c = RandomNumberGenerator::seeded(42);
        assert_eq!(b.generate(&mut a), b.generate(&mut c));
    }

    #[test]
    fn damage_clamps_at_zero() {
        let mut m = bestiary().generate(&mut RandomNumberGenerator::seeded(1));
        m.take_damage(10_000);
        assert_eq!(m.health, 0);
        assert!(!m.is_alive());
    }

    #[test]
    fn roster_spawns_on_free_grass() {
        let map = generate().unwrap();
        let mut rng = RandomNumberGenerator::seeded(5);
        let player = map.town();
        let roster = spawn_roster(&map, &bestiary(), &mut rng, 4, player).unwrap();
        assert_eq!(roster.len(), 4);
        for (i, m) in roster.iter().enumerate() {
            assert!(m.alive);
            assert_eq!(map.tiles[map.idx(m.pos)], TileKind::Grass);
            assert!(roster.iter().skip(i + 1).all(|o| o.pos != m.pos));
        }
    }

    #[test]
    fn wander_stays_on_map_and_off_town() {
        let map = generate().unwrap();
        let mut rng = RandomNumberGenerator::seeded(9);
        let player = Point::new(10, 6);
        let mut roster = spawn_roster(&map, &bestiary(), &mut rng, 5, player).unwrap();
        for _ in 0..50 {
            wander(&map, &mut roster, &mut rng, player);
            for m in &roster {
                assert!(map.in_bounds(m.pos));
                assert_ne!(m.pos, map.town());
                assert_ne!(m.pos, player);
            }
        }
    }

    #[test]
    fn dead_monsters_do_not_move_or_block() {
        let map = generate().unwrap();
        let mut rng = RandomNumberGenerator::seeded(11);
        let mut roster = spawn_roster(&map, &bestiary(), &mut rng, 1, map.town()).unwrap();
        roster[0].alive = false;
        let pos = roster[0].pos;
        wander(&map, &mut roster, &mut rng, map.town());
        assert_eq!(roster[0].pos, pos);
        assert_eq!(monster_at(&roster, pos), None);
    }

    #[test]
    fn respawn_revives_with_new_position() {
        let map = generate().unwrap();
        let mut rng = RandomNumberGenerator::seeded(13);
        let b = bestiary();
        let mut roster = spawn_roster(&map, &b, &mut rng, 2, map.town()).unwrap();
        roster[1].alive = false;
        roster[1].monster.health = 0;
        respawn(&map, &mut roster, 1, &b, &mut rng, map.town()).unwrap();
        assert!(roster[1].alive);
        assert!(roster[1].monster.health > 0);
        assert_ne!(roster[1].pos, roster[0].pos);
    }

    #[test]
    fn roster_entry_flattens_monster_fields() {
        let entry = RosterEntry {
            monster: Monster {
                name: MonsterKind::Goblin,
                description: "g".into(),
                health: 3,
                power: 4,
                bounty: 5,
            },
            pos: Point::new(1, 2),
            alive: true,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["name"], "Goblin");
        assert_eq!(json["health"], 3);
        assert_eq!(json["pos"], serde_json::json!([1, 2]));
        assert_eq!(json["alive"], true);
    }
}
