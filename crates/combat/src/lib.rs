//! Turn-based combat between the player and a single monster.

use std::fmt;
use std::str::FromStr;

use bestiary::Monster;
use bracket_lib::prelude::RandomNumberGenerator;
use common::{GameError, GameResult};
use data::MonsterKind;
use inventory::{Inventory, PlayerStatus, WeaponWear};

/// Inclusive range of the unmodified attack roll.
pub const BASE_DAMAGE: (i32, i32) = (5, 25);
pub const STRENGTH_BONUS: i32 = 5;
pub const WEAPON_BONUS: i32 = 10;
pub const DEFENSE_REDUCTION: i32 = 5;
pub const HEAL_AMOUNT: i32 = 15;

pub const HEALTH_POTION: &str = "Health Potion";
pub const STRENGTH_POTION: &str = "Strength Potion";
pub const DEFENSE_POTION: &str = "Defense Potion";
pub const MAGIC_GEM: &str = "Magic Gem";

/// Where an encounter stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombatState {
    /// The monster has appeared; no action taken yet.
    EncounterStart,
    /// Waiting for the player's next action.
    PlayerTurn,
    /// The monster is dead and its bounty is owed.
    Victory,
    /// The player has no hit points left.
    Defeat,
    /// The player ran away.
    Fled,
}

impl CombatState {
    pub fn is_terminal(self) -> bool {
        matches!(self, CombatState::Victory | CombatState::Defeat | CombatState::Fled)
    }
}

/// A single player decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Attack,
    /// Drink a potion by name.
    UseItem(String),
    /// Equip a weapon by name.
    Equip(String),
    /// Activate a consumable by name.
    Activate(String),
    Run,
}

impl FromStr for Action {
    type Err = GameError;

    /// Parses menu input such as `attack`, `use health potion` or `run`.
    fn from_str(s: &str) -> GameResult<Self> {
        let s = s.trim();
        let (verb, rest) = match s.split_once(char::is_whitespace) {
            Some((v, r)) => (v, r.trim()),
            None => (s, ""),
        };
        let needs_item = |make: fn(String) -> Action| {
            if rest.is_empty() {
                Err(GameError::InvalidAction(s.to_string()))
            } else {
                Ok(make(rest.to_string()))
            }
        };
        match verb.to_ascii_lowercase().as_str() {
            "attack" | "a" if rest.is_empty() => Ok(Action::Attack),
            "run" | "r" | "flee" if rest.is_empty() => Ok(Action::Run),
            "use" | "drink" => needs_item(Action::UseItem),
            "equip" => needs_item(Action::Equip),
            "activate" => needs_item(Action::Activate),
            _ => Err(GameError::InvalidAction(s.to_string())),
        }
    }
}

/// Something that happened while resolving a turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CombatEvent {
    Critical,
    StrengthBoost,
    WeaponStrike { name: String, remaining: Option<i32> },
    WeaponBroke { name: String },
    Hit { damage: i32, monster_health: i32 },
    Retaliation { by: MonsterKind, damage: i32, shielded: bool },
    Healed { amount: i32 },
    /// A potion whose effect applies by itself during attacks.
    PassivePotion { name: String },
    NoEffect { name: String },
    Equipped { name: String },
    GemShattered { name: String },
    MonsterSlain { by: MonsterKind, bounty: i32 },
    PlayerFell,
    Fled,
}

impl fmt::Display for CombatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombatEvent::Critical => write!(f, "Critical hit!"),
            CombatEvent::StrengthBoost => write!(f, "A Strength Potion surges through you (+{}).", STRENGTH_BONUS),
            CombatEvent::WeaponStrike { name, remaining: Some(r) } => {
                write!(f, "Your {} strikes (+{}, {} uses left).", name, WEAPON_BONUS, r)
            }
            CombatEvent::WeaponStrike { name, remaining: None } => {
                write!(f, "Your {} strikes (+{}).", name, WEAPON_BONUS)
            }
            CombatEvent::WeaponBroke { name } => write!(f, "Your {} breaks!", name),
            CombatEvent::Hit { damage, monster_health } => {
                write!(f, "You deal {} damage ({} left).", damage, monster_health)
            }
            CombatEvent::Retaliation { by, damage, shielded: true } => {
                write!(f, "A Defense Potion softens the blow: the {} hits for {}.", by, damage)
            }
            CombatEvent::Retaliation { by, damage, shielded: false } => {
                write!(f, "The {} hits you for {}.", by, damage)
            }
            CombatEvent::Healed { amount } => write!(f, "You recover {} HP.", amount),
            CombatEvent::PassivePotion { name } => {
                write!(f, "Your {} takes effect on its own when it matters.", name)
            }
            CombatEvent::NoEffect { name } => write!(f, "The {} has no effect in battle.", name),
            CombatEvent::Equipped { name } => write!(f, "You equip the {}.", name),
            CombatEvent::GemShattered { name } => write!(f, "The {} flares and shatters!", name),
            CombatEvent::MonsterSlain { by, bounty } => {
                write!(f, "The {} is defeated! You earn {} gold.", by, bounty)
            }
            CombatEvent::PlayerFell => write!(f, "You have been defeated..."),
            CombatEvent::Fled => write!(f, "You run away."),
        }
    }
}

/// Outcome of one resolved action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnReport {
    pub state: CombatState,
    pub events: Vec<CombatEvent>,
}

/// Resolves one player action against `monster`.
///
/// Item actions naming something the player does not hold fail with
/// [`GameError::UnknownItem`] and change nothing.
pub fn resolve_turn(
    action: &Action,
    monster: &mut Monster,
    inventory: &mut Inventory,
    status: &mut PlayerStatus,
    rng: &mut RandomNumberGenerator,
) -> GameResult<TurnReport> {
    let mut events = Vec::new();
    let state = match action {
        Action::Attack => attack(monster, inventory, status, rng, &mut events),
        Action::UseItem(name) => {
            use_potion(name, inventory, status, &mut events)?;
            CombatState::PlayerTurn
        }
        Action::Equip(name) => {
            let weapon = inventory
                .equip_weapon(name)
                .ok_or_else(|| GameError::UnknownItem(name.clone()))?;
            events.push(CombatEvent::Equipped { name: weapon.name });
            CombatState::PlayerTurn
        }
        Action::Activate(name) => activate(name, monster, inventory, &mut events)?,
        Action::Run => {
            events.push(CombatEvent::Fled);
            CombatState::Fled
        }
    };
    log::debug!("{:?} -> {:?}", action, state);
    Ok(TurnReport { state, events })
}

fn attack(
    monster: &mut Monster,
    inventory: &mut Inventory,
    status: &mut PlayerStatus,
    rng: &mut RandomNumberGenerator,
    events: &mut Vec<CombatEvent>,
) -> CombatState {
    let mut damage = rng.range(BASE_DAMAGE.0, BASE_DAMAGE.1 + 1);
    if rng.range(0.0_f64, 1.0) < status.luck {
        damage *= 2;
        events.push(CombatEvent::Critical);
    }
    if inventory.consume_potion(STRENGTH_POTION) {
        damage += STRENGTH_BONUS;
        events.push(CombatEvent::StrengthBoost);
    }
    match inventory.wear_equipped() {
        WeaponWear::Unarmed => {}
        WeaponWear::Worn { name, remaining } => {
            damage += WEAPON_BONUS;
            events.push(CombatEvent::WeaponStrike { name, remaining });
        }
        WeaponWear::Broke { name } => {
            damage += WEAPON_BONUS;
            events.push(CombatEvent::WeaponBroke { name });
        }
    }
    monster.take_damage(damage);
    events.push(CombatEvent::Hit {
        damage,
        monster_health: monster.health,
    });
    if !monster.is_alive() {
        events.push(CombatEvent::MonsterSlain {
            by: monster.name,
            bounty: monster.bounty,
        });
        return CombatState::Victory;
    }

    let shielded = inventory.consume_potion(DEFENSE_POTION);
    let retaliation = if shielded {
        (monster.power - DEFENSE_REDUCTION).max(0)
    } else {
        monster.power
    };
    status.take_damage(retaliation);
    events.push(CombatEvent::Retaliation {
        by: monster.name,
        damage: retaliation,
        shielded,
    });
    if status.is_defeated() {
        events.push(CombatEvent::PlayerFell);
        CombatState::Defeat
    } else {
        CombatState::PlayerTurn
    }
}

fn use_potion(
    name: &str,
    inventory: &mut Inventory,
    status: &mut PlayerStatus,
    events: &mut Vec<CombatEvent>,
) -> GameResult<()> {
    let held = inventory
        .potions()
        .iter()
        .find(|(n, count)| **count > 0 && n.eq_ignore_ascii_case(name.trim()))
        .map(|(n, _)| n.clone())
        .ok_or_else(|| GameError::UnknownItem(name.to_string()))?;
    match held.as_str() {
        HEALTH_POTION => {
            inventory.consume_potion(&held);
            let amount = status.heal(HEAL_AMOUNT);
            events.push(CombatEvent::Healed { amount });
        }
        STRENGTH_POTION | DEFENSE_POTION => events.push(CombatEvent::PassivePotion { name: held }),
        _ => events.push(CombatEvent::NoEffect { name: held }),
    }
    Ok(())
}

fn activate(
    name: &str,
    monster: &mut Monster,
    inventory: &mut Inventory,
    events: &mut Vec<CombatEvent>,
) -> GameResult<CombatState> {
    let item = inventory
        .find_consumable(name)
        .ok_or_else(|| GameError::UnknownItem(name.to_string()))?;
    inventory.remove_gear(item.id);
    if !item.name.eq_ignore_ascii_case(MAGIC_GEM) {
        events.push(CombatEvent::NoEffect { name: item.name });
        return Ok(CombatState::PlayerTurn);
    }
    events.push(CombatEvent::GemShattered { name: item.name });
    monster.take_damage(monster.health);
    events.push(CombatEvent::MonsterSlain {
        by: monster.name,
        bounty: monster.bounty,
    });
    Ok(CombatState::Victory)
}

/// A fight in progress against one monster.
#[derive(Clone, Debug)]
pub struct Encounter {
    pub monster: Monster,
    state: CombatState,
    turns: u32,
}

impl Encounter {
    pub fn new(monster: Monster) -> Self {
        log::info!("encounter with a {} (hp {})", monster.name, monster.health);
        Self {
            monster,
            state: CombatState::EncounterStart,
            turns: 0,
        }
    }

    pub fn state(&self) -> CombatState {
        self.state
    }

    /// Number of resolved actions.
    pub fn turns(&self) -> u32 {
        self.turns
    }

    /// Gold owed to the player: the bounty on victory, zero otherwise.
    pub fn reward(&self) -> i32 {
        if self.state == CombatState::Victory {
            self.monster.bounty
        } else {
            0
        }
    }

    /// Applies `action` and advances the state machine.
    pub fn update(
        &mut self,
        action: &Action,
        inventory: &mut Inventory,
        status: &mut PlayerStatus,
        rng: &mut RandomNumberGenerator,
    ) -> GameResult<TurnReport> {
        if self.state.is_terminal() {
            return Err(GameError::InvalidOperation);
        }
        if status.is_defeated() {
            self.state = CombatState::Defeat;
            return Ok(TurnReport {
                state: self.state,
                events: vec![CombatEvent::PlayerFell],
            });
        }
        self.state = CombatState::PlayerTurn;
        let report = resolve_turn(action, &mut self.monster, inventory, status, rng)?;
        self.turns += 1;
        self.state = report.state;
        Ok(report)
    }
}
