//! Player inventory, gear and vital status.

use std::collections::BTreeMap;

use data::{GearKind, GearTemplate};
use serde::{Deserialize, Serialize};

/// Highest hit point value a player can reach.
pub const MAX_HP: i32 = 30;
/// Default chance of landing a critical hit.
pub const DEFAULT_LUCK: f64 = 0.1;

/// Identity of one owned gear instance. Zero means "not yet assigned".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GearId(pub u32);

/// A weapon or consumable owned by the player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gear {
    #[serde(default)]
    pub id: GearId,
    pub name: String,
    pub kind: GearKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_durability: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_durability: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Gear {
    /// Creates an unowned, factory-fresh copy of a catalog entry.
    pub fn from_template(t: &GearTemplate) -> Self {
        Self {
            id: GearId::default(),
            name: t.name.clone(),
            kind: t.kind,
            max_durability: t.max_durability,
            current_durability: t.max_durability,
            note: t.note.clone(),
        }
    }

    pub fn is_weapon(&self) -> bool {
        self.kind == GearKind::Weapon
    }

    fn matches(&self, name: &str, kind: GearKind) -> bool {
        self.kind == kind && self.name.eq_ignore_ascii_case(name)
    }
}

/// Result of wearing down the equipped weapon by one attack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WeaponWear {
    /// Nothing is equipped.
    Unarmed,
    /// The weapon survived with `remaining` durability (`None` if unbreakable).
    Worn { name: String, remaining: Option<i32> },
    /// Durability hit zero: the weapon is gone from the inventory.
    Broke { name: String },
}

/// Potion stock and owned gear.
///
/// The equipped weapon is tracked by [`GearId`] into the gear list, so
/// removing that gear clears the reference in the same call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inventory {
    potions: BTreeMap<String, u32>,
    gear: Vec<Gear>,
    equipped: Option<GearId>,
    next_id: u32,
}

impl Inventory {
    /// Rebuilds an inventory from saved parts.
    ///
    /// Missing or duplicate gear ids are reassigned. The equipped weapon is
    /// matched by id first, then by name and durability; a weapon that is no
    /// longer in the list stays unequipped.
    pub fn restore(potions: BTreeMap<String, u32>, gear: Vec<Gear>, equipped: Option<&Gear>) -> Self {
        let mut inv = Self {
            potions,
            ..Self::default()
        };
        inv.next_id = gear.iter().map(|g| g.id.0).max().unwrap_or(0);
        let mut seen = Vec::new();
        for mut g in gear {
            if g.id.0 == 0 || seen.contains(&g.id) {
                g.id = inv.fresh_id();
            }
            seen.push(g.id);
            inv.gear.push(g);
        }
        if let Some(want) = equipped {
            let by_id = inv
                .gear
                .iter()
                .find(|g| want.id.0 != 0 && g.id == want.id && g.is_weapon());
            let found = by_id.or_else(|| {
                inv.gear.iter().find(|g| {
                    g.matches(&want.name, GearKind::Weapon)
                        && g.current_durability == want.current_durability
                })
            });
            inv.equipped = found.map(|g| g.id);
            if inv.equipped.is_none() {
                log::warn!("equipped {} not found in gear, unequipping", want.name);
            }
        }
        inv
    }

    fn fresh_id(&mut self) -> GearId {
        self.next_id += 1;
        GearId(self.next_id)
    }

    /// Adds `qty` potions of `name`.
    pub fn add_potion(&mut self, name: &str, qty: u32) {
        *self.potions.entry(name.to_string()).or_insert(0) += qty;
    }

    /// Uses one potion. Returns `false` if none are held.
    pub fn consume_potion(&mut self, name: &str) -> bool {
        match self.potions.get_mut(name) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Number of `name` potions held.
    pub fn potion_count(&self, name: &str) -> u32 {
        self.potions.get(name).copied().unwrap_or(0)
    }

    /// Potion stock by name, including emptied entries.
    pub fn potions(&self) -> &BTreeMap<String, u32> {
        &self.potions
    }

    /// Owned gear in purchase order.
    pub fn gear(&self) -> &[Gear] {
        &self.gear
    }

    /// Takes ownership of `item` under a fresh identity.
    pub fn add_gear(&mut self, mut item: Gear) -> GearId {
        item.id = self.fresh_id();
        let id = item.id;
        self.gear.push(item);
        id
    }

    /// Removes gear by identity, unequipping it if needed.
    pub fn remove_gear(&mut self, id: GearId) -> Option<Gear> {
        let idx = self.gear.iter().position(|g| g.id == id)?;
        if self.equipped == Some(id) {
            self.equipped = None;
        }
        Some(self.gear.remove(idx))
    }

    /// Equips the first weapon named `name` (case-insensitive).
    ///
    /// The weapon stays in the gear list.
    pub fn equip_weapon(&mut self, name: &str) -> Option<Gear> {
        let weapon = self.gear.iter().find(|g| g.matches(name, GearKind::Weapon))?;
        self.equipped = Some(weapon.id);
        Some(weapon.clone())
    }

    /// Currently equipped weapon.
    pub fn equipped_weapon(&self) -> Option<&Gear> {
        let id = self.equipped?;
        self.gear.iter().find(|g| g.id == id)
    }

    /// First consumable named `name` (case-insensitive).
    pub fn find_consumable(&self, name: &str) -> Option<Gear> {
        self.gear
            .iter()
            .find(|g| g.matches(name, GearKind::Consumable))
            .cloned()
    }

    /// Wears the equipped weapon by one point, destroying it at zero.
    pub fn wear_equipped(&mut self) -> WeaponWear {
        let Some(id) = self.equipped else {
            return WeaponWear::Unarmed;
        };
        let Some(weapon) = self.gear.iter_mut().find(|g| g.id == id) else {
            self.equipped = None;
            return WeaponWear::Unarmed;
        };
        let name = weapon.name.clone();
        let Some(durability) = weapon.current_durability.as_mut() else {
            return WeaponWear::Worn { name, remaining: None };
        };
        *durability = (*durability - 1).max(0);
        let remaining = *durability;
        if remaining == 0 {
            self.remove_gear(id);
            log::info!("{} broke", name);
            WeaponWear::Broke { name }
        } else {
            WeaponWear::Worn {
                name,
                remaining: Some(remaining),
            }
        }
    }
}

/// Vital status of the player.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerStatus {
    hp: i32,
    /// Probability of a critical hit.
    pub luck: f64,
}

impl Default for PlayerStatus {
    fn default() -> Self {
        Self {
            hp: MAX_HP,
            luck: DEFAULT_LUCK,
        }
    }
}

impl PlayerStatus {
    /// Creates a status with clamped `hp`.
    pub fn new(hp: i32, luck: f64) -> Self {
        let mut status = Self { hp: 0, luck };
        status.set_hp(hp);
        status
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    /// Sets hit points, clamped to `0..=MAX_HP`.
    pub fn set_hp(&mut self, hp: i32) {
        self.hp = hp.clamp(0, MAX_HP);
    }

    /// Heals up to `amount`, returning the points actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let healed = amount.max(0).min(MAX_HP - self.hp);
        self.set_hp(self.hp + healed);
        healed
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.set_hp(self.hp - amount.max(0));
    }

    pub fn restore_full(&mut self) {
        self.hp = MAX_HP;
    }

    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }
}
