//! Purchases and shop offers.

use bracket_lib::prelude::RandomNumberGenerator;
use common::{GameError, GameResult};
use data::Catalog;
use inventory::{Gear, Inventory};

/// Buys as many of `requested_qty` units as `available_gold` allows.
///
/// Returns `(bought, remaining_gold)`. A purchase never rounds up and never
/// leaves negative gold. Negative gold or a non-positive quantity buys
/// nothing.
pub fn purchase(unit_price: i32, available_gold: i32, requested_qty: i32) -> GameResult<(i32, i32)> {
    if unit_price <= 0 {
        return Err(GameError::InvalidPrice(unit_price));
    }
    let gold = available_gold.max(0);
    let wanted = requested_qty.max(0);
    let bought = match unit_price.checked_mul(wanted) {
        Some(total) if total <= gold => wanted,
        _ => gold / unit_price,
    };
    Ok((bought, gold - bought * unit_price))
}

/// Something the shop can sell, resolved once when the offer is drawn.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemOffer {
    Potion { name: String, price_range: (f64, f64) },
    Gear(Gear),
}

impl ItemOffer {
    pub fn name(&self) -> &str {
        match self {
            ItemOffer::Potion { name, .. } => name,
            ItemOffer::Gear(g) => &g.name,
        }
    }
}

/// One priced line of a shop offer.
#[derive(Clone, Debug, PartialEq)]
pub struct OfferEntry {
    pub item: ItemOffer,
    /// Displayed price, rounded to cents.
    pub price: f64,
}

impl OfferEntry {
    /// Gold charged per unit: the whole part of the displayed price.
    pub fn unit_price(&self) -> i32 {
        self.price.trunc() as i32
    }
}

/// Two distinct entries on display in the shop.
#[derive(Clone, Debug, PartialEq)]
pub struct ShopOffer {
    pub entries: [OfferEntry; 2],
}

impl ShopOffer {
    /// Finds the entry called `choice`, ignoring case and surrounding spaces.
    pub fn find(&self, choice: &str) -> Option<&OfferEntry> {
        let choice = choice.trim();
        self.entries
            .iter()
            .find(|e| e.item.name().eq_ignore_ascii_case(choice))
    }
}

/// Outcome of a shop transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub name: String,
    pub requested: i32,
    pub bought: i32,
    pub spent: i32,
    pub remaining_gold: i32,
}

fn offer_pool(catalog: &Catalog) -> Vec<ItemOffer> {
    let mut pool: Vec<ItemOffer> = catalog
        .potions
        .iter()
        .map(|p| ItemOffer::Potion {
            name: p.name.clone(),
            price_range: p.price,
        })
        .collect();
    for _ in 0..catalog.gear_weight.max(1) {
        pool.extend(catalog.gear.iter().map(|g| ItemOffer::Gear(Gear::from_template(g))));
    }
    pool
}

fn price_for(item: &ItemOffer, catalog: &Catalog, rng: &mut RandomNumberGenerator) -> f64 {
    match item {
        ItemOffer::Potion {
            price_range: (lo, hi),
            ..
        } => {
            let raw = if hi > lo { rng.range(*lo, *hi) } else { *lo };
            (raw * 100.0).round() / 100.0
        }
        ItemOffer::Gear(_) => {
            let (lo, hi) = catalog.gear_price;
            rng.range(lo, hi + 1) as f64
        }
    }
}

/// Draws two differently named entries from the weighted pool and prices them.
pub fn generate_offer(rng: &mut RandomNumberGenerator, catalog: &Catalog) -> GameResult<ShopOffer> {
    let pool = offer_pool(catalog);
    let first = pool[rng.range(0, pool.len())].clone();
    let rest: Vec<&ItemOffer> = pool.iter().filter(|i| i.name() != first.name()).collect();
    if rest.is_empty() {
        return Err(GameError::InvalidOperation);
    }
    let second = rest[rng.range(0, rest.len())].clone();
    let entries = [first, second].map(|item| OfferEntry {
        price: price_for(&item, catalog, rng),
        item,
    });
    log::debug!(
        "shop offers {} at {:.2} and {} at {:.2}",
        entries[0].item.name(),
        entries[0].price,
        entries[1].item.name(),
        entries[1].price
    );
    Ok(ShopOffer { entries })
}

/// Buys `qty` of the offered item named `choice` and stocks the inventory.
///
/// Gear is added as independent copies, one per unit bought.
pub fn buy(
    offer: &ShopOffer,
    choice: &str,
    qty: i32,
    gold: i32,
    inventory: &mut Inventory,
) -> GameResult<PurchaseReceipt> {
    let entry = offer
        .find(choice)
        .ok_or_else(|| GameError::UnknownItem(choice.trim().to_string()))?;
    let unit_price = entry.unit_price();
    let (bought, remaining_gold) = purchase(unit_price, gold, qty)?;
    match &entry.item {
        ItemOffer::Potion { name, .. } => {
            if bought > 0 {
                inventory.add_potion(name, bought as u32);
            }
        }
        ItemOffer::Gear(template) => {
            for _ in 0..bought {
                inventory.add_gear(template.clone());
            }
        }
    }
    let receipt = PurchaseReceipt {
        name: entry.item.name().to_string(),
        requested: qty,
        bought,
        spent: bought * unit_price,
        remaining_gold,
    };
    log::info!(
        "bought {}/{} {} for {} gold",
        receipt.bought,
        receipt.requested,
        receipt.name,
        receipt.spent
    );
    Ok(receipt)
}
