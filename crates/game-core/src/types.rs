use economy::ShopOffer;

use crate::session::Fight;

/// Where the player is in the shop dialogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShopStep {
    Choose,
    /// An entry is picked; waiting for a quantity.
    Quantity { index: usize },
}

/// Why a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    Quit,
    Defeated,
}

/// Current game mode.
#[derive(Clone, Debug)]
pub enum GameMode {
    Town,
    Shop { offer: ShopOffer, step: ShopStep },
    Exploring,
    Combat(Box<Fight>),
    Inventory { from_town: bool },
    End { reason: EndReason },
}
