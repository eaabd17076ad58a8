//! Game engine entry point.

mod app;
mod config;
mod input;
mod save;
mod session;
mod types;

use bracket_lib::prelude::*;

use combat::{Action, HEALTH_POTION, MAGIC_GEM};
use common::{GameError, GameResult, Point};
use mapgen::TileKind;
use ui::{ColorPalette, UIContext, UILayout};

const SAVE_PATH: &str = "questvale_save.json";
#[cfg(not(target_arch = "wasm32"))]
const CONFIG_PATH: &str = "questvale.toml";
const MAX_QUANTITY: u8 = 9;

pub use app::QuestApp;
pub use config::{GameConfig, GameSettings, PlayerConfig};
pub use input::{InputConfig, KeyBindings};
pub use save::{load_or_new, SaveFile};
pub use session::{Fight, FightOutcome, GameSession, MoveEvent, RestOutcome};
pub use types::{EndReason, GameMode, ShopStep};

/// Interactive game implementing [`GameState`].
pub struct QuestGame {
    session: GameSession,
    ui: UIContext,
    input: InputConfig,
    palette: ColorPalette,
    mode: GameMode,
    save_path: String,
    rest_cost: i32,
}

impl QuestGame {
    /// Wraps `session` with the settings from `config`.
    pub fn new(session: GameSession, config: &GameConfig) -> GameResult<Self> {
        let palette = if config.game.colorblind {
            ColorPalette::colorblind()
        } else {
            ColorPalette::default()
        };
        let mut game = Self {
            session,
            ui: UIContext::default(),
            input: config.input()?,
            palette,
            mode: GameMode::Town,
            save_path: config.game.save_path.clone(),
            rest_cost: config.game.rest_cost,
        };
        game.say(&format!("Welcome to Questvale, {}!", game.session.player_name));
        Ok(game)
    }

    /// Starts a brand new game.
    pub fn new_game(config: &GameConfig) -> GameResult<Self> {
        let session = GameSession::new_with_rng(&config.player.name, config.rng(), config.game.monsters)?;
        Self::new(session, config)
    }

    /// Continues from the configured save, or starts over if it cannot be read.
    pub fn continue_game(config: &GameConfig) -> GameResult<Self> {
        let (session, failure) = load_or_new(config)?;
        let mut game = Self::new(session, config)?;
        if let Some(e) = failure {
            game.say(&format!("Could not load your save ({}). A new adventure begins.", e));
        }
        Ok(game)
    }

    /// Returns the current game mode.
    pub fn mode(&self) -> &GameMode {
        &self.mode
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    fn say(&mut self, msg: &str) {
        self.ui.add_log(msg).ok();
    }

    fn save_game(&mut self) -> bool {
        match self.session.save(&self.save_path) {
            Ok(()) => {
                self.say("Game saved.");
                true
            }
            Err(e) => {
                log::error!("save failed: {}", e);
                self.say(&format!("Could not save: {}", e));
                false
            }
        }
    }

    /// Mode to return to after leaving a menu or a fight.
    fn field_mode(&self) -> GameMode {
        if self.session.in_town() {
            GameMode::Town
        } else {
            GameMode::Exploring
        }
    }

    fn sync_layout(&mut self) {
        let layout = match self.mode {
            GameMode::Town | GameMode::End { .. } => UILayout::Town,
            GameMode::Shop { .. } => UILayout::Shop,
            GameMode::Exploring => UILayout::Map,
            GameMode::Combat(_) => UILayout::Combat,
            GameMode::Inventory { .. } => UILayout::Inventory,
        };
        self.ui.set_layout(layout);
    }

    pub(crate) fn handle_input_key(&mut self, key: Option<VirtualKeyCode>) {
        let Some(key) = key else {
            return;
        };
        if self.ui.layout() == UILayout::Help {
            self.sync_layout();
            return;
        }
        if key == self.input.help {
            self.ui.set_layout(UILayout::Help);
            return;
        }
        if key == self.input.scroll_up {
            self.ui.scroll_up();
            return;
        }
        if key == self.input.scroll_down {
            self.ui.scroll_down();
            return;
        }
        let mode = std::mem::replace(&mut self.mode, GameMode::Town);
        self.mode = match mode {
            GameMode::Town => self.town_key(key),
            GameMode::Shop { offer, step } => self.shop_key(key, offer, step),
            GameMode::Exploring => self.explore_key(key),
            GameMode::Combat(fight) => self.combat_key(key, fight),
            GameMode::Inventory { from_town } => self.inventory_key(key, from_town),
            end @ GameMode::End { .. } => end,
        };
        self.sync_layout();
    }

    fn town_key(&mut self, key: VirtualKeyCode) -> GameMode {
        if key == self.input.quit || key == VirtualKeyCode::Escape {
            return GameMode::End { reason: EndReason::Quit };
        }
        if key == self.input.inventory {
            return GameMode::Inventory { from_town: true };
        }
        match input::digit(key) {
            Some(1) => match self.session.visit_shop() {
                Ok(offer) => {
                    self.say("Welcome to the shop! Pick an item with 1 or 2.");
                    GameMode::Shop {
                        offer,
                        step: ShopStep::Choose,
                    }
                }
                Err(e) => {
                    log::error!("shop unavailable: {}", e);
                    self.say("The shop is closed.");
                    GameMode::Town
                }
            },
            Some(2) => {
                match self.session.rest_with_cost(self.rest_cost) {
                    RestOutcome::Rested { cost } => {
                        self.say(&format!("You rest at the inn for {} gold and feel refreshed.", cost))
                    }
                    RestOutcome::CannotAfford { cost, gold } => {
                        self.say(&format!("Resting costs {} gold, but you only have {}.", cost, gold))
                    }
                }
                GameMode::Town
            }
            Some(3) => self.leave_town(),
            Some(4) => GameMode::Inventory { from_town: true },
            Some(5) => {
                self.save_game();
                GameMode::Town
            }
            Some(6) => {
                if self.save_game() {
                    GameMode::End { reason: EndReason::Quit }
                } else {
                    GameMode::Town
                }
            }
            _ => {
                self.unknown_command();
                GameMode::Town
            }
        }
    }

    fn unknown_command(&mut self) {
        self.say("Unknown command.");
    }

    fn first_weapon(&self) -> Option<String> {
        self.session
            .inventory
            .gear()
            .iter()
            .find(|g| g.is_weapon())
            .map(|g| g.name.clone())
    }

    /// Equip key swaps weapons; any other key closes the list.
    fn inventory_key(&mut self, key: VirtualKeyCode, from_town: bool) -> GameMode {
        if key != self.input.equip {
            return if from_town {
                GameMode::Town
            } else {
                GameMode::Exploring
            };
        }
        let result = match self.first_weapon() {
            Some(name) => self.session.equip(&name),
            None => Err(GameError::UnknownItem("weapon".into())),
        };
        match result {
            Ok(weapon) => self.say(&format!("You equip the {}.", weapon.name)),
            Err(_) => self.say("You have no weapon to equip."),
        }
        GameMode::Inventory { from_town }
    }

    fn leave_town(&mut self) -> GameMode {
        if self.session.roster().iter().any(|m| m.alive) {
            self.say("You head out into the wilds.");
            return GameMode::Exploring;
        }
        let fight = self.session.random_encounter();
        self.announce(&fight);
        GameMode::Combat(Box::new(fight))
    }

    fn shop_key(&mut self, key: VirtualKeyCode, offer: economy::ShopOffer, step: ShopStep) -> GameMode {
        if key == VirtualKeyCode::Escape || key == self.input.quit {
            self.say("You leave the shop.");
            return GameMode::Town;
        }
        let digit = input::digit(key);
        let step = match step {
            ShopStep::Choose => match digit {
                Some(d @ 1..=2) => {
                    let index = usize::from(d - 1);
                    self.say(&format!(
                        "How many {}? (1-{})",
                        offer.entries[index].item.name(),
                        MAX_QUANTITY
                    ));
                    ShopStep::Quantity { index }
                }
                _ => {
                    self.say("That item isn't in the shop!");
                    ShopStep::Choose
                }
            },
            ShopStep::Quantity { index } => match digit {
                Some(qty @ 1..=MAX_QUANTITY) => {
                    let name = offer.entries[index].item.name().to_string();
                    self.buy(&offer, &name, i32::from(qty));
                    ShopStep::Choose
                }
                _ => {
                    self.say(&format!("Pick a quantity from 1 to {}.", MAX_QUANTITY));
                    ShopStep::Quantity { index }
                }
            },
        };
        GameMode::Shop { offer, step }
    }

    fn buy(&mut self, offer: &economy::ShopOffer, name: &str, qty: i32) {
        match self.session.buy(offer, name, qty) {
            Ok(r) if r.bought == 0 => self.say(&format!("You can't afford any {}.", r.name)),
            Ok(r) if r.bought < r.requested => self.say(&format!(
                "You could only afford {} {} for {} gold.",
                r.bought, r.name, r.spent
            )),
            Ok(r) => self.say(&format!("You bought {} {} for {} gold.", r.bought, r.name, r.spent)),
            Err(GameError::UnknownItem(_)) => self.say("That item isn't in the shop!"),
            Err(e) => self.say(&e.to_string()),
        }
    }

    fn movement_delta(&self, key: VirtualKeyCode) -> Option<Point> {
        let delta = if key == self.input.left || key == VirtualKeyCode::Left {
            Point::new(-1, 0)
        } else if key == self.input.right || key == VirtualKeyCode::Right {
            Point::new(1, 0)
        } else if key == self.input.up || key == VirtualKeyCode::Up {
            Point::new(0, -1)
        } else if key == self.input.down || key == VirtualKeyCode::Down {
            Point::new(0, 1)
        } else {
            return None;
        };
        Some(delta)
    }

    fn explore_key(&mut self, key: VirtualKeyCode) -> GameMode {
        if key == self.input.quit || key == VirtualKeyCode::Escape {
            return GameMode::End { reason: EndReason::Quit };
        }
        if key == self.input.inventory {
            return GameMode::Inventory { from_town: false };
        }
        let Some(delta) = self.movement_delta(key) else {
            self.unknown_command();
            return GameMode::Exploring;
        };
        match self.session.move_player(delta) {
            MoveEvent::Moved => GameMode::Exploring,
            MoveEvent::Blocked => {
                self.say("You can't go that way.");
                GameMode::Exploring
            }
            MoveEvent::ReachedTown => {
                self.say("You return to town.");
                GameMode::Town
            }
            MoveEvent::Encounter(idx) => match self.session.begin_fight(idx) {
                Ok(fight) => {
                    self.announce(&fight);
                    GameMode::Combat(Box::new(fight))
                }
                Err(e) => {
                    log::error!("could not start fight with {}: {}", idx, e);
                    GameMode::Exploring
                }
            },
        }
    }

    fn announce(&mut self, fight: &Fight) {
        let m = &fight.encounter.monster;
        let lines = [
            format!("A wild {} appears!", m.name),
            m.description.clone(),
            format!("Health: {}, Power: {}, Gold: {}", m.health, m.power, m.bounty),
        ];
        for line in &lines {
            self.say(line);
        }
    }

    fn combat_action(&self, key: VirtualKeyCode) -> GameResult<Action> {
        if key == self.input.attack {
            Ok(Action::Attack)
        } else if key == self.input.potion {
            Ok(Action::UseItem(HEALTH_POTION.to_string()))
        } else if key == self.input.equip {
            self.first_weapon()
                .map(Action::Equip)
                .ok_or_else(|| GameError::UnknownItem("weapon".into()))
        } else if key == self.input.gem {
            Ok(Action::Activate(MAGIC_GEM.to_string()))
        } else if key == self.input.run {
            Ok(Action::Run)
        } else {
            Err(GameError::InvalidAction(format!("{:?}", key)))
        }
    }

    fn combat_key(&mut self, key: VirtualKeyCode, mut fight: Box<Fight>) -> GameMode {
        let report = match self
            .combat_action(key)
            .and_then(|action| self.session.fight_turn(&mut fight, &action))
        {
            Ok(report) => report,
            Err(GameError::UnknownItem(name)) => {
                self.say(&format!("You don't have a {}.", name));
                return GameMode::Combat(fight);
            }
            Err(GameError::InvalidAction(_)) => {
                self.unknown_command();
                return GameMode::Combat(fight);
            }
            Err(e) => {
                self.say(&e.to_string());
                return GameMode::Combat(fight);
            }
        };
        for event in &report.events {
            self.say(&event.to_string());
        }
        if !report.state.is_terminal() {
            return GameMode::Combat(fight);
        }
        match self.session.finish_fight(*fight) {
            Ok(FightOutcome::Won { .. }) => self.field_mode(),
            Ok(FightOutcome::Fled) => {
                self.say("You slip away from the fight.");
                self.field_mode()
            }
            Ok(FightOutcome::Lost) => GameMode::End {
                reason: EndReason::Defeated,
            },
            Err(e) => {
                log::error!("could not settle fight: {}", e);
                self.field_mode()
            }
        }
    }

    fn draw_map(&self, ctx: &mut BTerm) {
        let map = self.session.map();
        for y in 0..map.height as i32 {
            for x in 0..map.width as i32 {
                let pt = Point::new(x, y);
                let (glyph, color) = match map.tiles[map.idx(pt)] {
                    TileKind::Grass => ('.', self.palette.grass),
                    TileKind::Town => ('T', self.palette.town),
                };
                ctx.set(x, y, color, RGB::named(BLACK), to_cp437(glyph));
            }
        }
        for m in self.session.roster().iter().filter(|m| m.alive) {
            let glyph = m.monster.name.to_string().chars().next().unwrap_or('M');
            ctx.set(
                m.pos.x,
                m.pos.y,
                self.palette.monster,
                RGB::named(BLACK),
                to_cp437(glyph),
            );
        }
        let pos = self.session.player_pos();
        ctx.set(pos.x, pos.y, self.palette.player, RGB::named(BLACK), to_cp437('@'));
    }

    fn combat_lines(&self, fight: &Fight) -> Vec<String> {
        let m = &fight.encounter.monster;
        vec![
            format!("{} (turn {})", m.name, fight.encounter.turns() + 1),
            format!("Health: {}  Power: {}  Bounty: {}", m.health, m.power, m.bounty),
            String::new(),
            format!(
                "[{:?}] Attack  [{:?}] Health potion  [{:?}] Equip  [{:?}] Magic gem  [{:?}] Run",
                self.input.attack, self.input.potion, self.input.equip, self.input.gem, self.input.run
            ),
        ]
    }

    fn shop_prompt(offer: &economy::ShopOffer, step: ShopStep) -> String {
        match step {
            ShopStep::Choose => "Buy which item? (1/2, Esc to leave)".to_string(),
            ShopStep::Quantity { index } => {
                format!("How many {}? (1-{})", offer.entries[index].item.name(), MAX_QUANTITY)
            }
        }
    }
}

impl GameState for QuestGame {
    fn tick(&mut self, ctx: &mut BTerm) {
        self.handle_input_key(ctx.key);
        ctx.cls();
        if self.ui.layout() == UILayout::Help {
            self.ui.draw_help(ctx).ok();
            return;
        }
        match &self.mode {
            GameMode::Town => {
                self.ui
                    .draw_town(ctx, &self.session.player_name, self.rest_cost)
                    .ok();
            }
            GameMode::Shop { offer, step } => {
                self.ui
                    .draw_shop(ctx, offer, &Self::shop_prompt(offer, *step))
                    .ok();
            }
            GameMode::Exploring => self.draw_map(ctx),
            GameMode::Combat(fight) => {
                self.ui.draw_combat(ctx, &self.combat_lines(fight)).ok();
            }
            GameMode::Inventory { .. } => {
                self.ui.draw_inventory(ctx, &self.session.inventory).ok();
            }
            GameMode::End { .. } => {}
        }
        self.ui.draw_logs(ctx).ok();
        let weapon = self.session.inventory.equipped_weapon().map(|g| g.name.as_str());
        self.ui
            .draw_status(
                ctx,
                &self.session.player_name,
                self.session.status.hp(),
                self.session.gold(),
                weapon,
            )
            .ok();
    }
}

/// Runs the game loop using [`bracket-lib`].
pub fn run() -> BError {
    #[cfg(not(target_arch = "wasm32"))]
    let config = GameConfig::load(CONFIG_PATH)?;
    #[cfg(target_arch = "wasm32")]
    let config = GameConfig::default();
    log::info!("starting Questvale for {}", config.player.name);

    let context = BTermBuilder::simple(80, 25)?
        .with_title("Questvale")
        .build()?;
    let gs = QuestApp::new(config);
    main_loop(context, gs)
}
