//! Log window, screen layouts and menu text.
use bracket_lib::prelude::{BTerm, BLACK, GRAY, GREEN, RED, RGB, WHITE, YELLOW};
use common::GameResult;
use economy::ShopOffer;
use inventory::{Inventory, MAX_HP};

/// UI layout type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UILayout {
    /// Town menu.
    Town,
    /// Shop offer and purchase prompts.
    Shop,
    /// Grid exploration.
    Map,
    /// Fight against a monster.
    Combat,
    /// Layout displaying the inventory list.
    Inventory,
    /// Layout showing help and controls.
    Help,
}

/// Color palette for map and entity rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorPalette {
    pub grass: RGB,
    pub town: RGB,
    pub player: RGB,
    pub monster: RGB,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            grass: RGB::named(GREEN),
            town: RGB::named(YELLOW),
            player: RGB::named(WHITE),
            monster: RGB::named(RED),
        }
    }
}

impl ColorPalette {
    /// Returns a high contrast palette suitable for colorblind players.
    pub fn colorblind() -> Self {
        Self {
            grass: RGB::named(GRAY),
            town: RGB::named(WHITE),
            player: RGB::named(YELLOW),
            monster: RGB::named(WHITE),
        }
    }
}

const LOG_Y: i32 = 17;
const LOG_WINDOW: i32 = 8;
const STATUS_X: i32 = 60;
/// Oldest lines are dropped past this many.
const MAX_LOGS: usize = 200;

/// Basic UI context for logging and redraw requests.
pub struct UIContext {
    logs: Vec<String>,
    scroll: usize,
    layout: UILayout,
}

impl Default for UIContext {
    fn default() -> Self {
        Self {
            logs: Vec::new(),
            scroll: 0,
            layout: UILayout::Town,
        }
    }
}

impl UIContext {
    /// Sets the current layout.
    pub fn set_layout(&mut self, layout: UILayout) {
        self.layout = layout;
    }

    /// Returns the current layout.
    pub fn layout(&self) -> UILayout {
        self.layout
    }

    /// Adds a message to the log queue.
    pub fn add_log(&mut self, msg: &str) -> GameResult<()> {
        self.logs.push(msg.to_string());
        if self.logs.len() > MAX_LOGS {
            let excess = self.logs.len() - MAX_LOGS;
            self.logs.drain(..excess);
        }
        self.scroll = 0;
        log::debug!("LOG: {}", msg);
        Ok(())
    }

    /// Most recent log line.
    pub fn last_log(&self) -> Option<&str> {
        self.logs.last().map(String::as_str)
    }

    /// Scrolls log view one line up.
    pub fn scroll_up(&mut self) {
        if self.scroll + (LOG_WINDOW as usize) < self.logs.len() {
            self.scroll += 1;
        }
    }

    /// Scrolls log view one line down.
    pub fn scroll_down(&mut self) {
        if self.scroll > 0 {
            self.scroll -= 1;
        }
    }

    fn visible_logs(&self) -> &[String] {
        let start = self
            .logs
            .len()
            .saturating_sub(LOG_WINDOW as usize + self.scroll);
        let end = std::cmp::min(start + LOG_WINDOW as usize, self.logs.len());
        &self.logs[start..end]
    }

    /// Draws log window to the screen.
    pub fn draw_logs(&self, ctx: &mut BTerm) -> GameResult<()> {
        if self.layout == UILayout::Help {
            return Ok(());
        }
        for (i, line) in self.visible_logs().iter().enumerate() {
            ctx.print(0, LOG_Y + i as i32, line);
        }
        Ok(())
    }

    /// Draws a status panel on the right side.
    pub fn draw_status(&self, ctx: &mut BTerm, name: &str, hp: i32, gold: i32, weapon: Option<&str>) -> GameResult<()> {
        if self.layout == UILayout::Help {
            return Ok(());
        }
        ctx.print(STATUS_X, LOG_Y, name);
        let color = if hp > MAX_HP * 2 / 3 {
            GREEN
        } else if hp > MAX_HP / 3 {
            YELLOW
        } else {
            RED
        };
        ctx.print_color(
            STATUS_X,
            LOG_Y + 1,
            color,
            RGB::named(BLACK),
            format!("HP {}", hp_bar_string(hp, MAX_HP)),
        );
        ctx.print(STATUS_X, LOG_Y + 2, format!("Gold: {}", gold));
        ctx.print(STATUS_X, LOG_Y + 3, format!("Wield: {}", weapon.unwrap_or("-")));
        Ok(())
    }

    /// Draws the town menu.
    pub fn draw_town(&self, ctx: &mut BTerm, player_name: &str, rest_cost: i32) -> GameResult<()> {
        if self.layout != UILayout::Town {
            return Ok(());
        }
        ctx.print(0, 2, welcome_line(player_name, 80));
        for (i, line) in town_strings(rest_cost).iter().enumerate() {
            ctx.print(4, 5 + i as i32, line);
        }
        Ok(())
    }

    /// Draws the bordered shop menu and the purchase prompt.
    pub fn draw_shop(&self, ctx: &mut BTerm, offer: &ShopOffer, prompt: &str) -> GameResult<()> {
        if self.layout != UILayout::Shop {
            return Ok(());
        }
        ctx.print(4, 2, "Welcome to the shop!");
        for (i, line) in shop_menu_lines(offer).iter().enumerate() {
            ctx.print(4, 4 + i as i32, line);
        }
        ctx.print(4, 10, prompt);
        Ok(())
    }

    /// Draws the monster card and combat options.
    pub fn draw_combat(&self, ctx: &mut BTerm, lines: &[String]) -> GameResult<()> {
        if self.layout != UILayout::Combat {
            return Ok(());
        }
        for (i, line) in lines.iter().enumerate() {
            ctx.print(2, 1 + i as i32, line);
        }
        Ok(())
    }

    /// Draws the player's inventory when in `Inventory` layout.
    pub fn draw_inventory(&self, ctx: &mut BTerm, inventory: &Inventory) -> GameResult<()> {
        if self.layout != UILayout::Inventory {
            return Ok(());
        }
        ctx.print_centered(3, "Inventory");
        for (i, line) in inventory_strings(inventory).iter().enumerate() {
            ctx.print_centered(5 + i as i32, line);
        }
        Ok(())
    }

    /// Draws help text when in `Help` layout.
    pub fn draw_help(&self, ctx: &mut BTerm) -> GameResult<()> {
        if self.layout != UILayout::Help {
            return Ok(());
        }
        for (i, line) in help_strings().iter().enumerate() {
            ctx.print_centered(5 + i as i32, line);
        }
        Ok(())
    }
}

/// "Hello, name!" centered within `width` columns.
pub fn welcome_line(name: &str, width: usize) -> String {
    format!("{:^width$}", format!("Hello, {}!", name), width = width)
}

/// The two offer lines inside a slash-cornered border.
///
/// Names are left aligned in 16 columns; prices are right aligned with two
/// decimals after a dollar sign.
pub fn shop_menu_lines(offer: &ShopOffer) -> Vec<String> {
    let rows: Vec<String> = offer
        .entries
        .iter()
        .map(|e| format!("| {:<16}${:>7.2} |", e.item.name(), e.price))
        .collect();
    let inner = rows.iter().map(|r| r.chars().count()).max().unwrap_or(2) - 2;
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!("/{}\\", "-".repeat(inner)));
    lines.extend(rows);
    lines.push(format!("\\{}/", "-".repeat(inner)));
    lines
}

fn hp_bar_string(hp: i32, max: i32) -> String {
    let width = 10;
    let filled = ((hp.clamp(0, max) as f32 / max as f32) * width as f32).round() as usize;
    format!("[{}{}] {}/{}", "#".repeat(filled), "-".repeat(width - filled), hp, max)
}

/// One line per potion stack and gear item.
pub fn inventory_strings(inventory: &Inventory) -> Vec<String> {
    let equipped = inventory.equipped_weapon().map(|g| g.id);
    let mut lines: Vec<String> = inventory
        .potions()
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(name, count)| format!("{} x{}", name, count))
        .collect();
    for g in inventory.gear() {
        let mut line = g.name.clone();
        if let (Some(cur), Some(max)) = (g.current_durability, g.max_durability) {
            line.push_str(&format!(" ({}/{})", cur, max));
        }
        if Some(g.id) == equipped {
            line.push_str(" [equipped]");
        }
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push("(empty)".to_string());
    }
    lines
}

fn town_strings(rest_cost: i32) -> Vec<String> {
    vec![
        "What would you like to do?".to_string(),
        "1) Visit the shop".to_string(),
        format!("2) Rest at the inn ({} gold)", rest_cost),
        "3) Leave town".to_string(),
        "4) Inventory".to_string(),
        "5) Save".to_string(),
        "6) Save and quit".to_string(),
    ]
}

fn help_strings() -> Vec<String> {
    vec![
        "Controls:".to_string(),
        "Arrow keys / hjkl: Move on the map".to_string(),
        "Town: 1-6 pick a menu entry".to_string(),
        "Shop: 1/2 pick an item, then 1-9 quantity".to_string(),
        "Fight: a attack, p potion, e equip, g gem, r run".to_string(),
        "i: Inventory (e equips a weapon there)".to_string(),
        "F1: Toggle this help".to_string(),
        "Esc/Q: Quit".to_string(),
    ]
}
