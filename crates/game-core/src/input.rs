use bracket_lib::prelude::VirtualKeyCode;
use common::{GameError, GameResult};
use serde::{Deserialize, Serialize};

/// Key names as written in the `[keys]` table of the config file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub left: String,
    pub right: String,
    pub up: String,
    pub down: String,
    pub attack: String,
    pub potion: String,
    pub equip: String,
    pub gem: String,
    pub run: String,
    pub inventory: String,
    pub help: String,
    pub quit: String,
    pub scroll_up: String,
    pub scroll_down: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let s = |v: &str| v.to_string();
        Self {
            left: s("h"),
            right: s("l"),
            up: s("k"),
            down: s("j"),
            attack: s("a"),
            potion: s("p"),
            equip: s("e"),
            gem: s("g"),
            run: s("r"),
            inventory: s("i"),
            help: s("f1"),
            quit: s("q"),
            scroll_up: s("pageup"),
            scroll_down: s("pagedown"),
        }
    }
}

/// Configuration for keyboard controls.
#[derive(Clone, Debug)]
pub struct InputConfig {
    pub left: VirtualKeyCode,
    pub right: VirtualKeyCode,
    pub up: VirtualKeyCode,
    pub down: VirtualKeyCode,
    pub attack: VirtualKeyCode,
    pub potion: VirtualKeyCode,
    pub equip: VirtualKeyCode,
    pub gem: VirtualKeyCode,
    pub run: VirtualKeyCode,
    pub inventory: VirtualKeyCode,
    pub help: VirtualKeyCode,
    pub quit: VirtualKeyCode,
    pub scroll_up: VirtualKeyCode,
    pub scroll_down: VirtualKeyCode,
}

impl Default for InputConfig {
    fn default() -> Self {
        use VirtualKeyCode::*;
        Self {
            left: H,
            right: L,
            up: K,
            down: J,
            attack: A,
            potion: P,
            equip: E,
            gem: G,
            run: R,
            inventory: I,
            help: F1,
            quit: Q,
            scroll_up: PageUp,
            scroll_down: PageDown,
        }
    }
}

impl InputConfig {
    /// Resolves key names into key codes.
    pub fn from_bindings(keys: &KeyBindings) -> GameResult<Self> {
        Ok(Self {
            left: resolve("left", &keys.left)?,
            right: resolve("right", &keys.right)?,
            up: resolve("up", &keys.up)?,
            down: resolve("down", &keys.down)?,
            attack: resolve("attack", &keys.attack)?,
            potion: resolve("potion", &keys.potion)?,
            equip: resolve("equip", &keys.equip)?,
            gem: resolve("gem", &keys.gem)?,
            run: resolve("run", &keys.run)?,
            inventory: resolve("inventory", &keys.inventory)?,
            help: resolve("help", &keys.help)?,
            quit: resolve("quit", &keys.quit)?,
            scroll_up: resolve("scroll_up", &keys.scroll_up)?,
            scroll_down: resolve("scroll_down", &keys.scroll_down)?,
        })
    }
}

fn resolve(field: &str, name: &str) -> GameResult<VirtualKeyCode> {
    parse_key(name).ok_or_else(|| GameError::Config(format!("unknown key {:?} for {}", name, field)))
}

fn parse_key(name: &str) -> Option<VirtualKeyCode> {
    use VirtualKeyCode::*;
    let key = match name.trim().to_ascii_lowercase().as_str() {
        "left" => Left,
        "right" => Right,
        "up" => Up,
        "down" => Down,
        "a" => A,
        "b" => B,
        "c" => C,
        "d" => D,
        "e" => E,
        "f" => F,
        "g" => G,
        "h" => H,
        "i" => I,
        "j" => J,
        "k" => K,
        "l" => L,
        "m" => M,
        "n" => N,
        "o" => O,
        "p" => P,
        "q" => Q,
        "r" => R,
        "s" => S,
        "t" => T,
        "u" => U,
        "v" => V,
        "w" => W,
        "x" => X,
        "y" => Y,
        "z" => Z,
        "f1" => F1,
        "escape" | "esc" => Escape,
        "space" => Space,
        "return" | "enter" => Return,
        "pageup" => PageUp,
        "pagedown" => PageDown,
        _ => return None,
    };
    Some(key)
}

/// Digit keys on the main row and the keypad, as a number.
pub fn digit(key: VirtualKeyCode) -> Option<u8> {
    use VirtualKeyCode::*;
    let n = match key {
        Key0 | Numpad0 => 0,
        Key1 | Numpad1 => 1,
        Key2 | Numpad2 => 2,
        Key3 | Numpad3 => 3,
        Key4 | Numpad4 => 4,
        Key5 | Numpad5 => 5,
        Key6 | Numpad6 => 6,
        Key7 | Numpad7 => 7,
        Key8 | Numpad8 => 8,
        Key9 | Numpad9 => 9,
        _ => return None,
    };
    Some(n)
}
