use super::{EndReason, GameConfig, GameMode, QuestGame};
use bracket_lib::prelude::*;

pub enum AppState {
    Menu,
    Running(Box<QuestGame>),
    Summary(EndReason),
}

/// Title menu wrapped around a running game.
pub struct QuestApp {
    state: AppState,
    config: GameConfig,
    message: Option<String>,
}

impl QuestApp {
    pub fn new(config: GameConfig) -> Self {
        Self {
            state: AppState::Menu,
            config,
            message: None,
        }
    }

    fn start(&mut self, load: bool) {
        let game = if load {
            QuestGame::continue_game(&self.config)
        } else {
            QuestGame::new_game(&self.config)
        };
        match game {
            Ok(game) => {
                self.message = None;
                self.state = AppState::Running(Box::new(game));
            }
            Err(e) => {
                log::error!("could not start game: {}", e);
                self.message = Some(format!("Could not start: {}", e));
            }
        }
    }

    /// Advances the menu state machine. Returns true when the app should quit.
    fn update_state(&mut self, key: Option<VirtualKeyCode>) -> bool {
        use VirtualKeyCode::*;
        match &mut self.state {
            AppState::Menu => match key {
                Some(N) => {
                    self.start(false);
                    false
                }
                Some(L) => {
                    self.start(true);
                    false
                }
                Some(Q) | Some(Escape) => true,
                _ => false,
            },
            AppState::Running(game) => {
                let ended = match game.mode() {
                    GameMode::End { reason } => Some(*reason),
                    _ => None,
                };
                if let Some(reason) = ended {
                    self.state = AppState::Summary(reason);
                }
                false
            }
            AppState::Summary(_) => match key {
                Some(Return) => {
                    self.state = AppState::Menu;
                    false
                }
                Some(Q) => true,
                _ => false,
            },
        }
    }
}

impl GameState for QuestApp {
    fn tick(&mut self, ctx: &mut BTerm) {
        if let AppState::Running(game) = &mut self.state {
            game.tick(ctx);
        }
        let quit = self.update_state(ctx.key);
        if quit {
            ctx.quit();
            return;
        }
        match &self.state {
            AppState::Menu => {
                ctx.cls();
                ctx.print_centered(8, "Questvale");
                ctx.print_centered(10, format!("Hello, {}!", self.config.player.name));
                ctx.print_centered(12, "N: New game  L: Load game");
                ctx.print_centered(14, "Press Q to Quit");
                if let Some(msg) = &self.message {
                    ctx.print_centered(17, msg);
                }
            }
            AppState::Running(_) => {
                // game.tick already rendered
            }
            AppState::Summary(reason) => {
                ctx.cls();
                let title = match reason {
                    EndReason::Quit => "See you next time!",
                    EndReason::Defeated => "You have fallen.",
                };
                ctx.print_centered(10, title);
                ctx.print_centered(14, "Press Enter for Menu, Q to Quit");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(dir: &tempfile::TempDir) -> QuestApp {
        let mut config = GameConfig::default();
        config.game.seed = Some(8);
        config.game.save_path = dir.path().join("save.json").to_string_lossy().into_owned();
        QuestApp::new(config)
    }

    #[test]
    fn new_from_menu_starts_game() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.update_state(Some(VirtualKeyCode::N));
        assert!(matches!(app.state, AppState::Running(_)));
    }

    #[test]
    fn load_without_save_still_starts() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.update_state(Some(VirtualKeyCode::L));
        assert!(matches!(app.state, AppState::Running(_)));
    }

    #[test]
    fn bad_key_binding_stays_in_menu() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.config.keys.attack = "hyper".into();
        app.update_state(Some(VirtualKeyCode::N));
        assert!(matches!(app.state, AppState::Menu));
        assert!(app.message.is_some());
    }

    #[test]
    fn finished_run_shows_summary() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.update_state(Some(VirtualKeyCode::N));
        if let AppState::Running(game) = &mut app.state {
            game.handle_input_key(Some(VirtualKeyCode::Q));
        }
        app.update_state(None);
        assert!(matches!(app.state, AppState::Summary(EndReason::Quit)));
    }

    #[test]
    fn summary_return_goes_to_menu() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.state = AppState::Summary(EndReason::Defeated);
        app.update_state(Some(VirtualKeyCode::Return));
        assert!(matches!(app.state, AppState::Menu));
    }

    #[test]
    fn quit_from_menu() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        assert!(app.update_state(Some(VirtualKeyCode::Q)));
    }
}
