use std::time::{Duration, Instant};

use crossterm::event::KeyEvent;

use crate::config::Config;
use crate::game::session::{GameSession, GameState};
use crate::input::{map_key, Command};
use crate::ui::stage::Stage;

// Longest stretch of wall-clock time a single frame may cover.
const MAX_FRAME: Duration = Duration::from_millis(250);

pub struct App {
    pub should_quit: bool,
    pub session: GameSession,
    pub stage: Stage,
    last_frame: Instant,
    carry: Duration,
}

impl App {
    pub fn new(config: &Config, seed: u64) -> Self {
        let mut session = GameSession::new(config, seed);
        let mut stage = Stage::new();
        stage.apply_all(session.drain_intents());
        Self {
            should_quit: false,
            session,
            stage,
            last_frame: Instant::now(),
            carry: Duration::ZERO,
        }
    }

    /// Advance the session by the wall-clock time since the previous frame.
    pub fn on_tick(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame).min(MAX_FRAME);
        self.last_frame = now;
        self.step(elapsed);
    }

    /// Advance by an explicit amount. Sub-millisecond remainders carry over.
    pub fn step(&mut self, elapsed: Duration) {
        self.carry += elapsed;
        let ms = self.carry.as_millis() as u64;
        self.carry -= Duration::from_millis(ms);
        self.session.advance(ms);
        self.flush();
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        let Some(command) = map_key(key) else {
            return;
        };
        match command {
            Command::Quit => self.should_quit = true,
            Command::Move(direction) => {
                self.session.handle_direction(direction);
            }
            Command::Confirm => match self.session.state() {
                GameState::Idle => {
                    self.session.start_game();
                }
                GameState::GameOver => {
                    self.session.restart();
                }
                GameState::Running => {}
            },
            Command::Restart => {
                self.session.restart();
            }
        }
        self.flush();
    }

    fn flush(&mut self) {
        self.stage.apply_all(self.session.drain_intents());
    }
}
