use std::collections::BTreeMap;

use crate::game::spawner::{top_at, ObstacleId};
use crate::game::{Affordance, Geometry, Intent};

#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub x: f64,
    pub spawned_at: u64,
    pub fall_ms: u64,
    pub frozen_at: Option<u64>,
}

impl Sprite {
    pub fn top(&self, now: u64, geometry: &Geometry) -> f64 {
        top_at(self.spawned_at, self.fall_ms, self.frozen_at, now, geometry)
    }
}

/// What is on screen, built only from the session's intents.
#[derive(Debug, Clone)]
pub struct Stage {
    pub player_x: f64,
    pub score_text: String,
    pub sprites: BTreeMap<ObstacleId, Sprite>,
    pub show_start: bool,
    pub show_game_over: bool,
    pub show_restart: bool,
}

impl Stage {
    pub fn new() -> Self {
        Self {
            player_x: 0.0,
            score_text: "0".to_string(),
            sprites: BTreeMap::new(),
            show_start: false,
            show_game_over: false,
            show_restart: false,
        }
    }

    pub fn apply_all(&mut self, intents: impl IntoIterator<Item = Intent>) {
        for intent in intents {
            self.apply(intent);
        }
    }

    pub fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::PlayerMoved(x) => self.player_x = x,
            Intent::ScoreChanged(text) => self.score_text = text,
            Intent::ObstacleSpawned {
                id,
                x,
                spawned_at,
                fall_ms,
            } => {
                self.sprites.insert(
                    id,
                    Sprite {
                        x,
                        spawned_at,
                        fall_ms,
                        frozen_at: None,
                    },
                );
            }
            Intent::ObstacleRemoved(id) => {
                // Already gone is fine.
                self.sprites.remove(&id);
            }
            Intent::ObstaclesFrozen(at) => {
                for sprite in self.sprites.values_mut() {
                    sprite.frozen_at.get_or_insert(at);
                }
            }
            Intent::Show(affordance) => *self.flag(affordance) = true,
            Intent::Hide(affordance) => *self.flag(affordance) = false,
        }
    }

    fn flag(&mut self, affordance: Affordance) -> &mut bool {
        match affordance {
            Affordance::Start => &mut self.show_start,
            Affordance::GameOver => &mut self.show_game_over,
            Affordance::Restart => &mut self.show_restart,
        }
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}
