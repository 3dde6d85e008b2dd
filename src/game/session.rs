//! Game session state machine.
//!
//! ```text
//! Idle --start--> Running --collision--> GameOver --restart--> Idle --> Running
//! ```
//!
//! The session owns the scheduler and the three controllers. It is driven
//! by [`GameSession::advance`] once per frame and by the command methods
//! from the input layer. Everything it wants shown goes into an outbox of
//! [`Intent`]s.

use super::collision::{first_hit, player_bounds, Aabb};
use super::movement::{Direction, MovementController};
use super::score::ScoreCounter;
use super::spawner::{Obstacle, ObstacleSpawner};
use super::timer::{Scheduler, TimerHandle};
use super::{Affordance, Controller, Ctx, Geometry, Intent, Task};
use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Idle,
    Running,
    GameOver,
}

/// The three controllers, started and stopped as a group in a fixed order.
pub struct Controllers {
    pub movement: MovementController,
    pub score: ScoreCounter,
    pub spawner: ObstacleSpawner,
}

impl Controllers {
    fn start_all(&mut self, ctx: &mut Ctx) {
        for controller in [
            &mut self.movement as &mut dyn Controller,
            &mut self.score,
            &mut self.spawner,
        ] {
            controller.start(ctx);
        }
    }

    fn stop_all(&mut self, ctx: &mut Ctx) {
        for controller in [
            &mut self.score as &mut dyn Controller,
            &mut self.spawner,
            &mut self.movement,
        ] {
            controller.stop(ctx);
            tracing::trace!(controller = controller.name(), "stopped");
        }
    }

    fn reset_all(&mut self, ctx: &mut Ctx) {
        for controller in [
            &mut self.score as &mut dyn Controller,
            &mut self.spawner,
            &mut self.movement,
        ] {
            debug_assert!(!controller.is_active(), "{} reset while running", controller.name());
            controller.reset(ctx);
        }
    }
}

pub struct GameSession {
    state: GameState,
    // Latched on the first game over, cleared only by start_game.
    game_over_latched: bool,
    geometry: Geometry,
    sched: Scheduler<Task>,
    outbox: Vec<Intent>,
    controllers: Controllers,
    frame: Option<TimerHandle>,
}

impl GameSession {
    pub fn new(config: &Config, seed: u64) -> Self {
        let geometry = config.geometry();
        let mut session = Self {
            state: GameState::Idle,
            game_over_latched: false,
            geometry,
            sched: Scheduler::new(),
            outbox: Vec::new(),
            controllers: Controllers {
                movement: MovementController::new(geometry, config.move_step),
                score: ScoreCounter::new(config.score_interval_ms),
                spawner: ObstacleSpawner::new(config, seed),
            },
            frame: None,
        };
        session.enter_idle();
        session
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn now(&self) -> u64 {
        self.sched.now()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn score(&self) -> u64 {
        self.controllers.score.value()
    }

    #[cfg(test)]
    pub fn score_text(&self) -> String {
        self.controllers.score.display()
    }

    pub fn player_x(&self) -> f64 {
        self.controllers.movement.position()
    }

    pub fn player_bounds(&self) -> Aabb {
        player_bounds(self.player_x(), &self.geometry)
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        self.controllers.spawner.obstacles()
    }

    #[cfg(test)]
    pub fn pending_expiries(&self) -> usize {
        self.controllers.spawner.pending_expiries()
    }

    /// Live timers and frame callbacks across all controllers.
    #[cfg(test)]
    pub fn pending_timers(&self) -> usize {
        self.sched.pending()
    }

    /// Take everything queued for the presentation layer since the last call.
    pub fn drain_intents(&mut self) -> Vec<Intent> {
        std::mem::take(&mut self.outbox)
    }

    /// Idle -> Running. Ignored in any other state.
    pub fn start_game(&mut self) -> bool {
        if self.state != GameState::Idle {
            tracing::debug!(state = ?self.state, "start ignored");
            return false;
        }
        self.state = GameState::Running;
        self.game_over_latched = false;

        for affordance in [Affordance::Start, Affordance::GameOver, Affordance::Restart] {
            self.outbox.push(Intent::Hide(affordance));
        }
        self.controllers
            .start_all(&mut Ctx::new(&mut self.sched, &mut self.outbox));

        tracing::info!(now = self.sched.now(), "game started");
        self.check_collisions();
        true
    }

    /// Running -> GameOver. Runs at most once per game; later calls and calls
    /// outside Running are no-ops.
    pub fn perform_game_over(&mut self) -> bool {
        if self.game_over_latched || self.state != GameState::Running {
            return false;
        }
        self.game_over_latched = true;
        self.state = GameState::GameOver;

        let mut ctx = Ctx::new(&mut self.sched, &mut self.outbox);
        self.controllers.stop_all(&mut ctx);
        // Obstacles stay on screen, frozen, until the next restart clears them.
        self.controllers.spawner.freeze(&mut ctx);

        if let Some(handle) = self.frame.take() {
            self.sched.cancel(handle);
        }
        self.outbox.push(Intent::Show(Affordance::GameOver));
        self.outbox.push(Intent::Show(Affordance::Restart));

        tracing::info!(score = self.score(), now = self.sched.now(), "game over");
        true
    }

    /// GameOver -> Idle -> Running, clearing score, obstacles and position.
    pub fn restart(&mut self) -> bool {
        if self.state != GameState::GameOver {
            tracing::debug!(state = ?self.state, "restart ignored");
            return false;
        }
        self.reset_game_state();
        self.outbox.push(Intent::Hide(Affordance::Restart));
        self.state = GameState::Idle;
        tracing::info!("restarting");
        self.start_game()
    }

    /// Forward a directional press to the movement controller.
    pub fn handle_direction(&mut self, direction: Direction) -> bool {
        self.controllers
            .movement
            .nudge(direction, &mut Ctx::new(&mut self.sched, &mut self.outbox))
    }

    /// Shift the player by an arbitrary signed distance (same rules as a press).
    #[cfg(test)]
    pub fn apply_displacement(&mut self, delta: f64) -> bool {
        self.controllers
            .movement
            .apply_displacement(delta, &mut Ctx::new(&mut self.sched, &mut self.outbox))
    }

    /// One platform frame: move the clock, then run every due callback to
    /// completion, one at a time.
    pub fn advance(&mut self, elapsed_ms: u64) {
        self.sched.advance(elapsed_ms);
        while let Some((_, task)) = self.sched.next_due() {
            self.dispatch(task);
        }
    }

    fn dispatch(&mut self, task: Task) {
        let mut ctx = Ctx::new(&mut self.sched, &mut self.outbox);
        match task {
            Task::Spawn => self.controllers.spawner.spawn(&mut ctx),
            Task::Expire(id) => self.controllers.spawner.expire(id, &mut ctx),
            Task::ScoreTick => self.controllers.score.tick(&mut ctx),
            Task::CollisionCheck => {
                self.frame = None;
                self.check_collisions();
            }
        }
    }

    /// One step of the collision chain. The chain keeps re-requesting itself
    /// only while Running, so leaving Running is what ends it.
    fn check_collisions(&mut self) {
        if self.state != GameState::Running {
            return;
        }
        let now = self.sched.now();
        let player = self.player_bounds();
        let hit = first_hit(&player, self.obstacles(), now, &self.geometry).map(|o| o.id);
        if let Some(id) = hit {
            tracing::debug!(obstacle = id.raw(), now, "collision");
            self.perform_game_over();
            return;
        }
        self.frame = Some(self.sched.request_frame(Task::CollisionCheck));
    }

    // Every controller is stopped before any of them is reset.
    fn reset_game_state(&mut self) {
        let mut ctx = Ctx::new(&mut self.sched, &mut self.outbox);
        self.controllers.stop_all(&mut ctx);
        self.controllers.reset_all(&mut ctx);
        if let Some(handle) = self.frame.take() {
            self.sched.cancel(handle);
        }
    }

    fn enter_idle(&mut self) {
        self.reset_game_state();
        self.game_over_latched = false;
        self.state = GameState::Idle;
        self.outbox.push(Intent::Show(Affordance::Start));
        self.outbox.push(Intent::Hide(Affordance::Restart));
        self.outbox.push(Intent::Hide(Affordance::GameOver));
    }
}
