pub mod collision;
pub mod movement;
pub mod score;
pub mod session;
pub mod spawner;
pub mod timer;

use self::spawner::ObstacleId;
use self::timer::Scheduler;

/// Playfield and entity sizes in world units. Read once at setup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub screen_width: f64,
    pub screen_height: f64,
    pub player_width: f64,
    pub player_height: f64,
    pub obstacle_width: f64,
    pub obstacle_height: f64,
}

impl Geometry {
    /// Right-most legal x for the player's left edge.
    pub fn player_max_x(&self) -> f64 {
        (self.screen_width - self.player_width).max(0.0)
    }

    /// Right-most legal spawn x for an obstacle's left edge.
    pub fn obstacle_max_x(&self) -> f64 {
        (self.screen_width - self.obstacle_width).max(0.0)
    }
}

/// Deferred work the session schedules on its [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Spawn,
    ScoreTick,
    Expire(ObstacleId),
    CollisionCheck,
}

/// UI elements the session toggles on state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    Start,
    GameOver,
    Restart,
}

/// Instructions for the presentation layer. The core never draws itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    PlayerMoved(f64),
    ScoreChanged(String),
    ObstacleSpawned {
        id: ObstacleId,
        x: f64,
        spawned_at: u64,
        fall_ms: u64,
    },
    ObstacleRemoved(ObstacleId),
    /// Halt every visible obstacle where it is at time `at`.
    ObstaclesFrozen(u64),
    Show(Affordance),
    Hide(Affordance),
}

/// What a controller gets to touch while handling a lifecycle call.
pub struct Ctx<'a> {
    pub sched: &'a mut Scheduler<Task>,
    pub outbox: &'a mut Vec<Intent>,
}

impl<'a> Ctx<'a> {
    pub fn new(sched: &'a mut Scheduler<Task>, outbox: &'a mut Vec<Intent>) -> Self {
        Self { sched, outbox }
    }
}

/// Lifecycle contract shared by the movement, score and spawner controllers.
///
/// `start` and `stop` are idempotent. `stop` cancels every timer the
/// controller owns before returning. `reset` brings the controller back to
/// its initial state and must only be called once it is stopped.
pub trait Controller {
    fn name(&self) -> &'static str;
    fn start(&mut self, ctx: &mut Ctx);
    fn stop(&mut self, ctx: &mut Ctx);
    fn reset(&mut self, ctx: &mut Ctx);
    fn is_active(&self) -> bool;
}
