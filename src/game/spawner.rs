use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::collision::Aabb;
use super::timer::TimerHandle;
use super::{Controller, Ctx, Geometry, Intent, Task};
use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObstacleId(u64);

impl ObstacleId {
    pub fn raw(self) -> u64 {
        self.0
    }

    #[cfg(test)]
    pub fn new_for_test(raw: u64) -> Self {
        Self(raw)
    }
}

/// Top edge of a falling obstacle `elapsed_ms` after it spawned. It starts
/// just above the screen and ends just below it, moving linearly.
pub fn fall_top(elapsed_ms: u64, fall_ms: u64, geometry: &Geometry) -> f64 {
    let start = -geometry.obstacle_height;
    let end = geometry.screen_height + geometry.obstacle_height;
    let progress = if fall_ms == 0 {
        1.0
    } else {
        (elapsed_ms as f64 / fall_ms as f64).min(1.0)
    };
    start + (end - start) * progress
}

/// Top edge at `now` of an obstacle spawned at `spawned_at`, held in place
/// from `frozen_at` on.
pub fn top_at(
    spawned_at: u64,
    fall_ms: u64,
    frozen_at: Option<u64>,
    now: u64,
    geometry: &Geometry,
) -> f64 {
    let t = frozen_at.map_or(now, |at| at.min(now));
    fall_top(t.saturating_sub(spawned_at), fall_ms, geometry)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: ObstacleId,
    /// Left edge, fixed for the obstacle's lifetime.
    pub x: f64,
    pub spawned_at: u64,
    pub fall_ms: u64,
    /// Set on game over; the obstacle stays where it was at this time.
    pub frozen_at: Option<u64>,
}

impl Obstacle {
    pub fn top(&self, now: u64, geometry: &Geometry) -> f64 {
        top_at(self.spawned_at, self.fall_ms, self.frozen_at, now, geometry)
    }

    pub fn bounds(&self, now: u64, geometry: &Geometry) -> Aabb {
        Aabb::new(
            self.x,
            self.top(now, geometry),
            geometry.obstacle_width,
            geometry.obstacle_height,
        )
    }

    #[cfg(test)]
    pub fn new_for_test(id: u64, x: f64, spawned_at: u64, fall_ms: u64) -> Self {
        Self {
            id: ObstacleId::new_for_test(id),
            x,
            spawned_at,
            fall_ms,
            frozen_at: None,
        }
    }
}

/// Emits one obstacle per spawn interval and removes each one once it has
/// fallen off screen.
///
/// While spawning, every live obstacle has exactly one pending expiry timer.
/// `stop` cancels all of them but leaves the obstacles where they are;
/// only `clear_all` removes obstacles.
pub struct ObstacleSpawner {
    geometry: Geometry,
    interval_ms: u64,
    fall_ms: u64,
    slack_ms: u64,
    rng: StdRng,
    spawn_timer: Option<TimerHandle>,
    spawning: bool,
    obstacles: Vec<Obstacle>,
    expiries: BTreeMap<ObstacleId, TimerHandle>,
    next_id: u64,
}

impl ObstacleSpawner {
    pub fn new(config: &Config, seed: u64) -> Self {
        Self {
            geometry: config.geometry(),
            interval_ms: config.spawn_interval_ms,
            fall_ms: config.fall_duration_ms,
            slack_ms: config.expiry_slack_ms,
            rng: StdRng::seed_from_u64(seed),
            spawn_timer: None,
            spawning: false,
            obstacles: Vec::new(),
            expiries: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Live obstacles in creation order.
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn pending_expiries(&self) -> usize {
        self.expiries.len()
    }

    /// Spawn-timer callback.
    pub fn spawn(&mut self, ctx: &mut Ctx) {
        if !self.spawning {
            return;
        }

        let max_x = self.geometry.obstacle_max_x();
        let x = if max_x > 0.0 {
            self.rng.gen_range(0.0..max_x)
        } else {
            0.0
        };
        let id = ObstacleId(self.next_id);
        self.next_id += 1;
        let spawned_at = ctx.sched.now();

        self.obstacles.push(Obstacle {
            id,
            x,
            spawned_at,
            fall_ms: self.fall_ms,
            frozen_at: None,
        });
        let expiry = ctx
            .sched
            .set_timeout(self.fall_ms + self.slack_ms, Task::Expire(id));
        self.expiries.insert(id, expiry);

        tracing::debug!(id = id.0, x, spawned_at, "obstacle spawned");
        ctx.outbox.push(Intent::ObstacleSpawned {
            id,
            x,
            spawned_at,
            fall_ms: self.fall_ms,
        });
    }

    /// Expiry-timer callback for a single obstacle.
    pub fn expire(&mut self, id: ObstacleId, ctx: &mut Ctx) {
        self.expiries.remove(&id);
        match self.obstacles.iter().position(|o| o.id == id) {
            Some(index) => {
                self.obstacles.remove(index);
                tracing::debug!(id = id.0, "obstacle expired");
                ctx.outbox.push(Intent::ObstacleRemoved(id));
            }
            None => tracing::debug!(id = id.0, "expired obstacle was already removed"),
        }
    }

    /// Pin every live obstacle at its position at `now`.
    pub fn freeze(&mut self, ctx: &mut Ctx) {
        let now = ctx.sched.now();
        for obstacle in &mut self.obstacles {
            obstacle.frozen_at.get_or_insert(now);
        }
        ctx.outbox.push(Intent::ObstaclesFrozen(now));
    }

    /// Stop spawning and remove every obstacle immediately.
    pub fn clear_all(&mut self, ctx: &mut Ctx) {
        self.stop(ctx);
        for obstacle in self.obstacles.drain(..) {
            ctx.outbox.push(Intent::ObstacleRemoved(obstacle.id));
        }
    }
}

impl Controller for ObstacleSpawner {
    fn name(&self) -> &'static str {
        "spawner"
    }

    fn start(&mut self, ctx: &mut Ctx) {
        if self.spawn_timer.is_some() {
            return;
        }
        self.spawning = true;
        self.spawn_timer = Some(ctx.sched.set_interval(self.interval_ms, Task::Spawn));
    }

    fn stop(&mut self, ctx: &mut Ctx) {
        self.spawning = false;
        if let Some(handle) = self.spawn_timer.take() {
            ctx.sched.cancel(handle);
        }
        for (_, handle) in std::mem::take(&mut self.expiries) {
            ctx.sched.cancel(handle);
        }
    }

    fn reset(&mut self, ctx: &mut Ctx) {
        self.clear_all(ctx);
    }

    fn is_active(&self) -> bool {
        self.spawn_timer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::timer::Scheduler;

    struct Rig {
        sched: Scheduler<Task>,
        outbox: Vec<Intent>,
        spawner: ObstacleSpawner,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                sched: Scheduler::new(),
                outbox: Vec::new(),
                spawner: ObstacleSpawner::new(&Config::default(), 7),
            }
        }

        fn start(&mut self) {
            self.spawner.start(&mut Ctx::new(&mut self.sched, &mut self.outbox));
        }

        fn stop(&mut self) {
            self.spawner.stop(&mut Ctx::new(&mut self.sched, &mut self.outbox));
        }

        fn clear_all(&mut self) {
            self.spawner
                .clear_all(&mut Ctx::new(&mut self.sched, &mut self.outbox));
        }

        fn advance(&mut self, ms: u64) {
            self.sched.advance(ms);
            while let Some((_, task)) = self.sched.next_due() {
                let mut ctx = Ctx::new(&mut self.sched, &mut self.outbox);
                match task {
                    Task::Spawn => self.spawner.spawn(&mut ctx),
                    Task::Expire(id) => self.spawner.expire(id, &mut ctx),
                    other => panic!("unexpected task {other:?}"),
                }
            }
        }

        fn spawned(&self) -> usize {
            self.outbox
                .iter()
                .filter(|i| matches!(i, Intent::ObstacleSpawned { .. }))
                .count()
        }
    }

    #[test]
    fn spawns_one_obstacle_per_interval() {
        let mut rig = Rig::new();
        rig.start();
        rig.advance(499);
        assert_eq!(rig.spawner.obstacles().len(), 0);
        rig.advance(1);
        assert_eq!(rig.spawner.obstacles().len(), 1);
        rig.advance(1000);
        assert_eq!(rig.spawner.obstacles().len(), 3);
    }

    #[test]
    fn double_start_keeps_a_single_spawn_timer() {
        let mut rig = Rig::new();
        rig.start();
        rig.start();
        rig.advance(500);
        assert_eq!(rig.spawned(), 1);
        assert_eq!(rig.sched.pending(), 2); // spawn interval + one expiry
    }

    #[test]
    fn spawn_positions_stay_inside_the_screen() {
        let mut rig = Rig::new();
        rig.start();
        for _ in 0..40 {
            rig.advance(500);
        }
        let max_x = Config::default().geometry().obstacle_max_x();
        for obstacle in rig.spawner.obstacles() {
            assert!((0.0..=max_x).contains(&obstacle.x), "x = {}", obstacle.x);
        }
    }

    #[test]
    fn obstacles_expire_after_fall_plus_slack() {
        let mut rig = Rig::new();
        rig.start();
        rig.advance(500);
        let first = rig.spawner.obstacles()[0].id;

        // Spawned at 500, so it lives until 500 + 3000 + 100.
        rig.advance(3099);
        assert_eq!(rig.spawner.obstacles()[0].id, first);
        assert!(!rig.outbox.contains(&Intent::ObstacleRemoved(first)));

        rig.advance(1);
        assert!(rig.spawner.obstacles().iter().all(|o| o.id != first));
        assert!(rig.outbox.contains(&Intent::ObstacleRemoved(first)));
        assert!(rig.spawner.is_active());
        assert_eq!(rig.spawner.pending_expiries(), rig.spawner.obstacles().len());
    }

    #[test]
    fn expiry_handles_track_live_obstacles_while_running() {
        let mut rig = Rig::new();
        rig.start();
        for _ in 0..20 {
            rig.advance(250);
            assert_eq!(rig.spawner.pending_expiries(), rig.spawner.obstacles().len());
        }
        // An obstacle lives 3100ms, so at most seven overlap.
        assert!(rig.spawner.obstacles().len() <= 7);
    }

    #[test]
    fn stop_cancels_timers_but_keeps_obstacles() {
        let mut rig = Rig::new();
        rig.start();
        rig.advance(1500);
        assert_eq!(rig.spawner.obstacles().len(), 3);

        rig.stop();
        rig.stop();
        assert!(!rig.spawner.is_active());
        assert_eq!(rig.spawner.pending_expiries(), 0);
        assert_eq!(rig.sched.pending(), 0);
        assert_eq!(rig.spawner.obstacles().len(), 3);

        rig.advance(10_000);
        assert_eq!(rig.spawner.obstacles().len(), 3);
    }

    #[test]
    fn clear_all_removes_everything() {
        let mut rig = Rig::new();
        rig.start();
        rig.advance(1000);
        rig.outbox.clear();

        rig.clear_all();
        assert!(rig.spawner.obstacles().is_empty());
        assert_eq!(rig.sched.pending(), 0);
        let removed = rig
            .outbox
            .iter()
            .filter(|i| matches!(i, Intent::ObstacleRemoved(_)))
            .count();
        assert_eq!(removed, 2);
    }

    #[test]
    fn restart_after_stop_spawns_again() {
        let mut rig = Rig::new();
        rig.start();
        rig.stop();
        rig.start();
        assert!(rig.spawner.is_active());
        rig.advance(500);
        assert_eq!(rig.spawner.obstacles().len(), 1);
    }

    #[test]
    fn expiring_a_detached_obstacle_is_harmless() {
        let mut rig = Rig::new();
        rig.start();
        rig.advance(500);
        let id = rig.spawner.obstacles()[0].id;
        rig.clear_all();
        rig.outbox.clear();

        rig.spawner
            .expire(id, &mut Ctx::new(&mut rig.sched, &mut rig.outbox));
        assert!(rig.outbox.is_empty());
    }

    #[test]
    fn frozen_obstacles_stop_falling() {
        let mut rig = Rig::new();
        rig.start();
        rig.advance(500);
        rig.advance(1000);
        rig.spawner
            .freeze(&mut Ctx::new(&mut rig.sched, &mut rig.outbox));
        let geometry = Config::default().geometry();
        let first = rig.spawner.obstacles()[0].clone();
        let top = first.top(rig.sched.now(), &geometry);
        assert_eq!(first.top(rig.sched.now() + 5000, &geometry), top);
    }

    #[test]
    fn fall_runs_from_above_to_below_the_screen() {
        let geometry = Config::default().geometry();
        assert_eq!(fall_top(0, 3000, &geometry), -50.0);
        assert_eq!(fall_top(1500, 3000, &geometry), 300.0);
        assert_eq!(fall_top(3000, 3000, &geometry), 650.0);
        assert_eq!(fall_top(9000, 3000, &geometry), 650.0);
    }

    #[test]
    fn top_at_holds_from_the_freeze_time() {
        let geometry = Config::default().geometry();
        assert_eq!(top_at(1000, 3000, None, 2500, &geometry), 300.0);
        assert_eq!(top_at(1000, 3000, Some(2500), 9000, &geometry), 300.0);
        // Asked about a moment before the freeze, it is still falling.
        assert_eq!(top_at(1000, 3000, Some(2500), 1000, &geometry), -50.0);
    }
}
