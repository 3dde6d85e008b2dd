use super::{Controller, Ctx, Geometry, Intent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Moves the player horizontally, clamped to `[0, screen_width - player_width]`.
pub struct MovementController {
    geometry: Geometry,
    step: f64,
    x: f64,
    enabled: bool,
}

impl MovementController {
    pub fn new(geometry: Geometry, step: f64) -> Self {
        if geometry.player_width > geometry.screen_width {
            tracing::warn!(
                screen = geometry.screen_width,
                player = geometry.player_width,
                "player wider than screen, movement range collapses to 0"
            );
        }
        Self {
            geometry,
            step,
            x: geometry.player_max_x() / 2.0,
            enabled: false,
        }
    }

    pub fn position(&self) -> f64 {
        self.x
    }

    /// Signed distance for one press in `direction`, if one is defined.
    pub fn magnitude(&self, direction: Direction) -> Option<f64> {
        let step = match direction {
            Direction::Left => -self.step,
            Direction::Right => self.step,
        };
        (step != 0.0 && step.is_finite()).then_some(step)
    }

    pub fn nudge(&mut self, direction: Direction, ctx: &mut Ctx) -> bool {
        match self.magnitude(direction) {
            Some(delta) => self.apply_displacement(delta, ctx),
            None => false,
        }
    }

    /// Shift by `delta` and clamp. Ignored while disabled.
    pub fn apply_displacement(&mut self, delta: f64, ctx: &mut Ctx) -> bool {
        if !self.enabled {
            return false;
        }
        self.x = (self.x + delta).clamp(0.0, self.geometry.player_max_x());
        ctx.outbox.push(Intent::PlayerMoved(self.x));
        true
    }
}

impl Controller for MovementController {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn start(&mut self, _ctx: &mut Ctx) {
        self.enabled = true;
    }

    fn stop(&mut self, _ctx: &mut Ctx) {
        self.enabled = false;
    }

    /// Center the player, whether or not movement is enabled.
    fn reset(&mut self, ctx: &mut Ctx) {
        self.x = self.geometry.player_max_x() / 2.0;
        ctx.outbox.push(Intent::PlayerMoved(self.x));
    }

    fn is_active(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::game::timer::Scheduler;
    use proptest::prelude::*;

    fn controller() -> MovementController {
        let config = Config::default();
        MovementController::new(config.geometry(), config.move_step)
    }

    #[test]
    fn starts_centered() {
        assert_eq!(controller().position(), 450.0);
    }

    #[test]
    fn ignores_input_while_disabled() {
        let mut sched = Scheduler::new();
        let mut outbox = Vec::new();
        let mut mc = controller();
        assert!(!mc.nudge(Direction::Left, &mut Ctx::new(&mut sched, &mut outbox)));
        assert_eq!(mc.position(), 450.0);
        assert!(outbox.is_empty());
    }

    #[test]
    fn moves_by_step_and_publishes() {
        let mut sched = Scheduler::new();
        let mut outbox = Vec::new();
        let mut mc = controller();
        let mut ctx = Ctx::new(&mut sched, &mut outbox);
        mc.start(&mut ctx);
        mc.nudge(Direction::Right, &mut ctx);
        mc.nudge(Direction::Right, &mut ctx);
        mc.nudge(Direction::Left, &mut ctx);
        assert_eq!(mc.position(), 470.0);
        assert_eq!(outbox.last(), Some(&Intent::PlayerMoved(470.0)));
    }

    #[test]
    fn stop_keeps_position_and_reset_recenters() {
        let mut sched = Scheduler::new();
        let mut outbox = Vec::new();
        let mut mc = controller();
        let mut ctx = Ctx::new(&mut sched, &mut outbox);
        mc.start(&mut ctx);
        for _ in 0..100 {
            mc.nudge(Direction::Left, &mut ctx);
        }
        mc.stop(&mut ctx);
        mc.stop(&mut ctx);
        assert_eq!(mc.position(), 0.0);
        assert!(!mc.nudge(Direction::Right, &mut ctx));

        mc.reset(&mut ctx);
        assert_eq!(mc.position(), 450.0);
        assert!(!mc.is_active());
    }

    proptest! {
        #[test]
        fn position_never_leaves_the_screen(deltas in prop::collection::vec(-2000.0f64..2000.0, 0..64)) {
            let mut sched = Scheduler::new();
            let mut outbox = Vec::new();
            let mut mc = controller();
            let mut ctx = Ctx::new(&mut sched, &mut outbox);
            mc.start(&mut ctx);
            for delta in deltas {
                mc.apply_displacement(delta, &mut ctx);
                prop_assert!(mc.position() >= 0.0);
                prop_assert!(mc.position() <= 900.0);
            }
        }
    }
}
