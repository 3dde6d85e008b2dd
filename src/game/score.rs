use super::timer::TimerHandle;
use super::{Controller, Ctx, Intent, Task};

/// Display form of a score: plain below 1000, otherwise thousands with one
/// decimal and a `k` suffix, dropping a trailing `.0` (1500 -> "1.5k").
///
/// Tenths come from rounding the `f64` quotient `score / 1000` to one
/// decimal, so 1150 reads "1.1k" (1.15 is stored just below the half).
pub fn format_score(score: u64) -> String {
    if score < 1000 {
        return score.to_string();
    }
    let tenths = round_tenths(score as f64 / 1000.0);
    match tenths % 10 {
        0 => format!("{}k", tenths / 10),
        frac => format!("{}.{}k", tenths / 10, frac),
    }
}

/// Nearest integer to `x * 10` computed on the exact binary value of `x`,
/// taking the larger one on an exact tie. `x` must be finite and >= 1.
fn round_tenths(x: f64) -> u128 {
    let bits = x.to_bits();
    let mantissa = u128::from(bits & ((1 << 52) - 1) | (1 << 52));
    let exponent = ((bits >> 52) & 0x7ff) as i32 - 1075;
    if exponent >= 0 {
        return (mantissa * 10) << exponent;
    }
    let shift = (-exponent) as u32;
    (mantissa * 10 + (1 << (shift - 1))) >> shift
}

/// Adds one point per score interval while active.
pub struct ScoreCounter {
    interval_ms: u64,
    timer: Option<TimerHandle>,
    scoring: bool,
    value: u64,
}

impl ScoreCounter {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            timer: None,
            scoring: false,
            value: 0,
        }
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn display(&self) -> String {
        format_score(self.value)
    }

    /// Score-timer callback.
    pub fn tick(&mut self, ctx: &mut Ctx) {
        if !self.scoring {
            return;
        }
        self.value += 1;
        ctx.outbox.push(Intent::ScoreChanged(self.display()));
    }
}

impl Controller for ScoreCounter {
    fn name(&self) -> &'static str {
        "score"
    }

    fn start(&mut self, ctx: &mut Ctx) {
        if self.timer.is_some() {
            return;
        }
        self.scoring = true;
        self.timer = Some(ctx.sched.set_interval(self.interval_ms, Task::ScoreTick));
    }

    fn stop(&mut self, ctx: &mut Ctx) {
        self.scoring = false;
        if let Some(handle) = self.timer.take() {
            ctx.sched.cancel(handle);
        }
    }

    fn reset(&mut self, ctx: &mut Ctx) {
        self.stop(ctx);
        self.value = 0;
        ctx.outbox.push(Intent::ScoreChanged(self.display()));
    }

    fn is_active(&self) -> bool {
        self.timer.is_some()
    }
}
