use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, KeyEvent, KeyEventKind};

pub enum Event {
    Key(KeyEvent),
    /// One platform frame with no input.
    Tick,
}

/// Consecutive failed reads tolerated before the input thread gives up.
const MAX_READ_FAILURES: u32 = 10;

/// Polls the terminal on a background thread and turns it into a stream of
/// key presses and frame ticks.
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(frame: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let mut read_failures = 0;
            loop {
                let next = match event::poll(frame) {
                    Ok(true) => match event::read() {
                        Ok(raw) => {
                            read_failures = 0;
                            match raw {
                                // Auto-repeat counts as a press, holding an arrow keeps moving.
                                crossterm::event::Event::Key(key)
                                    if key.kind != KeyEventKind::Release =>
                                {
                                    Event::Key(key)
                                }
                                _ => continue,
                            }
                        }
                        Err(err) => match read_failed(&mut read_failures, &err) {
                            Some(tick) => tick,
                            None => return,
                        },
                    },
                    Ok(false) => Event::Tick,
                    Err(err) => {
                        tracing::error!(error = %err, "terminal poll failed, stopping input thread");
                        return;
                    }
                };
                if tx.send(next).is_err() {
                    return;
                }
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> Result<Event> {
        self.rx.recv().context("input thread stopped")
    }
}

/// Count a failed read. The frame still ticks, until too many fail in a row.
fn read_failed(failures: &mut u32, err: &std::io::Error) -> Option<Event> {
    *failures += 1;
    if *failures >= MAX_READ_FAILURES {
        tracing::error!(error = %err, failures = *failures, "terminal read keeps failing, stopping input thread");
        return None;
    }
    tracing::warn!(error = %err, failures = *failures, "terminal read failed");
    Some(Event::Tick)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn read_failures_tick_then_stop() {
        let err = io::Error::new(io::ErrorKind::Other, "broken tty");
        let mut failures = 0;
        for _ in 1..MAX_READ_FAILURES {
            assert!(matches!(read_failed(&mut failures, &err), Some(Event::Tick)));
        }
        assert!(read_failed(&mut failures, &err).is_none());
    }
}
