//! Background initialization.
//!
//! Camera acquisition and detector loading can take a while.  Each runs on
//! its own thread and hands its result back over a channel; the frame loop
//! polls the [`Loader`] once per frame and never blocks on it.

use std::fmt::Display;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

// ════════════════════════════════════════════════════════════════════════════
// LoadState
// ════════════════════════════════════════════════════════════════════════════

/// Outcome of one [`Loader::poll`].
#[derive(Debug)]
pub enum LoadState<T> {
    /// Still initializing.
    Pending,
    /// Finished; the value is handed over exactly once.
    Ready(T),
    /// Initialization failed, or the result was already taken.
    Failed(String),
}

// ════════════════════════════════════════════════════════════════════════════
// Loader
// ════════════════════════════════════════════════════════════════════════════

/// Handle to an initializer running on its own thread.
pub struct Loader<T> {
    name:    &'static str,
    rx:      Receiver<Result<T, String>>,
    started: Instant,
}

/// Run `init` on a new thread and return a handle to poll for its result.
pub fn spawn_loader<T, E, F>(name: &'static str, init: F) -> Loader<T>
where
    T: Send + 'static,
    E: Display,
    F: FnOnce() -> Result<T, E> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    log::info!("{}: loading", name);
    thread::spawn(move || {
        let _ = tx.send(init().map_err(|e| e.to_string()));
    });
    Loader { name, rx, started: Instant::now() }
}

impl<T> Loader<T> {
    pub fn name(&self) -> &'static str { self.name }

    /// Time since the loader was spawned.
    pub fn elapsed(&self) -> Duration { self.started.elapsed() }

    /// Check for a result without blocking.
    pub fn poll(&mut self) -> LoadState<T> {
        match self.rx.try_recv() {
            Ok(Ok(value)) => {
                log::info!("{}: ready after {:.2?}", self.name, self.elapsed());
                LoadState::Ready(value)
            }
            Ok(Err(e)) => LoadState::Failed(e),
            Err(TryRecvError::Empty) => LoadState::Pending,
            Err(TryRecvError::Disconnected) => {
                LoadState::Failed(format!("{} loader exited without a result", self.name))
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn wait<T>(loader: &mut Loader<T>) -> LoadState<T> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match loader.poll() {
                LoadState::Pending if Instant::now() < deadline => {
                    thread::sleep(Duration::from_millis(1));
                }
                other => return other,
            }
        }
    }

    #[test]
    fn ready_value_is_delivered() {
        let mut l = spawn_loader("test", || Ok::<_, String>(42));
        assert!(matches!(wait(&mut l), LoadState::Ready(42)));
    }

    #[test]
    fn failure_message_is_delivered() {
        let mut l = spawn_loader("test", || Err::<u8, _>("no device"));
        match wait(&mut l) {
            LoadState::Failed(msg) => assert_eq!(msg, "no device"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn pending_while_initializing() {
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let mut l = spawn_loader("slow", move || {
            gate_rx.recv().map_err(|e| e.to_string())?;
            Ok::<_, String>("done")
        });
        assert!(matches!(l.poll(), LoadState::Pending));
        gate_tx.send(()).unwrap();
        assert!(matches!(wait(&mut l), LoadState::Ready("done")));
    }

    #[test]
    fn second_poll_after_ready_fails() {
        let mut l = spawn_loader("once", || Ok::<_, String>(1u8));
        assert!(matches!(wait(&mut l), LoadState::Ready(1)));
        assert!(matches!(wait(&mut l), LoadState::Failed(_)));
    }

    #[test]
    fn panicking_loader_reports_failure() {
        let mut l: Loader<u8> = spawn_loader("boom", || -> Result<u8, String> { panic!("boom") });
        assert!(matches!(wait(&mut l), LoadState::Failed(_)));
    }
}
