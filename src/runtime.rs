//! Real-time host for the engine
//!
//! A single worker thread owns the [`Engine`] and is the only place it is
//! touched. Commands arrive over a channel and are applied between ticks;
//! ticks are delivered when the wall-clock deadline passes. Both run on the
//! same thread, one at a time.

use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::engine::{Command, Engine};
use crate::feedback::FeedbackSink;
use crate::scheduler::DeadlineScheduler;
use crate::snapshot::Snapshot;

enum Message {
    Command(Command),
    Shutdown,
}

/// Cloneable handle for queueing commands from any thread
#[derive(Clone)]
pub struct CommandSender {
    tx: Sender<Message>,
}

impl CommandSender {
    /// Queue a command. Returns false once the loop has stopped.
    pub fn send(&self, command: Command) -> bool {
        self.tx.send(Message::Command(command)).is_ok()
    }
}

/// Running game loop
pub struct GameLoop {
    tx: Sender<Message>,
    worker: Option<JoinHandle<Snapshot>>,
}

impl GameLoop {
    /// Move `engine` onto a worker thread and start delivering ticks
    pub fn spawn<F>(engine: Engine<DeadlineScheduler, F>) -> io::Result<Self>
    where
        F: FeedbackSink + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("snake-engine".into())
            .spawn(move || run(engine, rx))?;
        Ok(Self {
            tx,
            worker: Some(worker),
        })
    }

    pub fn commands(&self) -> CommandSender {
        CommandSender {
            tx: self.tx.clone(),
        }
    }

    pub fn send(&self, command: Command) -> bool {
        self.tx.send(Message::Command(command)).is_ok()
    }

    /// Stop the loop and return the final snapshot
    pub fn shutdown(mut self) -> Option<Snapshot> {
        self.stop()
    }

    fn stop(&mut self) -> Option<Snapshot> {
        let worker = self.worker.take()?;
        let _ = self.tx.send(Message::Shutdown);
        match worker.join() {
            Ok(snapshot) => Some(snapshot),
            Err(_) => {
                log::error!("Game loop thread panicked");
                None
            }
        }
    }
}

impl Drop for GameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run<F: FeedbackSink>(
    mut engine: Engine<DeadlineScheduler, F>,
    rx: Receiver<Message>,
) -> Snapshot {
    log::info!("Game loop running");

    loop {
        // Sleep until the next tick is due or a command arrives
        let message = match engine.scheduler().next_due() {
            Some(due) => match rx.recv_timeout(due.saturating_duration_since(Instant::now())) {
                Ok(message) => Some(message),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match rx.recv() {
                Ok(message) => Some(message),
                Err(_) => break,
            },
        };

        match message {
            Some(Message::Command(command)) => engine.apply(command),
            Some(Message::Shutdown) => break,
            None => {}
        }

        while let Some(ticket) = engine.scheduler_mut().pop_due(Instant::now()) {
            engine.on_tick(ticket);
        }
    }

    log::info!("Game loop stopped");
    engine.snapshot()
}
