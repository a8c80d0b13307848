//! Twin Driver
//!
//! Runs a [`SimulationView`] either in real time on a tokio task or
//! fast-forwarded through simulated time.
//!
//! The realtime task owns the view outright. Two independent intervals feed
//! it (the accrual tick and the display frame), commands arrive over an mpsc
//! channel and every update is published on a watch channel. Because a
//! single task does all the mutation there is no locking.

use crate::config::TwinConfig;
use crate::facility::FacilityType;
use crate::view::{SimulationSnapshot, SimulationView};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Errors from talking to a running driver
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Twin driver is no longer running")]
    Closed,

    #[error("Twin driver task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// Commands accepted by the realtime driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwinCommand {
    /// Play
    Start,
    /// Pause
    Stop,
    /// Switch facility (stops the simulation)
    SetFacility(FacilityType),
    /// Tear the view down and end the task
    Shutdown,
}

/// Handle to a realtime twin task
///
/// Dropping the handle aborts the task.
#[derive(Debug)]
pub struct TwinHandle {
    commands: mpsc::Sender<TwinCommand>,
    snapshots: watch::Receiver<SimulationSnapshot>,
    task: Option<JoinHandle<SimulationSnapshot>>,
}

impl TwinHandle {
    /// Start or resume the simulation
    pub async fn start(&self) -> Result<(), DriverError> {
        self.send(TwinCommand::Start).await
    }

    /// Pause the simulation
    pub async fn stop(&self) -> Result<(), DriverError> {
        self.send(TwinCommand::Stop).await
    }

    /// Switch facility
    pub async fn set_facility(&self, facility: FacilityType) -> Result<(), DriverError> {
        self.send(TwinCommand::SetFacility(facility)).await
    }

    /// Send a raw command
    pub async fn send(&self, command: TwinCommand) -> Result<(), DriverError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| DriverError::Closed)
    }

    /// Most recently published snapshot
    pub fn latest(&self) -> SimulationSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that sees every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<SimulationSnapshot> {
        self.snapshots.clone()
    }

    /// Tear the view down and wait for the task, returning the final snapshot
    pub async fn shutdown(mut self) -> Result<SimulationSnapshot, DriverError> {
        // The task may already be gone; joining still reports how it ended
        let _ = self.commands.send(TwinCommand::Shutdown).await;
        match self.task.take() {
            Some(task) => Ok(task.await?),
            None => Err(DriverError::Closed),
        }
    }
}

impl Drop for TwinHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Mount a view and run it on a new tokio task
pub fn spawn(config: TwinConfig) -> TwinHandle {
    let view = SimulationView::mount(config);
    let (snapshot_tx, snapshot_rx) = watch::channel(view.snapshot());
    let (command_tx, command_rx) = mpsc::channel(32);

    let task = tokio::spawn(run(view, command_rx, snapshot_tx));

    TwinHandle {
        commands: command_tx,
        snapshots: snapshot_rx,
        task: Some(task),
    }
}

async fn run(
    mut view: SimulationView,
    mut commands: mpsc::Receiver<TwinCommand>,
    snapshots: watch::Sender<SimulationSnapshot>,
) -> SimulationSnapshot {
    let origin = Instant::now();

    let mut tick = tokio::time::interval(view.config().tick_interval());
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut frame = tokio::time::interval(view.config().frame_interval());
    frame.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_frame = origin;

    tracing::debug!(session_id = %view.session_id(), "Twin driver started");

    loop {
        tokio::select! {
            command = commands.recv() => {
                let now = origin.elapsed();
                match command {
                    Some(TwinCommand::Start) => view.set_running(true, now),
                    Some(TwinCommand::Stop) => view.set_running(false, now),
                    Some(TwinCommand::SetFacility(facility)) => view.set_facility(facility, now),
                    Some(TwinCommand::Shutdown) | None => break,
                }
            }
            at = tick.tick() => {
                view.on_tick(at.duration_since(origin));
            }
            at = frame.tick() => {
                let dt = at.duration_since(last_frame);
                last_frame = at;
                view.on_frame(at.duration_since(origin), dt);
            }
        }
        snapshots.send_replace(view.snapshot());
    }

    view.teardown();
    let last = view.snapshot();
    snapshots.send_replace(last.clone());
    tracing::debug!(session_id = %view.session_id(), "Twin driver stopped");
    last
}

/// Drive a view through `span` of simulated time starting at `start`,
/// interleaving accrual ticks and frames at the configured intervals.
/// Returns the time reached.
pub fn fast_forward(view: &mut SimulationView, start: Duration, span: Duration) -> Duration {
    let tick = view.config().tick_interval();
    let frame = view.config().frame_interval();
    let end = start + span;

    let mut next_tick = start + tick;
    let mut next_frame = start + frame;
    let mut last_frame = start;

    loop {
        let next = next_tick.min(next_frame);
        if next > end {
            break;
        }
        if next_frame <= next_tick {
            view.on_frame(next_frame, next_frame - last_frame);
            last_frame = next_frame;
            next_frame += frame;
        } else {
            view.on_tick(next_tick);
            next_tick += tick;
        }
    }

    end
}
