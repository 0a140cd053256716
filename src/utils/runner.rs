//! Background execution of simulations
//!
//! A run blocks for its whole duration, so front-ends execute it on a
//! worker thread. The runner admits a single run at a time and checks its
//! cancel flag only between simulation ticks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, TryRecvError};
use tracing::{info, warn};

use crate::common::{ControlError, ControlResult};
use crate::control::{MpcConfig, PredictiveController, SimulationHistory};

/// What a finished (or cancelled) run hands back
#[derive(Debug, Clone)]
pub struct RunReport {
    pub history: SimulationHistory,
    /// Reference trajectory the run tracked
    pub reference: Vec<f64>,
    /// True when the run stopped on a cancel request
    pub cancelled: bool,
}

/// Single-flight simulation runner
pub struct SimulationRunner {
    busy: Arc<AtomicBool>,
    cancel: Arc<AtomicBool>,
    receiver: Option<Receiver<RunReport>>,
}

impl SimulationRunner {
    pub fn new() -> Self {
        Self {
            busy: Arc::new(AtomicBool::new(false)),
            cancel: Arc::new(AtomicBool::new(false)),
            receiver: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Start a run on a worker thread. Configuration errors are returned
    /// here, before any thread is spawned.
    pub fn start(&mut self, config: MpcConfig) -> ControlResult<()> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ControlError::Busy);
        }

        let mut controller = match PredictiveController::new(config) {
            Ok(controller) => controller,
            Err(e) => {
                self.busy.store(false, Ordering::Release);
                return Err(e);
            }
        };

        self.cancel.store(false, Ordering::Release);
        let (tx, rx) = crossbeam_channel::bounded(1);
        if let Some(stale) = self.receiver.replace(rx) {
            if !stale.is_empty() {
                warn!("discarding report of a previous run that was never collected");
            }
        }

        let busy = Arc::clone(&self.busy);
        let cancel = Arc::clone(&self.cancel);
        let spawned = thread::Builder::new().name("mpc-simulation".to_string()).spawn(move || {
            let mut cancelled = false;
            while !controller.is_finished() {
                if cancel.load(Ordering::Acquire) {
                    cancelled = true;
                    break;
                }
                controller.tick();
            }
            if cancelled {
                warn!(time = controller.time(), "simulation cancelled");
            } else {
                info!(ticks = controller.history().len(), "background simulation finished");
            }

            let reference = controller.reference().values().to_vec();
            let report = RunReport {
                history: controller.into_history(),
                reference,
                cancelled,
            };
            // the runner may have been dropped; nobody is left to tell
            let _ = tx.send(report);
            busy.store(false, Ordering::Release);
        });

        if let Err(e) = spawned {
            self.receiver = None;
            self.busy.store(false, Ordering::Release);
            return Err(ControlError::WorkerFailed(format!("failed to spawn simulation thread: {}", e)));
        }
        Ok(())
    }

    /// Ask the current run to stop at the next tick boundary
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    /// Non-blocking check for a finished run
    pub fn poll(&mut self) -> Option<ControlResult<RunReport>> {
        let result = match self.receiver.as_ref()?.try_recv() {
            Ok(report) => Ok(report),
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(self.worker_lost()),
        };
        self.receiver = None;
        Some(result)
    }

    /// Block until the current run delivers its report
    pub fn wait(&mut self) -> ControlResult<RunReport> {
        let receiver = self
            .receiver
            .take()
            .ok_or_else(|| ControlError::WorkerFailed("no simulation was started".to_string()))?;
        receiver.recv().map_err(|_| self.worker_lost())
    }

    fn worker_lost(&self) -> ControlError {
        self.busy.store(false, Ordering::Release);
        ControlError::WorkerFailed("simulation worker exited without a result".to_string())
    }
}

impl Default for SimulationRunner {
    fn default() -> Self {
        Self::new()
    }
}
