use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use heycycle_api::restful::Status;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::errors::{AuthError, CatalogError, CycleError};
use crate::models::Step;
use crate::services::{
    CycleSequencer, DeviceService, RunReport, StatusService, StepExecutor, StopSignal,
    TokenService, load_steps,
};

/// Drives one step on the configured power strip and records it.
#[derive(Clone)]
pub struct ControlExecutor {
    token_service: Arc<TokenService>,
    device_service: DeviceService,
    status_service: StatusService,
    device_id: String,
}

impl ControlExecutor {
    pub fn new(
        token_service: Arc<TokenService>,
        device_service: DeviceService,
        status_service: StatusService,
        device_id: impl Into<String>,
    ) -> Self {
        Self {
            token_service,
            device_service,
            status_service,
            device_id: device_id.into(),
        }
    }
}

#[async_trait]
impl StepExecutor for ControlExecutor {
    async fn execute(&self, step: &Step, cycle_id: u32) -> Result<(), AuthError> {
        let token = self.token_service.get_valid_token().await?;

        let applied = self
            .device_service
            .apply(&token, &self.device_id, step.states)
            .await;

        // a rejected command is not recorded, the cycle keeps its pace
        if applied {
            self.status_service
                .record(
                    &self.device_id,
                    step.states,
                    &step.description,
                    Some(i64::from(cycle_id)),
                )
                .await;
        }

        Ok(())
    }
}

struct ActiveRun {
    stop: StopSignal,
    handle: JoinHandle<Result<RunReport, AuthError>>,
    finished: watch::Receiver<bool>,
}

impl ActiveRun {
    /// Live until the worker reports back, including while a stop is pending.
    fn is_live(&self) -> bool {
        !*self.finished.borrow() && !self.handle.is_finished()
    }
}

/// Owns at most one background cycle run.
pub struct CycleRunner<E> {
    sequencer: Arc<CycleSequencer<E>>,
    steps_path: PathBuf,
    total_runtime: Duration,
    active: Mutex<Option<ActiveRun>>,
}

impl<E: StepExecutor + 'static> CycleRunner<E> {
    pub fn new(sequencer: CycleSequencer<E>, steps_path: impl Into<PathBuf>, total_runtime: Duration) -> Self {
        Self {
            sequencer: Arc::new(sequencer),
            steps_path: steps_path.into(),
            total_runtime,
            active: Mutex::new(None),
        }
    }

    /// Loads the step file and starts a run in the background.
    pub async fn start(&self) -> Result<(), CycleError> {
        let mut active = self.active.lock().await;

        if active.as_ref().is_some_and(ActiveRun::is_live) {
            return Err(CycleError::AlreadyRunning);
        }

        let steps = load_steps(&self.steps_path)?;
        if steps.is_empty() {
            return Err(CatalogError::Empty(self.steps_path.clone()).into());
        }

        let stop = StopSignal::new();
        let (finished_tx, finished) = watch::channel(false);
        let handle = tokio::spawn(Self::run(
            self.sequencer.clone(),
            steps,
            self.total_runtime,
            stop.clone(),
            finished_tx,
        ));

        *active = Some(ActiveRun {
            stop,
            handle,
            finished,
        });

        tracing::info!("cycle control started");

        Ok(())
    }

    /// Raises the stop signal and waits for the run to observe it.
    ///
    /// The lock is released before waiting, so `status` and `start` keep
    /// answering while the current hold runs out.
    pub async fn stop(&self) -> Result<(), CycleError> {
        let mut finished = {
            let active = self.active.lock().await;

            match active.as_ref() {
                Some(run) if run.is_live() => {
                    run.stop.stop();
                    run.finished.clone()
                }
                _ => return Err(CycleError::NotRunning),
            }
        };

        tracing::info!("stop requested, waiting for the current step to finish");

        finished
            .wait_for(|done| *done)
            .await
            .map_err(|_| CycleError::Worker(String::from("worker exited without reporting")))?;

        tracing::info!("cycle control stopped");

        Ok(())
    }

    pub async fn status(&self) -> Status {
        match self.active.lock().await.as_ref() {
            Some(run) if run.is_live() => Status::Running,
            _ => Status::Idle,
        }
    }

    async fn run(
        sequencer: Arc<CycleSequencer<E>>,
        steps: Vec<Step>,
        total_runtime: Duration,
        stop: StopSignal,
        finished: watch::Sender<bool>,
    ) -> Result<RunReport, AuthError> {
        let result = sequencer.run(&steps, total_runtime, &stop).await;
        finished.send_replace(true);

        match &result {
            Ok(report) => tracing::info!(
                "cycle control finished: {:?} after {} steps",
                report.outcome,
                report.steps_executed
            ),
            Err(e) => tracing::error!("cycle control aborted: {}", e),
        }

        result
    }
}
