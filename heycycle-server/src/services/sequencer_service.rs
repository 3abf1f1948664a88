use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::errors::AuthError;
use crate::models::{CycleGroup, Step};

/// Upper bound on materialized cycle groups.
pub const MAX_CYCLE_GROUPS: usize = 1000;

/// Runs a single step against the device. Only an [`AuthError`] stops the sequence.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn execute(&self, step: &Step, cycle_id: u32) -> Result<(), AuthError>;
}

/// Cooperative stop flag, polled once per step boundary.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Elapsed time reached the total runtime
    BudgetExhausted,
    /// The stop signal was observed
    Stopped,
    /// No step matched any pattern group
    NoMatchingSteps,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub steps_executed: usize,
    /// Cycle the last executed step belonged to, 0 when none ran
    pub last_cycle_id: u32,
}

/// Groups steps round-robin by pattern until [`MAX_CYCLE_GROUPS`] groups exist.
pub fn create_cycles<'a>(steps: &'a [Step], patterns: &[Vec<String>]) -> Vec<CycleGroup<'a>> {
    if patterns.is_empty() {
        return Vec::new();
    }

    (0..MAX_CYCLE_GROUPS)
        .map(|index| {
            let pattern_index = index % patterns.len();
            let pattern = &patterns[pattern_index];

            CycleGroup {
                pattern_index,
                steps: steps
                    .iter()
                    .filter(|step| pattern.contains(&step.description))
                    .collect(),
            }
        })
        .collect()
}

pub struct CycleSequencer<E> {
    executor: E,
    patterns: Vec<Vec<String>>,
}

impl<E: StepExecutor> CycleSequencer<E> {
    pub fn new(executor: E, patterns: Vec<Vec<String>>) -> Self {
        Self { executor, patterns }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Replays the cycle groups until `total_runtime` elapses or `stop` is raised.
    ///
    /// The budget is checked before and after every step, and the hold of the
    /// step in flight is never cut short, so a run may overrun by one hold.
    pub async fn run(
        &self,
        steps: &[Step],
        total_runtime: Duration,
        stop: &StopSignal,
    ) -> Result<RunReport, AuthError> {
        let started = Instant::now();
        let cycles = create_cycles(steps, &self.patterns);

        let mut report = RunReport {
            outcome: RunOutcome::BudgetExhausted,
            steps_executed: 0,
            last_cycle_id: 0,
        };

        if cycles.iter().all(|group| group.steps.is_empty()) {
            tracing::warn!("no step matches any cycle pattern, nothing to run");
            report.outcome = RunOutcome::NoMatchingSteps;
            return Ok(report);
        }

        // Wrap at the last whole pass so the round-robin order survives replay
        let groups_per_cycle = self.patterns.len();
        let replay_len = match cycles.len() - cycles.len() % groups_per_cycle {
            0 => cycles.len(),
            len => len,
        };

        let mut position = 0usize;
        loop {
            if started.elapsed() >= total_runtime {
                tracing::info!("total runtime of {:?} reached", total_runtime);
                return Ok(report);
            }

            let group = &cycles[position % replay_len];
            let cycle_id = u32::try_from(position / groups_per_cycle + 1).unwrap_or(u32::MAX);

            for step in &group.steps {
                if stop.is_stopped() {
                    tracing::info!("cycle control stopped by user");
                    report.outcome = RunOutcome::Stopped;
                    return Ok(report);
                }

                if started.elapsed() >= total_runtime {
                    tracing::info!("total runtime of {:?} reached", total_runtime);
                    return Ok(report);
                }

                tracing::info!("executing: {} (Cycle {})", step.description, cycle_id);
                self.executor.execute(step, cycle_id).await?;
                report.steps_executed += 1;
                report.last_cycle_id = cycle_id;

                tokio::time::sleep(step.hold()).await;

                if started.elapsed() >= total_runtime {
                    tracing::info!("total runtime of {:?} reached", total_runtime);
                    return Ok(report);
                }
            }

            position += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use heycycle_api::models::PortStates;
    use tokio::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Execution {
        description: String,
        cycle_id: u32,
        at_secs: u64,
    }

    struct RecordingExecutor {
        started: Instant,
        executions: Mutex<Vec<Execution>>,
        stop_after: Option<(usize, StopSignal)>,
        fail_at: Option<usize>,
    }

    impl RecordingExecutor {
        fn new() -> Self {
            Self {
                started: Instant::now(),
                executions: Mutex::new(Vec::new()),
                stop_after: None,
                fail_at: None,
            }
        }

        async fn executions(&self) -> Vec<Execution> {
            self.executions.lock().await.clone()
        }
    }

    #[async_trait]
    impl StepExecutor for RecordingExecutor {
        async fn execute(&self, step: &Step, cycle_id: u32) -> Result<(), AuthError> {
            let mut executions = self.executions.lock().await;

            if self.fail_at == Some(executions.len()) {
                return Err(AuthError::InvalidResponse(String::from("no token")));
            }

            executions.push(Execution {
                description: step.description.clone(),
                cycle_id,
                at_secs: self.started.elapsed().as_secs(),
            });

            if let Some((count, signal)) = &self.stop_after {
                if executions.len() == *count {
                    signal.stop();
                }
            }

            Ok(())
        }
    }

    fn patterns() -> Vec<Vec<String>> {
        [
            ["Turning ON fog", "Turning OFF fog"],
            ["Turning ON plasma", "Turning OFF plasma"],
            ["Turning ON fog and plasma", "Turning OFF fog and plasma"],
        ]
        .iter()
        .map(|pair| pair.iter().map(|s| s.to_string()).collect())
        .collect()
    }

    fn fog_steps(duration: u64) -> Vec<Step> {
        vec![
            Step::new("Turning ON fog", PortStates::new(true, false, true), duration),
            Step::new("Turning OFF fog", PortStates::new(false, false, true), duration),
        ]
    }

    fn all_steps(duration: u64) -> Vec<Step> {
        vec![
            Step::new("Turning ON fog", PortStates::new(true, false, true), duration),
            Step::new("Turning OFF fog", PortStates::new(false, false, true), duration),
            Step::new("Turning ON plasma", PortStates::new(false, true, true), duration),
            Step::new("Turning OFF plasma", PortStates::new(false, false, true), duration),
            Step::new("Turning ON fog and plasma", PortStates::new(true, true, true), duration),
            Step::new("Turning OFF fog and plasma", PortStates::new(false, false, true), duration),
        ]
    }

    #[test]
    fn test_create_cycles_is_round_robin_and_capped() {
        let steps = all_steps(1);

        let cycles = create_cycles(&steps, &patterns());

        assert_eq!(cycles.len(), MAX_CYCLE_GROUPS);
        for (index, group) in cycles.iter().enumerate() {
            assert_eq!(group.pattern_index, index % 3);
            assert_eq!(group.steps.len(), 2);
        }
        assert_eq!(cycles[1].steps[0].description, "Turning ON plasma");
        assert_eq!(cycles[2].steps[1].description, "Turning OFF fog and plasma");
    }

    #[test]
    fn test_create_cycles_matches_exact_descriptions_in_catalog_order() {
        let steps = vec![
            Step::new("Turning OFF fog", PortStates::default(), 1),
            Step::new("turning on fog", PortStates::default(), 1),
            Step::new("Turning ON fog", PortStates::default(), 1),
        ];

        let first = create_cycles(&steps, &patterns());
        let second = create_cycles(&steps, &patterns());

        assert_eq!(first, second);
        let descriptions: Vec<_> = first[0].steps.iter().map(|s| s.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Turning OFF fog", "Turning ON fog"]);
        assert!(first[1].steps.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_soft_budget_allows_overrun() {
        let sequencer = CycleSequencer::new(RecordingExecutor::new(), patterns());

        let report = sequencer
            .run(&fog_steps(5), Duration::from_secs(12), &StopSignal::new())
            .await
            .unwrap();

        let executions = sequencer.executor().executions().await;
        let summary: Vec<_> = executions
            .iter()
            .map(|e| (e.description.as_str(), e.cycle_id, e.at_secs))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Turning ON fog", 1, 0),
                ("Turning OFF fog", 1, 5),
                ("Turning ON fog", 2, 10),
            ]
        );
        assert_eq!(report.outcome, RunOutcome::BudgetExhausted);
        assert_eq!(report.steps_executed, 3);
        assert_eq!(report.last_cycle_id, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_id_counts_full_passes() {
        let sequencer = CycleSequencer::new(RecordingExecutor::new(), patterns());

        sequencer
            .run(&all_steps(1), Duration::from_secs(12), &StopSignal::new())
            .await
            .unwrap();

        let cycle_ids: Vec<_> = sequencer
            .executor()
            .executions()
            .await
            .iter()
            .map(|e| e.cycle_id)
            .collect();
        assert_eq!(cycle_ids, vec![1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_runtime_executes_nothing() {
        let sequencer = CycleSequencer::new(RecordingExecutor::new(), patterns());

        let report = sequencer
            .run(&fog_steps(5), Duration::ZERO, &StopSignal::new())
            .await
            .unwrap();

        assert_eq!(report.steps_executed, 0);
        assert!(sequencer.executor().executions().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_first_step() {
        let sequencer = CycleSequencer::new(RecordingExecutor::new(), patterns());
        let stop = StopSignal::new();
        stop.stop();

        let report = sequencer
            .run(&fog_steps(5), Duration::from_secs(3600), &stop)
            .await
            .unwrap();

        assert_eq!(report.outcome, RunOutcome::Stopped);
        assert_eq!(report.steps_executed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_observed_at_next_step_boundary() {
        let stop = StopSignal::new();
        let executor = RecordingExecutor {
            stop_after: Some((3, stop.clone())),
            ..RecordingExecutor::new()
        };
        let sequencer = CycleSequencer::new(executor, patterns());

        let report = sequencer
            .run(&all_steps(60), Duration::from_secs(36000), &stop)
            .await
            .unwrap();

        assert_eq!(report.outcome, RunOutcome::Stopped);
        assert_eq!(report.steps_executed, 3);
        let executions = sequencer.executor().executions().await;
        assert_eq!(executions[2].description, "Turning ON plasma");
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_error_aborts_run() {
        let executor = RecordingExecutor {
            fail_at: Some(1),
            ..RecordingExecutor::new()
        };
        let sequencer = CycleSequencer::new(executor, patterns());

        let result = sequencer
            .run(&fog_steps(5), Duration::from_secs(3600), &StopSignal::new())
            .await;

        assert!(matches!(result, Err(AuthError::InvalidResponse(_))));
        assert_eq!(sequencer.executor().executions().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmatched_steps_return_immediately() {
        let sequencer = CycleSequencer::new(RecordingExecutor::new(), patterns());
        let steps = vec![Step::new("Turning ON lights", PortStates::default(), 5)];

        let report = sequencer
            .run(&steps, Duration::from_secs(3600), &StopSignal::new())
            .await
            .unwrap();

        assert_eq!(report.outcome, RunOutcome::NoMatchingSteps);
        assert_eq!(report.steps_executed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_keeps_round_robin_order() {
        let sequencer = CycleSequencer::new(RecordingExecutor::new(), patterns());
        let steps = vec![
            Step::new("Turning ON fog", PortStates::default(), 1),
            Step::new("Turning ON plasma", PortStates::default(), 1),
        ];

        // 333 whole passes of fog, plasma, (empty) then into the replay
        sequencer
            .run(&steps, Duration::from_secs(670), &StopSignal::new())
            .await
            .unwrap();

        let executions = sequencer.executor().executions().await;
        assert_eq!(executions.len(), 670);
        for (index, execution) in executions.iter().enumerate() {
            let expected = if index % 2 == 0 { "Turning ON fog" } else { "Turning ON plasma" };
            assert_eq!(execution.description, expected);
            assert_eq!(execution.cycle_id as usize, index / 2 + 1);
        }
    }
}
