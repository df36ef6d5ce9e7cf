//! Background worker for scheduled housekeeping

use crate::{Janitor, JanitorConfig, JanitorError, RunControl, RunReport};
use tokio::time::{interval, Duration};

/// Background worker that runs the Janitor on a schedule
///
/// Each cycle runs on the blocking thread pool, since the pipeline does plain
/// filesystem I/O. Ctrl+C cancels an in-flight cycle between files and stops the
/// worker once that cycle has wound down.
///
/// # Examples
///
/// ```no_run
/// use logkeeper_janitor::{JanitorConfig, JanitorWorker};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = JanitorConfig::default().with_dirs("/srv/archives", ["/var/log/app"]);
///     let mut worker = JanitorWorker::new(config);
///
///     // Run indefinitely (until Ctrl+C)
///     worker.run().await?;
///     Ok(())
/// }
/// ```
pub struct JanitorWorker {
    config: JanitorConfig,
    interval: Duration,
    control: RunControl,
    cycles_completed: usize,
    last_report: Option<RunReport>,
}

impl JanitorWorker {
    /// Create a new background worker with the given configuration
    pub fn new(config: JanitorConfig) -> Self {
        let interval = config.sweep_interval();
        Self {
            config,
            interval,
            control: RunControl::new(),
            cycles_completed: 0,
            last_report: None,
        }
    }

    /// Override the interval between cycles
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Interval between cycles
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Handle that stops the worker's current and future cycles
    pub fn control(&self) -> RunControl {
        self.control.clone()
    }

    /// Number of cycles that ran to completion (with or without a report error)
    pub fn cycles_completed(&self) -> usize {
        self.cycles_completed
    }

    /// Report of the most recent cycle
    pub fn last_report(&self) -> Option<&RunReport> {
        self.last_report.as_ref()
    }

    /// Run the worker indefinitely
    ///
    /// Runs a cycle at the configured interval until a shutdown signal (Ctrl+C) is
    /// received or the control is cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the blocking task panics.
    pub async fn run(&mut self) -> Result<(), JanitorError> {
        self.config.validate()?;
        let mut ticker = interval(self.interval);
        let control = self.control.clone();

        tracing::info!("Janitor worker started (interval: {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if control.is_cancelled() {
                        break;
                    }
                    tracing::debug!("Starting housekeeping cycle");

                    let result = {
                        let cycle = self.run_cycle();
                        tokio::pin!(cycle);
                        tokio::select! {
                            result = &mut cycle => result,
                            _ = tokio::signal::ctrl_c() => {
                                tracing::info!("Shutdown signal received, stopping current cycle");
                                control.cancel();
                                (&mut cycle).await
                            }
                        }
                    };
                    self.log_cycle(result)?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping janitor");
                    control.cancel();
                }
            }

            if control.is_cancelled() {
                break;
            }
        }

        tracing::info!("Janitor stopped after {} cycle(s)", self.cycles_completed);
        Ok(())
    }

    /// Run for a specific number of cycles (useful for testing)
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use logkeeper_janitor::{JanitorConfig, JanitorWorker};
    /// use std::time::Duration;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let config = JanitorConfig::default().with_dirs("/srv/archives", ["/var/log/app"]);
    ///     let mut worker = JanitorWorker::new(config).with_interval(Duration::from_secs(1));
    ///
    ///     // Run for 3 cycles then stop
    ///     worker.run_cycles(3).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn run_cycles(&mut self, cycles: usize) -> Result<(), JanitorError> {
        self.config.validate()?;
        let mut ticker = interval(self.interval);

        tracing::info!(
            "Janitor worker started for {} cycles (interval: {:?})",
            cycles,
            self.interval
        );

        for cycle in 0..cycles {
            ticker.tick().await;
            if self.control.is_cancelled() {
                break;
            }
            tracing::debug!("Starting housekeeping cycle {}/{}", cycle + 1, cycles);

            let result = self.run_cycle().await;
            self.log_cycle(result)?;
        }

        tracing::info!("Janitor finished {} cycle(s)", self.cycles_completed);
        Ok(())
    }

    /// Run one cycle on the blocking pool
    async fn run_cycle(&mut self) -> Result<RunReport, JanitorError> {
        let config = self.config.clone();
        let control = self.control.clone();

        let (result, report) = tokio::task::spawn_blocking(move || {
            let mut janitor = Janitor::new(config);
            let result = janitor.run(&control);
            (result, janitor.last_report().cloned())
        })
        .await
        .map_err(|e| JanitorError::Worker(e.to_string()))?;

        if report.is_some() {
            self.cycles_completed += 1;
            self.last_report = report;
        }
        result
    }

    /// Log a cycle outcome; only configuration and worker errors stop the worker
    fn log_cycle(&self, result: Result<RunReport, JanitorError>) -> Result<(), JanitorError> {
        match result {
            Ok(report) => {
                tracing::info!(
                    "Cycle completed: {} archived, {} deleted, {} failed",
                    report.archive.totals.succeeded,
                    report.deletion.totals.succeeded,
                    report.archive.totals.failed + report.deletion.totals.failed
                );
                Ok(())
            }
            Err(e @ (JanitorError::Config(_) | JanitorError::Worker(_))) => {
                tracing::error!("Cycle failed: {}", e);
                Err(e)
            }
            Err(e) => {
                tracing::error!("Cycle finished with error: {}", e);
                Ok(())
            }
        }
    }
}
