//! Cron-driven reminder scheduler.
//!
//! Runs [`ReminderJob::run_all`] on a cron schedule and drains the rescan
//! channel on a monitor task. Join handles are tracked, cancellation is
//! explicit, and every lifecycle step is wrapped in a timeout.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use medminder_infra::scheduling::{
//!     ChannelRescanTrigger, ReminderJob, ReminderScheduler, ReminderSchedulerConfig,
//!     SchedulerResult,
//! };
//!
//! # async fn example(job: Arc<ReminderJob>) -> SchedulerResult<()> {
//! let (_trigger, rescans) = ChannelRescanTrigger::channel();
//! let mut scheduler =
//!     ReminderScheduler::new(ReminderSchedulerConfig::default(), job, rescans);
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use medminder_domain::{ReminderConfig, UserId};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::reminder_job::ReminderJob;
use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the reminder scheduler.
#[derive(Debug, Clone)]
pub struct ReminderSchedulerConfig {
    /// Six-field cron expression (seconds first).
    pub cron_expression: String,
    /// Timeout applied to one scan pass.
    pub job_timeout: Duration,
    pub start_timeout: Duration,
    pub stop_timeout: Duration,
    /// Timeout for awaiting the monitor task join handle.
    pub join_timeout: Duration,
}

impl Default for ReminderSchedulerConfig {
    fn default() -> Self {
        Self::from_reminders(&ReminderConfig::default())
    }
}

impl ReminderSchedulerConfig {
    pub fn from_reminders(config: &ReminderConfig) -> Self {
        Self {
            cron_expression: config.scan_cron.clone(),
            job_timeout: Duration::from_secs(30),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Reminder scheduler with explicit lifecycle management.
///
/// A fresh [`JobScheduler`] is built on every start, so a stopped scheduler
/// can be started again.
pub struct ReminderScheduler {
    scheduler: Option<JobScheduler>,
    config: ReminderSchedulerConfig,
    job: Arc<ReminderJob>,
    rescans: Arc<Mutex<UnboundedReceiver<UserId>>>,
    monitor_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
}

impl ReminderScheduler {
    pub fn new(
        config: ReminderSchedulerConfig,
        job: Arc<ReminderJob>,
        rescans: UnboundedReceiver<UserId>,
    ) -> Self {
        Self {
            scheduler: None,
            config,
            job,
            rescans: Arc::new(Mutex::new(rescans)),
            monitor_handle: None,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn job(&self) -> &Arc<ReminderJob> {
        &self.job
    }

    /// Start the cron job and the rescan monitor.
    ///
    /// # Errors
    /// `AlreadyRunning`, an invalid cron expression, or a start timeout.
    #[instrument(skip(self), fields(cron = %self.config.cron_expression))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler = JobScheduler::new()
            .await
            .map_err(|source| SchedulerError::CreationFailed { source })?;
        let job_id = self.register_scan_job(&scheduler).await?;

        let start_timeout = self.config.start_timeout;
        tokio::time::timeout(start_timeout, scheduler.start())
            .await
            .map_err(|source| SchedulerError::Timeout { duration: start_timeout, source })?
            .map_err(|source| SchedulerError::StartFailed { source })?;

        let cancel = self.cancellation.clone();
        let job = Arc::clone(&self.job);
        let rescans = Arc::clone(&self.rescans);
        let job_timeout = self.config.job_timeout;
        let handle = tokio::spawn(async move {
            Self::monitor_task(cancel, job, rescans, job_timeout).await;
        });

        self.scheduler = Some(scheduler);
        self.monitor_handle = Some(handle);
        info!(job_id = %job_id, "Reminder scheduler started");
        Ok(())
    }

    /// Stop the cron job and wait for the monitor task to finish.
    ///
    /// # Errors
    /// `NotRunning`, a shutdown failure, or a stop/join timeout.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.cancel();

        if let Some(mut scheduler) = self.scheduler.take() {
            let stop_timeout = self.config.stop_timeout;
            tokio::time::timeout(stop_timeout, scheduler.shutdown())
                .await
                .map_err(|source| SchedulerError::Timeout { duration: stop_timeout, source })?
                .map_err(|source| SchedulerError::StopFailed { source })?;
        }

        if let Some(handle) = self.monitor_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|source| SchedulerError::Timeout { duration: join_timeout, source })??;
        }

        info!("Reminder scheduler stopped");
        self.cancellation = CancellationToken::new();
        Ok(())
    }

    /// Returns true when the monitor task is active.
    pub fn is_running(&self) -> bool {
        self.monitor_handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    async fn register_scan_job(&self, scheduler: &JobScheduler) -> SchedulerResult<Uuid> {
        let job = Arc::clone(&self.job);
        let job_timeout = self.config.job_timeout;

        let job_definition = Job::new_async(self.config.cron_expression.as_str(), move |_id, _lock| {
            let job = Arc::clone(&job);

            Box::pin(async move {
                let started = Instant::now();
                match tokio::time::timeout(job_timeout, job.run_all()).await {
                    Ok(presented) => debug!(
                        presented,
                        elapsed_ms = started.elapsed().as_millis(),
                        "Reminder scan pass finished"
                    ),
                    Err(_) => {
                        warn!(timeout_secs = job_timeout.as_secs(), "Reminder scan pass timed out");
                    }
                }
            })
        })
        .map_err(|source| SchedulerError::JobRegistrationFailed { source })?;

        let job_id = job_definition.guid();
        scheduler
            .add(job_definition)
            .await
            .map_err(|source| SchedulerError::JobRegistrationFailed { source })?;

        debug!(job_id = %job_id, "Registered reminder scan job");
        Ok(job_id)
    }

    async fn monitor_task(
        cancel: CancellationToken,
        job: Arc<ReminderJob>,
        rescans: Arc<Mutex<UnboundedReceiver<UserId>>>,
        job_timeout: Duration,
    ) {
        let mut rescans = rescans.lock().await;
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("Reminder scheduler monitor cancelled");
                    break;
                }
                request = rescans.recv() => {
                    let Some(user_id) = request else {
                        debug!("Rescan channel closed");
                        cancel.cancelled().await;
                        break;
                    };
                    match tokio::time::timeout(job_timeout, job.run_scan(&user_id)).await {
                        Ok(Ok(report)) => {
                            debug!(user = %user_id, due = report.reminder.is_some(), "Rescan finished");
                        }
                        Ok(Err(err)) => warn!(user = %user_id, error = %err, "Rescan failed"),
                        Err(_) => warn!(user = %user_id, "Rescan timed out"),
                    }
                }
            }
        }
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("ReminderScheduler dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}
