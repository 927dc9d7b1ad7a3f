//! Application context - dependency injection container

use std::sync::Arc;

use medminder_core::{
    Clock, DoseLedger, IntakeService, MedicationLookup, MedicationService, ReminderPresenter,
    ReminderScanner, SnoozeCoordinator, TimerRegistry,
};
use medminder_domain::{Config, Result, UserId};
use medminder_infra::scheduling::ReminderSchedulerConfig;
use medminder_infra::{
    ChannelRescanTrigger, InMemoryIntakeLogStore, InMemoryMedicationStore, MokaLocalCache,
    OpenFdaLookup, ReminderJob, ReminderScheduler, SystemClock, TracingNotificationScheduler,
    TracingReminderPresenter,
};
use tokio::sync::Mutex;
use tracing::info;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub clock: Arc<dyn Clock>,

    // Stores
    pub medications: Arc<InMemoryMedicationStore>,
    pub intake_logs: Arc<InMemoryIntakeLogStore>,
    pub cache: Arc<MokaLocalCache>,
    pub notifications: Arc<TracingNotificationScheduler>,
    pub lookup: Arc<dyn MedicationLookup>,

    // Core services
    pub timers: Arc<TimerRegistry>,
    pub intake: Arc<IntakeService>,
    pub medication_service: Arc<MedicationService>,
    pub scanner: Arc<ReminderScanner>,
    pub snooze: Arc<SnoozeCoordinator>,

    // Reminder loop
    pub reminder_job: Arc<ReminderJob>,
    pub scheduler: Mutex<ReminderScheduler>,
}

impl AppContext {
    /// Wire the application against the system clock, logging reminders.
    ///
    /// # Errors
    /// Returns `MedMinderError::Config` if the configuration is invalid, or a
    /// network error if the catalogue client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_parts(config, Arc::new(SystemClock), Arc::new(TracingReminderPresenter))
    }

    /// Wire the application with an explicit clock and presenter.
    ///
    /// # Errors
    /// Same as [`Self::new`].
    pub fn with_parts(
        config: Config,
        clock: Arc<dyn Clock>,
        presenter: Arc<dyn ReminderPresenter>,
    ) -> Result<Self> {
        config.validate()?;
        let reminders = &config.reminders;

        let medications = Arc::new(InMemoryMedicationStore::new());
        let intake_logs = Arc::new(InMemoryIntakeLogStore::new());
        let cache = Arc::new(MokaLocalCache::new(&config.cache));
        let notifications = Arc::new(TracingNotificationScheduler::new());
        let lookup: Arc<dyn MedicationLookup> = Arc::new(OpenFdaLookup::new(&config.lookup)?);

        let timers = Arc::new(TimerRegistry::new());
        let ledger = Arc::new(DoseLedger::new(cache.clone(), reminders.max_snoozes));
        let intake = Arc::new(
            IntakeService::new(medications.clone(), intake_logs.clone(), ledger, clock.clone())
                .with_timers(timers.clone()),
        );
        let medication_service = Arc::new(MedicationService::new(
            medications.clone(),
            notifications.clone(),
            clock.clone(),
        ));

        let (rescan, rescans) = ChannelRescanTrigger::channel();
        let scanner = Arc::new(ReminderScanner::new(intake.clone(), reminders.grace_period_minutes));
        let snooze = Arc::new(SnoozeCoordinator::new(
            intake.clone(),
            Arc::new(rescan),
            reminders.grace_period_minutes,
        ));

        let reminder_job = Arc::new(
            ReminderJob::new(
                medications.clone(),
                scanner.clone(),
                snooze.clone(),
                presenter,
                clock.clone(),
            )
            .with_sweep(reminders.sweep_missed),
        );
        let scheduler = ReminderScheduler::new(
            ReminderSchedulerConfig::from_reminders(reminders),
            reminder_job.clone(),
            rescans,
        );

        info!(
            grace_period_minutes = reminders.grace_period_minutes,
            max_snoozes = reminders.max_snoozes,
            scan_cron = %reminders.scan_cron,
            "Application context initialised"
        );

        Ok(Self {
            config,
            clock,
            medications,
            intake_logs,
            cache,
            notifications,
            lookup,
            timers,
            intake,
            medication_service,
            scanner,
            snooze,
            reminder_job,
            scheduler: Mutex::new(scheduler),
        })
    }

    /// Include a user in the reminder loop and schedule their daily
    /// notifications. Returns the number of reminders scheduled.
    ///
    /// # Errors
    /// Medication store failures.
    pub async fn watch_user(&self, user_id: &UserId) -> Result<usize> {
        self.reminder_job.watch(user_id.clone());
        self.medication_service.sync_notifications(user_id).await
    }

    /// Start the periodic reminder scan.
    ///
    /// # Errors
    /// `Conflict` if already running, `Config` for an invalid cron expression.
    pub async fn start_reminders(&self) -> Result<()> {
        self.scheduler.lock().await.start().await?;
        Ok(())
    }

    /// Stop the reminder scan and cancel every pending snooze/grace timer.
    ///
    /// # Errors
    /// Scheduler shutdown failures or timeouts.
    pub async fn shutdown(&self) -> Result<()> {
        let mut scheduler = self.scheduler.lock().await;
        if scheduler.is_running() {
            scheduler.stop().await?;
        }
        let pending = self.timers.len();
        self.timers.cancel_all();
        info!(cancelled_timers = pending, "Application context shut down");
        Ok(())
    }
}
