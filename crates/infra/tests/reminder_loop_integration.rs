//! End-to-end reminder loop over the in-process adapters
//!
//! Wires the core services to the in-memory stores, the moka cache, the
//! channel presenter and the rescan channel, then drives the loop.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use medminder_core::{
    Clock, DoseLedger, FixedClock, IntakeLogStore, IntakeService, MedicationService,
    MedicationStore, ReminderScanner, RescanTrigger, SnoozeCoordinator, TimerRegistry,
};
use medminder_domain::{
    CacheConfig, ClockTime, DayPattern, DoseInstance, DueReminder, IntakeLogEntry, IntakeStatus,
    Medication,
    MedicationDraft, MedicationForm, MedicationId, ScheduleType, UserId,
};
use medminder_infra::scheduling::{ReminderSchedulerConfig, ScanReport};
use medminder_infra::{
    ChannelReminderPresenter, ChannelRescanTrigger, InMemoryIntakeLogStore,
    InMemoryMedicationStore, MokaLocalCache, ReminderJob, ReminderScheduler,
    TracingNotificationScheduler,
};
use num_rational::Rational64;
use tokio::sync::mpsc::UnboundedReceiver;

const GRACE: u32 = 120;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap().and_hms_opt(8, 30, 0).unwrap()
}

fn user() -> UserId {
    UserId::new("user-1")
}

fn medication(name: &str, time: ClockTime) -> Medication {
    let added_at = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    Medication {
        id: MedicationId::new("placeholder"),
        user_id: user(),
        name: name.to_string(),
        dosage: "5".into(),
        dosage_unit: "mg".into(),
        form: MedicationForm::Pill,
        schedule_type: ScheduleType::FixedTimes,
        times: vec![time],
        day_pattern: DayPattern::Everyday,
        serving_size: Rational64::from_integer(1),
        servings_per_container: 30,
        current_servings: Rational64::from_integer(30),
        refill_threshold: 5,
        added_at,
        created_at: added_at.and_utc(),
    }
}

struct Loop {
    medications: Arc<InMemoryMedicationStore>,
    logs: Arc<InMemoryIntakeLogStore>,
    intake: Arc<IntakeService>,
    snooze: Arc<SnoozeCoordinator>,
    job: Arc<ReminderJob>,
    trigger: ChannelRescanTrigger,
    rescans: Option<UnboundedReceiver<UserId>>,
    presented: UnboundedReceiver<(UserId, DueReminder)>,
}

impl Loop {
    fn new() -> Self {
        let medications = Arc::new(InMemoryMedicationStore::new());
        let logs = Arc::new(InMemoryIntakeLogStore::new());
        let cache = Arc::new(MokaLocalCache::new(&CacheConfig::default()));
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(now()));
        let ledger = Arc::new(DoseLedger::new(cache, 3));
        let intake = Arc::new(
            IntakeService::new(medications.clone(), logs.clone(), ledger, clock.clone())
                .with_timers(Arc::new(TimerRegistry::new())),
        );
        let (trigger, rescans) = ChannelRescanTrigger::channel();
        let (presenter, presented) = ChannelReminderPresenter::channel();
        let scanner = Arc::new(ReminderScanner::new(intake.clone(), GRACE));
        let snooze =
            Arc::new(SnoozeCoordinator::new(intake.clone(), Arc::new(trigger.clone()), GRACE));
        let job = Arc::new(ReminderJob::new(
            medications.clone(),
            scanner,
            snooze.clone(),
            Arc::new(presenter),
            clock,
        ));
        job.watch(user());
        Self {
            medications,
            logs,
            intake,
            snooze,
            job,
            trigger,
            rescans: Some(rescans),
            presented,
        }
    }

    async fn add(&self, name: &str, hour: u8, minute: u8) -> MedicationId {
        let time = ClockTime::new(hour, minute).unwrap();
        self.medications.create(&user(), medication(name, time)).await.unwrap()
    }

    fn scheduler(&mut self, cron: &str) -> ReminderScheduler {
        let config = ReminderSchedulerConfig {
            cron_expression: cron.into(),
            job_timeout: Duration::from_secs(2),
            start_timeout: Duration::from_secs(2),
            stop_timeout: Duration::from_secs(2),
            join_timeout: Duration::from_secs(2),
        };
        let rescans = self.rescans.take().expect("scheduler built once");
        ReminderScheduler::new(config, self.job.clone(), rescans)
    }
}

#[tokio::test]
async fn scan_presents_the_most_overdue_dose() {
    let mut harness = Loop::new();
    harness.add("Later", 8, 20).await;
    let early = harness.add("Early", 7, 45).await;

    let report: ScanReport = harness.job.run_scan(&user()).await.unwrap();

    let reminder = report.reminder.expect("a dose is due");
    assert_eq!(reminder.medication.id, early);
    assert_eq!(reminder.due_minutes, 45);
    let (presented_user, presented) = harness.presented.recv().await.unwrap();
    assert_eq!(presented_user, user());
    assert_eq!(presented.dose, reminder.dose);
}

#[tokio::test]
async fn taken_dose_is_no_longer_presented() {
    let mut harness = Loop::new();
    let id = harness.add("Metformin", 8, 0).await;
    let dose = DoseInstance::new(id.clone(), now().date(), ClockTime::new(8, 0).unwrap());

    harness
        .intake
        .record_taken(&user(), &dose, ClockTime::new(8, 25).unwrap(), Rational64::from_integer(1))
        .await
        .unwrap();

    let report = harness.job.run_scan(&user()).await.unwrap();
    assert!(report.reminder.is_none());
    assert!(harness.presented.try_recv().is_err());

    let stored = harness.medications.get(&user(), &id).await.unwrap().unwrap();
    assert_eq!(stored.current_servings, Rational64::from_integer(29));
}

#[tokio::test]
async fn sweep_marks_expired_doses_missed() {
    let harness = Loop::new();
    harness.add("Overnight", 5, 0).await;

    let report = harness.job.run_scan(&user()).await.unwrap();

    assert_eq!(report.expired.len(), 1);
    assert_eq!(report.expired[0].status, IntakeStatus::Missed);
    let logs = harness.logs.list(&user()).await.unwrap();
    assert_eq!(logs.len(), 1);
}

#[tokio::test]
async fn sweep_can_be_disabled() {
    let harness = Loop::new();
    harness.add("Overnight", 5, 0).await;
    let job = ReminderJob::new(
        harness.medications.clone(),
        Arc::new(ReminderScanner::new(harness.intake.clone(), GRACE)),
        harness.snooze.clone(),
        Arc::new(ChannelReminderPresenter::channel().0),
        Arc::new(FixedClock::new(now())),
    )
    .with_sweep(false);

    let report = job.run_scan(&user()).await.unwrap();
    assert!(report.expired.is_empty());
    assert!(harness.logs.list(&user()).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn snooze_rescan_is_served_by_the_monitor_task() {
    let mut harness = Loop::new();
    let id = harness.add("Lisinopril", 8, 0).await;
    let dose = DoseInstance::new(id, now().date(), ClockTime::new(8, 0).unwrap());
    // yearly cron so only the rescan path presents
    let mut scheduler = harness.scheduler("0 0 0 1 1 *");
    scheduler.start().await.expect("start succeeds");

    let snoozed = harness.snooze.snooze(&user(), &dose, 5).await.unwrap();
    // stands in for the snooze elapsing
    snoozed.handle.cancel();
    harness.trigger.request_rescan(&user());

    let (_, reminder) = tokio::time::timeout(Duration::from_secs(5), harness.presented.recv())
        .await
        .expect("rescan presented in time")
        .expect("presenter channel open");
    assert_eq!(reminder.dose, dose);
    assert_eq!(reminder.snooze_count, 1);

    scheduler.stop().await.expect("stop succeeds");
    assert!(!scheduler.is_running());
}

#[tokio::test(flavor = "multi_thread")]
async fn cron_tick_scans_watched_users() {
    let mut harness = Loop::new();
    harness.add("Atorvastatin", 8, 10).await;
    let mut scheduler = harness.scheduler("*/1 * * * * *");

    scheduler.start().await.expect("start succeeds");
    let presented = tokio::time::timeout(Duration::from_secs(5), harness.presented.recv())
        .await
        .expect("tick presented in time");
    scheduler.stop().await.expect("stop succeeds");

    assert!(presented.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn double_start_is_rejected_and_restart_works() {
    let mut harness = Loop::new();
    let mut scheduler = harness.scheduler("0 0 0 1 1 *");

    scheduler.start().await.expect("first start");
    let err = scheduler.start().await.expect_err("second start fails");
    assert!(matches!(err, medminder_infra::scheduling::SchedulerError::AlreadyRunning));
    scheduler.stop().await.expect("stop succeeds");

    let err = scheduler.stop().await.expect_err("stop when stopped fails");
    assert!(matches!(err, medminder_infra::scheduling::SchedulerError::NotRunning));

    scheduler.start().await.expect("start again");
    scheduler.stop().await.expect("stop again");
}

#[tokio::test]
async fn invalid_cron_is_reported_at_start() {
    let mut harness = Loop::new();
    let mut scheduler = harness.scheduler("not a cron");

    let err = scheduler.start().await.expect_err("start fails");
    assert!(matches!(
        err,
        medminder_infra::scheduling::SchedulerError::JobRegistrationFailed { .. }
    ));
    assert!(!scheduler.is_running());
}

#[tokio::test]
async fn store_subscriptions_receive_snapshots_until_dropped() {
    let harness = Loop::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let last_len = Arc::new(AtomicUsize::new(usize::MAX));
    let subscription = {
        let (calls, last_len) = (calls.clone(), last_len.clone());
        harness
            .medications
            .subscribe(
                &user(),
                Arc::new(move |medications: Vec<Medication>| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    last_len.store(medications.len(), Ordering::SeqCst);
                }),
            )
            .unwrap()
    };
    // initial snapshot
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(last_len.load(Ordering::SeqCst), 0);

    harness.add("Aspirin", 9, 0).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(last_len.load(Ordering::SeqCst), 1);
    assert_eq!(harness.medications.subscriber_count(&user()), 1);

    drop(subscription);
    assert_eq!(harness.medications.subscriber_count(&user()), 0);
    harness.add("Ibuprofen", 10, 0).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn intake_subscription_sees_appends_and_deletes() {
    let harness = Loop::new();
    let id = harness.add("Omeprazole", 8, 0).await;
    let dose = DoseInstance::new(id, now().date(), ClockTime::new(8, 0).unwrap());
    let sizes = Arc::new(Mutex::new(Vec::new()));
    let recorder = sizes.clone();
    let _subscription = harness
        .logs
        .subscribe(
            &user(),
            Arc::new(move |entries: Vec<IntakeLogEntry>| recorder.lock().unwrap().push(entries.len())),
        )
        .unwrap();

    harness.intake.record_skipped(&user(), &dose, None).await.unwrap();
    harness.intake.revert(&user(), &dose).await.unwrap();

    assert_eq!(*sizes.lock().unwrap(), vec![0, 1, 0]);
}

#[tokio::test]
async fn medication_service_schedules_daily_reminders() {
    let medications = Arc::new(InMemoryMedicationStore::new());
    let notifications = Arc::new(TracingNotificationScheduler::new());
    let service = MedicationService::new(
        medications.clone(),
        notifications.clone(),
        Arc::new(FixedClock::new(now())),
    );
    let draft = MedicationDraft {
        name: "Levothyroxine".into(),
        dosage: "50".into(),
        dosage_unit: "mcg".into(),
        form: MedicationForm::Pill,
        schedule_type: ScheduleType::FixedTimes,
        times: vec![ClockTime::new(20, 0).unwrap(), ClockTime::new(7, 0).unwrap()],
        day_pattern: DayPattern::Everyday,
        serving_size: Rational64::from_integer(1),
        servings_per_container: 90,
        current_servings: None,
        refill_threshold: 10,
    };

    let added = service.add(&user(), draft).await.unwrap();
    assert_eq!(added.added_at, now());
    assert_eq!(added.current_servings, Rational64::from_integer(90));
    let scheduled = notifications.scheduled();
    assert_eq!(
        scheduled,
        vec![
            (added.id.clone(), ClockTime::new(7, 0).unwrap()),
            (added.id.clone(), ClockTime::new(20, 0).unwrap()),
        ]
    );

    service.delete(&user(), &added.id).await.unwrap();
    assert!(notifications.scheduled().is_empty());
    assert!(medications.list(&user()).await.unwrap().is_empty());
}
