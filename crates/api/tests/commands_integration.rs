//! Integration tests for the boundary commands.

use medminder_domain::{DoseState, IntakeStatus, SkipReason};
use medminder_lib::commands::{
    add_medication, adherence_stats, calendar_marks, check_grace, day_view, delete_medication,
    list_medications, low_inventory, miss_dose, refill_medication, revert_dose,
    search_medications, skip_dose, snooze_dose, take_dose,
};
use num_rational::Rational64;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;
use support::{draft, dose, setup_test_context, TODAY, USER};

#[tokio::test]
async fn take_dose_defaults_to_serving_size_and_current_time() {
    let test = setup_test_context(None);
    let medication = add_medication(&test.ctx, USER, draft("Metformin", &["08:00"])).await.unwrap();

    let entry = take_dose(&test.ctx, dose(medication.id.as_str(), "08:00"), None, None)
        .await
        .unwrap();

    assert_eq!(entry.status, IntakeStatus::Taken);
    assert_eq!(entry.actual_time.unwrap().to_string(), "08:30");
    assert_eq!(entry.servings_deducted, Some(Rational64::from_integer(1)));
    let listed = list_medications(&test.ctx, USER).await.unwrap();
    assert_eq!(listed[0].current_servings, Rational64::from_integer(9));
}

#[tokio::test]
async fn fractional_take_then_revert_restores_inventory() {
    let test = setup_test_context(None);
    let medication = add_medication(&test.ctx, USER, draft("Warfarin", &["08:00"])).await.unwrap();
    let id = medication.id.as_str();

    take_dose(&test.ctx, dose(id, "08:00"), Some("08:10"), Some("1/2")).await.unwrap();
    let reverted = revert_dose(&test.ctx, dose(id, "08:00")).await.unwrap();

    assert!(reverted.is_some());
    assert!(revert_dose(&test.ctx, dose(id, "08:00")).await.unwrap().is_none());
    let listed = list_medications(&test.ctx, USER).await.unwrap();
    assert_eq!(listed[0].current_servings, Rational64::from_integer(10));
}

#[tokio::test]
async fn malformed_input_is_rejected_before_the_core() {
    let test = setup_test_context(None);

    let err = take_dose(&test.ctx, dose("m1", "8am"), None, Some("1")).await.unwrap_err();
    assert_eq!(err.code, "invalid_input");
    assert!(!err.retryable);

    let err = take_dose(&test.ctx, dose("m1", "08:00"), None, Some("0")).await.unwrap_err();
    assert_eq!(err.code, "invalid_input");

    let err = take_dose(&test.ctx, dose("m1", "08:00"), None, None).await.unwrap_err();
    assert_eq!(err.code, "not_found");
}

#[tokio::test]
async fn overly_fine_amount_leaves_inventory_untouched() {
    let test = setup_test_context(None);
    let medication = add_medication(&test.ctx, USER, draft("Metformin", &["08:00"])).await.unwrap();
    let id = medication.id.as_str();

    let err = take_dose(&test.ctx, dose(id, "08:00"), None, Some("1/9223372036854775807"))
        .await
        .unwrap_err();
    assert_eq!(err.code, "invalid_input");

    let listed = list_medications(&test.ctx, USER).await.unwrap();
    assert_eq!(listed[0].current_servings, Rational64::from_integer(10));
    assert!(revert_dose(&test.ctx, dose(id, "08:00")).await.unwrap().is_none());
}

#[tokio::test]
async fn skip_and_miss_record_reasons() {
    let test = setup_test_context(None);
    let medication =
        add_medication(&test.ctx, USER, draft("Lisinopril", &["08:00", "20:00"])).await.unwrap();
    let id = medication.id.as_str();

    let skipped =
        skip_dose(&test.ctx, dose(id, "08:00"), Some("side effects")).await.unwrap();
    assert_eq!(skipped.reason.as_deref(), Some(SkipReason::SideEffects.as_text()));

    let missed = miss_dose(&test.ctx, dose(id, "20:00"), Some("  ")).await.unwrap();
    assert_eq!(missed.reason.as_deref(), Some("No reason provided"));

    let views = day_view(&test.ctx, USER, TODAY).await.unwrap();
    let states: Vec<DoseState> = views.iter().map(|view| view.state).collect();
    assert_eq!(states, vec![DoseState::Skipped, DoseState::Missed]);
}

#[tokio::test]
async fn snooze_accepts_only_configured_intervals() {
    let test = setup_test_context(None);
    let medication = add_medication(&test.ctx, USER, draft("Aspirin", &["08:00"])).await.unwrap();
    let id = medication.id.as_str();

    let err = snooze_dose(&test.ctx, dose(id, "08:00"), 7).await.unwrap_err();
    assert_eq!(err.code, "invalid_input");

    let snoozed = snooze_dose(&test.ctx, dose(id, "08:00"), 10).await.unwrap();
    assert_eq!(snoozed.snooze_count, 1);
    assert!(!snoozed.cap_reached);
    assert_eq!(snoozed.fires_at.to_string(), "2024-03-04 08:40:00");

    take_dose(&test.ctx, dose(id, "08:00"), None, None).await.unwrap();
    let err = snooze_dose(&test.ctx, dose(id, "08:00"), 5).await.unwrap_err();
    assert_eq!(err.code, "conflict");
}

#[tokio::test]
async fn grace_check_reports_remaining_minutes() {
    let test = setup_test_context(None);
    let medication = add_medication(&test.ctx, USER, draft("Aspirin", &["08:00"])).await.unwrap();

    let outcome = check_grace(&test.ctx, dose(medication.id.as_str(), "08:00")).await.unwrap();
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["outcome"], "pending");
    assert_eq!(json["remaining_minutes"], 90);
}

#[tokio::test]
async fn adherence_reports_cover_the_period() {
    let test = setup_test_context(None);
    let medication =
        add_medication(&test.ctx, USER, draft("Atorvastatin", &["08:00", "20:00"])).await.unwrap();
    let id = medication.id.as_str();
    take_dose(&test.ctx, dose(id, "08:00"), None, None).await.unwrap();
    miss_dose(&test.ctx, dose(id, "20:00"), None).await.unwrap();

    let stats = adherence_stats(&test.ctx, USER, "2024-03-01", "2024-03-31").await.unwrap();
    assert_eq!(stats.total_doses, 2);
    assert_eq!(stats.taken_doses, 1);
    assert_eq!(stats.adherence_rate, 50);

    let marks = calendar_marks(&test.ctx, USER, "2024-03-01", "2024-03-31").await.unwrap();
    assert_eq!(marks.len(), 1);

    let err = adherence_stats(&test.ctx, USER, "2024-03-31", "2024-03-01").await.unwrap_err();
    assert_eq!(err.code, "invalid_input");
}

#[tokio::test]
async fn refill_and_low_inventory() {
    let test = setup_test_context(None);
    let mut low = draft("Prednisone", &["08:00"]);
    low.current_servings = Some(Rational64::from_integer(2));
    let medication = add_medication(&test.ctx, USER, low).await.unwrap();

    assert_eq!(low_inventory(&test.ctx, USER).await.unwrap().len(), 1);
    let refilled = refill_medication(&test.ctx, USER, medication.id.as_str()).await.unwrap();
    assert_eq!(refilled.current_servings, Rational64::from_integer(10));
    assert!(low_inventory(&test.ctx, USER).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_keeps_history_and_cancels_reminders() {
    let test = setup_test_context(None);
    let medication = add_medication(&test.ctx, USER, draft("Ibuprofen", &["08:00"])).await.unwrap();
    let id = medication.id.as_str();
    take_dose(&test.ctx, dose(id, "08:00"), None, None).await.unwrap();
    assert_eq!(test.ctx.notifications.scheduled().len(), 1);

    delete_medication(&test.ctx, USER, id).await.unwrap();

    assert!(test.ctx.notifications.scheduled().is_empty());
    let stats = adherence_stats(&test.ctx, USER, TODAY, TODAY).await.unwrap();
    assert_eq!(stats.taken_doses, 1);
    let err = delete_medication(&test.ctx, USER, id).await.unwrap_err();
    assert_eq!(err.code, "not_found");
}

#[tokio::test]
async fn search_ranks_remote_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                {"openfda": {"brand_name": ["Zestril"]}},
                {"openfda": {"brand_name": ["Lipitor"]}},
                {"openfda": {"brand_name": ["LIPITOR"]}}
            ]
        })))
        .mount(&server)
        .await;
    let test = setup_test_context(Some(server.uri()));

    let results = search_medications(&test.ctx, "lip").await.unwrap();
    let names: Vec<_> = results.iter().map(|s| s.display_name.as_str()).collect();
    assert_eq!(names, vec!["Lipitor", "Zestril"]);

    assert!(search_medications(&test.ctx, "l").await.unwrap().is_empty());
}

#[tokio::test]
async fn search_uses_builtin_names_when_remote_is_disabled() {
    let test = setup_test_context(None);
    let results = search_medications(&test.ctx, "metf").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].display_name, "Metformin");
}

#[tokio::test]
async fn invalid_draft_is_reported() {
    let test = setup_test_context(None);
    let err = add_medication(&test.ctx, USER, draft("  ", &["08:00"])).await.unwrap_err();
    assert_eq!(err.code, "invalid_input");
    assert!(list_medications(&test.ctx, USER).await.unwrap().is_empty());
}
