//! End-to-end replay of the reservation flow against the in-memory site.

#![allow(clippy::unwrap_used)]

use rehearse::{
    AriaRole, FailureKind, Locator, ManualClock, MemoryPage, Page, PageCall, RecordingPage,
    ReplayOptions, Replayer, RunOutcome, Script, Site, StepStatus,
};
use std::path::PathBuf;
use std::sync::Arc;

const SITE: &str = include_str!("fixtures/reservation_site.yaml");

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn replayer(site_yaml: &str) -> (Replayer<RecordingPage<MemoryPage>>, ManualClock) {
    let clock = ManualClock::new();
    let site = Site::from_yaml(site_yaml).unwrap();
    let page = RecordingPage::new(MemoryPage::new(site, Arc::new(clock.clone())).unwrap());
    let replayer = Replayer::new(page)
        .with_clock(Arc::new(clock.clone()))
        .with_options(ReplayOptions::new().with_timeout(1000).with_poll_interval(50));
    (replayer, clock)
}

#[test]
fn test_yaml_script_succeeds() {
    let (mut replayer, clock) = replayer(SITE);
    let script = Script::load(fixture("reservation.yaml")).unwrap();
    let report = replayer.run(&script).unwrap();

    assert!(report.is_success(), "{report:#?}");
    assert_eq!(report.name.as_deref(), Some("reservation"));
    assert_eq!(report.count(StepStatus::Succeeded), script.len());
    // page load + arrangement delay + confirmation delay
    assert!(clock.now_ms() >= 250 + 200 + 400);
    assert_eq!(
        replayer.page().inner().current_url(),
        Some("http://localhost:8000/waerboom#buffet")
    );
}

#[test]
fn test_recorded_codegen_script_succeeds() {
    let (mut replayer, _) = replayer(SITE);
    let script = Script::load(fixture("test-3.spec.ts")).unwrap();
    assert_eq!(script.name.as_deref(), Some("test"));

    let report = replayer.run(&script).unwrap();
    assert!(report.is_success(), "{report:#?}");

    let fills: Vec<&PageCall> = replayer
        .page()
        .history()
        .iter()
        .filter(|c| matches!(c, PageCall::Fill(..)))
        .collect();
    assert_eq!(fills.len(), 2);
    assert!(matches!(fills[0], PageCall::Fill(_, v) if v == "3"));
    assert!(matches!(fills[1], PageCall::Fill(_, v) if v == "pieter@hotmail.com"));
}

#[test]
fn test_filled_amount_is_readable() {
    let (mut replayer, _) = replayer(SITE);
    let script = Script::load(fixture("reservation.yaml")).unwrap();
    replayer.run(&script).unwrap();

    let amount = Locator::role(AriaRole::Listitem)
        .has_text("Gastronomisch buffet prijzen")
        .locator("#amount")
        .unwrap();
    assert_eq!(replayer.input_value(&amount).unwrap(), "3");
}

#[test]
fn test_wrong_confirmation_fails_at_assertion() {
    let failing = SITE.replace("your reservation requested", "reservation failed, fully booked");
    let (mut replayer, _) = replayer(&failing);
    let script = Script::load(fixture("reservation.yaml")).unwrap();
    let report = replayer.run(&script).unwrap();

    let last = script.len() - 1;
    match &report.outcome {
        RunOutcome::Failed { step, error } => {
            assert_eq!(*step, last);
            assert_eq!(error.kind, FailureKind::AssertionTimeout);
            assert!(error.message.contains("reservation failed"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(report.count(StepStatus::Succeeded), last);
}

#[test]
fn test_missing_link_halts_run() {
    let (mut replayer, _) = replayer(SITE);
    let script = Script::new()
        .navigate("http://localhost:8000/")
        .click(Locator::role(AriaRole::Link).with_name("Nonexistent"))
        .click(Locator::role(AriaRole::Link).with_name("Waerboom"));
    let report = replayer.run(&script).unwrap();

    let failed = report.failed_step().unwrap();
    assert_eq!(failed.index, 2);
    assert_eq!(
        failed.error.as_ref().map(|e| e.kind),
        Some(FailureKind::ElementNotInteractable)
    );
    assert_eq!(report.count(StepStatus::Skipped), 2);
    // nothing after the failure touched the page
    assert_eq!(
        replayer.page().history(),
        &[PageCall::Navigate("http://localhost:8000/".to_string())]
    );
}

#[test]
fn test_ambiguous_locator_is_not_clicked() {
    let (mut replayer, _) = replayer(SITE);
    let script = Script::new()
        .navigate("http://localhost:8000/")
        .click(Locator::role(AriaRole::Link));
    let report = replayer.run(&script).unwrap();

    let failed = report.failed_step().unwrap();
    assert!(failed.error.as_ref().unwrap().message.contains("2 elements"));
    assert!(!replayer.page().was_called("click"));
}

#[test]
fn test_unknown_venue_is_navigation_error() {
    let (mut replayer, _) = replayer(SITE);
    let script = Script::new()
        .navigate("http://localhost:8000/")
        .click(Locator::role(AriaRole::Link).with_name("Zeezicht"));
    let report = replayer.run(&script).unwrap();

    let failed = report.failed_step().unwrap();
    assert_eq!(failed.index, 2);
    assert_eq!(
        failed.error.as_ref().map(|e| e.kind),
        Some(FailureKind::Navigation)
    );
}
