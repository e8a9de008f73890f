use std::sync::Arc;

use journey::{JourneyError, ScanOutcome, ScanPhase, Stage, YearlyStats};
use journey_mock::{MockBehavior, MockSite};

use crate::helpers::{ME, builder, empty_site, inbox_page};

#[tokio::test]
async fn concurrent_scan_is_rejected_while_one_is_in_flight() {
    let (site, ctl) = empty_site().await;
    ctl.set_inbox_page(1, MockBehavior::Hang).await;
    let journey = Arc::new(builder().site(site).build().unwrap());

    let mut phases = journey.subscribe_phase();
    let running = {
        let journey = Arc::clone(&journey);
        tokio::spawn(async move { journey.start_scan(false).await })
    };
    phases
        .wait_for(|p| *p == ScanPhase::Inbox)
        .await
        .expect("scan reaches the inbox stage");

    let second = journey.start_scan(false).await;
    assert_eq!(second.outcome, ScanOutcome::AlreadyRunning);
    assert!(second.stats.is_empty());
    assert_eq!(
        journey.clear_saved_state().await,
        Err(JourneyError::ScanInProgress)
    );

    // Dropping the stalled scan releases the guard.
    running.abort();
    assert!(running.await.unwrap_err().is_cancelled());
    assert_eq!(journey.phase(), ScanPhase::Idle);

    ctl.set_inbox_pages(vec![inbox_page(1, &[])]).await;
    let report = journey.start_scan(false).await;
    assert!(report.outcome.is_completed());
}

#[tokio::test]
async fn missing_identity_is_reported_not_retried() {
    let journey = builder()
        .site(Arc::new(MockSite::signed_out()))
        .build()
        .unwrap();
    let report = journey.start_scan(false).await;
    assert_eq!(report.outcome, ScanOutcome::NotAuthenticated);
    assert_eq!(report.identity, None);
    assert_eq!(journey.phase(), ScanPhase::Idle);
    assert_eq!(
        journey.clear_saved_state().await,
        Err(JourneyError::NotAuthenticated)
    );
}

#[tokio::test]
async fn blank_identity_counts_as_signed_out() {
    let (site, ctl) = empty_site().await;
    ctl.set_identity(Some("   ")).await;
    let journey = builder().site(site).build().unwrap();
    let report = journey.start_scan(false).await;
    assert_eq!(report.outcome, ScanOutcome::NotAuthenticated);
    assert!(ctl.fetch_log().await.is_empty());
}

#[tokio::test]
async fn clear_saved_state_removes_cache_and_checkpoint() {
    let (site, _ctl) = empty_site().await;
    let journey = builder().site(site).build().unwrap();
    let data = YearlyStats::new();
    journey.state().save_cache(ME, &data).await;
    journey
        .state()
        .save_progress(ME, Stage::Inbox, 2, None, None, &data, None)
        .await;

    journey.clear_saved_state().await.unwrap();
    assert!(journey.state().load_cache(ME).await.is_none());
    assert!(journey.state().load_progress(ME).await.is_none());
}
