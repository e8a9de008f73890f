use journey::{JourneyError, ScanMode, ScanOutcome, ScanPhase, Stage, YearlyStats};
use journey_mock::{MockBehavior, ScriptedSite};

use crate::helpers::{ME, builder, inbox_page, readings_page};

async fn site_failing_on_history_page_2() -> (
    std::sync::Arc<ScriptedSite>,
    journey_mock::ScriptedSiteController,
) {
    let (site, ctl) = ScriptedSite::new_with_controller(ME);
    ctl.set_works_pages(vec![journey::WorksListPage {
        total_pages: 1,
        works: vec![],
    }])
    .await;
    ctl.set_inbox_pages(vec![inbox_page(1, &[("alice", "3 days ago")])])
        .await;
    ctl.set_readings_pages(vec![
        readings_page(3, &[("One", "01 Mar 2024")]),
        readings_page(3, &[("Two", "01 Mar 2024")]),
        readings_page(3, &[("Three", "01 Mar 2024")]),
    ])
    .await;
    ctl.set_readings_page(
        2,
        MockBehavior::Fail(JourneyError::fetch("history page 2", "503 Service Unavailable")),
    )
    .await;
    (site, ctl)
}

#[tokio::test]
async fn failed_stage_keeps_partial_stats_and_never_writes_cache() {
    let (site, _ctl) = site_failing_on_history_page_2().await;
    let journey = builder().site(site).build().unwrap();
    let mut previous = YearlyStats::new();
    previous.entry(2021).reader.fics = 9;
    journey.state().save_cache(ME, &previous).await;

    let report = journey.start_scan(true).await;
    match &report.outcome {
        ScanOutcome::Failed { stage, error } => {
            assert_eq!(*stage, Some(Stage::History));
            assert!(error.is_fetch_failure());
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(journey.phase(), ScanPhase::Failed);

    // Everything before the failure is kept.
    let y2024 = report.stats.get(2024).unwrap();
    assert_eq!(y2024.creator.commenters.get("alice"), 1);
    assert_eq!(y2024.reader.fics, 1);

    // The cache still holds the previous scan.
    let cache = journey.state().load_cache(ME).await.unwrap();
    assert_eq!(cache.data, previous);

    // The checkpoint after history page 1 survives for a later resume.
    let progress = journey.state().load_progress(ME).await.unwrap();
    assert_eq!(progress.stage, Stage::History);
    assert_eq!(progress.last_page, 1);
    assert_eq!(progress.data, report.stats);
}

#[tokio::test]
async fn failed_scan_resumes_once_the_site_recovers() {
    let (site, ctl) = site_failing_on_history_page_2().await;
    let journey = builder().site(site).build().unwrap();
    let failed = journey.start_scan(false).await;
    assert!(matches!(failed.outcome, ScanOutcome::Failed { .. }));

    ctl.set_readings_pages(vec![
        readings_page(3, &[("One", "01 Mar 2024")]),
        readings_page(3, &[("Two", "01 Mar 2024")]),
        readings_page(3, &[("Three", "01 Mar 2024")]),
    ])
    .await;
    ctl.clear_log().await;

    let report = journey.start_scan(false).await;
    assert_eq!(
        report.outcome,
        ScanOutcome::Completed {
            mode: ScanMode::Resumed {
                stage: Stage::History,
                from_page: 2,
                target_year: None,
            },
            cache_written: true,
        }
    );
    assert_eq!(journey.phase(), ScanPhase::Idle);
    assert_eq!(ctl.pages_fetched(Stage::History).await, vec![2, 3]);
    assert!(ctl.pages_fetched(Stage::Inbox).await.is_empty());
    let y2024 = report.stats.get(2024).unwrap();
    assert_eq!(y2024.reader.fics, 3);
    assert_eq!(y2024.creator.commenters.get("alice"), 1);
}

#[tokio::test]
async fn work_detail_failure_fails_the_works_stage() {
    let (site, ctl) = crate::helpers::empty_site().await;
    ctl.set_works_pages(vec![journey::WorksListPage {
        total_pages: 1,
        works: vec![crate::helpers::blurb(7, "01 Jan 2024")],
    }])
    .await;
    let journey = builder().site(site).build().unwrap();

    let report = journey.start_scan(false).await;
    match report.outcome {
        ScanOutcome::Failed { stage, error } => {
            assert_eq!(stage, Some(Stage::Works));
            assert!(error.is_fetch_failure());
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(ctl.pages_fetched(Stage::Inbox).await.is_empty());
    // The discovered url list was checkpointed before detail fetching began.
    let progress = journey.state().load_progress(ME).await.unwrap();
    assert_eq!(progress.stage, Stage::Works);
    assert_eq!(progress.extra.unwrap().work_urls.len(), 1);
}
