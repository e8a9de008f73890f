use std::sync::{Arc, Mutex};

use journey::{
    JourneyError, ResumePolicy, ScanMode, ScanOutcome, Stage, WorksListPage, WorksResume,
    YearlyStats,
};
use journey_mock::{MockBehavior, ScriptedSite, work_url};

use crate::helpers::{ME, builder, empty_site, inbox_page, readings_page, work};

fn six_history_pages() -> Vec<journey::ReadingsPage> {
    (1..=6)
        .map(|p| readings_page(6, &[(format!("Page {p}").as_str(), "01 Mar 2024")]))
        .collect()
}

fn snapshot() -> YearlyStats {
    let mut data = YearlyStats::new();
    data.entry(2024).creator.words = 4321;
    data.entry(2024).creator.commenters.add("alice", 3);
    data.entry(2024).reader.fics = 4;
    data
}

#[tokio::test]
async fn resume_in_history_skips_earlier_stages() {
    let (site, ctl) = ScriptedSite::new_with_controller(ME);
    ctl.set_readings_pages(six_history_pages()).await;
    let journey = builder().site(site).build().unwrap();

    assert!(
        journey
            .state()
            .save_progress(ME, Stage::History, 4, None, None, &snapshot(), None)
            .await
    );

    let report = journey.start_scan(false).await;
    assert_eq!(
        report.outcome,
        ScanOutcome::Completed {
            mode: ScanMode::Resumed {
                stage: Stage::History,
                from_page: 5,
                target_year: None,
            },
            cache_written: true,
        }
    );
    assert!(ctl.pages_fetched(Stage::Works).await.is_empty());
    assert!(ctl.pages_fetched(Stage::Inbox).await.is_empty());
    assert!(ctl.details_fetched().await.is_empty());
    assert_eq!(ctl.pages_fetched(Stage::History).await, vec![5, 6]);

    let y2024 = report.stats.get(2024).unwrap();
    assert_eq!(y2024.creator.words, 4321);
    assert_eq!(y2024.creator.commenters.get("alice"), 3);
    assert_eq!(y2024.reader.fics, 4 + 2);
    assert!(y2024.reader.work_visits.contains_key("Page 5"));
    assert!(!y2024.reader.work_visits.contains_key("Page 4"));

    assert!(journey.state().load_progress(ME).await.is_none());
    assert_eq!(
        journey.state().load_cache(ME).await.unwrap().data,
        report.stats
    );
}

#[tokio::test]
async fn resume_in_works_continues_after_last_processed_work() {
    let (site, ctl) = empty_site().await;
    for id in 1..=4 {
        ctl.add_work(work(id, "2024-01-01", None, 100)).await;
    }
    let journey = builder().site(site).build().unwrap();
    let saved = WorksResume {
        work_urls: (1..=4).map(work_url).collect(),
        work_index: Some(1),
    };
    journey
        .state()
        .save_progress(ME, Stage::Works, 2, None, None, &YearlyStats::new(), Some(&saved))
        .await;

    let report = journey.start_scan(false).await;
    assert!(report.outcome.is_completed());
    // The listing is not fetched again.
    assert!(ctl.pages_fetched(Stage::Works).await.is_empty());
    assert_eq!(ctl.details_fetched().await, vec![work_url(3), work_url(4)]);
    // Later stages run from their first page.
    assert_eq!(ctl.pages_fetched(Stage::Inbox).await, vec![1]);
    assert_eq!(ctl.pages_fetched(Stage::History).await, vec![1]);
    assert_eq!(report.stats.get(2024).unwrap().creator.works, 2);
}

#[tokio::test]
async fn resumed_incremental_scan_keeps_its_target_year() {
    let (site, ctl) = ScriptedSite::new_with_controller(ME);
    ctl.set_readings_pages(vec![
        readings_page(3, &[("Kept", "01 Mar 2024")]),
        readings_page(3, &[("Newer", "01 Mar 2024"), ("Older", "01 Mar 2023")]),
        readings_page(3, &[("Never fetched", "01 Mar 2022")]),
    ])
    .await;
    let journey = builder().site(site).build().unwrap();
    journey
        .state()
        .save_progress(ME, Stage::History, 1, None, Some(2024), &YearlyStats::new(), None)
        .await;

    let report = journey.start_scan(false).await;
    assert_eq!(
        report.outcome,
        ScanOutcome::Completed {
            mode: ScanMode::Resumed {
                stage: Stage::History,
                from_page: 2,
                target_year: Some(2024),
            },
            cache_written: true,
        }
    );
    assert_eq!(ctl.pages_fetched(Stage::History).await, vec![2]);
    assert!(!report.stats.contains(2023));
    assert_eq!(report.stats.get(2024).unwrap().reader.fics, 1);
}

#[tokio::test]
async fn discard_policy_starts_over() {
    let (site, ctl) = empty_site().await;
    let journey = builder()
        .site(site)
        .resume_policy(ResumePolicy::Discard)
        .build()
        .unwrap();
    journey
        .state()
        .save_progress(ME, Stage::History, 4, None, None, &snapshot(), None)
        .await;

    let report = journey.start_scan(false).await;
    assert_eq!(
        report.outcome,
        ScanOutcome::Completed {
            mode: ScanMode::Full,
            cache_written: true,
        }
    );
    assert!(report.stats.is_empty());
    assert_eq!(ctl.pages_fetched(Stage::Works).await, vec![1]);
    assert!(journey.state().load_progress(ME).await.is_none());
}

#[tokio::test]
async fn ask_policy_sees_the_checkpoint() {
    let (site, ctl) = ScriptedSite::new_with_controller(ME);
    ctl.set_readings_pages(six_history_pages()).await;
    let seen = Arc::new(Mutex::new(None));
    let seen_in_prompt = Arc::clone(&seen);
    let journey = builder()
        .site(site)
        .resume_policy(ResumePolicy::ask(move |p| {
            *seen_in_prompt.lock().unwrap() = Some((p.stage, p.last_page));
            true
        }))
        .build()
        .unwrap();
    journey
        .state()
        .save_progress(ME, Stage::History, 5, None, None, &snapshot(), None)
        .await;

    let report = journey.start_scan(false).await;
    assert!(report.outcome.is_completed());
    assert_eq!(*seen.lock().unwrap(), Some((Stage::History, 5)));
    assert_eq!(ctl.pages_fetched(Stage::History).await, vec![6]);
}

#[tokio::test]
async fn forced_full_scan_drops_the_checkpoint() {
    let (site, ctl) = empty_site().await;
    let journey = builder().site(site).build().unwrap();
    journey
        .state()
        .save_progress(ME, Stage::History, 4, None, None, &snapshot(), None)
        .await;

    let report = journey.start_scan(true).await;
    assert!(report.outcome.is_completed());
    assert!(report.stats.is_empty());
    assert_eq!(ctl.pages_fetched(Stage::Works).await, vec![1]);
}

#[tokio::test]
async fn stage_checkpointed_on_its_last_page_is_not_fetched_again() {
    let (site, ctl) = ScriptedSite::new_with_controller(ME);
    ctl.set_works_pages(vec![WorksListPage {
        total_pages: 1,
        works: vec![],
    }])
    .await;
    ctl.set_inbox_pages(vec![
        inbox_page(2, &[("alice", "01 Mar 2024")]),
        inbox_page(2, &[("bob", "01 Feb 2024")]),
    ])
    .await;
    ctl.set_readings_page(
        1,
        MockBehavior::Fail(JourneyError::fetch("history page 1", "503 Service Unavailable")),
    )
    .await;
    let journey = builder().site(site).save_interval(2).build().unwrap();

    let failed = journey.start_scan(false).await;
    assert!(matches!(
        failed.outcome,
        ScanOutcome::Failed {
            stage: Some(Stage::History),
            ..
        }
    ));
    let progress = journey.state().load_progress(ME).await.unwrap();
    assert_eq!(progress.stage, Stage::Inbox);
    assert_eq!(progress.last_page, 2);
    assert_eq!(progress.total_pages, Some(2));

    ctl.set_readings_pages(vec![readings_page(1, &[("One", "01 Mar 2024")])])
        .await;
    ctl.clear_log().await;
    let report = journey.start_scan(false).await;
    assert_eq!(
        report.outcome,
        ScanOutcome::Completed {
            mode: ScanMode::Resumed {
                stage: Stage::Inbox,
                from_page: 3,
                target_year: None,
            },
            cache_written: true,
        }
    );
    assert!(ctl.pages_fetched(Stage::Inbox).await.is_empty());
    assert_eq!(ctl.pages_fetched(Stage::History).await, vec![1]);
    let y2024 = report.stats.get(2024).unwrap();
    assert_eq!(y2024.creator.commenters.get("alice"), 1);
    assert_eq!(y2024.creator.commenters.get("bob"), 1);
    assert_eq!(y2024.reader.fics, 1);
}

#[tokio::test]
async fn checkpoint_at_the_inbox_page_cap_moves_on_to_history() {
    let (site, ctl) = empty_site().await;
    ctl.set_inbox_pages(
        (1..=4)
            .map(|_| inbox_page(500, &[("dana", "01 Mar 2024")]))
            .collect(),
    )
    .await;
    let journey = builder().site(site).max_inbox_pages(3).build().unwrap();
    journey
        .state()
        .save_progress(ME, Stage::Inbox, 3, None, None, &snapshot(), None)
        .await;

    let report = journey.start_scan(false).await;
    assert!(report.outcome.is_completed());
    assert!(ctl.pages_fetched(Stage::Inbox).await.is_empty());
    assert_eq!(ctl.pages_fetched(Stage::History).await, vec![1]);
    assert_eq!(
        report.stats.get(2024).unwrap().creator.commenters.get("alice"),
        3
    );
}
