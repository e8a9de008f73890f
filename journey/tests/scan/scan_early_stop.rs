use std::sync::Arc;

use journey::{Stage, YearlyStats};
use journey_mock::ScriptedSite;

use crate::helpers::{ME, ProgressLog, builder, inbox_page, readings_page};

async fn with_cached_past(journey: &journey::Journey) {
    let mut cached = YearlyStats::new();
    cached.entry(2023).creator.works = 1;
    assert!(journey.state().save_cache(ME, &cached).await);
}

#[tokio::test]
async fn newest_first_resources_stop_after_first_older_page() {
    let (site, ctl) = ScriptedSite::new_with_controller(ME);
    ctl.set_works_pages(vec![journey::WorksListPage {
        total_pages: 1,
        works: vec![],
    }])
    .await;
    let inbox: Vec<_> = (1..=8)
        .map(|p| match p {
            3 => inbox_page(8, &[("alice", "01 Feb 2024"), ("bob", "30 Dec 2023")]),
            _ => inbox_page(8, &[("carol", "01 Mar 2024")]),
        })
        .collect();
    ctl.set_inbox_pages(inbox).await;
    let history: Vec<_> = (1..=8)
        .map(|p| match p {
            3 => readings_page(8, &[("Late", "02 Jan 2024"), ("Early", "31 Dec 2023")]),
            _ => readings_page(8, &[(format!("Work {p}").as_str(), "01 Mar 2024")]),
        })
        .collect();
    ctl.set_readings_pages(history).await;

    let log = ProgressLog::default();
    let journey = builder()
        .site(site)
        .progress_sink(Arc::new(log.clone()))
        .build()
        .unwrap();
    with_cached_past(&journey).await;

    let report = journey.start_scan(false).await;
    assert!(report.outcome.is_completed());
    assert_eq!(ctl.pages_fetched(Stage::Inbox).await, vec![1, 2, 3]);
    assert_eq!(ctl.pages_fetched(Stage::History).await, vec![1, 2, 3]);

    let y2024 = report.stats.get(2024).unwrap();
    assert_eq!(y2024.creator.commenters.get("carol"), 2);
    assert_eq!(y2024.creator.commenters.get("alice"), 1);
    assert!(!y2024.creator.commenters.contains("bob"));
    assert_eq!(y2024.reader.fics, 3);
    assert!(log.updates().iter().any(|u| {
        u.detail == "Done! Stopped at page 3 (older entries skipped)" && u.percent == Some(95)
    }));
}

#[tokio::test]
async fn full_scan_walks_every_page() {
    let (site, ctl) = ScriptedSite::new_with_controller(ME);
    ctl.set_works_pages(vec![journey::WorksListPage {
        total_pages: 1,
        works: vec![],
    }])
    .await;
    ctl.set_inbox_pages(vec![inbox_page(1, &[])]).await;
    ctl.set_readings_pages(vec![
        readings_page(3, &[("A", "01 Mar 2024")]),
        readings_page(3, &[("B", "01 Mar 2019")]),
        readings_page(3, &[("C", "01 Mar 2024")]),
    ])
    .await;
    let journey = builder().site(site).build().unwrap();

    let report = journey.start_scan(false).await;
    assert_eq!(ctl.pages_fetched(Stage::History).await, vec![1, 2, 3]);
    assert_eq!(report.stats.get(2019).unwrap().reader.fics, 1);
    assert_eq!(report.stats.get(2024).unwrap().reader.fics, 2);
}

#[tokio::test]
async fn inbox_page_cap_bounds_the_crawl() {
    let (site, ctl) = crate::helpers::empty_site().await;
    ctl.set_inbox_pages(
        (1..=5)
            .map(|_| inbox_page(500, &[("dana", "01 Mar 2024")]))
            .collect(),
    )
    .await;
    let journey = builder().site(site).max_inbox_pages(3).build().unwrap();

    let report = journey.start_scan(false).await;
    assert!(report.outcome.is_completed());
    assert_eq!(ctl.pages_fetched(Stage::Inbox).await, vec![1, 2, 3]);
    assert_eq!(
        report.stats.get(2024).unwrap().creator.commenters.get("dana"),
        3
    );
}
