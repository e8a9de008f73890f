use std::sync::Arc;

use journey::{ScanMode, ScanOutcome, ScanPhase};
use journey_mock::{MOCK_IDENTITY, MockSite, work_url};

use crate::helpers::{ProgressLog, builder};

#[tokio::test]
async fn full_scan_over_fixture_site() {
    let log = ProgressLog::default();
    let journey = builder()
        .site(Arc::new(MockSite::new()))
        .progress_sink(Arc::new(log.clone()))
        .build()
        .unwrap();

    let report = journey.start_scan(false).await;
    assert_eq!(
        report.outcome,
        ScanOutcome::Completed {
            mode: ScanMode::Full,
            cache_written: true,
        }
    );
    assert_eq!(report.identity.as_deref(), Some(MOCK_IDENTITY));
    assert_eq!(report.stats.years(), vec![2022, 2023, 2024]);
    assert!(report.cached_years.is_empty());
    assert!(report.skipped_stages.is_empty());

    // The Long Winter spans 2023-06-01..2024-06-30: 214 + 182 days.
    let y2023 = &report.stats.get(2023).unwrap().creator;
    let y2024 = &report.stats.get(2024).unwrap().creator;
    assert_eq!(y2023.works, 2);
    assert_eq!(y2023.words, 1978 + 1200);
    assert_eq!(y2024.works, 1);
    assert_eq!(y2024.words, 1682);
    assert_eq!(y2023.kudos, 65 + 40);
    assert_eq!(y2024.kudos, 55);
    assert_eq!(y2024.hits, 1103);
    assert_eq!(y2023.fandoms.get("Good Omens"), 1978);
    assert_eq!(y2023.fandoms.get("Hades (Video Game)"), 1200);
    assert!(y2023.tags.contains("Slow Burn"));
    assert!(!y2023.tags.contains("Major Character Death"));
    assert!(!y2023.tags.contains("No Archive Warnings Apply"));
    assert_eq!(y2023.kudos_givers.get("alice"), 2);
    assert_eq!(y2024.top_works.len(), 1);
    assert_eq!(y2024.top_works[0].url, work_url(101));
    assert_eq!(y2024.top_works[0].score, 120 + 60);

    // Inbox: alice twice, no UI labels, never the scanning user.
    assert_eq!(y2024.commenters.get("alice"), 2);
    assert!(!y2024.commenters.contains("Reply"));
    assert!(!y2024.commenters.contains(MOCK_IDENTITY));
    assert_eq!(y2023.commenters.get("bob"), 1);
    let y2022 = &report.stats.get(2022).unwrap().creator;
    assert_eq!(y2022.commenters.get("carol"), 1);

    // History: repeat visits count once toward fics and words.
    let r2024 = &report.stats.get(2024).unwrap().reader;
    assert_eq!(r2024.fics, 2);
    assert_eq!(r2024.words, 57_000);
    assert_eq!(r2024.work_visits["Tea for Two"].visits, 5);
    assert_eq!(r2024.mature_clicks, 1);
    assert_eq!(r2024.fandoms.get("Good Omens"), 2);
    assert!(!r2024.tags.contains("Graphic Depictions Of Violence"));
    let quill = &r2024.authors["quillpen"];
    assert_eq!(quill.works_seen.len(), 1);
    assert_eq!(quill.visits, 5);
    assert_eq!(quill.top_work.as_deref(), Some("Tea for Two"));
    assert_eq!(quill.top_work_visits, 3);
    assert_eq!(report.stats.get(2023).unwrap().reader.mature_clicks, 4);

    // Finalizing: cache written, checkpoint gone, back to idle.
    let cache = journey.state().load_cache(MOCK_IDENTITY).await.unwrap();
    assert_eq!(cache.data, report.stats);
    assert!(journey.state().load_progress(MOCK_IDENTITY).await.is_none());
    assert_eq!(journey.phase(), ScanPhase::Idle);

    let percents = log.percents();
    assert!(percents.windows(2).all(|w| w[0] <= w[1]), "{percents:?}");
    assert_eq!(percents.last(), Some(&100));
    assert!(
        log.updates()
            .iter()
            .any(|u| u.detail == "Almost done!" && u.percent == Some(98))
    );
}

#[tokio::test]
async fn forced_full_scan_ignores_cache() {
    let journey = builder()
        .site(Arc::new(MockSite::new()))
        .build()
        .unwrap();
    let first = journey.start_scan(false).await;
    let forced = journey.start_scan(true).await;
    assert_eq!(
        forced.outcome,
        ScanOutcome::Completed {
            mode: ScanMode::Full,
            cache_written: true,
        }
    );
    assert!(forced.cached_years.is_empty());
    assert_eq!(forced.stats, first.stats);
}
