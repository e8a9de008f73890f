use std::sync::Arc;
use std::time::Duration;

use journey::{
    InboxPage, Journey, JourneyError, ReadingEntry, ReadingsPage, ResumePolicy, ScanOutcome,
    WorksListPage,
};
use journey_mock::{MockBehavior, ScriptedSite};

fn history_page(n: u32) -> ReadingsPage {
    ReadingsPage {
        total_pages: 4,
        entries: vec![ReadingEntry {
            title: Some(format!("Story {n}")),
            last_visited: "Last visited: 12 Apr 2024".to_string(),
            words: 2_500,
            ..ReadingEntry::default()
        }],
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();

    // 1. A site whose reading history fails on page 3.
    let (site, ctl) = ScriptedSite::new_with_controller("demo_reader");
    ctl.set_works_pages(vec![WorksListPage::default()]).await;
    ctl.set_inbox_pages(vec![InboxPage::default()]).await;
    ctl.set_readings_pages((1..=4).map(history_page).collect())
        .await;
    ctl.set_readings_page(
        3,
        MockBehavior::Fail(JourneyError::fetch("history page 3", "503 Service Unavailable")),
    )
    .await;

    let journey = Journey::builder()
        .site(site)
        .request_delay(Duration::from_millis(20))
        .save_interval(1)
        .resume_policy(ResumePolicy::ask(|p| {
            println!(
                "found checkpoint: stage {}, page {} (saved {})",
                p.stage, p.last_page, p.saved_at
            );
            true
        }))
        .build()?;

    // 2. The first run fails; partial statistics and the checkpoint survive.
    let failed = journey.start_scan(false).await;
    if let ScanOutcome::Failed { stage, error } = &failed.outcome {
        println!("scan failed in {stage:?}: {error}");
    }
    println!("years accumulated before the failure: {:?}", failed.stats.years());

    // 3. The site recovers and the next run picks up at page 3.
    ctl.set_readings_page(3, MockBehavior::Return(history_page(3)))
        .await;
    ctl.clear_log().await;
    let resumed = journey.start_scan(false).await;
    println!("resumed: {:?}", resumed.outcome);
    println!("fetched after resume: {:?}", ctl.fetch_log().await);
    if let Some(year) = resumed.stats.get(2024) {
        println!("read {} works in 2024", year.reader.fics);
    }

    Ok(())
}
