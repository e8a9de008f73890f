use std::sync::Arc;
use std::time::Duration;

use journey::{Journey, ProgressUpdate};
use journey_mock::MockSite;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info,journey=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .try_init();

    // 1. Build the orchestrator against the fixture site. State stays in memory.
    let journey = Journey::builder()
        .site(Arc::new(MockSite::new()))
        .request_delay(Duration::from_millis(50))
        .on_progress(|u: &ProgressUpdate| {
            let pct = u.percent.map_or_else(|| "  ".to_string(), |p| format!("{p:>3}%"));
            println!("[{pct}] {} {}", u.status, u.detail);
        })
        .build()?;

    // 2. First run crawls everything.
    let full = journey.start_scan(false).await;
    println!("\nfirst run: {:?}", full.outcome);

    for year in full.stats.years_desc() {
        let Some(record) = full.stats.get(year) else {
            continue;
        };
        let c = &record.creator;
        let r = &record.reader;
        println!("\n== {year} ==");
        println!(
            "wrote {} words across {} works ({} kudos, {} comments, {} hits)",
            c.words, c.works, c.kudos, c.comments, c.hits
        );
        for (fandom, words) in c.fandoms.top(3) {
            println!("  fandom {fandom}: {words} words");
        }
        for (who, n) in c.commenters.top(3) {
            println!("  commenter {who}: {n}");
        }
        for work in c.top_works(3) {
            println!("  top work {} (score {})", work.title, work.score);
        }
        println!("read {} works, {} words", r.fics, r.words);
        if let Some((author, stats)) = r.favorite_author() {
            println!("  favorite author {author} ({} works)", stats.works_seen.len());
        }
    }

    // 3. Second run reuses every past year and only crawls the current one.
    let again = journey.start_scan(false).await;
    println!(
        "\nsecond run: {:?}, cached years {:?}",
        again.outcome, again.cached_years
    );

    Ok(())
}
