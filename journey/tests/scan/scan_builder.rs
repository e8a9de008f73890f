use std::sync::Arc;
use std::time::Duration;

use journey::{Journey, JourneyConfig, JourneyError, ScanPhase};
use journey_mock::MockSite;

#[test]
fn builder_requires_a_site() {
    let err = Journey::builder().build().err().unwrap();
    assert!(matches!(err, JourneyError::InvalidArg(_)));
}

#[test]
fn builder_rejects_zero_save_interval() {
    let err = Journey::builder()
        .site(Arc::new(MockSite::new()))
        .save_interval(0)
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, JourneyError::InvalidArg(_)));
}

#[test]
fn builder_defaults_and_overrides() {
    let journey = Journey::builder()
        .site(Arc::new(MockSite::new()))
        .build()
        .unwrap();
    assert_eq!(journey.config(), &JourneyConfig::default());
    assert_eq!(journey.config().request_delay, Duration::from_millis(1300));
    assert_eq!(journey.config().save_interval, 5);
    assert_eq!(journey.phase(), ScanPhase::Idle);

    let tuned = Journey::builder()
        .site(Arc::new(MockSite::new()))
        .request_delay(Duration::from_millis(10))
        .max_inbox_pages(7)
        .max_history_pages(Some(9))
        .progress_max_age(Duration::from_secs(60))
        .build()
        .unwrap();
    assert_eq!(tuned.config().request_delay, Duration::from_millis(10));
    assert_eq!(tuned.config().max_inbox_pages, 7);
    assert_eq!(tuned.config().max_history_pages, Some(9));
    assert_eq!(tuned.config().progress_max_age, Duration::from_secs(60));
}
