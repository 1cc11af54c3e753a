use chrono::Utc;
use numby::currency_fetcher::{FetchError, RateFetcher};
use numby::{api, ErrorKind, Session, Value};
use tempfile::tempdir;

use crate::should_run_external_api_tests;

#[test]
fn test_live_rates_are_usable_and_persisted() {
    if !should_run_external_api_tests() {
        return;
    }

    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{}").unwrap();

    let session = Session::from_config(&path).unwrap();
    let date = session.update_currency_rates().unwrap();
    assert!(date <= Utc::now().date_naive());
    assert_eq!(api::get_rates_update_date(), Some(date));
    assert!(!api::are_rates_stale().unwrap());

    let euros = session.evaluate("100 USD to EUR").unwrap();
    assert_eq!(euros.unit_label, "EUR");
    assert!(euros.value.amount > 0.0);

    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.contains("currency_rates"));

    // second fetch inside the minimum interval is refused
    let error = session.update_currency_rates().unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NetworkError);
    assert!(matches!(
        RateFetcher::new().unwrap().fetch(),
        Err(FetchError::RateLimited(_))
    ));
    assert_eq!(
        session.evaluate("5 USD").unwrap().value,
        Value::currency(5.0, "USD")
    );
}
