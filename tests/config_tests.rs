//! Configuration loading and validation tests.

use lyrebird::config::Config;
use lyrebird::connector::TradeMode;
use rust_decimal_macros::dec;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const MINIMAL: &str = r#"
[monitor]
symbols = ["BTC-AUD"]

[[venues]]
id = "paper-1"
kind = "paper"
base_prices = { "BTC-AUD" = 65000 }
"#;

#[test]
fn minimal_config_gets_documented_defaults() {
    let file = write_config(MINIMAL);
    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.conductor.approval_threshold, 0.6);
    assert_eq!(config.conductor.hold_threshold, 0.4);
    assert_eq!(config.aggregation.per_call_timeout_ms, 2000);
    assert_eq!(config.monitor.tick_interval_ms, 5000);
    assert_eq!(config.monitor.alert_threshold_pct, dec!(2));
    assert_eq!(config.router.size_ceiling, dec!(1));
    assert_eq!(config.router.max_retry_count, 2);
    assert_eq!(config.router.mode, TradeMode::Paper);
    assert_eq!(config.monitor.max_ticks, None);
}

#[test]
fn missing_file_is_an_error() {
    assert!(Config::load("/definitely/not/here.toml").is_err());
}

#[test]
fn threshold_outside_unit_interval_is_rejected() {
    let file = write_config(&format!(
        "{MINIMAL}\n[conductor]\napproval_threshold = 1.5\n"
    ));
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn hold_threshold_above_approval_is_rejected() {
    let file = write_config(&format!(
        "{MINIMAL}\n[conductor]\napproval_threshold = 0.5\nhold_threshold = 0.7\n"
    ));
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn empty_venue_list_is_rejected() {
    let file = write_config(
        r#"
venues = []

[monitor]
symbols = ["BTC-AUD"]
"#,
    );
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn duplicate_venue_ids_are_rejected() {
    let file = write_config(
        r#"
[monitor]
symbols = ["BTC-AUD"]

[[venues]]
id = "twin"
kind = "paper"
base_prices = { "BTC-AUD" = 65000 }

[[venues]]
id = "twin"
kind = "paper"
base_prices = { "BTC-AUD" = 65000 }
"#,
    );
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn paper_venue_without_base_prices_is_rejected() {
    let file = write_config(
        r#"
[monitor]
symbols = ["BTC-AUD"]

[[venues]]
id = "paper-1"
kind = "paper"
"#,
    );
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn zero_tick_interval_is_rejected() {
    let file = write_config(
        r#"
[monitor]
symbols = ["BTC-AUD"]
tick_interval_ms = 0

[[venues]]
id = "paper-1"
kind = "paper"
base_prices = { "BTC-AUD" = 65000 }
"#,
    );
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn no_symbols_is_rejected() {
    let file = write_config(
        r#"
[monitor]
symbols = []

[[venues]]
id = "paper-1"
kind = "paper"
base_prices = { "BTC-AUD" = 65000 }
"#,
    );
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn unknown_strategy_name_is_rejected() {
    let file = write_config(&format!(
        "{MINIMAL}\n[conductor]\nstrategies = [\"typo-strategy\"]\n"
    ));
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn known_strategies_pass_validation() {
    let file = write_config(&format!(
        "{MINIMAL}\n[conductor]\nstrategies = [\"momentum\", \"spread_reversion\"]\n"
    ));
    assert!(Config::load(file.path()).is_ok());
}

#[test]
fn unknown_fields_are_rejected() {
    let file = write_config(&format!("{MINIMAL}\nsurprise = true\n"));
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn live_mode_parses() {
    let file = write_config(&format!("{MINIMAL}\n[router]\nmode = \"live\"\n"));
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.router.mode, TradeMode::Live);
}
