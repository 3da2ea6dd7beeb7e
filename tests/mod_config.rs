use std::io::Write;
use std::time::Duration;

use boardlite::ServiceConfig;

#[test]
fn defaults_match_the_documented_ttls() {
    let config = ServiceConfig::default();
    assert_eq!(config.post_sequence, "posts_sequence");
    assert_eq!(config.trace_sequence, "traces_sequence");
    assert_eq!(config.post_create_ttl(), Duration::from_secs(3600));
    assert_eq!(config.post_read_ttl(), Duration::from_secs(1800));
    assert_eq!(config.trace_list_ttl(), Duration::from_secs(600));
}

#[test]
fn loads_overrides_from_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "post_sequence = \"board_seq\"\npost_read_ttl_secs = 60"
    )
    .unwrap();

    let config = ServiceConfig::load(file.path()).unwrap();
    assert_eq!(config.post_sequence, "board_seq");
    assert_eq!(config.post_read_ttl(), Duration::from_secs(60));
    // Unlisted keys keep their defaults.
    assert_eq!(config.trace_list_ttl(), Duration::from_secs(600));
}

#[test]
fn unreadable_or_malformed_config_is_a_config_error() {
    let err = ServiceConfig::load("/nonexistent/boardlite.toml").unwrap_err();
    assert_eq!(err.code(), 500);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "post_sequence = [not toml").unwrap();
    let err = ServiceConfig::load(file.path()).unwrap_err();
    assert_eq!(err.code(), 500);
}

#[test]
fn trace_sequence_names_are_per_post() {
    let config = ServiceConfig::default();
    assert_eq!(config.trace_sequence_for("7"), "traces_sequence_7");
    assert_ne!(config.trace_sequence_for("7"), config.trace_sequence_for("8"));
}
