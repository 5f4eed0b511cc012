//! Configuration loaded from process environment variables.

use serial_test::serial;
use wellchat::config::{
    AssistConfig, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_ENDPOINT, DEFAULT_LOCALE, ENV_CONNECT_TIMEOUT,
    ENV_ENDPOINT, ENV_LOCALE,
};

fn clear_env() {
    for key in [ENV_ENDPOINT, ENV_LOCALE, ENV_CONNECT_TIMEOUT] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_from_env_defaults_when_unset() {
    clear_env();
    let config = AssistConfig::from_env();

    assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    assert_eq!(config.locale, DEFAULT_LOCALE);
    assert_eq!(config.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_from_env_reads_all_variables() {
    clear_env();
    std::env::set_var(ENV_ENDPOINT, "https://project.supabase.co/functions/v1/chat");
    std::env::set_var(ENV_LOCALE, "fr-CA");
    std::env::set_var(ENV_CONNECT_TIMEOUT, "3");

    let config = AssistConfig::from_env();
    clear_env();

    assert_eq!(config.endpoint, "https://project.supabase.co/functions/v1/chat");
    assert_eq!(config.locale, "fr-CA");
    assert_eq!(config.connect_timeout_secs, 3);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_from_env_ignores_blank_and_invalid_values() {
    clear_env();
    std::env::set_var(ENV_ENDPOINT, "   ");
    std::env::set_var(ENV_LOCALE, "");
    std::env::set_var(ENV_CONNECT_TIMEOUT, "soon");

    let config = AssistConfig::from_env();
    clear_env();

    assert_eq!(config, AssistConfig::default());
}

#[test]
#[serial]
fn test_invalid_endpoint_from_env_fails_validation() {
    clear_env();
    std::env::set_var(ENV_ENDPOINT, "ftp://example.com/chat");

    let config = AssistConfig::from_env();
    clear_env();

    let err = config.validate().unwrap_err();
    assert_eq!(err.error_code(), "E_CONFIG");
    assert!(err.user_message().contains("ftp://example.com/chat"));
}
