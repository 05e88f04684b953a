//! Integration tests for the configuration system.
//!
//! Covers validation, presets, environment parsing and JSON file round trips.

use super::*;
use crate::error::RingError;
use std::env;
use std::fs;
use tempfile::tempdir;

/// Sets a variable for the duration of a test
///
/// Every test uses its own prefix, so concurrently running tests never touch
/// the same variable.
fn set_var(name: &str, value: &str) {
    // SAFETY: each test owns a unique variable name
    unsafe { env::set_var(name, value) };
}

fn remove_var(name: &str) {
    // SAFETY: each test owns a unique variable name
    unsafe { env::remove_var(name) };
}

#[test]
fn test_default_is_valid() {
    let config = RingQueueConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.initial_capacity, 0);
    assert_eq!(config.memory_limit, None);
    assert_eq!(config.effective_capacity(), Some(0));
}

#[test]
fn test_all_presets_valid() {
    assert!(RingQueueConfig::performance_preset().validate().is_ok());
    assert!(RingQueueConfig::memory_preset().validate().is_ok());
    assert!(RingQueueConfig::realtime_preset().validate().is_ok());
    assert!(RingQueueConfig::balanced_preset().validate().is_ok());

    assert_eq!(RingQueueConfig::balanced_preset(), RingQueueConfig::default());
    assert!(RingQueueConfig::memory_preset().memory_limit.is_some());
    assert!(RingQueueConfig::performance_preset().memory_limit.is_none());
}

#[test]
fn test_validation_failures() {
    let zero_limit = RingQueueConfig::default().with_memory_limit(Some(0));
    assert!(matches!(
        zero_limit.validate(),
        Err(RingError::Configuration { .. })
    ));

    let huge = RingQueueConfig::default().with_initial_capacity(usize::MAX);
    assert_eq!(huge.effective_capacity(), None);
    let err = huge.validate().unwrap_err();
    assert_eq!(err.category(), "config");
    assert!(err.to_string().contains("initial_capacity"));
}

#[test]
fn test_effective_capacity_rounding() {
    let rounded: Vec<_> = [0, 1, 2, 3, 4, 5, 31, 32]
        .iter()
        .map(|&hint| {
            RingQueueConfig::default()
                .with_initial_capacity(hint)
                .effective_capacity()
        })
        .collect();
    let expected: Vec<Option<usize>> = [0, 1, 2, 4, 4, 8, 32, 32].map(Some).to_vec();
    assert_eq!(rounded, expected);
}

#[test]
fn test_from_env_with_prefix() {
    set_var("RFTEST_ENV_QUEUE_INITIAL_CAPACITY", "300");
    set_var("RFTEST_ENV_QUEUE_MEMORY_LIMIT", "65536");

    let config = RingQueueConfig::from_env_with_prefix("RFTEST_ENV_").unwrap();
    assert_eq!(config.initial_capacity, 300);
    assert_eq!(config.memory_limit, Some(65536));
    assert_eq!(config.effective_capacity(), Some(512));

    remove_var("RFTEST_ENV_QUEUE_INITIAL_CAPACITY");
    remove_var("RFTEST_ENV_QUEUE_MEMORY_LIMIT");
}

#[test]
fn test_from_env_unlimited_and_garbage() {
    set_var("RFTEST_GARBAGE_QUEUE_INITIAL_CAPACITY", "not a number");
    set_var("RFTEST_GARBAGE_QUEUE_MEMORY_LIMIT", "0");

    let config = RingQueueConfig::from_env_with_prefix("RFTEST_GARBAGE_").unwrap();
    assert_eq!(config, RingQueueConfig::default());

    remove_var("RFTEST_GARBAGE_QUEUE_INITIAL_CAPACITY");
    remove_var("RFTEST_GARBAGE_QUEUE_MEMORY_LIMIT");
}

#[test]
fn test_from_env_single_variable() {
    set_var("RFTEST_PARTIAL_QUEUE_MEMORY_LIMIT", "4096");

    let config = RingQueueConfig::from_env_with_prefix("RFTEST_PARTIAL_").unwrap();
    assert_eq!(config.initial_capacity, 0);
    assert_eq!(config.memory_limit, Some(4096));

    remove_var("RFTEST_PARTIAL_QUEUE_MEMORY_LIMIT");
}

#[test]
fn test_from_env_unset_uses_defaults() {
    let config = RingQueueConfig::from_env_with_prefix("RFTEST_UNSET_").unwrap();
    assert_eq!(config, RingQueueConfig::default());
}

#[test]
fn test_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("queue.json");

    let config = RingQueueConfig::realtime_preset();
    config.save_to_file(&path).unwrap();

    let loaded = RingQueueConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_partial_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.json");
    fs::write(&path, r#"{ "initial_capacity": 64 }"#).unwrap();

    let loaded = RingQueueConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded.initial_capacity, 64);
    assert_eq!(loaded.memory_limit, None);
}

#[test]
fn test_load_rejects_invalid_files() {
    let dir = tempdir().unwrap();

    let missing = RingQueueConfig::load_from_file(dir.path().join("missing.json"));
    assert!(matches!(missing, Err(RingError::Configuration { .. })));

    let malformed = dir.path().join("malformed.json");
    fs::write(&malformed, "{ initial_capacity: ").unwrap();
    let err = RingQueueConfig::load_from_file(&malformed).unwrap_err();
    assert!(err.to_string().contains("Failed to parse"));

    let invalid = dir.path().join("invalid.json");
    fs::write(&invalid, r#"{ "memory_limit": 0 }"#).unwrap();
    assert!(matches!(
        RingQueueConfig::load_from_file(&invalid),
        Err(RingError::Configuration { .. })
    ));
}
