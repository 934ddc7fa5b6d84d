use crate::config::{Config, ConfigError, DEFAULT_INTENTS};
use crate::semantic::{DEFAULT_MODEL, EMPTY_TEXT};
use crate::storage::{BackendLocal, StorageManager};

fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

/// First load writes a default config.yaml
#[test]
fn test_load_creates_default_config() {
    let dir = temp_dir();
    let config = Config::load_with(dir.path()).unwrap();

    assert_eq!(config.model, DEFAULT_MODEL);
    assert_eq!(config.download_timeout_secs, 300);
    assert_eq!(config.score_precision, 6);
    assert_eq!(config.stop_words.language, "english");
    assert_eq!(config.intents, DEFAULT_INTENTS.map(String::from).to_vec());
    assert_eq!(config.base_path(), dir.path());
    assert!(dir.path().join("config.yaml").exists());
}

/// Missing fields are filled with defaults and the file is upgraded
#[test]
fn test_partial_config_is_upgraded() {
    let dir = temp_dir();
    let store = BackendLocal::new(dir.path()).unwrap();
    store
        .write(
            "config.yaml",
            b"model: bge-small-en-v1.5\nintents:\n- Hello builders\n",
        )
        .unwrap();

    let config = Config::load_with(dir.path()).unwrap();
    assert_eq!(config.model, "bge-small-en-v1.5");
    assert_eq!(config.intents, vec!["Hello builders".to_string()]);
    assert_eq!(config.score_precision, 6);

    let saved = String::from_utf8(store.read("config.yaml").unwrap()).unwrap();
    assert!(saved.contains("download_timeout_secs: 300"));
    assert!(saved.contains("score_precision: 6"));
}

#[test]
fn test_save_and_reload() {
    let dir = temp_dir();
    let mut config = Config::load_with(dir.path()).unwrap();
    config.intents = vec!["What are you building today?".to_string()];
    config.stop_words.extra = vec!["ai".to_string()];
    config.batch_size = Some(64);
    config.save().unwrap();

    let reloaded = Config::load_with(dir.path()).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_invalid_stop_word_language() {
    let dir = temp_dir();
    let store = BackendLocal::new(dir.path()).unwrap();
    store
        .write("config.yaml", b"stop_words:\n  language: klingon\n")
        .unwrap();

    let result = Config::load_with(dir.path());
    assert!(matches!(
        result,
        Err(ConfigError::Invalid { ref field, .. }) if field == "stop_words.language"
    ));
}

#[test]
fn test_validation_rejects_bad_values() {
    let mut config = Config::default();
    config.download_timeout_secs = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.score_precision = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.score_precision = 12;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.batch_size = Some(0);
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.intents.push("   ".to_string());
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.model = String::new();
    assert!(config.validate().is_err());

    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_empty_intent_list_is_valid() {
    let mut config = Config::default();
    config.intents.clear();
    assert!(config.validate().is_ok());
}

#[test]
fn test_malformed_yaml() {
    let dir = temp_dir();
    let store = BackendLocal::new(dir.path()).unwrap();
    store.write("config.yaml", b"intents: [unclosed").unwrap();

    assert!(matches!(
        Config::load_with(dir.path()),
        Err(ConfigError::Yaml(_))
    ));
}

#[test]
fn test_normalizer_follows_stop_word_config() {
    let mut config = Config::default();
    config.stop_words.extra = vec!["AI".to_string()];
    let normalizer = config.normalizer();
    assert_eq!(normalizer.normalize(Some("The future of AI")), "future");

    config.stop_words.language = "none".to_string();
    config.stop_words.extra.clear();
    let normalizer = config.normalizer();
    assert_eq!(normalizer.normalize(Some("The a")), "the a");
    assert_eq!(normalizer.normalize(Some("  ")), EMPTY_TEXT);
}
