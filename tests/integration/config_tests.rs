use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use hashdex::config::Config;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();

    assert_eq!(config.index_path, None);
    assert_eq!(config.sample_size, 1_000_000);
    assert!(!config.follow_symlinks);
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("HASHDEX_TEST_SAMPLE_SIZE", "2048");
    std::env::set_var("HASHDEX_TEST_SKIP_HIDDEN", "true");
    std::env::set_var("HASHDEX_TEST_INDEX_PATH", "/tmp/from-env.db");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("HASHDEX_TEST_"))
        .extract()
        .unwrap();

    assert_eq!(config.sample_size, 2048);
    assert!(config.skip_hidden);
    assert_eq!(config.index_path, Some(PathBuf::from("/tmp/from-env.db")));

    std::env::remove_var("HASHDEX_TEST_SAMPLE_SIZE");
    std::env::remove_var("HASHDEX_TEST_SKIP_HIDDEN");
    std::env::remove_var("HASHDEX_TEST_INDEX_PATH");
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
index_path = "/data/hashdex.db"
sample_size = 65536
follow_symlinks = true
ignore_patterns = ["*.part", "cache/"]
"#,
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();

    assert_eq!(config.index_path, Some(PathBuf::from("/data/hashdex.db")));
    assert_eq!(config.sample_size, 65_536);
    assert!(config.follow_symlinks);
    assert!(!config.skip_hidden);
    assert_eq!(config.ignore_patterns, vec!["*.part", "cache/"]);
}

#[test]
fn test_config_save_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    let config = Config {
        sample_size: 4096,
        skip_hidden: true,
        ..Config::default()
    };

    config.save_to(&config_path).unwrap();

    let saved = fs::read_to_string(&config_path).unwrap();
    assert!(saved.contains("sample_size = 4096"));
    assert!(saved.contains("skip_hidden = true"));
    assert!(!saved.contains("index_path"));
}

#[test]
fn test_config_invalid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "sample_size = \"lots\"").unwrap();

    let result: Result<Config, _> = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract();
    assert!(result.is_err());
}

#[test]
fn test_config_figment_stack_reads_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "follow_symlinks = true\n").unwrap();

    let config: Config = Config::figment(Some(&config_path)).extract().unwrap();
    assert!(config.follow_symlinks);
}
