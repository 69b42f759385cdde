use super::*;
use tempfile::TempDir;

#[test]
fn default_config() {
    let config = Config::default();

    assert_eq!(config.embedder.protocol, "http");
    assert_eq!(config.embedder.host, "localhost");
    assert_eq!(config.embedder.port, 11434);
    assert_eq!(config.embedder.model, "all-minilm:latest");

    assert_eq!(config.index.name, "document-retrieval");
    assert_eq!(config.index.dimension, 384);
    assert_eq!(config.index.metric, "cosine");
    assert_eq!(config.index.cloud, "aws");
    assert_eq!(config.index.region, "us-east-1");
    assert!(!config.index.strict_readiness);

    assert_eq!(config.chunking.window, 50);
    assert_eq!(config.chunking.overlap, 10);
}

#[test]
fn config_validation() {
    let config = Config::default();
    assert!(config.validate().is_ok());

    let mut invalid_config = config.clone();
    invalid_config.embedder.protocol = "ftp".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.embedder.port = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.embedder.model = String::new();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.index.name = "Not Valid".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.index.dimension = 2;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.index.metric = "manhattan".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.chunking.window = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config;
    invalid_config.chunking.overlap = invalid_config.chunking.window;
    assert!(invalid_config.validate().is_err());
}

#[test]
fn endpoint_url_generation() {
    let config = Config::default();

    let embedder_url = config
        .embedder
        .url()
        .expect("should generate embedder URL successfully");
    assert_eq!(embedder_url.as_str(), "http://localhost:11434/");

    let index_url = config
        .index
        .url()
        .expect("should generate index URL successfully");
    assert_eq!(index_url.as_str(), "http://localhost:8080/");
}

#[test]
fn toml_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string(&config).expect("should serialize toml correctly");
    let mut parsed_config: Config =
        toml::from_str(&toml_str).expect("should parse toml correctly");
    parsed_config.base_dir = config.base_dir.clone();
    assert_eq!(config, parsed_config);
}

#[test]
fn load_from_missing_file_uses_defaults() {
    let dir = TempDir::new().expect("can create temp dir");

    let config = Config::load_from(dir.path()).expect("load should succeed");
    assert_eq!(config.index.name, "document-retrieval");
    assert_eq!(config.base_dir, dir.path());
}

#[test]
fn save_and_load_round_trip() {
    let dir = TempDir::new().expect("can create temp dir");

    let mut config = Config::load_from(dir.path()).expect("load should succeed");
    config.index.name = "my-notes".to_string();
    config.index.strict_readiness = true;
    config.chunking.window = 80;
    config.save().expect("save should succeed");

    let reloaded = Config::load_from(dir.path()).expect("reload should succeed");
    assert_eq!(reloaded.index.name, "my-notes");
    assert!(reloaded.index.strict_readiness);
    assert_eq!(reloaded.chunking.window, 80);
}

#[test]
fn invalid_file_fails_to_load() {
    let dir = TempDir::new().expect("can create temp dir");
    std::fs::write(dir.path().join("config.toml"), "not valid toml [[[")
        .expect("can write test file");

    assert!(Config::load_from(dir.path()).is_err());
}

#[test]
fn out_of_bounds_file_fails_validation() {
    let dir = TempDir::new().expect("can create temp dir");
    std::fs::write(
        dir.path().join("config.toml"),
        "[index]\ndimension = 7\n",
    )
    .expect("can write test file");

    assert!(Config::load_from(dir.path()).is_err());
}
