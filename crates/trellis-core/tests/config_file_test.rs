//! Loading authorization configuration from disk

#![allow(clippy::unwrap_used)]

use std::io::Write;
use trellis_core::{AuthorizationConfig, TrellisError};

#[test]
fn loads_config_from_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[authorization]\nenforce = true\nsave_chunk_size = 50\nlarge_batch_warning = 200"
    )
    .unwrap();

    let config = AuthorizationConfig::load_from_file(file.path()).unwrap();
    assert!(config.enforce);
    assert_eq!(config.save_chunk_size, 50);
    assert_eq!(config.large_batch_warning, 200);
    assert!(config.log_denials);
}

#[test]
fn missing_file_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let err = AuthorizationConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, TrellisError::Invalid { .. }));
}
