//! Shared integration-test server bootstrap helpers.

use axum_test::TestServer;
use hmac::{Hmac, Mac};
use notes_server::{create_app, AppState, Config, Database, TantivySearchIndex};
use sha2::Sha256;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub(crate) const TEST_SECRET: &str = "integration-secret";

pub(crate) fn test_config_for_dir(dir: &Path) -> Config {
    let mut config = Config::from_lookup(|_| None);
    config.port = 0;
    config.db_path = dir.join("kv").to_str().expect("db path").to_string();
    config.search_path = dir.join("search").to_str().expect("search path").to_string();
    config.static_dir = dir.join("static").to_str().expect("static dir").to_string();
    config.signing_secret = TEST_SECRET.to_string();
    config
}

pub(crate) fn test_server_for_config(config: Config) -> TestServer {
    let db = Database::open(&config.db_path, config.database_options()).expect("open db");
    let index =
        TantivySearchIndex::open(&config.search_path, config.search_limit).expect("open index");
    let state = AppState::new(config, db, Arc::new(index));
    TestServer::new(create_app(state, false)).expect("server")
}

pub(crate) fn setup_test_server() -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config_for_dir(temp_dir.path());
    (test_server_for_config(config), temp_dir)
}

/// Mint a bearer header value for `tenant` signed with `secret`.
pub(crate) fn bearer_for(secret: &str, tenant: [u8; 8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("hmac key");
    mac.update(&tenant);
    let mut token = tenant.to_vec();
    token.extend_from_slice(&mac.finalize().into_bytes());
    format!("Bearer {}", hex::encode(token))
}

pub(crate) fn bearer(tenant: [u8; 8]) -> String {
    bearer_for(TEST_SECRET, tenant)
}
