//! Shared integration-test server bootstrap helpers.

use axum_test::TestServer;
use finesdesk_server::{create_app, seed::demo_store, AppState, Config, Store};

pub(crate) fn test_config() -> Config {
    Config {
        port: 0,
        ..Config::default()
    }
}

pub(crate) fn test_server_for_store(store: Store) -> TestServer {
    let state = AppState::new(test_config(), store);
    TestServer::new(create_app(state, false)).expect("server")
}

pub(crate) fn setup_test_server() -> TestServer {
    test_server_for_store(Store::default())
}

pub(crate) fn setup_demo_server() -> TestServer {
    test_server_for_store(demo_store(42).expect("demo store"))
}
