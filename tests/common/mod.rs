//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use group_service::config::ServerConfig;
use group_service::groups::types::{RealmId, Role, User, UserId};
use group_service::store::memory::MemoryStore;
use group_service::store::GroupStore;
use group_service::{HttpServer, Shutdown};

pub const ADMIN_KEY: &str = "iago-api-key";
pub const MEMBER_KEY: &str = "hamlet-api-key";
pub const SECOND_MEMBER_KEY: &str = "ophelia-api-key";
pub const GUEST_KEY: &str = "polonius-api-key";
pub const OTHER_REALM_KEY: &str = "othello-api-key";

#[allow(dead_code)]
pub const ADMIN: u64 = 1;
#[allow(dead_code)]
pub const HAMLET: u64 = 2;
#[allow(dead_code)]
pub const OPHELIA: u64 = 3;
#[allow(dead_code)]
pub const POLONIUS: u64 = 4;
#[allow(dead_code)]
pub const OTHELLO: u64 = 9;

fn user(id: u64, realm: u64, name: &str, key: &str, role: Role) -> User {
    User {
        id: UserId(id),
        realm: RealmId(realm),
        email: format!("{name}@example.com"),
        api_key: key.to_string(),
        role,
    }
}

/// A store holding the standard test users: an admin, two members, and a
/// guest in realm 1, plus an admin in realm 2.
pub fn seeded_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_users([
        user(ADMIN, 1, "iago", ADMIN_KEY, Role::Admin),
        user(HAMLET, 1, "hamlet", MEMBER_KEY, Role::Member),
        user(OPHELIA, 1, "ophelia", SECOND_MEMBER_KEY, Role::Member),
        user(POLONIUS, 1, "polonius", GUEST_KEY, Role::Guest),
        user(OTHELLO, 2, "othello", OTHER_REALM_KEY, Role::Admin),
    ]))
}

/// Start the real server on the given port and wait until it answers.
///
/// Returns the base URL and the shutdown handle keeping the server up.
pub async fn spawn_server(port: u16, store: Arc<dyn GroupStore>) -> (String, Shutdown) {
    spawn_server_with_config(port, store, ServerConfig::default()).await
}

/// Same as [`spawn_server`] but with a caller-supplied config.
pub async fn spawn_server_with_config(
    port: u16,
    store: Arc<dyn GroupStore>,
    mut config: ServerConfig,
) -> (String, Shutdown) {
    let addr: SocketAddr = format!("127.0.0.1:{port}").parse().unwrap();
    config.listener.bind_address = addr.to_string();

    let listener = TcpListener::bind(addr).await.unwrap();
    let server = HttpServer::new(&config, store);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        server.run(listener, &server_shutdown).await.unwrap();
    });

    let base = format!("http://{addr}");
    wait_ready(&base).await;
    (base, shutdown)
}

async fn wait_ready(base: &str) {
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if let Ok(res) = client.get(format!("{base}/health")).send().await {
            if res.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server at {base} did not become ready");
}

/// Attach the given caller key as a bearer token.
#[allow(dead_code)]
pub fn bearer(builder: reqwest::RequestBuilder, key: &str) -> reqwest::RequestBuilder {
    builder.header("Authorization", format!("Bearer {key}"))
}
