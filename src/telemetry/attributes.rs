//! Fixed span attribute sets.

use opentelemetry::KeyValue;

use crate::store::{Statement, StoreTarget};

pub const DB_SYSTEM: &str = "db.system";
pub const DB_CONNECTION_STRING: &str = "db.connection_string";
pub const DB_USER: &str = "db.user";
pub const DB_NAME: &str = "db.name";
pub const DB_OPERATION: &str = "db.operation";
pub const DB_STATEMENT: &str = "db.statement";
pub const NET_PEER_NAME: &str = "net.peer.name";
pub const NET_PEER_PORT: &str = "net.peer.port";
pub const HTTP_METHOD: &str = "http.method";
pub const HTTP_URL: &str = "http.url";
pub const HTTP_STATUS_CODE: &str = "http.status_code";

/// Attributes for one statement against the store.
pub fn db_attributes(target: &StoreTarget, statement: &Statement) -> Vec<KeyValue> {
    let operation: &'static str = statement.operation.into();
    let mut attrs = vec![
        KeyValue::new(DB_SYSTEM, target.system.clone()),
        KeyValue::new(DB_CONNECTION_STRING, target.connection_string()),
        KeyValue::new(DB_USER, target.user.clone()),
        KeyValue::new(DB_NAME, target.database.clone()),
        KeyValue::new(DB_OPERATION, operation),
        KeyValue::new(DB_STATEMENT, statement.text),
        KeyValue::new(NET_PEER_NAME, target.host.clone()),
    ];
    if let Some(port) = target.port {
        attrs.push(KeyValue::new(NET_PEER_PORT, i64::from(port)));
    }
    attrs
}

/// Attributes for one outbound HTTP call. The status code is added once known.
pub fn http_attributes(method: &str, url: &str) -> Vec<KeyValue> {
    vec![
        KeyValue::new(HTTP_METHOD, method.to_string()),
        KeyValue::new(HTTP_URL, url.to_string()),
    ]
}
