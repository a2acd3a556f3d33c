//! Fixtures shared by the unit tests.

use dvp_core::messages::{
    LinkedSource, PluginDefinedObject, RemoteConnection, RemoteEnvironment, RemoteHost,
    Repository, SingleEntireMount, Snapshot, SourceConfig, StagedSource, VirtualSource,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dvp_core::{Dict, Schema};
use serde_json::Value;
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// A schema whose five definitions are all generic maps.
pub(crate) struct TestSchema;

impl Schema for TestSchema {
    type Repository = Dict;
    type SourceConfig = Dict;
    type Snapshot = Dict;
    type LinkedSource = Dict;
    type VirtualSource = Dict;
}

pub(crate) fn dict(value: Value) -> Dict {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub(crate) fn object(json: &str) -> PluginDefinedObject {
    PluginDefinedObject { json: json.into() }
}

pub(crate) fn environment(name: &str) -> RemoteEnvironment {
    RemoteEnvironment {
        name: name.into(),
        reference: format!("{name}-ref"),
        host: RemoteHost {
            name: format!("{name}-host"),
            reference: format!("{name}-host-ref"),
            binary_path: "/opt/bin".into(),
            scratch_path: "/var/tmp".into(),
        },
    }
}

pub(crate) fn repository(json: &str) -> Repository {
    Repository {
        parameters: object(json),
    }
}

pub(crate) fn source_config(json: &str) -> SourceConfig {
    SourceConfig {
        parameters: object(json),
    }
}

pub(crate) fn snapshot(json: &str) -> Snapshot {
    Snapshot {
        parameters: object(json),
    }
}

pub(crate) fn staged_source(guid: &str) -> StagedSource {
    StagedSource {
        linked_source: LinkedSource {
            guid: guid.into(),
            parameters: object(r#"{"port":5432}"#),
        },
        connection: RemoteConnection::default(),
        staged_mount: SingleEntireMount {
            remote_environment: environment("staging"),
            mount_path: "/mnt/staging".into(),
            shared_path: None,
        },
    }
}

pub(crate) fn virtual_source(guid: &str) -> VirtualSource {
    VirtualSource {
        guid: guid.into(),
        connection: RemoteConnection {
            environment: environment("target"),
            ..RemoteConnection::default()
        },
        parameters: object(r#"{"port":5433}"#),
    }
}

/// Counts events at one level on the current thread.
pub(crate) struct LevelCounter {
    level: Level,
    count: Arc<AtomicUsize>,
}

impl<S: Subscriber> Layer<S> for LevelCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == self.level {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Install a thread-local subscriber counting `level` events until the
/// guard drops. Works under the current-thread `#[tokio::test]` runtime.
pub(crate) fn count_events(level: Level) -> (DefaultGuard, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(LevelCounter {
        level,
        count: Arc::clone(&count),
    });
    (tracing::subscriber::set_default(subscriber), count)
}
