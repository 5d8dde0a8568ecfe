use serial_test::serial;
use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

use netlify_deploy::cli::{run, Cli, Commands};
use netlify_deploy_core::DeployError;

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events.lock().unwrap().push(format!("{:?}", event));
    }
}

#[tokio::test]
#[serial]
async fn deploy_without_token_fails_with_config_error_and_traces_start() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    std::env::remove_var("NETLIFY_TOKEN");
    let cli = Cli {
        command: Commands::Deploy,
    };

    let err = run(cli).await.unwrap_err();

    assert!(
        matches!(err.downcast_ref::<DeployError>(), Some(DeployError::Config(_))),
        "expected a configuration error, got: {err:#}"
    );
    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
