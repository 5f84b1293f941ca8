//! Agent transcript CLI
//!
//! Lists persisted sessions and replays them offline, printing the
//! reconstructed transcript as JSON.

use agent_transcript::api::{FileSessionApi, HttpSessionApi};
use agent_transcript::config::ClientConfig;
use agent_transcript::runtime::{LoggingTransport, SessionApi, SessionRuntime, SessionStore, Update};
use agent_transcript::state_machine::NotifyLevel;
use agent_transcript::view::{content_for, Scrollback, TerminalSink};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: agent_transcript <sessions | replay <session_id> | replay-file <path>>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stdout is reserved for output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agent_transcript=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env()?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["sessions"] => {
            let device_id = config
                .device_id
                .as_deref()
                .ok_or("AGENT_DEVICE_ID is not set")?;
            let api = HttpSessionApi::new(&config.api_url, config.http_timeout)?;
            let sessions = api.list_sessions(device_id).await?;
            tracing::info!(device_id = %device_id, count = sessions.len(), "Listed sessions");
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
        ["replay", session_id] => {
            let api = HttpSessionApi::new(&config.api_url, config.http_timeout)?;
            replay(&config, api, session_id).await?;
        }
        ["replay-file", path] => {
            let api = FileSessionApi::new(*path);
            let session_id = api
                .list_sessions("")
                .await?
                .into_iter()
                .next()
                .map(|s| s.id)
                .unwrap_or_default();
            replay(&config, api, &session_id).await?;
        }
        _ => return Err(USAGE.into()),
    }

    Ok(())
}

async fn replay<A: SessionApi + 'static>(
    config: &ClientConfig,
    api: A,
    session_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = SessionStore::new(config.session_context());
    let (runtime, handle) = SessionRuntime::new(store, LoggingTransport, api, config.replay_delay);
    let mut updates = handle.subscribe();
    let task = tokio::spawn(runtime.run());

    handle.replay(session_id).await?;
    drop(handle);

    let mut terminal = Scrollback::default();
    loop {
        match updates.recv().await {
            Ok(Update::Terminal(writes)) => {
                for write in &writes {
                    terminal.write(write);
                }
            }
            Ok(Update::Notice { level: NotifyLevel::Error, message }) => {
                tracing::error!(message = %message, "Session error");
            }
            Ok(Update::Notice { message, .. }) => tracing::info!(message = %message, "Session notice"),
            Ok(Update::State(_)) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Fell behind session updates");
            }
            Err(RecvError::Closed) => break,
        }
    }

    let state = task.await?;
    let output = serde_json::json!({
        "session": &state,
        "view": content_for(&state),
        "terminal": terminal.lines(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
