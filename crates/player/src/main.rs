//! StreamChat Player - terminal client binary.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use streamchat_domain::StoryDialogue;
use streamchat_player::application::ChatSession;
use streamchat_player::infrastructure::{ChatMode, PlayerConfig, RelayHttpClient};
use streamchat_player::ui::TerminalView;

const QUIT_COMMAND: &str = "/quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    // Logs go to stderr so they don't interleave with the transcript.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streamchat_player=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = PlayerConfig::from_env()?;
    let relay = Arc::new(RelayHttpClient::new(config.relay_url));
    tracing::info!(relay = %relay.chat_url(), mode = ?config.mode, "Starting StreamChat Player");

    let view = Box::new(TerminalView::stdout());
    let mut session = match config.mode {
        ChatMode::Chat => ChatSession::new(relay, view),
        ChatMode::Story => ChatSession::with_stage(relay, view, Box::new(StoryDialogue::new())),
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end();
        if line == QUIT_COMMAND {
            break;
        }
        session.set_input(line);
        let outcome = session.submit().await;
        tracing::debug!(
            session_id = %session.id(),
            ?outcome,
            stage = ?session.stage_label(),
            "Submission handled"
        );
    }

    session.end();
    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
