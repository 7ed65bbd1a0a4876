use crate::app::status::{render_config, render_gate};
use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::dialogue::{Brief, DialogueEngine, DialogueState, DurationClass, TurnRequest};
use crate::pipeline::fitting::fit_narration;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

const QUIT_COMMANDS: [&str; 3] = ["/quit", "/exit", "/q"];

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Chat { save } => run_chat(&config, save.as_deref()).await,

        Commands::Gate { path } => {
            let brief = read_brief(&path).await?;
            let engine = DialogueEngine::new(config.dialogue.clone());
            println!("{}", render_gate(&engine.evaluate_gate(&brief)));
            Ok(())
        }

        Commands::Fit { seconds, cta, text } => {
            let class = DurationClass::nearest(seconds);
            if i64::from(class.seconds()) != seconds {
                info!(requested = seconds, normalized = class.seconds(), "video length normalized");
            }
            println!("{}", fit_narration(&text, cta.as_deref().unwrap_or(""), class));
            Ok(())
        }

        Commands::Config => {
            println!("{}", render_config(&config));
            Ok(())
        }
    }
}

/// Line-by-line brief collection. Ends on EOF or a quit command.
async fn run_chat(config: &Config, save: Option<&Path>) -> Result<()> {
    let engine = DialogueEngine::new(config.dialogue.clone());
    let session = engine.new_session();
    info!(session_id = %session.session_id, "chat session started");

    let mut brief = session.brief;
    let mut state = session.state;
    let mut stdout = tokio::io::stdout();
    say(&mut stdout, &session.greeting).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let utterance = line.trim();
        if utterance.is_empty() {
            continue;
        }
        if QUIT_COMMANDS.contains(&utterance) {
            break;
        }
        let result = engine.process_turn(TurnRequest::new(utterance, brief).with_state(state));
        say(&mut stdout, &result.message).await?;
        if result.state == DialogueState::Ready && state != DialogueState::Ready {
            say(&mut stdout, &render_gate(&result.gate)).await?;
        }
        brief = result.brief;
        state = result.state;
    }

    if let Some(path) = save {
        write_brief(path, &brief).await?;
        say(&mut stdout, &format!("saved brief to {}", path.display())).await?;
    }
    Ok(())
}

async fn say(stdout: &mut tokio::io::Stdout, text: &str) -> Result<()> {
    stdout.write_all(text.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

async fn read_brief(path: &Path) -> Result<Brief> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read brief {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid brief JSON in {}", path.display()))
}

async fn write_brief(path: &Path, brief: &Brief) -> Result<()> {
    let json = serde_json::to_string_pretty(brief).context("Failed to serialize brief")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write brief {}", path.display()))
}
