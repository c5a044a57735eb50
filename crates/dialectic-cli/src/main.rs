use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialogue::{
    ContentStore, DialogueConfig, DialogueController, DialogueError, DialogueEvent, EventBus,
    HttpContentStore, HttpStoreConfig, InMemoryStore, LiveSession, Outcome, RebuttalSink,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tracing::{info, warn};

use dialectic_cli::input::{self, Input, ParseError};
use dialectic_cli::{demo, render};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Argument backend base URL; without it the built-in topics are used
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory of JSON seed files to play from instead of a backend
    #[arg(long, global = true, conflicts_with = "api_url")]
    data_dir: Option<PathBuf>,

    /// TOML file with session quotas and timing
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Turns per side
    #[arg(long, global = true)]
    max_turns: Option<u32>,

    /// Seconds before an idle turn is skipped
    #[arg(long, global = true)]
    turn_timeout: Option<u64>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// List the available topics
    Topics,
    /// Play a dialogue on one topic, both sides at this terminal
    Play {
        /// Topic name; defaults to the first listed topic
        #[arg(long)]
        topic: Option<String>,
    },
}

struct Stores {
    content: Arc<dyn ContentStore>,
    sink: Arc<dyn RebuttalSink>,
}

impl Stores {
    fn shared<S: ContentStore + RebuttalSink + 'static>(store: S) -> Self {
        let store = Arc::new(store);
        let content: Arc<dyn ContentStore> = store.clone();
        let sink: Arc<dyn RebuttalSink> = store;
        Self { content, sink }
    }
}

fn open_stores(args: &Args) -> Result<Stores> {
    if let Some(url) = &args.api_url {
        info!(url = %url, "Using HTTP content store");
        let store = HttpContentStore::new(&HttpStoreConfig::new(url.clone()))
            .context("failed to build HTTP client")?;
        return Ok(Stores::shared(store));
    }
    if let Some(dir) = &args.data_dir {
        let store = InMemoryStore::load_dir(dir)
            .with_context(|| format!("failed to load seed data from {}", dir.display()))?;
        return Ok(Stores::shared(store));
    }
    info!("Using built-in demo topics");
    Ok(Stores::shared(demo::store()))
}

fn load_config(args: &Args) -> Result<DialogueConfig> {
    let mut config = match &args.config {
        Some(path) => DialogueConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => DialogueConfig::from_env()?,
    };
    if let Some(turns) = args.max_turns {
        config.max_turns = turns;
    }
    if let Some(secs) = args.turn_timeout {
        config.turn_timeout_secs = secs;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let stores = open_stores(&args)?;
    match &args.command {
        Cmd::Topics => {
            let topics = stores.content.topics().await.context("failed to list topics")?;
            for topic in topics {
                println!("{}", topic.topic);
            }
            Ok(())
        }
        Cmd::Play { topic } => {
            let config = load_config(&args)?;
            let topic = match topic {
                Some(topic) => topic.clone(),
                None => stores
                    .content
                    .topics()
                    .await
                    .context("failed to list topics")?
                    .into_iter()
                    .next()
                    .map(|t| t.topic)
                    .context("the store has no topics")?,
            };
            play(&topic, stores, &config).await
        }
    }
}

async fn play(topic: &str, stores: Stores, config: &DialogueConfig) -> Result<()> {
    let bus = EventBus::new().shared();
    let controller = DialogueController::start_with_events(
        topic,
        stores.content,
        stores.sink,
        config,
        Some(bus.clone()),
    )
    .await
    .with_context(|| format!("failed to start a dialogue on '{}'", topic))?;

    let mut events = bus.subscribe_session(controller.id());
    let session = LiveSession::spawn(controller, config.tick_interval());

    // Timeouts and endings happen off the input path; report them as they come.
    let ended = Arc::new(Notify::new());
    let notices = {
        let ended = ended.clone();
        tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                if let Some(text) = render::notice(&event) {
                    println!("{}", text);
                }
                if matches!(event, DialogueEvent::SessionEnded { .. }) {
                    ended.notify_one();
                    break;
                }
            }
        })
    };

    println!("Topic: {}", topic);
    println!("{}", render::tree(&session.snapshot().await));
    println!("Type 'help' for the list of moves.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let state = session.snapshot().await;
        if state.is_ended() {
            break;
        }
        let generation = state.generation;
        print!("{}", render::prompt(&state, &state.allowed_moves()));
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = ended.notified() => break,
        };
        let Some(line) = line else {
            break;
        };

        let command = match input::parse_line(&line) {
            Ok(Input::Command(command)) => command,
            Ok(Input::Tree) => {
                print!("{}", render::tree(&state));
                continue;
            }
            Ok(Input::History) => {
                print!("{}", render::history(&state));
                continue;
            }
            Ok(Input::Status) => {
                print!("{}", render::status(&state, session.time_remaining().await));
                continue;
            }
            Ok(Input::Help) => {
                println!("{}", input::HELP);
                continue;
            }
            Ok(Input::Quit) => break,
            Err(ParseError::Empty) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match session.submit(generation, command).await {
            // The notice task reports endings.
            Ok(Outcome::Ended { .. }) => {}
            Ok(outcome) => print!("{}", render::outcome(&outcome)),
            Err(DialogueError::Stale { .. }) => {
                println!("The turn changed before that move arrived; it was discarded.")
            }
            Err(e) if e.is_retryable() => {
                warn!(error = %e, "Move failed");
                println!("{} (try again)", e);
            }
            Err(e) => println!("{}", e),
        }
    }

    if session.abandon().await.is_some() {
        info!("Dialogue abandoned");
    }
    let final_state = session.snapshot().await;
    let _ = notices.await;
    println!("{}", render::tree(&final_state));
    print!("{}", render::status(&final_state, None));
    Ok(())
}
