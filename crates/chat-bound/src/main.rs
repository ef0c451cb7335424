//! Interactive chatbot whose history is bounded by trimming or summarization.
//!
//! Reads the API key from `OPENROUTER_KEY`, falling back to `OPENAI_API_KEY`.
//! An OpenAI key talks to OpenAI's endpoint unless `--base-url` says
//! otherwise, so it is never sent to OpenRouter by default.
//!
//! # Examples
//!
//! ```sh
//! # Keep the last 10 messages
//! chat-bound --policy trim --keep-last 10
//!
//! # Summarize once 8 messages are stored, persisting threads on disk
//! chat-bound --policy summarize --threshold 8 --thread-id 3 --store-dir .chat-bound
//!
//! # OpenAI directly (gpt-4o-mini at api.openai.com)
//! OPENAI_API_KEY=... chat-bound
//!
//! # Any other OpenAI-compatible endpoint
//! OPENROUTER_KEY=... chat-bound --base-url http://localhost:8080/v1/chat/completions \
//!   --model llama3
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process;

use chat_bound::agent::{ChatConfig, ChatSession, DEFAULT_THREAD_ID, LoggingHandler};
use chat_bound::history::{BoundingPolicy, DEFAULT_KEEP_LAST, DEFAULT_SUMMARY_THRESHOLD};
use chat_bound::model::OpenRouterModel;
use chat_bound::store::{FileStore, MemoryStore, ThreadStore};
use chat_bound::{
    ChatError, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT, OPENAI_URL, OPENROUTER_URL, OpenRouterClient,
};
use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Model used against OpenAI's endpoint, which does not take the
/// `openai/` provider prefix.
const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Chat with an LLM while keeping the history it sees bounded.
#[derive(Parser)]
#[command(name = "chat-bound")]
struct Cli {
    // ── History policy ─────────────────────────────────────────
    /// How to bound the history sent with each message
    #[arg(long, value_enum, default_value_t = PolicyKind::Trim)]
    policy: PolicyKind,

    /// Messages kept by the trim policy
    #[arg(long, default_value_t = DEFAULT_KEEP_LAST)]
    keep_last: usize,

    /// Stored messages that trigger summarization
    #[arg(long, default_value_t = DEFAULT_SUMMARY_THRESHOLD)]
    threshold: usize,

    // ── Model ──────────────────────────────────────────────────
    /// Model to use [default: openai/gpt-4o-mini, or gpt-4o-mini with an OpenAI key]
    #[arg(long)]
    model: Option<String>,

    /// System prompt
    #[arg(long, default_value = DEFAULT_SYSTEM_PROMPT)]
    system: String,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.0)]
    temperature: f32,

    /// Maximum tokens per reply (0 = provider default)
    #[arg(long, default_value_t = 0)]
    max_tokens: u32,

    /// Chat completions URL of an OpenAI-compatible API [default: OpenRouter,
    /// or OpenAI with an OpenAI key]
    #[arg(long)]
    base_url: Option<String>,

    // ── Storage ────────────────────────────────────────────────
    /// Conversation thread to continue
    #[arg(long, default_value = DEFAULT_THREAD_ID)]
    thread_id: String,

    /// Directory for persisted threads (in-memory when omitted)
    #[arg(long)]
    store_dir: Option<PathBuf>,

    // ── Output ─────────────────────────────────────────────────
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PolicyKind {
    /// Send only the most recent messages
    Trim,
    /// Replace old messages with a summary
    Summarize,
}

impl Cli {
    fn policy(&self) -> BoundingPolicy {
        match self.policy {
            PolicyKind::Trim => BoundingPolicy::Trim {
                keep_last: self.keep_last,
            },
            PolicyKind::Summarize => BoundingPolicy::Summarize {
                threshold: self.threshold,
            },
        }
    }

    /// Chat completions URL and model name. Flags win; otherwise both follow
    /// the provider the key belongs to.
    fn endpoint(&self, source: KeySource) -> (String, String) {
        let (url, model) = match source {
            KeySource::OpenRouter => (OPENROUTER_URL, DEFAULT_MODEL),
            KeySource::OpenAi => (OPENAI_URL, OPENAI_DEFAULT_MODEL),
        };
        (
            self.base_url.clone().unwrap_or_else(|| url.to_string()),
            self.model.clone().unwrap_or_else(|| model.to_string()),
        )
    }

    fn chat_config(&self, model: String) -> ChatConfig {
        ChatConfig::new(model, self.system.clone())
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
            .with_policy(self.policy())
            .with_thread_id(self.thread_id.clone())
    }
}

/// One line of user input, classified.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Blank,
    Message(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if trimmed.eq_ignore_ascii_case("quit") {
        Input::Quit
    } else if trimmed.is_empty() {
        Input::Blank
    } else {
        Input::Message(trimmed)
    }
}

/// Which provider issued the API key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KeySource {
    OpenRouter,
    OpenAi,
}

/// Look up the API key through `var`, preferring `OPENROUTER_KEY`. Empty
/// values count as unset.
fn api_key(var: impl Fn(&str) -> Option<String>) -> Result<(KeySource, String), ChatError> {
    let lookup = |name: &str| var(name).filter(|key| !key.trim().is_empty());
    if let Some(key) = lookup("OPENROUTER_KEY") {
        Ok((KeySource::OpenRouter, key))
    } else if let Some(key) = lookup("OPENAI_API_KEY") {
        Ok((KeySource::OpenAi, key))
    } else {
        Err(ChatError::Config(
            "OPENROUTER_KEY or OPENAI_API_KEY must be set".into(),
        ))
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "chat_bound=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn prompt() -> Result<(), ChatError> {
    let mut stdout = std::io::stdout();
    write!(stdout, "You: ")?;
    stdout.flush()?;
    Ok(())
}

async fn run(cli: &Cli) -> Result<(), ChatError> {
    let (source, key) = api_key(|name| std::env::var(name).ok())?;
    let (url, model_name) = cli.endpoint(source);
    let config = cli.chat_config(model_name);

    let client = OpenRouterClient::new(key)?.with_url(url);
    let model = OpenRouterModel::from_config(client, &config);

    let store: Box<dyn ThreadStore> = match &cli.store_dir {
        Some(dir) => Box::new(FileStore::new(dir)?),
        None => Box::new(MemoryStore::new()),
    };

    let session =
        ChatSession::new(&model, store.as_ref(), config)?.with_event_handler(&LoggingHandler);

    println!("Therapy Chatbot ({})", session.policy());
    println!("Type 'quit' to exit\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        match classify(&line) {
            Input::Quit => break,
            Input::Blank => continue,
            Input::Message(text) => {
                let reply = session.send(text).await?;
                println!("Bot: {}\n", reply.content);
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
