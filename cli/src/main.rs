mod client;
mod history;
mod netinfo;
mod slides;
mod watch;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use display::engine::DisplayConfig;
use display::transient::PlacementPolicy;
use protocol::{
    ClientEvent, CommentSubmission, FixedCommentFields, FontFamily, FontSize, IndicatorPayload, ModerationList,
    ObjectRef, ServerEvent, ShapeFields, ShapeKind,
};
use reqwest::StatusCode;
use serde_json::Value;

use crate::slides::{NotesFileDeck, SlideDeck, SlideError, UnavailableDeck};

/// Fixed-comment id the current slide notes are posted under.
const SLIDE_NOTES_ID: &str = "slide-notes";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("hub answered HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("event codec failed: {0}")]
    Codec(#[from] protocol::CodecError),
    #[error("timed out waiting for the hub")]
    Timeout,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no words given; pass words or --file")]
    NoWords,
    #[error(transparent)]
    Slides(#[from] SlideError),
}

#[derive(Parser, Debug)]
#[command(name = "livewall-cli", about = "Presenter console and headless display for a livewall hub")]
struct Cli {
    #[arg(long, env = "LIVEWALL_URL", default_value = "http://127.0.0.1:3000")]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the hub answers its health endpoint.
    Ping,
    /// Submit a comment.
    Send(SendArgs),
    /// Replace the moderation list.
    Moderate(ModerateArgs),
    /// Fixed comments.
    Fixed(FixedCommand),
    /// Shapes.
    Shape(ShapeCommand),
    /// Screen-sharing indicator.
    Indicator(IndicatorCommand),
    /// Run a headless display and print scene changes.
    Watch(WatchArgs),
    /// Print every broadcast comment as it arrives.
    History,
    /// Print the URL audience devices should open.
    Url {
        /// Port to advertise; defaults to the port of `--url`.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Move the hub's listener to another port.
    Port { port: u16 },
    /// Speaker notes and slide navigation.
    Slides(SlidesCommand),
}

#[derive(Args, Debug)]
struct SendArgs {
    text: String,
    #[arg(long)]
    color: Option<String>,
    #[arg(long, value_parser = parse_font)]
    font: Option<FontFamily>,
    #[arg(long, value_parser = parse_size)]
    size: Option<FontSize>,
    /// Pin the comment instead of scrolling it.
    #[arg(long)]
    fixed: bool,
    /// Vertical position of a pinned comment, in percent.
    #[arg(long)]
    position: Option<f64>,
    /// Id of a pinned comment; generated when omitted so every display keys
    /// it the same way.
    #[arg(long)]
    id: Option<String>,
}

#[derive(Args, Debug)]
struct ModerateArgs {
    words: Vec<String>,
    /// Read words from a file, one per line.
    #[arg(long, conflicts_with = "words")]
    file: Option<PathBuf>,
    /// Send an empty list, allowing everything.
    #[arg(long, conflicts_with_all = ["words", "file"])]
    clear: bool,
}

#[derive(Args, Debug)]
struct FixedCommand {
    #[command(subcommand)]
    command: FixedSubcommand,
}

#[derive(Subcommand, Debug)]
enum FixedSubcommand {
    Create {
        /// Object id; generated when omitted.
        #[arg(long)]
        id: Option<String>,
        #[command(flatten)]
        fields: FixedArgs,
    },
    Update {
        #[arg(long)]
        id: String,
        #[command(flatten)]
        fields: FixedArgs,
    },
    Delete { id: String },
    Clear,
}

#[derive(Args, Debug)]
struct FixedArgs {
    #[arg(long)]
    text: Option<String>,
    #[arg(long)]
    color: Option<String>,
    #[arg(long, value_parser = parse_font)]
    font: Option<FontFamily>,
    #[arg(long, value_parser = parse_size)]
    size: Option<FontSize>,
    #[arg(long)]
    x: Option<f64>,
    #[arg(long)]
    y: Option<f64>,
}

#[derive(Args, Debug)]
struct ShapeCommand {
    #[command(subcommand)]
    command: ShapeSubcommand,
}

#[derive(Subcommand, Debug)]
enum ShapeSubcommand {
    Create {
        /// Object id; generated when omitted.
        #[arg(long)]
        id: Option<String>,
        #[command(flatten)]
        fields: ShapeArgs,
    },
    Update {
        #[arg(long)]
        id: String,
        #[command(flatten)]
        fields: ShapeArgs,
    },
    Delete { id: String },
    Clear,
}

#[derive(Args, Debug)]
struct ShapeArgs {
    #[arg(long = "type", value_parser = parse_shape)]
    kind: Option<ShapeKind>,
    #[arg(long)]
    x: Option<f64>,
    #[arg(long)]
    y: Option<f64>,
    #[arg(long)]
    width: Option<f64>,
    #[arg(long)]
    height: Option<f64>,
    #[arg(long)]
    color: Option<String>,
}

#[derive(Args, Debug)]
struct IndicatorCommand {
    #[command(subcommand)]
    command: IndicatorSubcommand,
}

#[derive(Subcommand, Debug)]
enum IndicatorSubcommand {
    Show {
        /// Opaque JSON handed to displays.
        #[arg(long)]
        payload: Option<String>,
    },
    Hide,
}

#[derive(Args, Debug)]
struct WatchArgs {
    #[arg(long, default_value_t = 1920.0)]
    width: f64,
    #[arg(long, default_value_t = 1080.0)]
    height: f64,
    #[arg(long, value_parser = parse_policy, default_value = "lanes")]
    policy: PlacementPolicy,
    #[arg(long, default_value_t = 250)]
    tick_ms: u64,
    /// Print the full scene as JSON on every change.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct SlidesCommand {
    /// Speaker notes file, slides separated by `---` lines.
    #[arg(long, env = "LIVEWALL_NOTES")]
    notes: Option<PathBuf>,

    #[command(subcommand)]
    command: SlidesSubcommand,
}

#[derive(Subcommand, Debug)]
enum SlidesSubcommand {
    Notes,
    Next,
    Prev,
    /// Pin the current notes on every display.
    Post {
        #[arg(long)]
        x: Option<f64>,
        #[arg(long)]
        y: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let url = cli.url;

    match cli.command {
        Command::Ping => run_ping(&url).await,
        Command::Send(args) => client::send_once(&url, &ClientEvent::SubmitComment(submission(args))).await,
        Command::Moderate(args) => run_moderate(&url, args).await,
        Command::Fixed(fixed) => client::send_once(&url, &fixed_event(fixed.command)).await,
        Command::Shape(shape) => client::send_once(&url, &shape_event(shape.command)).await,
        Command::Indicator(indicator) => client::send_once(&url, &indicator_event(indicator.command)?).await,
        Command::Watch(args) => run_watch(&url, args).await,
        Command::History => run_history(&url).await,
        Command::Url { port } => run_url(&url, port),
        Command::Port { port } => run_port(&url, port).await,
        Command::Slides(slides) => run_slides(&url, slides).await,
    }
}

// =============================================================================
// HTTP
// =============================================================================

async fn run_ping(url: &str) -> Result<(), CliError> {
    let client = reqwest::Client::new();
    let response = client.get(format!("{}/healthz", url.trim_end_matches('/'))).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Status { status: status.as_u16(), message: "health check failed".to_owned() });
    }
    println!("ok");
    Ok(())
}

async fn run_port(url: &str, port: u16) -> Result<(), CliError> {
    let client = reqwest::Client::new();
    let response = client
        .put(format!("{}/api/port", url.trim_end_matches('/')))
        .json(&serde_json::json!({ "port": port }))
        .send()
        .await?;
    let status = response.status();
    if status != StatusCode::NO_CONTENT {
        let message = response.text().await.unwrap_or_default();
        return Err(CliError::Status { status: status.as_u16(), message });
    }
    println!("{}", client::with_port(url, port)?);
    Ok(())
}

fn run_url(url: &str, port: Option<u16>) -> Result<(), CliError> {
    let port = match port {
        Some(port) => port,
        None => reqwest::Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.port_or_known_default())
            .ok_or_else(|| CliError::InvalidBaseUrl(url.to_owned()))?,
    };
    println!("{}", netinfo::audience_url(netinfo::lan_ipv4(), port));
    Ok(())
}

// =============================================================================
// EVENTS
// =============================================================================

fn submission(args: SendArgs) -> CommentSubmission {
    CommentSubmission {
        id: if args.fixed { Some(args.id.unwrap_or_else(new_id)) } else { args.id },
        text: Some(args.text),
        color: args.color,
        font_family: args.font,
        size: args.size,
        is_fixed: args.fixed,
        position: args.position,
        x: None,
        y: None,
    }
}

async fn run_moderate(url: &str, args: ModerateArgs) -> Result<(), CliError> {
    let words = match &args.file {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| CliError::Read { path: path.clone(), source })?;
            parse_word_list(&text)
        }
        None => args.words,
    };
    if words.is_empty() && !args.clear {
        return Err(CliError::NoWords);
    }
    let count = words.len();
    client::send_once(url, &ClientEvent::ReplaceModerationList(ModerationList { words })).await?;
    println!("moderation list replaced ({count} words)");
    Ok(())
}

/// One word per line; blank lines and `#` comments are skipped.
fn parse_word_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToOwned::to_owned)
        .collect()
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn fixed_fields(id: String, args: FixedArgs) -> FixedCommentFields {
    FixedCommentFields {
        id,
        text: args.text,
        color: args.color,
        font_family: args.font,
        size: args.size,
        x: args.x,
        y: args.y,
    }
}

fn fixed_event(command: FixedSubcommand) -> ClientEvent {
    match command {
        FixedSubcommand::Create { id, fields } => ClientEvent::CreateFixed(fixed_fields(id.unwrap_or_else(new_id), fields)),
        FixedSubcommand::Update { id, fields } => ClientEvent::UpdateFixed(fixed_fields(id, fields)),
        FixedSubcommand::Delete { id } => ClientEvent::DeleteFixed(ObjectRef { id }),
        FixedSubcommand::Clear => ClientEvent::ClearFixed,
    }
}

fn shape_fields(id: String, args: ShapeArgs) -> ShapeFields {
    ShapeFields {
        id,
        kind: args.kind,
        x: args.x,
        y: args.y,
        width: args.width,
        height: args.height,
        color: args.color,
    }
}

fn shape_event(command: ShapeSubcommand) -> ClientEvent {
    match command {
        ShapeSubcommand::Create { id, fields } => ClientEvent::CreateShape(shape_fields(id.unwrap_or_else(new_id), fields)),
        ShapeSubcommand::Update { id, fields } => ClientEvent::UpdateShape(shape_fields(id, fields)),
        ShapeSubcommand::Delete { id } => ClientEvent::DeleteShape(ObjectRef { id }),
        ShapeSubcommand::Clear => ClientEvent::ClearShapes,
    }
}

fn indicator_event(command: IndicatorSubcommand) -> Result<ClientEvent, CliError> {
    match command {
        IndicatorSubcommand::Show { payload } => {
            let payload = match payload {
                Some(raw) => serde_json::from_str::<Value>(&raw)?,
                None => Value::Object(serde_json::Map::new()),
            };
            Ok(ClientEvent::ShowIndicator(IndicatorPayload { payload }))
        }
        IndicatorSubcommand::Hide => Ok(ClientEvent::HideIndicator),
    }
}

// =============================================================================
// STREAMS
// =============================================================================

async fn run_watch(url: &str, args: WatchArgs) -> Result<(), CliError> {
    let config = DisplayConfig { width: args.width, height: args.height, policy: args.policy, ..DisplayConfig::default() };
    watch::run(url, config, Duration::from_millis(args.tick_ms.max(1)), args.json).await
}

async fn run_history(url: &str) -> Result<(), CliError> {
    let (mut stream, _) = client::connect(url).await?;
    loop {
        match client::recv_event(&mut stream).await? {
            ServerEvent::NewComment(comment) => {
                if let Some(line) = history::format_entry(&comment, history::now()) {
                    println!("{line}");
                }
            }
            ServerEvent::ServerClosing(notice) => {
                println!("hub moving to port {}", notice.port);
                return Ok(());
            }
            _ => {}
        }
    }
}

// =============================================================================
// SLIDES
// =============================================================================

async fn run_slides(url: &str, slides: SlidesCommand) -> Result<(), CliError> {
    let mut deck: Box<dyn SlideDeck> = match &slides.notes {
        Some(path) => Box::new(NotesFileDeck::open(path)?),
        None => Box::new(UnavailableDeck),
    };

    match slides.command {
        SlidesSubcommand::Notes => print_notes(deck.as_ref()),
        SlidesSubcommand::Next => {
            deck.go_next()?;
            print_notes(deck.as_ref())
        }
        SlidesSubcommand::Prev => {
            deck.go_previous()?;
            print_notes(deck.as_ref())
        }
        SlidesSubcommand::Post { x, y } => {
            let (index, notes) = deck.current_notes().ok_or(SlideError::Unavailable)?;
            let fields = FixedCommentFields {
                id: SLIDE_NOTES_ID.to_owned(),
                text: Some(notes),
                x,
                y,
                ..FixedCommentFields::default()
            };
            client::send_once(url, &ClientEvent::CreateFixed(fields)).await?;
            println!("posted notes for slide {}", index + 1);
            Ok(())
        }
    }
}

fn print_notes(deck: &dyn SlideDeck) -> Result<(), CliError> {
    let (index, notes) = deck.current_notes().ok_or(SlideError::Unavailable)?;
    println!("slide {}\n{notes}", index + 1);
    Ok(())
}

// =============================================================================
// ARGUMENT PARSERS
// =============================================================================

fn parse_font(value: &str) -> Result<FontFamily, String> {
    match value {
        "sans" => Ok(FontFamily::Sans),
        "serif" => Ok(FontFamily::Serif),
        other => Err(format!("unknown font `{other}` (sans, serif)")),
    }
}

fn parse_size(value: &str) -> Result<FontSize, String> {
    match value {
        "normal" => Ok(FontSize::Normal),
        "large" => Ok(FontSize::Large),
        other => Err(format!("unknown size `{other}` (normal, large)")),
    }
}

fn parse_shape(value: &str) -> Result<ShapeKind, String> {
    match value {
        "circle" => Ok(ShapeKind::Circle),
        "square" => Ok(ShapeKind::Square),
        "line" => Ok(ShapeKind::Line),
        other => Err(format!("unknown shape `{other}` (circle, square, line)")),
    }
}

fn parse_policy(value: &str) -> Result<PlacementPolicy, String> {
    match value {
        "lanes" => Ok(PlacementPolicy::Lanes),
        "floating" => Ok(PlacementPolicy::Floating),
        other => Err(format!("unknown policy `{other}` (lanes, floating)")),
    }
}
