//! Foresight Server
//!
//! The chat surface for the analyst crew: a small axum server pushing
//! chat messages out over SSE and taking human messages in over JSON
//! POST. The first message of a session starts the analysis; every later
//! message is routed to the analyst waiting on the mailbox. A CLI mode
//! runs one analysis in the terminal instead.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Json,
    },
    routing::{get, post},
    Router,
};
use clap::{Parser, Subcommand};
use foresight_core::analysts::{AnalystRole, LlmExecutor};
use foresight_core::bridge::{MailboxInputProvider, StdinInputProvider};
use foresight_core::config::AppConfig;
use foresight_core::pipeline::{
    run_analysis, PipelineEvent, PipelineEventKind, Runner,
};
use foresight_core::session::{Route, Session, SessionPhase};
use futures::{stream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::{
    net::TcpListener,
    sync::{broadcast, mpsc, RwLock},
};
use utoipa::{OpenApi, ToSchema};

/// Built-in chat page
const INDEX_HTML: &str = include_str!("index.html");

/// Shown once when the chat opens, like a receptionist
const GREETING: &str =
    "Enter your industry or topic to start the analysis and receive strategic insights.";

/// Messages kept for replay to late SSE subscribers
const HISTORY_CAP: usize = 500;

/// One message on the chat surface
#[derive(Debug, Clone, Serialize, ToSchema)]
struct ChatMessage {
    timestamp: String,
    sender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar: Option<String>,
    content: String,
}

impl ChatMessage {
    fn new(sender: &str, avatar: Option<String>, content: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            sender: sender.to_string(),
            avatar,
            content: content.into(),
        }
    }

    fn system(content: impl Into<String>) -> Self {
        Self::new("System", None, content)
    }

    fn user(content: impl Into<String>) -> Self {
        Self::new("You", None, content)
    }
}

/// Application state
struct AppState {
    session: Arc<Session>,
    config: AppConfig,
    chat_tx: broadcast::Sender<ChatMessage>,
    history: RwLock<Vec<ChatMessage>>,
}

type SharedState = Arc<AppState>;

/// Publish a message: remember it for late subscribers, push it to live ones.
async fn publish(state: &SharedState, message: ChatMessage) {
    {
        let mut history = state.history.write().await;
        if history.len() >= HISTORY_CAP {
            history.remove(0);
        }
        history.push(message.clone());
    }
    let _ = state.chat_tx.send(message);
}

// === API Types ===

#[derive(Deserialize, ToSchema)]
struct SendMessageRequest {
    content: String,
}

#[derive(Serialize, ToSchema)]
struct ApiResponse {
    success: bool,
    message: String,
}

#[derive(Serialize, ToSchema)]
struct StatusResponse {
    phase: String,
}

// === CLI ===

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Foresight - business analysis agent crew with a human in the loop"
)]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Start the chat server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
    /// Run one analysis in the terminal, no server
    Run {
        /// The industry or topic to analyze
        topic: String,
    },
}

// === OpenAPI Definition ===

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Foresight API",
        version = "1.0.0",
        description = "Chat API for the Foresight business-analysis crew"
    ),
    paths(send_message, chat_status),
    components(schemas(SendMessageRequest, ApiResponse, StatusResponse, ChatMessage)),
    tags(
        (name = "chat", description = "Chat surface for the analyst crew")
    )
)]
struct ApiDoc;

// === API Handlers ===

/// Send a human message into the session
#[utoipa::path(
    post,
    path = "/api/v1/chat/message",
    tag = "chat",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message routed", body = ApiResponse)
    )
)]
async fn send_message(
    State(state): State<SharedState>,
    Json(req): Json<SendMessageRequest>,
) -> Json<ApiResponse> {
    let content = req.content.trim().to_string();
    if content.is_empty() {
        return Json(ApiResponse {
            success: false,
            message: "Empty message".to_string(),
        });
    }

    publish(&state, ChatMessage::user(&content)).await;

    match state.session.route_message(&content).await {
        Route::StartRun(topic) => {
            tracing::info!(%topic, "starting analysis");
            spawn_run(state.clone(), topic);
            Json(ApiResponse {
                success: true,
                message: "Analysis started".to_string(),
            })
        }
        Route::HumanReply => Json(ApiResponse {
            success: true,
            message: "Reply passed to the waiting analyst".to_string(),
        }),
        Route::Finished => {
            publish(
                &state,
                ChatMessage::system(
                    "This session's analysis is complete. Restart the server to run another topic.",
                ),
            )
            .await;
            Json(ApiResponse {
                success: true,
                message: "Session finished".to_string(),
            })
        }
    }
}

/// Get the session phase
#[utoipa::path(
    get,
    path = "/api/v1/chat/status",
    tag = "chat",
    responses(
        (status = 200, description = "Current session phase", body = StatusResponse)
    )
)]
async fn chat_status(State(state): State<SharedState>) -> Json<StatusResponse> {
    let phase = match state.session.phase() {
        SessionPhase::Idle => "idle",
        SessionPhase::Running => "running",
        SessionPhase::Finished => "finished",
    };
    Json(StatusResponse {
        phase: phase.to_string(),
    })
}

/// SSE stream of chat messages with heartbeat
async fn chat_events(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let backlog: Vec<ChatMessage> = state.history.read().await.clone();
    let rx = state.chat_tx.subscribe();

    let backlog = stream::iter(
        backlog
            .into_iter()
            .map(|message| Ok::<Event, Infallible>(message_event(&message))),
    );

    let live = stream::unfold(rx, |mut rx| async move {
        loop {
            match tokio::time::timeout(Duration::from_secs(15), rx.recv()).await {
                Ok(Ok(message)) => return Some((Ok(message_event(&message)), rx)),
                Ok(Err(broadcast::error::RecvError::Lagged(_))) => continue,
                Ok(Err(broadcast::error::RecvError::Closed)) => return None,
                // Timeout - send heartbeat comment to keep the connection alive
                Err(_) => return Some((Ok(Event::default().comment("heartbeat")), rx)),
            }
        }
    });

    Sse::new(backlog.chain(live)).keep_alive(KeepAlive::default())
}

fn message_event(message: &ChatMessage) -> Event {
    Event::default().data(serde_json::to_string(message).unwrap_or_default())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn serve_openapi() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// === Pipeline wiring ===

/// Spawn a full analysis run in the background. The chat dispatch context
/// returns immediately; results stream back through the event bridge.
fn spawn_run(state: SharedState, topic: String) {
    let (event_tx, mut event_rx) = mpsc::channel::<PipelineEvent>(64);

    // Bridge pipeline events into chat messages
    let bridge_state = state.clone();
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if let Some(message) = chat_message_for(&event) {
                publish(&bridge_state, message).await;
            }
        }
    });

    let human = Arc::new(MailboxInputProvider::new(
        state.session.clone(),
        event_tx.clone(),
        state.config.runner.human_input_timeout,
    ));
    let executor = Arc::new(LlmExecutor::new(state.config.runner.clone(), human));
    let mut runner =
        Runner::new(state.config.runner.clone(), executor).with_event_channel(event_tx);

    let session = state.session.clone();
    tokio::spawn(async move {
        match run_analysis(&session, &mut runner, &topic).await {
            Ok(result) => tracing::info!(stages = result.stages.len(), "analysis complete"),
            Err(e) => tracing::error!(error = %e, "analysis failed"),
        }
    });
}

/// Map a pipeline event to the chat message it should appear as, if any.
fn chat_message_for(event: &PipelineEvent) -> Option<ChatMessage> {
    let text = event.text.clone()?;
    match event.kind {
        PipelineEventKind::PipelineStarted => Some(ChatMessage::system(text)),
        PipelineEventKind::StageStarted => Some(ChatMessage::new("Assistant", None, text)),
        PipelineEventKind::StageCompleted => {
            let (sender, avatar) = analyst_identity(&event.analyst);
            Some(ChatMessage::new(&sender, avatar, text))
        }
        PipelineEventKind::HumanInputRequired => Some(ChatMessage::new("Assistant", None, text)),
        // The human's own message is already on the surface
        PipelineEventKind::HumanInputReceived => None,
        PipelineEventKind::PipelineCompleted => Some(ChatMessage::new("Assistant", None, text)),
        PipelineEventKind::PipelineFailed => Some(ChatMessage::system(text)),
    }
}

/// Resolve an analyst slug to its chat identity.
fn analyst_identity(slug: &str) -> (String, Option<String>) {
    for role in AnalystRole::all() {
        if role.slug() == slug {
            return (
                role.display_name().to_string(),
                Some(role.avatar_url().to_string()),
            );
        }
    }
    ("Assistant".to_string(), None)
}

// === Server Entry ===

async fn serve(port: u16) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let (chat_tx, _) = broadcast::channel(256);
    let state: SharedState = Arc::new(AppState {
        session: Arc::new(Session::new()),
        config,
        chat_tx,
        history: RwLock::new(Vec::new()),
    });

    publish(&state, ChatMessage::system(GREETING)).await;

    let chat_routes = Router::new()
        .route("/message", post(send_message))
        .route("/events", get(chat_events))
        .route("/status", get(chat_status));

    let app = Router::new()
        .route("/", get(index))
        .nest("/api/v1/chat", chat_routes)
        .route("/api/v1/openapi.json", get(serve_openapi))
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("Foresight chat running at http://{}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run one analysis in the terminal: events print to stdout, review
/// questions read from stdin.
async fn run_cli(topic: String) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let (event_tx, mut event_rx) = mpsc::channel::<PipelineEvent>(64);

    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event.kind {
                PipelineEventKind::StageStarted => {
                    let (name, _) = analyst_identity(&event.analyst);
                    println!("\n--- {} is working ---", name);
                }
                PipelineEventKind::StageCompleted
                | PipelineEventKind::PipelineCompleted
                | PipelineEventKind::PipelineFailed => {
                    if let Some(text) = &event.text {
                        println!("\n{}", text);
                    }
                }
                // The stdin provider prints its own prompt
                _ => {}
            }
        }
    });

    let executor = Arc::new(LlmExecutor::new(
        config.runner.clone(),
        Arc::new(StdinInputProvider),
    ));
    let mut runner = Runner::new(config.runner.clone(), executor).with_event_channel(event_tx);

    let session = Session::new();
    let _ = session.route_message(&topic).await; // claim the gate
    let outcome = run_analysis(&session, &mut runner, &topic).await;

    drop(runner); // closes the event channel so the printer drains and exits
    let _ = printer.await;

    outcome.map(|_| ())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foresight=info,foresight_core=info".into()),
        )
        .init();

    match Args::parse().command {
        Some(CliCommand::Run { topic }) => run_cli(topic).await,
        Some(CliCommand::Serve { port }) => serve(port).await,
        None => serve(8080).await,
    }
}
