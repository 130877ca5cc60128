//! Servidor web Axum com WebSocket para extração de entidades capitalizadas em tempo real

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use capner_core::{corpus::demo_texts, ConfigError, EntityPipeline, PipelineConfig, PipelineEvent};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// Pausa entre eventos enviados pelo WebSocket (animação passo a passo na UI)
const EVENT_DELAY: Duration = Duration::from_millis(35);

/// Estado compartilhado da aplicação
struct AppState {
    pipeline: Arc<EntityPipeline>,
}

impl AppState {
    fn new(pipeline: EntityPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Pipeline padrão do servidor, ou um novo se a requisição trouxer configuração própria.
    fn pipeline_for(&self, config: Option<&PipelineConfig>) -> Result<Arc<EntityPipeline>, ConfigError> {
        match config {
            Some(config) => Ok(Arc::new(EntityPipeline::from_config(config)?)),
            None => Ok(Arc::clone(&self.pipeline)),
        }
    }
}

/// Corpo aceito por `/tokenize`, `/extract` e pelas mensagens do WebSocket
#[derive(Deserialize)]
struct TextRequest {
    text: String,
    #[serde(default)]
    config: Option<PipelineConfig>,
}

#[derive(Serialize)]
struct TokenizeResponse {
    tokens: Vec<String>,
}

#[derive(Serialize)]
struct ExtractResponse {
    entities: Vec<String>,
    total_tokens: usize,
    processing_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // CAPNER_CONFIG aceita o mesmo JSON do campo `config` das requisições
    let config = match std::env::var("CAPNER_CONFIG") {
        Ok(json) => PipelineConfig::from_json(&json)?,
        Err(_) => PipelineConfig::default(),
    };
    let pipeline = EntityPipeline::from_config(&config)?;
    let state = Arc::new(AppState::new(pipeline));

    let addr = std::env::var("CAPNER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(?config, "🚀 Servidor de entidades iniciado em http://{addr}");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/tokenize", post(tokenize_handler))
        .route("/extract", post(extract_handler))
        .route("/ws", get(ws_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .layer(cors)
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Tokens do texto, sem classificação
async fn tokenize_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TextRequest>,
) -> Response {
    let pipeline = match state.pipeline_for(req.config.as_ref()) {
        Ok(pipeline) => pipeline,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, err.to_string()),
    };
    let tokens = pipeline.tokens(&req.text).map(str::to_string).collect();
    Json(TokenizeResponse { tokens }).into_response()
}

/// Extração via HTTP POST (sem streaming)
async fn extract_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TextRequest>,
) -> Response {
    let start = Instant::now();
    if req.text.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Texto vazio");
    }
    let pipeline = match state.pipeline_for(req.config.as_ref()) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            warn!(%err, "configuração rejeitada");
            return error_response(StatusCode::BAD_REQUEST, err.to_string());
        }
    };

    let (entities, total_tokens) = pipeline.analyze_with_count(&req.text);
    info!(entities = entities.len(), total_tokens, "extração concluída");

    Json(ExtractResponse {
        entities,
        total_tokens,
        processing_ms: start.elapsed().as_millis() as u64,
    })
    .into_response()
}

/// Retorna textos de demonstração
async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(label, text)| {
            serde_json::json!({
                "label": label,
                "text": text
            })
        })
        .collect();
    Json(texts)
}

/// Interpreta uma mensagem do WebSocket.
///
/// Um objeto JSON precisa ser um `TextRequest` válido; qualquer outra coisa
/// (texto puro, número, lista) é analisada como texto.
fn parse_ws_request(raw: String) -> Result<TextRequest, serde_json::Error> {
    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(value @ serde_json::Value::Object(_)) => serde_json::from_value(value),
        _ => Ok(TextRequest { text: raw, config: None }),
    }
}

/// Envia `{"error": ...}` ao cliente; `false` se a conexão caiu.
async fn send_error(socket: &mut WebSocket, message: String) -> bool {
    let body = serde_json::json!({ "error": message }).to_string();
    socket.send(Message::Text(body)).await.is_ok()
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Lógica do WebSocket: recebe texto, executa o pipeline e envia os eventos
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(raw) => {
                let request = match parse_ws_request(raw) {
                    Ok(request) => request,
                    Err(err) => {
                        warn!(%err, "requisição inválida via WebSocket");
                        if !send_error(&mut socket, err.to_string()).await {
                            return;
                        }
                        continue;
                    }
                };

                let text = request.text.trim().to_string();
                if text.is_empty() {
                    continue;
                }

                let pipeline = match state.pipeline_for(request.config.as_ref()) {
                    Ok(pipeline) => pipeline,
                    Err(err) => {
                        warn!(%err, "configuração rejeitada via WebSocket");
                        if !send_error(&mut socket, err.to_string()).await {
                            return;
                        }
                        continue;
                    }
                };

                info!(chars = text.len(), "analisando via WebSocket");

                // O pipeline é síncrono: roda fora do runtime e coleta os eventos ao final
                let (tx, rx) = std::sync::mpsc::channel::<PipelineEvent>();
                let handle = tokio::task::spawn_blocking(move || {
                    pipeline.analyze_streaming(&text, tx);
                });
                if let Err(err) = handle.await {
                    warn!(%err, "análise interrompida");
                    continue;
                }

                let events: Vec<PipelineEvent> = rx.try_iter().collect();
                for event in &events {
                    let Ok(json) = serde_json::to_string(event) else {
                        continue;
                    };
                    if socket.send(Message::Text(json)).await.is_err() {
                        return; // cliente desconectou
                    }
                    tokio::time::sleep(EVENT_DELAY).await;
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}
