use anyhow::Result;
use log::{error, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use tauri::{AppHandle, Builder, Emitter, State};

mod ai_client;
mod analysis;
mod export;
mod prompts;
mod schema;
pub mod timer;
mod writer;

pub use ai_client::{AiClient, AiModel};
pub use analysis::{AnalysisError, AnalysisService, CompletionBackend};
pub use export::{build_document, parse_document, ExportDocument, EXPORT_FILENAME};
pub use schema::{AnalysisRequest, AnalysisResult, ImprovementTips};
pub use timer::{FocusTimer, TickOutcome, TimerState};
pub use writer::{WriterPhase, WriterSession, WriterSnapshot};

pub fn run() -> Result<()> {
    info!("WriteWise starting with embedded environment configuration...");

    log_environment_status();

    Builder::default()
        .plugin(tauri_plugin_opener::init())
        .invoke_handler(tauri::generate_handler![
            // Analysis flow
            analyze_text,
            generate_improvement_tips,
            get_writer_state,
            // Export
            export_analysis,
            save_analysis_to,
            // Model selection
            get_available_models,
            set_ai_model,
            // Focus timer
            timer::set_timer_duration,
            timer::start_focus_timer,
            timer::pause_focus_timer,
            timer::reset_focus_timer,
            timer::get_focus_timer_state
        ])
        .manage(AppState::new())
        .setup(|_app| {
            info!("WriteWise application starting up...");

            match get_env_var("WRITEWISE_API_KEY").or_else(|| get_env_var("OPENAI_API_KEY")) {
                Some(_) => info!("✅ Analysis API key loaded successfully"),
                None => warn!("❌ No API key set in environment - analysis will not work"),
            }

            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("Error while running tauri application");

    Ok(())
}

// Global application state
struct AppState {
    ai_client: Arc<Mutex<Option<AiClient>>>,
    model: Arc<Mutex<AiModel>>,
    writer: Arc<Mutex<WriterSession>>,
}

impl AppState {
    fn new() -> Self {
        let model = get_env_var("WRITEWISE_MODEL")
            .and_then(|name| AiModel::from_str(&name))
            .unwrap_or_default();
        Self {
            ai_client: Arc::new(Mutex::new(None)),
            model: Arc::new(Mutex::new(model)),
            writer: Arc::new(Mutex::new(WriterSession::new())),
        }
    }

    fn ensure_ai_client(&self) -> Result<(), String> {
        let mut client_guard = self.ai_client.lock();
        if client_guard.is_none() {
            let api_key = get_env_var("WRITEWISE_API_KEY")
                .or_else(|| get_env_var("OPENAI_API_KEY"))
                .ok_or_else(|| "WRITEWISE_API_KEY environment variable not set".to_string())?;
            let client = match get_env_var("WRITEWISE_API_BASE_URL") {
                Some(base_url) => AiClient::with_base_url(api_key, base_url),
                None => AiClient::new(api_key),
            };
            *client_guard = Some(client);
        }
        Ok(())
    }

    fn service(&self) -> Result<AnalysisService<AiClient>, String> {
        self.ensure_ai_client()?;
        let client = {
            let client_guard = self.ai_client.lock();
            client_guard.as_ref().cloned()
        }
        .ok_or_else(|| "AI client not initialized".to_string())?;
        let model = self.model.lock().clone();
        Ok(AnalysisService::new(client, model))
    }
}

/// The remote analysis call: one submitted text in, the five-field result
/// out. The writer store hands out a request id up front and only the
/// latest id is allowed to land, so a slow earlier response cannot
/// overwrite a fresher one.
#[tauri::command]
async fn analyze_text(
    payload: AnalysisRequest,
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<AnalysisResult, String> {
    let request_id = {
        let mut writer = state.writer.lock();
        writer
            .begin_submit(&payload.text)
            .map_err(|e| e.to_string())?
    };

    let service = match state.service() {
        Ok(service) => service,
        Err(e) => {
            // The submit already moved the store to Loading; settle it.
            error!("Analysis service unavailable: {}", e);
            state.writer.lock().fail(request_id);
            let _ = app.emit("analysis-error", AnalysisError::AnalysisFailed.to_string());
            return Err(AnalysisError::AnalysisFailed.to_string());
        }
    };

    let outcome = service.analyze(&payload.text).await;
    let settled = settle_analysis(&state.writer, request_id, outcome);
    match &settled {
        Ok(result) => {
            let _ = app.emit("analysis-complete", result);
        }
        Err(notice) if notice.as_str() == SUPERSEDED_NOTICE => {}
        Err(notice) => {
            let _ = app.emit("analysis-error", notice.clone());
        }
    }
    settled
}

const SUPERSEDED_NOTICE: &str = "Analysis superseded by a newer request";

/// Settle a finished analysis against the writer store. A response whose
/// request id is no longer the latest is discarded by the store, and the
/// superseded invoke gets an error instead of a result it must not render.
fn settle_analysis(
    writer: &Mutex<WriterSession>,
    request_id: u64,
    outcome: std::result::Result<AnalysisResult, AnalysisError>,
) -> std::result::Result<AnalysisResult, String> {
    match outcome {
        Ok(result) => {
            if writer.lock().complete(request_id, result.clone()) {
                Ok(result)
            } else {
                Err(SUPERSEDED_NOTICE.to_string())
            }
        }
        Err(e) => {
            if writer.lock().fail(request_id) {
                Err(e.to_string())
            } else {
                Err(SUPERSEDED_NOTICE.to_string())
            }
        }
    }
}

/// Regenerate the improvement tips from the latest completed analysis via
/// the tips-only template.
#[tauri::command]
async fn generate_improvement_tips(
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<ImprovementTips, String> {
    // The request id pins the analysis the tips are computed against; if a
    // newer submit lands while the call is in flight, these tips are stale.
    let (request_id, text, analysis) = {
        let writer = state.writer.lock();
        let snapshot = writer.snapshot();
        match snapshot.analysis {
            Some(analysis) => (snapshot.request_id, snapshot.text, analysis),
            None => return Err("No completed analysis to generate tips for".to_string()),
        }
    };

    let service = state.service()?;
    let tips = service
        .improvement_tips(&text, &analysis)
        .await
        .map_err(|e| e.to_string())?;

    if state
        .writer
        .lock()
        .replace_tips(request_id, tips.improvement_tips.clone())
    {
        let _ = app.emit("tips-updated", &tips);
        Ok(tips)
    } else {
        Err(SUPERSEDED_NOTICE.to_string())
    }
}

#[tauri::command]
fn get_writer_state(state: State<'_, AppState>) -> Result<WriterSnapshot, String> {
    Ok(state.writer.lock().snapshot())
}

/// Render the downloadable `writing_analysis.txt` document. Only available
/// once an analysis has succeeded.
#[tauri::command]
fn export_analysis(state: State<'_, AppState>) -> Result<ExportDocument, String> {
    state
        .writer
        .lock()
        .export()
        .ok_or_else(|| "No completed analysis to export".to_string())
}

#[tauri::command]
fn save_analysis_to(path: String, state: State<'_, AppState>) -> Result<String, String> {
    let doc = export_analysis(state)?;
    std::fs::write(&path, doc.content.as_bytes())
        .map_err(|e| format!("Failed to write {}: {}", path, e))?;
    info!("💾 Analysis exported to {}", path);
    Ok(path)
}

#[tauri::command]
fn get_available_models() -> Vec<String> {
    vec![
        "gpt-4-turbo".to_string(),
        "gpt-4".to_string(),
        "gpt-3.5-turbo".to_string(),
    ]
}

#[tauri::command]
fn set_ai_model(model: String, state: State<'_, AppState>) -> Result<String, String> {
    let parsed = AiModel::from_string(&model).map_err(|e| format!("Invalid model: {}", e))?;
    info!("Model switched to {}", parsed.as_str());
    *state.model.lock() = parsed;
    Ok(model)
}

fn get_env_var(key: &str) -> Option<String> {
    // Load .env file if it exists for development
    let _ = dotenvy::dotenv();

    // Try runtime environment variable first
    if let Ok(value) = std::env::var(key) {
        if !value.is_empty() {
            return Some(value);
        }
    }

    // Try compile-time embedded variables as fallback (only if they were set
    // during build). option_env!() avoids compile-time errors when absent.
    let embedded_value = match key {
        "WRITEWISE_API_KEY" => option_env!("WRITEWISE_API_KEY"),
        "OPENAI_API_KEY" => option_env!("OPENAI_API_KEY"),
        "WRITEWISE_API_BASE_URL" => option_env!("WRITEWISE_API_BASE_URL"),
        "WRITEWISE_MODEL" => option_env!("WRITEWISE_MODEL"),
        _ => None,
    };

    embedded_value
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
}

fn log_environment_status() {
    info!("🔧 Environment Configuration Status (using embedded + runtime fallback):");

    for key in ["WRITEWISE_API_KEY", "OPENAI_API_KEY"] {
        match get_env_var(key) {
            Some(value) => {
                let preview = if value.len() > 8 {
                    format!("{}...{}", &value[..4], &value[value.len() - 4..])
                } else {
                    "***".to_string()
                };
                info!("✅ {}: {} (length: {})", key, preview, value.len());
            }
            None => warn!("❌ {}: Not available (neither runtime nor embedded)", key),
        }
    }

    match get_env_var("WRITEWISE_MODEL") {
        Some(model) => info!("✅ WRITEWISE_MODEL: {}", model),
        None => info!("ℹ️ WRITEWISE_MODEL not set, using default"),
    }
}
