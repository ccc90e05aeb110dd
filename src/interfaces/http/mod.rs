use crate::domain::error::AppError;
use crate::domain::test_case::{GenerationMode, GenerationReport};
use crate::infrastructure::document;
use crate::infrastructure::export::{self, ExportFormat};
use crate::interfaces::state::AppState;
use actix_cors::Cors;
use actix_web::http::header::ContentDisposition;
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use validator::Validate;

const MAX_LOG_ENTRIES: usize = 100;
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub app_state: Arc<AppState>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

#[derive(Deserialize, Validate)]
pub struct GenerateRequest {
    #[validate(length(max = 5000))]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub mode: Option<GenerationMode>,
}

#[derive(Deserialize)]
pub struct ModeQuery {
    #[serde(default)]
    pub mode: Option<GenerationMode>,
}

#[derive(Serialize)]
pub struct ExtractResponse {
    pub count: usize,
    pub requirements: Vec<String>,
}

fn error_response(err: &AppError) -> HttpResponse {
    match err {
        AppError::ConfigError(_) | AppError::ValidationError(_) | AppError::ParseError(_) => {
            HttpResponse::BadRequest().body(err.to_string())
        }
        _ => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

/// Store the run in the session and surface every skipped requirement as a
/// warning in the log ring.
fn finish_run(data: &HttpState, report: GenerationReport) -> HttpResponse {
    for skipped in &report.skipped {
        add_log(
            &data.logs,
            "WARN",
            "Generator",
            &format!(
                "Skipped requirement {}: {}",
                skipped.position + 1,
                skipped.reason
            ),
        );
    }
    add_log(
        &data.logs,
        "INFO",
        "Generator",
        &format!(
            "Generated {} test cases ({} mode, {} skipped)",
            report.result_set.len(),
            report.result_set.mode.as_str(),
            report.skipped.len()
        ),
    );

    data.app_state.session.replace(report.result_set.clone());
    HttpResponse::Ok().json(report)
}

#[post("/requirements/extract")]
async fn extract_requirements(data: web::Data<HttpState>, body: web::Bytes) -> impl Responder {
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!("Extracting requirements ({} bytes)", body.len()),
    );

    match document::load_docx_bytes(&body) {
        Ok(paragraphs) => {
            let requirements = data.app_state.generate_use_case.extract(&paragraphs);
            HttpResponse::Ok().json(ExtractResponse {
                count: requirements.len(),
                requirements,
            })
        }
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "HttpApi",
                &format!("Extraction failed: {}", e),
            );
            error_response(&e)
        }
    }
}

#[post("/test-cases/generate")]
async fn generate_test_cases(
    data: web::Data<HttpState>,
    req: web::Json<GenerateRequest>,
) -> impl Responder {
    if let Err(e) = req.validate() {
        return error_response(&AppError::from(e));
    }

    let use_case = &data.app_state.generate_use_case;
    let mode = req.mode.unwrap_or_else(|| use_case.default_mode());
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!(
            "Generating test cases (mode={} requirements={})",
            mode.as_str(),
            req.requirements.len()
        ),
    );

    match use_case.execute(&req.requirements, mode).await {
        Ok(report) => finish_run(&data, report),
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "HttpApi",
                &format!("Generation failed: {}", e),
            );
            error_response(&e)
        }
    }
}

#[post("/documents/generate")]
async fn generate_from_document(
    data: web::Data<HttpState>,
    query: web::Query<ModeQuery>,
    body: web::Bytes,
) -> impl Responder {
    let use_case = &data.app_state.generate_use_case;
    let mode = query.mode.unwrap_or_else(|| use_case.default_mode());
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!(
            "Generating test cases from document (mode={} bytes={})",
            mode.as_str(),
            body.len()
        ),
    );

    let paragraphs = match document::load_docx_bytes(&body) {
        Ok(paragraphs) => paragraphs,
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "HttpApi",
                &format!("Document rejected: {}", e),
            );
            return error_response(&e);
        }
    };

    match use_case.execute_paragraphs(&paragraphs, mode).await {
        Ok(report) => finish_run(&data, report),
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "HttpApi",
                &format!("Generation failed: {}", e),
            );
            error_response(&e)
        }
    }
}

#[get("/results")]
async fn get_results(data: web::Data<HttpState>) -> impl Responder {
    match data.app_state.session.current() {
        Some(result_set) => HttpResponse::Ok().json(result_set),
        None => HttpResponse::NotFound().body("No test cases yet. Run the generator first."),
    }
}

fn export_response(data: &HttpState, format: ExportFormat) -> HttpResponse {
    let Some(result_set) = data.app_state.session.current() else {
        return HttpResponse::NotFound().body("No test cases yet. Run the generator first.");
    };

    let encoded = match format {
        ExportFormat::Csv => export::write_csv(&result_set),
        ExportFormat::Json => export::write_json(&result_set),
    };

    match encoded {
        Ok(body) => HttpResponse::Ok()
            .content_type(format.content_type())
            .insert_header(ContentDisposition::attachment(format.file_name()))
            .body(body),
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "HttpApi",
                &format!("Export failed: {}", e),
            );
            error_response(&e)
        }
    }
}

#[get("/results/export.csv")]
async fn export_csv(data: web::Data<HttpState>) -> impl Responder {
    export_response(&data, ExportFormat::Csv)
}

#[get("/results/export.json")]
async fn export_json(data: web::Data<HttpState>) -> impl Responder {
    export_response(&data, ExportFormat::Json)
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = data.logs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    HttpResponse::Ok().json(&*logs)
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    match level {
        "ERROR" => tracing::error!(source, "{}", message),
        "WARN" => tracing::warn!(source, "{}", message),
        _ => tracing::info!(source, "{}", message),
    }

    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = logs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    logs.push(entry.clone());
    if logs.len() > MAX_LOG_ENTRIES {
        logs.remove(0);
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
            .service(extract_requirements)
            .service(generate_test_cases)
            .service(generate_from_document)
            .service(get_results)
            .service(export_csv)
            .service(export_json)
            .service(get_logs),
    );
}

pub fn start_server(
    app_state: Arc<AppState>,
    logs: Arc<Mutex<Vec<LogEntry>>>,
    host: &str,
    port: u16,
) -> std::io::Result<Server> {
    let state = web::Data::new(HttpState { app_state, logs });

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Allow all origins for local tool

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(api_routes)
    })
    .bind((host, port))?
    .run();

    Ok(server)
}
