use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use procurement_marketplace::config::{AppConfig, AppEnvironment};
use procurement_marketplace::error::AppError;
use procurement_marketplace::telemetry;
use procurement_marketplace::workflows::briefs::{
    brief_router, dates, AssessmentStatus, BriefService, EligibilityPolicy, Framework,
    FrameworkStatus, Lot, LotSlug, MemoryStore, RequirementsLength, Supplier, SupplierCode,
    SupplierDomain,
};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Procurement Marketplace",
    about = "Run the procurement marketplace service or inspect opportunity deadlines",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Opportunity brief utilities
    Brief {
        #[command(subcommand)]
        command: BriefCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum BriefCommand {
    /// Show the application window derived from a publication date
    Dates(BriefDatesArgs),
}

#[derive(Args, Debug)]
struct BriefDatesArgs {
    /// Publication date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    published_at: NaiveDate,
    /// Application window length ("1 week" or "2 weeks")
    #[arg(long, default_value = "2 weeks")]
    requirements_length: String,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Brief {
            command: BriefCommand::Dates(args),
        } => {
            run_brief_dates(args);
            Ok(())
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let store = Arc::new(MemoryStore::new());
    store.register_framework(standard_framework());
    if config.environment != AppEnvironment::Production {
        seed_demo_sellers(&store);
    }

    let policy = EligibilityPolicy::new(config.marketplace.generic_email_domains.clone());
    let service = Arc::new(BriefService::new(store, policy));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(brief_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "procurement marketplace ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// The framework every brief in this deployment publishes against.
fn standard_framework() -> Framework {
    let lot = |slug: LotSlug, name: &str| Lot {
        slug,
        name: name.to_string(),
        allows_brief: true,
    };
    Framework {
        slug: "digital-marketplace".to_string(),
        name: "Digital Marketplace".to_string(),
        status: FrameworkStatus::Live,
        lots: vec![
            lot(LotSlug::Specialist, "Specialist"),
            lot(LotSlug::Rfx, "Request for anything"),
            lot(LotSlug::Atm, "Ask the market"),
            lot(LotSlug::Training, "Training"),
        ],
    }
}

/// Registered sellers for local demos. Production deployments source sellers
/// from the registration pipeline instead.
fn seed_demo_sellers(store: &MemoryStore) {
    store.register_supplier(Supplier {
        code: SupplierCode(1001),
        name: "Quokka Digital".to_string(),
        contact_email: "bids@quokka.example".to_string(),
        on_current_framework: true,
        domains: vec![SupplierDomain {
            category: "Software engineering and development".to_string(),
            status: AssessmentStatus::Assessed,
        }],
    });
    store.register_supplier(Supplier {
        code: SupplierCode(1002),
        name: "Bilby Research".to_string(),
        contact_email: "hello@bilby.example".to_string(),
        on_current_framework: true,
        domains: vec![SupplierDomain {
            category: "User research and design".to_string(),
            status: AssessmentStatus::Unassessed,
        }],
    });
    info!("seeded demo sellers for non-production environment");
}

fn run_brief_dates(args: BriefDatesArgs) {
    let BriefDatesArgs {
        published_at,
        requirements_length,
    } = args;

    let length = RequirementsLength::parse(Some(requirements_length.as_str()));
    let published: DateTime<Utc> = published_at
        .and_hms_opt(9, 0, 0)
        .expect("09:00:00 is a valid wall-clock time")
        .and_utc();

    match dates::window(Some(published), length) {
        Some(window) => {
            println!("Opportunity window ({} length)", length.label());
            println!("Published:             {}", window.published_at);
            println!("Questions close:       {}", window.questions_closing_at);
            println!("Answers published by:  {}", window.answers_published_by);
            println!("Applications close:    {}", window.closing_at);
        }
        None => println!("No publication date supplied; the opportunity is still a draft"),
    }
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
