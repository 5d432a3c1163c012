use clap::Parser;
use pib_scraper::{ai::OpenAiClient, config::Settings, pipeline::Pipeline, telemetry};
use pib_server::{app, state::AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive HTTP front end for the PIB digest pipeline", long_about = None)]
struct Args {
    #[command(flatten)]
    settings: Settings,

    /// Address to listen on
    #[arg(long, env = "PIB_BIND", default_value = "127.0.0.1:3000")]
    bind: String,

    /// Browser origin allowed to call the API
    #[arg(long, env = "CLIENT_URL")]
    client_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();
    let args = Args::parse();

    // No credential, no server.
    let api_key = args.settings.require_api_key()?;
    let service = Arc::new(OpenAiClient::new(
        args.settings.api_url.clone(),
        api_key,
        args.settings.model.clone(),
    )?);
    let pipeline = Pipeline::new(&args.settings.pipeline_config(), service)?;

    let app = app(AppState::new(pipeline), args.client_url.as_deref());

    let listener = TcpListener::bind(&args.bind).await?;
    info!(address = %args.bind, model = %args.settings.model, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
