use anyhow::Result;
use clap::Parser;
use mixcritic::feedback::{OpenAiFeedback, ServiceConfig};
use mixcritic::{CritiquePipeline, FeatureConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "mixcritic")]
#[command(about = "Audio critique backend: acoustic fingerprint + AI feedback", long_about = None)]
struct Args {
    /// Address to bind the HTTP server on
    #[arg(short = 'b', long, default_value = "127.0.0.1:8000")]
    bind: String,

    /// Base URL of the OpenAI-compatible feedback service
    #[arg(long, default_value = "https://api.openai.com/v1")]
    service_url: String,

    /// Model requested from the feedback service
    #[arg(long, default_value = "gpt-3.5-turbo")]
    model: String,

    /// Feedback request timeout in seconds
    #[arg(long, default_value = "60")]
    service_timeout: u64,

    /// Analyze a local audio file and print its summary instead of serving
    #[arg(long)]
    analyze: Option<PathBuf>,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Local analysis mode: extraction only, no feedback service involved
    if let Some(ref path) = args.analyze {
        log::info!("Analyzing: {:?}", path);
        let (vector, analysis) =
            mixcritic::pipeline::analyze_file(path, &FeatureConfig::default())?;
        log::debug!("Feature vector: {:?}", vector);
        println!("{}", analysis);
        return Ok(());
    }

    // Credentials stay out of the core: read once here, pass down explicitly
    let api_key = std::env::var("OPENAI_API_KEY").ok();
    if api_key.is_none() {
        log::warn!("OPENAI_API_KEY is not set; feedback requests will be unauthenticated");
    }

    let service = OpenAiFeedback::new(ServiceConfig {
        base_url: args.service_url.clone(),
        model: args.model.clone(),
        api_key,
        timeout: Duration::from_secs(args.service_timeout),
    });

    let pipeline = Arc::new(CritiquePipeline::new(FeatureConfig::default(), service));
    let app = mixcritic::server::router(pipeline);

    log::info!(
        "Feedback service: {} (model {})",
        args.service_url,
        args.model
    );

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    log::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
