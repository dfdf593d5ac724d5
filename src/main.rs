use mimalloc::MiMalloc;
use quote_digest::api::{gmail_api::GmailClient, inference_api::HfInferenceClient};
use quote_digest::config::Config;
use quote_digest::http::{build_http_client, build_oauth_http_client};
use quote_digest::scrape::HttpQuoteSource;
use quote_digest::service::credential_manager::CredentialManager;
use quote_digest::service::enricher::Enricher;
use quote_digest::service::token_cache::TokenCache;
use quote_digest::{GoogleAuthFlow, Pipeline, ReportSettings};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        url = %cfg.scrape.url,
        csv_path = %cfg.report.csv_path.display(),
        token_cache = %cfg.gmail.token_cache_path.display(),
        proxy = %cfg.basic.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        loglevel = %cfg.basic.loglevel,
        recipient = %cfg.gmail.recipient
    );

    let http = build_http_client(&cfg.basic)?;
    let source = HttpQuoteSource::new(http.clone(), &cfg.scrape)?;
    let enricher = Enricher::new(HfInferenceClient::new(http.clone(), &cfg.inference));
    let credentials = CredentialManager::new(
        TokenCache::new(&cfg.gmail.token_cache_path),
        GoogleAuthFlow::new(build_oauth_http_client(&cfg.basic)?, &cfg.gmail),
    );
    let transport = GmailClient::new(http, &cfg.gmail)?;

    let pipeline = Pipeline::new(
        source,
        enricher,
        credentials,
        transport,
        ReportSettings::from(&cfg),
    );
    let summary = pipeline.run().await?;
    info!(
        rows = summary.rows,
        csv_path = %summary.csv_path.display(),
        message_id = %summary.message_id,
        "run complete"
    );

    println!("✅ Email with Hugging Face AI-enhanced quotes sent successfully!");
    Ok(())
}
