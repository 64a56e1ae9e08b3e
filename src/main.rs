use ai_interviewer::security::RateLimiter;
use ai_interviewer::{create_router, metrics, telemetry};
use ai_interviewer::{AppState, InterviewerAgent, OpenAiClient, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = ServerConfig::from_env()?;

    telemetry::init_tracing("ai-interviewer", config.otlp_endpoint.as_deref())?;
    metrics::init();

    let client = OpenAiClient::new(&config.base_url, &config.api_key);
    let agent = InterviewerAgent::new(client, config.agent.clone());
    let limiter = RateLimiter::new(config.rate_limit_burst, config.rate_limit_per_sec);
    tracing::info!(
        burst = limiter.capacity(),
        per_sec = limiter.refill_rate(),
        "Rate limiter configured"
    );
    let app = create_router(AppState::new(agent, limiter));

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!(
        bind = %config.bind,
        model = %config.agent.model,
        provider = %config.base_url,
        "Interviewer backend listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Received shutdown signal");
        })
        .await?;

    if config.otlp_endpoint.is_some() {
        telemetry::shutdown_tracing();
    }

    Ok(())
}
