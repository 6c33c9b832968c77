//! Honeypot server binary.

use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing_subscriber::{fmt, EnvFilter};

use honeypot::adapters::ai::{OpenAICompatibleConfig, OpenAICompatibleProvider, PersonaReplyGenerator};
use honeypot::adapters::callback::HttpCallbackSender;
use honeypot::adapters::http::{app_router, honeypot_routes, ApiKeyState, HoneypotHandlers};
use honeypot::adapters::memory::InMemorySessionStore;
use honeypot::application::{CallbackDispatcher, EngageHandler};
use honeypot::config::{AiProvider, AppConfig, ServerConfig, ValidationError};
use honeypot::ports::{AIError, AIProvider, SessionStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_logging(&config.server);

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        return Err(e.into());
    }
    let api_key = config
        .auth
        .api_key
        .clone()
        .ok_or(ValidationError::MissingRequired("HONEYPOT__AUTH__API_KEY"))?;

    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

    let sender = HttpCallbackSender::new(config.callback.url.clone(), config.callback.timeout())?
        .with_attempts(config.callback.attempts_per_dispatch)
        .with_retry_delay(config.callback.retry_delay());
    let dispatcher = CallbackDispatcher::new(store.clone(), Arc::new(sender))
        .with_retry_policy(config.callback.retry_policy())
        .with_deadline(config.callback.dispatch_deadline());

    let engage = EngageHandler::new(store, Arc::new(reply_generator(&config)?), dispatcher)
        .with_scorer(config.detection.scorer())
        .with_completion_policy(config.engagement.completion_policy());

    let app = app_router(
        honeypot_routes(
            HoneypotHandlers::new(Arc::new(engage)),
            ApiKeyState::new(api_key),
        ),
        &config.server,
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        environment = ?config.server.environment,
        callback_url = %config.callback.url,
        "Honeypot listening on http://{}",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Honeypot stopped");
    Ok(())
}

fn init_logging(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let builder = fmt().with_env_filter(filter);

    if server.is_production() {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

/// Persona generator backed by the configured provider, if any.
fn reply_generator(config: &AppConfig) -> Result<PersonaReplyGenerator, AIError> {
    let provider: Option<Arc<dyn AIProvider>> = match &config.ai.api_key {
        Some(key) if config.ai.is_configured() => {
            let key = key.expose_secret().clone();
            let mut provider_config = match config.ai.provider {
                AiProvider::OpenAI => OpenAICompatibleConfig::new(key),
                AiProvider::Gemini => OpenAICompatibleConfig::gemini(key),
            }
            .with_timeout(config.ai.timeout())
            .with_max_retries(config.ai.max_retries);
            if let Some(model) = &config.ai.model {
                provider_config = provider_config.with_model(model.clone());
            }
            if let Some(base_url) = &config.ai.base_url {
                provider_config = provider_config.with_base_url(base_url.clone());
            }

            let provider = OpenAICompatibleProvider::new(provider_config)?;
            tracing::info!(
                provider = %provider.provider_info().name,
                model = %provider.provider_info().model,
                "AI provider configured"
            );
            Some(Arc::new(provider) as Arc<dyn AIProvider>)
        }
        _ => {
            tracing::warn!("No AI provider configured, persona will use fallback replies");
            None
        }
    };

    Ok(PersonaReplyGenerator::new(provider)
        .with_timeout(config.engagement.reply_timeout())
        .with_max_reply_chars(config.engagement.max_reply_chars))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
