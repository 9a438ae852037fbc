use anyhow::{Context, Result};
use skill_grader::scoring::{AiDetector, Evaluator, RubricRegistry};
use skill_grader::server::{router, AppState};
use skill_grader::settings::settings;
use skill_grader::utils::{
    log_init, log_lexicon_ready, log_rubrics_loaded, log_rubrics_reload_failed,
    log_rubrics_reloaded, log_rubrics_watching, log_server_ready,
};
use std::sync::Arc;
use tracing::subscriber::set_global_default;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("skill_grader=info".parse()?))
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        );
    set_global_default(subscriber).context("failed to set tracing subscriber")?;

    let settings = settings();
    log_init(&settings.server.host, settings.server.port, settings.server.demo_mode);

    let lexicon = settings
        .detector
        .load_lexicon()
        .context("failed to load detector lexicon")?;
    log_lexicon_ready(lexicon.version(), settings.detector.lexicon_path.as_deref());

    let registry = Arc::new(
        RubricRegistry::load(&settings.rubrics.path)
            .with_context(|| format!("failed to load rubrics from {}", settings.rubrics.path.display()))?,
    );
    log_rubrics_loaded(registry.path(), &registry.snapshot());

    // dropping the watcher stops hot reload, so it lives as long as main
    let _watcher = if settings.rubrics.watch {
        let watcher = registry.watch(|result| match result {
            Ok(catalog) => log_rubrics_reloaded(&catalog),
            Err(e) => log_rubrics_reload_failed(&e),
        })?;
        log_rubrics_watching(registry.path());
        Some(watcher)
    } else {
        None
    };

    let evaluator = Arc::new(Evaluator::new(registry, AiDetector::new(lexicon)));
    let app = router(AppState::new(evaluator, settings.server.clone()));

    let address = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    log_server_ready(&address);

    axum::serve(listener, app).await?;

    Ok(())
}
