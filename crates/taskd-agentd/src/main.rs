mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use taskd_api::{AgentAdapter, HttpApi};
use taskd_core::{ReloadConfig, ReloadController};
use taskd_exec::{ExecConfig, ShellExecutor};
use taskd_observe::{LoggerConfig, logger_init};

use crate::cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 1) Logger
    let log = LoggerConfig {
        format: args.log_format,
        level: args.log_level.clone(),
        ..Default::default()
    };
    logger_init(&log)?;
    info!(config = %args.config.display(), "starting agent");

    // 2) Registry: a config that doesn't load is fatal
    let controller = ReloadController::start(
        &args.config,
        ReloadConfig {
            check_every: args.reload_every,
        },
    )
    .await
    .with_context(|| format!("loading {}", args.config.display()))?;
    let registry = controller.registry();
    let settings = registry.settings();
    info!(tasks = registry.len(), port = settings.port, gzip = settings.gzip, "tasks loaded");

    // 3) Hot reload
    let cancel = CancellationToken::new();
    let reload = controller.spawn(cancel.child_token());

    // 4) Front end
    let handler = Arc::new(AgentAdapter::new(
        registry,
        ShellExecutor::new(ExecConfig::default()),
    ));
    let app = HttpApi::new(handler).router();
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", settings.port))
        .await
        .with_context(|| format!("binding port {}", settings.port))?;
    info!(addr = %listener.local_addr()?, "listening");

    let shutdown = cancel.clone();
    taskd_api::axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_signal().await;
            info!("shutting down...");
            shutdown.cancel();
        })
        .await?;

    // 5) No registry writes after this point
    cancel.cancel();
    if let Err(e) = reload.await {
        warn!(error = %e, "reload loop ended abnormally");
    }
    Ok(())
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
