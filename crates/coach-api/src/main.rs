//! Coaching backend CLI and REST API entry point.
//!
//! Binary name: `coachd`
//!
//! Parses CLI arguments, initializes configuration, database and services,
//! then dispatches to the command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;

use coach_infra::jobs::spawn_worker;
use coach_observe::tracing_setup::{init_tracing_with_default, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing_with_default(cli.otel, cli.log_filter())
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Missing API key or a broken config.toml stops here, before any work.
    let (state, jobs) = AppState::init().await?;

    match cli.command {
        Commands::Serve { bind } => {
            let worker = spawn_worker(jobs, state.sentinel.clone());

            let addr = bind.unwrap_or_else(|| state.config.server.bind.clone());
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} coachd listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}/api/v1")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }
            tracing::info!(%addr, data_dir = %state.data_dir.display(), "server started");

            let router = http::router::build_router(state);
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            // The router owned the last queue sender; let the worker drain.
            worker.await?;
            tracing::info!("server stopped");
        }

        Commands::CreateUser { name } => {
            cli::user::create_user(&state, &name, cli.json).await?;
        }

        Commands::Chat {
            user_id,
            text,
            show_prompt,
        } => {
            let worker = spawn_worker(jobs, state.sentinel.clone());
            cli::chat::chat_once(&state, &user_id, &text, show_prompt, cli.json).await?;
            // Run the queued note extraction before exiting.
            drop(state);
            worker.await?;
        }

        Commands::Extract { user_id } => {
            cli::extract::extract(&state, &user_id, cli.json).await?;
        }

        Commands::SkipCategory { user_id, category } => {
            cli::user::skip_category(&state, &user_id, &category, cli.json).await?;
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
