//! servertester - Main Entry Point
//!
//! Loads settings and templates, runs one bundled suite against the server
//! under test and prints the report. Exits non-zero if any test failed or
//! errored.

mod args;
mod suites;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use args::{Args, Format};
use clap::Parser;
use servertester_application::{
    CancellationToken, Dispatcher, SuiteRunner, TemplateStore, TestRegistry,
};
use servertester_domain::{Report, RunSettings};
use servertester_infrastructure::{
    BuiltinTemplates, FileTemplateSource, ReqwestHttpClient, SettingsLoader, render_text,
    to_json_stable, to_yaml,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Logs go to stderr so the report on stdout stays machine-readable
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if args.list {
        print_suites();
        return Ok(ExitCode::SUCCESS);
    }

    let settings = load_settings(&args)?;
    let suite = suites::find(&args.suite)
        .with_context(|| format!("unknown suite '{}', try --list", args.suite))?;

    let mut store = TemplateStore::new();
    store.load_from(&BuiltinTemplates).await?;
    if let Some(dir) = &settings.template_dir {
        let loaded = store
            .load_from(&FileTemplateSource::new(dir))
            .await
            .with_context(|| format!("loading templates from {}", dir.display()))?;
        tracing::info!(dir = %dir.display(), templates = loaded, "loaded template directory");
    }

    let registry = TestRegistry::from_suite(suite.as_ref(), &store)?;
    let client = Arc::new(ReqwestHttpClient::new()?);
    let dispatcher = Dispatcher::new(client, &settings)?;
    tracing::info!(
        suite = registry.suite(),
        target = %dispatcher.base_url(),
        "servertester v{}",
        env!("CARGO_PKG_VERSION")
    );
    let runner = SuiteRunner::new(dispatcher).with_concurrency(settings.effective_concurrency());

    let (token, cancel) = CancellationToken::new();
    tokio::spawn(async move {
        shutdown_signal().await;
        token.cancel();
    });

    let report = runner.run_with_cancellation(&registry, &cancel).await;
    print!("{}", render(&report, args.format)?);

    Ok(if report.summary().is_success() && !report.cancelled {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Settings file and environment first, then command line flags.
fn load_settings(args: &Args) -> anyhow::Result<RunSettings> {
    let mut loader = SettingsLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_file(path);
    }
    let mut settings = loader.load()?;

    if let Some(host) = &args.host {
        settings.host.clone_from(host);
    }
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        settings.timeout_ms = timeout_ms;
    }
    if let Some(concurrency) = args.concurrency {
        settings.concurrency = concurrency;
    }
    if let Some(dir) = &args.templates {
        settings.template_dir = Some(dir.clone());
    }
    Ok(settings)
}

fn render(report: &Report, format: Format) -> anyhow::Result<String> {
    Ok(match format {
        Format::Text => render_text(report),
        Format::Json => to_json_stable(report)?,
        Format::Yaml => to_yaml(report)?,
    })
}

fn print_suites() {
    for suite in suites::all() {
        println!("{}  {}", suite.name(), suite.description());
        for binding in suite.bindings() {
            println!("    {}", binding.name);
        }
    }
}

/// Waits for Ctrl+C; if no handler can be installed, never resolves.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::warn!("interrupt received, finishing the current test"),
        Err(e) => {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
