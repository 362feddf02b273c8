use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod analysis;
mod cli;
mod config;
mod errors;
mod fontfile;
mod scrape;
mod search;
#[cfg(test)]
mod tests;
mod web;

use analysis::Analyzer;
use config::Config;

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("font_exposure=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();
    let mut config = Config::load_with(args.config.as_deref())?;

    match args.command {
        cli::Command::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            web::start_daemon(&config)
        }

        cli::Command::Analyze { url } => {
            let analyzer = Analyzer::from_config(&config)?;
            print_json(&analyzer.analyze_url(&url)?)
        }

        cli::Command::Search { font_name } => {
            let analyzer = Analyzer::from_config(&config)?;
            print_json(&analyzer.search_font(&font_name)?)
        }

        cli::Command::InspectFont { path } => {
            let data = std::fs::read(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            let analyzer = Analyzer::from_config(&config)?;
            print_json(&analyzer.analyze_font_file(&data, &file_name)?)
        }
    }
}
