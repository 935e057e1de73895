use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use token_pulse::api::SimulatedTokenSource;
use token_pulse::cli::Cli;
use token_pulse::config::Config;
use token_pulse::feed::{PriceFeed, PriceSnapshot};
use token_pulse::models::{Category, Token};
use token_pulse::services::FeedSession;
use token_pulse::store::{Selection, TokenStore};
use token_pulse::{logging, metrics};

const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

#[derive(Serialize)]
struct ViewLine<'a> {
    category: Category,
    loading: bool,
    error: Option<&'a str>,
    tokens: &'a [Token],
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(Path::new(DEFAULT_CONFIG_PATH)),
        None => Ok(Config::default()),
    }
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if !cli.categories.is_empty() {
        config.view.categories = cli.categories.clone();
    }
    if let Some(sort_by) = cli.sort_by {
        config.view.sort_by = sort_by;
    }
    if let Some(order) = cli.order {
        config.view.sort_order = order;
    }
    if cli.filter.is_some() {
        config.view.filter_category = cli.filter.clone();
    }
}

fn print_instrument(snapshot: &PriceSnapshot, json: bool) {
    if json {
        let line = serde_json::json!({
            "symbol": snapshot.symbol,
            "price": snapshot.current_price,
            "change": snapshot.price_change,
            "connected": snapshot.is_connected,
            "ticks": snapshot.ticks,
        });
        println!("{}", line);
    } else {
        let ma = snapshot.ticks.latest().map(|t| t.ma).unwrap_or_default();
        println!(
            "{} {:>12.2} ({:+.2}%) ma {:.2}",
            snapshot.symbol, snapshot.current_price, snapshot.price_change, ma
        );
    }
}

async fn print_views(store: &TokenStore, categories: &[Category], json: bool) -> Result<()> {
    let state = store.snapshot().await;
    for &category in categories {
        let tokens = state.view(category);
        if json {
            let line = ViewLine {
                category,
                loading: state.loading,
                error: state.error.as_deref(),
                tokens: &tokens,
            };
            println!("{}", serde_json::to_string(&line)?);
            continue;
        }

        println!("== {} ({} tokens) ==", category, tokens.len());
        for token in &tokens {
            println!(
                "  {:<8} {:>14.6} {:>+8.2}% cap {:>16.0} vol {:>14.0}",
                token.symbol, token.price, token.change_24h, token.market_cap, token.volume_24h
            );
        }
    }
    if !json {
        if let Some(message) = &state.error {
            println!("error: {}", message);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli).context("Configuration loading failed")?;
    apply_cli_overrides(&mut config, &cli);
    config.validate()?;

    logging::init(&config.logging, cli.debug)?;
    metrics::init()?;
    info!("Starting token pulse...");

    let store = TokenStore::with_selection(Selection {
        sort_by: config.view.sort_by,
        sort_order: config.view.sort_order,
        filter_category: config.view.filter_category.clone(),
    });
    let feed = Arc::new(PriceFeed::from_config(&config.feed));
    let source = Arc::new(SimulatedTokenSource::from_config(&config.fetch)?);
    let categories = config.view.categories.clone();

    let session = FeedSession::start(&config, store.clone(), feed.clone(), source, &categories);

    let mut store_rx = store.subscribe();
    let mut feed_rx = feed.subscribe();
    let deadline = async {
        match cli.duration_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            changed = store_rx.changed() => {
                if changed.is_err() {
                    warn!("Store closed");
                    break;
                }
                print_views(&store, &categories, cli.json).await?;
            }
            changed = feed_rx.changed() => {
                if changed.is_err() {
                    warn!("Price feed closed");
                    break;
                }
                let snapshot = feed_rx.borrow_and_update().clone();
                print_instrument(&snapshot, cli.json);
            }
            _ = &mut deadline => {
                info!("Run duration elapsed");
                break;
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!("Failed to listen for Ctrl-C: {}", e);
                }
                info!("Received Ctrl-C");
                break;
            }
        }
    }

    session.shutdown();
    match metrics::render() {
        Ok(text) => info!("Final metrics:\n{}", text),
        Err(e) => warn!("Could not render metrics: {}", e),
    }
    Ok(())
}
