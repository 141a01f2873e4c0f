//! fq-quote - price a part from the command line
//!
//! Prints the local estimate immediately, then the authoritative quote once
//! the session settles (or the local figure again if the server is away).

use anyhow::{Context, Result};
use clap::Parser;
use fq_client::{HttpPricingClient, Quote, QuoteSession, QuoteState};
use fq_common::catalog::Catalog;
use fq_common::config::{ClientOverrides, ClientSettings, TomlConfig};
use fq_common::PartConfiguration;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for fq-quote
#[derive(Parser, Debug)]
#[command(name = "fq-quote")]
#[command(about = "Quote a fabricated part against a fabquote server")]
#[command(version)]
struct Args {
    /// Path to config.toml
    #[arg(short, long, env = "FQ_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of fq-server
    #[arg(short, long, env = "FQ_SERVER_URL")]
    server_url: Option<String>,

    /// Quiet period before the authoritative request, in milliseconds
    #[arg(long, env = "FQ_DEBOUNCE_MS")]
    debounce_ms: Option<u64>,

    /// Authoritative request timeout, in milliseconds
    #[arg(long, env = "FQ_REQUEST_TIMEOUT_MS")]
    request_timeout_ms: Option<u64>,

    /// Material id, e.g. mild-steel
    #[arg(short, long)]
    material: String,

    /// Thickness label exactly as listed for the material
    #[arg(short, long)]
    thickness: String,

    /// Part width in inches
    #[arg(long)]
    width: f64,

    /// Part height in inches
    #[arg(long)]
    height: f64,

    /// Number of parts
    #[arg(short, long, default_value_t = 1)]
    quantity: u32,

    /// Service add-on id; repeat for several
    #[arg(long = "service")]
    services: Vec<String>,

    /// Price with built-in constants only; never contact the server
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (toml_config, _) =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    let settings = ClientSettings::resolve(
        &toml_config,
        ClientOverrides {
            server_url: args.server_url.clone(),
            debounce_ms: args.debounce_ms,
            request_timeout_ms: args.request_timeout_ms,
        },
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| toml_config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = PartConfiguration::new(
        args.material.as_str(),
        args.thickness.as_str(),
        args.width,
        args.height,
        args.quantity,
    );
    for service in &args.services {
        config = config.with_service(service.as_str());
    }

    let client = HttpPricingClient::new(&settings).context("Failed to create HTTP client")?;
    info!("Server: {}", client.base_url());

    let catalog = if args.offline {
        Catalog::builtin()
    } else {
        match client.fetch_catalog().await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!("Using built-in catalog: {}", e);
                Catalog::builtin()
            }
        }
    };

    let session = QuoteSession::new(Arc::new(client), catalog, &settings);
    if !args.offline {
        // Failure leaves the built-in constants in place
        if let Err(e) = session.refresh_snapshot().await {
            debug!("Parameter snapshot unavailable: {}", e);
        }
    }

    let mut rx = session.subscribe();
    let local = session.update(config).context("Invalid part configuration")?;
    print_quote("estimate", &local);

    if args.offline {
        session.discard();
        return Ok(());
    }

    let budget = settings.debounce + settings.request_timeout + Duration::from_secs(1);
    let settled = tokio::time::timeout(budget, async {
        let mut requested = false;
        loop {
            let quote = rx.borrow_and_update().clone()?;
            match quote.state {
                QuoteState::AwaitingAuthoritative => requested = true,
                QuoteState::Authoritative => return Some(quote),
                QuoteState::LocalOnly if requested => return Some(quote),
                _ => {}
            }
            if rx.changed().await.is_err() {
                return None;
            }
        }
    })
    .await;

    match settled {
        Ok(Some(quote)) if quote.is_authoritative() => print_quote("quote", &quote),
        Ok(Some(quote)) => print_quote("estimate (server unavailable)", &quote),
        _ => warn!("No authoritative quote within {:?}", budget),
    }

    session.discard();
    Ok(())
}

fn print_quote(label: &str, quote: &Quote) {
    let b = &quote.breakdown;
    println!(
        "{:<30} unit ${:.2}  qty {}  discount {:.1}%  setup ${:.2}  subtotal ${:.2}",
        label,
        b.unit_price,
        quote.configuration.quantity,
        b.discount_fraction * 100.0,
        b.setup_fee,
        b.subtotal,
    );
}
