pub mod routes;
pub mod state;

use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use color_eyre::{Result, eyre};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;
use nota_config::Config;

#[derive(Debug, Parser)]
#[command(
	version = nota_cli::VERSION,
	rename_all = "kebab",
	styles = nota_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> Result<()> {
	let config = nota_config::load(&args.config)?;

	init_tracing(&config);

	let http_addr = check_bind(&config)?;
	let state = AppState::new(config).await?;
	let app = routes::router(state);
	let listener = TcpListener::bind(http_addr).await?;

	tracing::info!(%http_addr, "HTTP server listening.");

	axum::serve(listener, app).await?;

	Ok(())
}

/// Resolves the HTTP bind address. `auth_mode = "off"` trusts a caller-supplied owner header, so it
/// requires a loopback address just like `bind_localhost_only` does.
pub fn check_bind(config: &Config) -> Result<SocketAddr> {
	let http_addr: SocketAddr = config.service.http_bind.parse().map_err(|err| {
		eyre::eyre!("service.http_bind must be a valid socket address: {err}")
	})?;

	if config.security.auth_mode == "off" && !http_addr.ip().is_loopback() {
		return Err(eyre::eyre!(
			"service.http_bind must be a loopback address when security.auth_mode=off."
		));
	}
	if config.security.bind_localhost_only && !http_addr.ip().is_loopback() {
		return Err(eyre::eyre!(
			"service.http_bind must be a loopback address when bind_localhost_only is true."
		));
	}

	Ok(http_addr)
}

fn init_tracing(config: &Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}
