//! Command-line client for the BlueCust bottle ordering platform.
//!
//! Authenticates against the configured backend, keeps the session in
//! durable storage across invocations, and exposes the order, production,
//! and supplier directory flows as subcommands.

use clap::Parser;
use bluecust_config::Config;
use bluecust_core::{CoreBuilder, CoreEngine, CoreFactories};
use std::path::PathBuf;

mod commands;

use commands::Command;

/// Command-line arguments for the BlueCust client.
#[derive(Parser, Debug)]
#[command(name = "bluecust", author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml", env = "BLUECUST_CONFIG")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "warn")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt().with_env_filter(env_filter).with_target(true).init();

	let config = Config::from_file(&args.config)?;
	tracing::info!("Loaded configuration [{}]", config.client.id);

	let engine = build_engine(config)?;
	commands::run(&engine, args.command).await
}

/// Builds the core engine with all registered implementations.
fn build_engine(config: Config) -> Result<CoreEngine, Box<dyn std::error::Error>> {
	let factories = CoreFactories {
		backend_factories: bluecust_backend::get_all_implementations()
			.into_iter()
			.map(|(name, factory)| (name.to_string(), factory))
			.collect(),
		storage_factories: bluecust_storage::get_all_implementations()
			.into_iter()
			.map(|(name, factory)| (name.to_string(), factory))
			.collect(),
	};
	Ok(CoreBuilder::new(config).build(factories)?)
}
