// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tether server binary.
//!
//! The SSO protocol layer links `tether-server-sso` directly; this binary
//! covers schema setup and replaying a single verified assertion.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tether_server_auth::VerifiedAssertion;
use tether_server_db::{ProviderAccountRepository, UserRepository};
use tether_server_sso::SsoLogin;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod version;

/// Tether server - federated login reconciliation.
#[derive(Parser, Debug)]
#[command(name = "tether-server", about = "Tether SSO login reconciliation", version)]
struct Args {
	/// Config file to load instead of /etc/tether/server.toml
	#[arg(long, global = true)]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Create or upgrade the database schema
	Migrate,
	/// Reconcile one verified assertion (JSON) and print the resulting user
	Reconcile {
		#[arg(long)]
		assertion: PathBuf,
	},
	/// Show version and build information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Command::Version = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => tether_server_config::load_config_with_file(path)?,
		None => tether_server_config::load_config()?,
	};

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();

	let pool = tether_server_db::create_pool(&config.database.url).await?;
	tether_server_db::run_migrations(&pool).await?;

	match args.command {
		Command::Migrate => {
			tracing::info!(database = %config.database.url, "schema is up to date");
		}
		Command::Reconcile { assertion } => {
			let raw = std::fs::read_to_string(&assertion)?;
			let assertion: VerifiedAssertion = serde_json::from_str(&raw)?;

			let login = SsoLogin::new(
				UserRepository::new(pool.clone()),
				ProviderAccountRepository::new(pool.clone()),
			)
			.with_provider_label(config.sso.provider_label.clone());

			match login.reconcile(assertion).await {
				Ok(user) => println!("{}", serde_json::to_string_pretty(&user)?),
				Err(e) => {
					if e.is_internal() {
						tracing::error!(error = %e, "reconciliation failed");
					} else {
						tracing::warn!(status = e.status_code(), error = %e, "login rejected");
					}
					pool.close().await;
					return Err(e.into());
				}
			}
		}
		Command::Version => {}
	}

	pool.close().await;
	Ok(())
}
