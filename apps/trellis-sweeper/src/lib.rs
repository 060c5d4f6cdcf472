use std::{path::PathBuf, time::Duration};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use trellis_service::TrellisService;
use trellis_storage::db::Db;

#[derive(Debug, Parser)]
#[command(version, rename_all = "kebab")]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Seconds between readiness sweeps.
	#[arg(long, default_value_t = 60)]
	pub interval_secs: u64,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = trellis_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let service = TrellisService::new(config, db);
	let interval = Duration::from_secs(args.interval_secs.max(1));

	tracing::info!(interval_secs = interval.as_secs(), "Sweeper started.");

	loop {
		match service.tick().await {
			Ok(report) =>
				if report.notified > 0 {
					tracing::info!(notified = report.notified, "Readiness sweep completed.");
				},
			Err(err) => {
				tracing::error!(error = %err, "Readiness sweep failed.");
			},
		}

		tokio::time::sleep(interval).await;
	}
}
