use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = trellis_sweeper::Args::parse();
	trellis_sweeper::run(args).await
}
