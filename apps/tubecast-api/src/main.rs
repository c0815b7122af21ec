use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = tubecast_api::Args::parse();

	tubecast_api::run(args).await
}
