use clap::Parser;

use kb_ask::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	kb_ask::run(args).await
}
