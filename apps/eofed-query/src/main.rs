use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = eofed_query::Args::parse();

	eofed_query::run(args).await
}
