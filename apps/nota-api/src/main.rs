use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = nota_api::Args::parse();

	nota_api::run(args).await
}
