use clap::Parser;
use wiki_rag_cli::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    wiki_rag_cli::telemetry::init(cli.verbose, cli.json);
    wiki_rag_cli::run(cli).await
}
