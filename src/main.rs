use clap::Parser as _;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pagekit=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = pagekit::CliArgs::parse();
    pagekit::run(args).await
}
