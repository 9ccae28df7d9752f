use anyhow::Result;
use clap::Parser;
use supportcrew_cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the key may come from the real environment.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let answer = supportcrew_cli::run(cli).await?;
    println!("{answer}");

    Ok(())
}
