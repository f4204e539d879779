use clap::Parser;
use tracing_subscriber::EnvFilter;

use book_catalog::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_tracing(&config.log_level);

    book_catalog::interface::http::run(config).await
}

/// RUST_LOG があれば優先し、無ければ --log-level を使う。ログはstderrへ。
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
