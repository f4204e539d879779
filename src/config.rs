use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// サーバー設定。CLI引数 → 環境変数 → デフォルトの順に解決する。
#[derive(Debug, Clone, Parser)]
#[command(name = "book-catalog", version, about = "Server-rendered book catalog")]
pub struct ServerConfig {
    /// SQLite database file (created if absent)
    #[arg(env = "BOOK_CATALOG_DB", default_value = "books.db")]
    pub database: PathBuf,

    /// Address to listen on
    #[arg(long, env = "BOOK_CATALOG_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Log filter used when RUST_LOG is not set (e.g. info, debug)
    #[arg(long, env = "BOOK_CATALOG_LOG", default_value = "info")]
    pub log_level: String,
}
