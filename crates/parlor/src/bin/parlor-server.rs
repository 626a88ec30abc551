//! Parlor relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin parlor-server
//! PORT=8080 cargo run --bin parlor-server -- --host 127.0.0.1 --log-level debug
//! ```

use clap::Parser;
use parlor::{DEFAULT_HOST, DEFAULT_PORT, ParlorError, ParlorServer, logging};

#[derive(Parser, Debug)]
#[command(name = "parlor-server", version)]
#[command(about = "Room relay server for browser multiplayer games", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "PARLOR_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Port number to listen on
    #[arg(short = 'p', long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Log level for Parlor's own crates (overridden by RUST_LOG)
    #[arg(long, env = "PARLOR_LOG", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), ParlorError> {
    let args = Args::parse();
    logging::init(&args.log_level);

    let addr = format!("{}:{}", args.host, args.port);
    let server = ParlorServer::builder().bind(&addr).build().await?;
    tracing::info!(%addr, "server listening");

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        // Only meaningful when the env overrides are unset.
        if std::env::var_os("PORT").is_some()
            || std::env::var_os("PARLOR_HOST").is_some()
            || std::env::var_os("PARLOR_LOG").is_some()
        {
            return;
        }
        let args = Args::parse_from(["parlor-server"]);
        assert_eq!(args.port, DEFAULT_PORT);
        assert_eq!(args.host, DEFAULT_HOST);
        assert_eq!(
            format!("{}:{}", args.host, args.port),
            "0.0.0.0:3000",
            "same address the library builder binds by default"
        );
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_args_flags_override_defaults() {
        let args = Args::parse_from([
            "parlor-server",
            "--port",
            "8080",
            "-H",
            "127.0.0.1",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.port, 8080);
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.log_level, "debug");
    }
}
