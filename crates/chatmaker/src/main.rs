// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auto Chat Maker - automatic reply suggestions for Microsoft Teams chats.
//!
//! This is the binary entry point for the HTTP service.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use std::sync::Arc;

use chatmaker_config::ChatMakerConfig;
use clap::{Args, Parser, Subcommand};

/// Auto Chat Maker - automatic reply suggestions for Microsoft Teams chats.
#[derive(Parser, Debug)]
#[command(name = "chatmaker", version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    serve: ServeArgs,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server (default).
    Serve(ServeArgs),
    /// Validate and print the effective configuration with secrets redacted.
    Config,
}

/// Listen address overrides for `serve`.
#[derive(Args, Debug, Default, Clone)]
struct ServeArgs {
    /// Interface to bind, overriding `app.host`.
    #[arg(long)]
    host: Option<String>,
    /// Port to bind, overriding `app.port`.
    #[arg(long)]
    port: Option<u16>,
}

impl ServeArgs {
    fn apply(self, config: &ChatMakerConfig) -> ChatMakerConfig {
        let mut config = config.clone();
        if let Some(host) = self.host {
            config.app.host = host;
        }
        if let Some(port) = self.port {
            config.app.port = port;
        }
        config
    }
}

fn print_config(config: &ChatMakerConfig) -> Result<(), String> {
    let rendered = toml::to_string_pretty(&config.redacted())
        .map_err(|e| format!("failed to render configuration: {e}"))?;
    print!("{rendered}");
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match chatmaker_config::get_config() {
        Ok(config) => config,
        Err(errors) => {
            chatmaker_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Config) => print_config(&config),
        Some(Commands::Serve(args)) => run_serve(args, &config).await,
        None => run_serve(cli.serve, &config).await,
    };

    if let Err(message) = result {
        eprintln!("error: {message}");
        std::process::exit(1);
    }
}

async fn run_serve(args: ServeArgs, config: &ChatMakerConfig) -> Result<(), String> {
    let config = Arc::new(args.apply(config));
    serve::run_serve(config).await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_serves() {
        let cli = Cli::try_parse_from(["chatmaker"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.serve.host.is_none());
    }

    #[test]
    fn top_level_flags_apply_to_default_serve() {
        let cli = Cli::try_parse_from(["chatmaker", "--port", "9000"]).unwrap();
        let config = cli.serve.apply(&ChatMakerConfig::default());
        assert_eq!(config.app.port, 9000);
        assert_eq!(config.app.host, "0.0.0.0");
    }

    #[test]
    fn serve_subcommand_overrides_host_and_port() {
        let cli =
            Cli::try_parse_from(["chatmaker", "serve", "--host", "127.0.0.1", "--port", "8080"])
                .unwrap();
        let Some(Commands::Serve(args)) = cli.command else {
            panic!("expected serve subcommand");
        };
        let config = args.apply(&ChatMakerConfig::default());
        assert_eq!(config.app.host, "127.0.0.1");
        assert_eq!(config.app.port, 8080);
    }

    #[test]
    fn config_subcommand_takes_no_flags() {
        assert!(Cli::try_parse_from(["chatmaker", "config", "--port", "1"]).is_err());
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert!(Cli::try_parse_from(["chatmaker", "--port", "70000"]).is_err());
    }
}
