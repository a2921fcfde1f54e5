//! pdfchat - ask questions about a PDF.
//!
//! `pdfchat serve` (the default) indexes the first PDF in the source
//! directory and serves the viewer + chat page. `pdfchat chat [server-url]`
//! runs the same chat controller in the terminal against a running server.

use std::process::ExitCode;

use pdfchat::{client, logging, server, Config};

// ============================================================================
// Main
// ============================================================================

enum Command {
    Serve,
    Chat(Option<String>),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Command, String> {
    match args.next().as_deref() {
        None | Some("serve") => Ok(Command::Serve),
        Some("chat") => Ok(Command::Chat(args.next())),
        Some("-h") | Some("--help") | Some("help") => Ok(Command::Help),
        Some(other) => Err(format!("unknown command: {}", other)),
    }
}

const USAGE: &str = "usage: pdfchat [serve | chat [server-url]]";

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = logging::init() {
        eprintln!("{}", e);
    }

    let command = match parse_args(std::env::args().skip(1)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}\n{}", e, USAGE);
            return ExitCode::FAILURE;
        }
    };

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match command {
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        Command::Serve => server::serve(config).await.map_err(|e| e.to_string()),
        Command::Chat(url) => {
            let config = match url {
                Some(raw) => config.with_server_url(&raw).map_err(|e| e.to_string()),
                None => Ok(config),
            };
            match config {
                Ok(c) => client::run_terminal(c.server_url)
                    .await
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e),
            }
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
