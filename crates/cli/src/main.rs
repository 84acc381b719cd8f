mod auth_cmd;
mod chat_cmd;
mod config;
mod connect;
mod export_cmd;
mod output;
mod repl;

use biasbuster_core::Model;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::export_cmd::FormatArg;

#[derive(Parser)]
#[command(
    name = "biasbuster",
    version,
    about = "BiasBuster CLI - ask the bias analysis service about your data"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session token
    Login {
        #[arg(long)]
        email: Option<String>,
    },

    /// Create an account
    Signup {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// Forget the stored session token
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List chats, most recent first
    History {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Start a new chat and print its id
    New,

    /// Send one message and print the reply
    Send {
        /// Message text (may be empty when --file is given)
        text: String,

        /// Attach a .csv, .json, .txt or .xlsx file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Continue an existing chat instead of starting one
        #[arg(long)]
        chat: Option<String>,

        /// Model to ask (gpt-4, gpt-3.5-turbo, claude-3)
        #[arg(long)]
        model: Option<Model>,

        /// Export the bias report, if the reply has one
        #[arg(long)]
        export: bool,
    },

    /// Delete a chat
    Delete {
        chat_id: String,
    },

    /// Export a saved bias report as PDF or JSON
    Export {
        /// JSON file holding the report
        #[arg(long)]
        report: PathBuf,

        /// Identifier printed on the report and used in the file name
        #[arg(long)]
        id: String,

        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Output directory (defaults to `export.output_dir`)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Show or set configuration
    Config {
        /// Set the server URL
        #[arg(long)]
        server: Option<String>,

        /// Set the default model
        #[arg(long)]
        model: Option<Model>,

        /// Set the directory reports are exported to
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Interactive chat session
    Chat {
        #[arg(long)]
        model: Option<Model>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Login { email } => auth_cmd::run_login(email).await,
        Commands::Signup { username, email } => auth_cmd::run_signup(username, email).await,
        Commands::Logout => auth_cmd::run_logout(),
        Commands::Whoami => auth_cmd::run_whoami().await,
        Commands::History { json } => chat_cmd::run_history(json).await,
        Commands::New => chat_cmd::run_new().await,
        Commands::Send {
            text,
            file,
            chat,
            model,
            export,
        } => {
            chat_cmd::run_send(chat_cmd::SendArgs {
                text,
                file,
                chat,
                model,
                export,
            })
            .await
        }
        Commands::Delete { chat_id } => chat_cmd::run_delete(&chat_id).await,
        Commands::Export {
            report,
            id,
            format,
            out,
        } => export_cmd::run_export(&report, &id, format, out),
        Commands::Config {
            server,
            model,
            output_dir,
        } => {
            if server.is_none() && model.is_none() && output_dir.is_none() {
                config::show_config()
            } else {
                config::set_config(server, model, output_dir)
            }
        }
        Commands::Chat { model } => repl::run_chat(model).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
