use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use biasbuster_conversation::{Controller, StartRoute, TurnOutcome};
use biasbuster_core::Model;
use biasbuster_export::ExportFormat;

use crate::chat_cmd::stage_upload;
use crate::config::{export_dir, load_config};
use crate::connect::{Connection, explain};
use crate::export_cmd::{configured_format, export_from_conversation};
use crate::output::{print_history, print_message};

const HELP: &str = "\
Type a message to send it. Commands:
  /upload PATH                 attach a .csv, .json, .txt or .xlsx file
  /remove                      drop the attached file
  /new                         start a new chat
  /history                     list chats
  /open N|ID                   switch to a chat from /history
  /model [NAME]                show or change the model
  /export [MESSAGE_ID] [pdf|json]  export a bias report
  /delete ID                   delete a chat
  /quit                        leave";

#[derive(Debug, Clone, PartialEq)]
enum ReplCommand {
    Send(String),
    Upload(PathBuf),
    Remove,
    New,
    History,
    Open(String),
    Model(Option<String>),
    Export {
        message_id: Option<String>,
        format: Option<ExportFormat>,
    },
    Delete(String),
    Help,
    Quit,
    Empty,
    Invalid(String),
}

fn parse_line(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return ReplCommand::Send(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let required = |usage: &str, build: fn(String) -> ReplCommand| {
        if arg.is_empty() {
            ReplCommand::Invalid(format!("usage: {usage}"))
        } else {
            build(arg.to_string())
        }
    };

    match name {
        "upload" => required("/upload PATH", |p| ReplCommand::Upload(PathBuf::from(p))),
        "remove" => ReplCommand::Remove,
        "new" => ReplCommand::New,
        "history" => ReplCommand::History,
        "open" => required("/open N|ID", ReplCommand::Open),
        "model" => ReplCommand::Model((!arg.is_empty()).then(|| arg.to_string())),
        "export" => {
            let mut message_id = None;
            let mut format = None;
            for token in arg.split_whitespace() {
                match token.to_ascii_lowercase().as_str() {
                    "pdf" => format = Some(ExportFormat::Pdf),
                    "json" => format = Some(ExportFormat::Json),
                    _ => message_id = Some(token.to_string()),
                }
            }
            ReplCommand::Export { message_id, format }
        }
        "delete" => required("/delete ID", ReplCommand::Delete),
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => ReplCommand::Invalid(format!("unknown command /{other} (try /help)")),
    }
}

/// `biasbuster chat`
pub async fn run_chat(model: Option<Model>) -> Result<()> {
    let conn = Connection::open(load_config()?)?;
    if conn.account().restore() == StartRoute::Login {
        bail!("Not logged in (run `biasbuster login`)");
    }

    let mut ctl = conn.controller(model);
    let chats = ctl.refresh_history().await.map_err(explain)?;
    print_history(&chats);
    println!("Model: {}. Type /help for commands.", ctl.model().display_name());

    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        print!("{}", prompt(&ctl));
        std::io::stdout().flush().context("failed to flush stdout")?;

        line.clear();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("failed to read input")?;
        if read == 0 {
            println!();
            break;
        }

        match handle(&mut ctl, &conn, parse_line(&line)).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => eprintln!("Error: {e:#}"),
        }
    }

    ctl.settle_background().await;
    Ok(())
}

fn prompt(ctl: &Controller) -> String {
    let chat = ctl.chat_id().unwrap_or("new chat");
    match ctl.attachment().staged() {
        Some(file) => format!("[{chat} +{}]> ", file.file_name),
        None => format!("[{chat}]> "),
    }
}

/// Returns `false` when the loop should end.
async fn handle(ctl: &mut Controller, conn: &Connection, cmd: ReplCommand) -> Result<bool> {
    match cmd {
        ReplCommand::Empty => {}
        ReplCommand::Send(text) => {
            ctl.set_input(text);
            match ctl.submit().await.map_err(explain)? {
                TurnOutcome::Settled(reply) => print_message(&reply),
                TurnOutcome::Skipped | TurnOutcome::Discarded => {}
            }
        }
        ReplCommand::Upload(path) => stage_upload(ctl, &path).await?,
        ReplCommand::Remove => {
            if ctl.attachment().staged().is_some() {
                ctl.attachment_mut().clear();
                println!("Attachment removed.");
            } else {
                println!("Nothing attached.");
            }
        }
        ReplCommand::New => {
            let id = ctl.start_chat().await.map_err(explain)?;
            println!("Started chat {id}.");
        }
        ReplCommand::History => {
            let chats = ctl.refresh_history().await.map_err(explain)?;
            print_history(&chats);
        }
        ReplCommand::Open(target) => {
            let chats = ctl.chats();
            let found = match target.parse::<usize>() {
                Ok(n) if (1..=chats.len()).contains(&n) => Some(&chats[n - 1]),
                _ => chats.iter().find(|c| c.id == target),
            };
            let Some(summary) = found else {
                bail!("no chat {target} in history (run /history)");
            };
            ctl.open_summary(summary);
            println!("Opened chat {}.", summary.id);
            for message in ctl.messages() {
                print_message(message);
            }
        }
        ReplCommand::Model(None) => {
            println!("Current model: {}", ctl.model().display_name());
            let names: Vec<_> = Model::ALL.iter().map(|m| m.as_str()).collect();
            println!("Available: {}", names.join(", "));
        }
        ReplCommand::Model(Some(name)) => {
            let model: Model = name.parse()?;
            ctl.set_model(model);
            println!("Model set to {}.", model.display_name());
        }
        ReplCommand::Export { message_id, format } => {
            let format = format.unwrap_or_else(|| configured_format(&conn.config));
            let path = export_from_conversation(
                ctl.conversation(),
                message_id.as_deref(),
                format,
                &export_dir(&conn.config),
            )?;
            println!("Exported {}", path.display());
        }
        ReplCommand::Delete(id) => {
            ctl.delete_chat(&id).await.map_err(explain)?;
            println!("Deleted chat {id}.");
        }
        ReplCommand::Help => println!("{HELP}"),
        ReplCommand::Quit => return Ok(false),
        ReplCommand::Invalid(message) => println!("{message}"),
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_message() {
        assert_eq!(
            parse_line("Is this biased?\n"),
            ReplCommand::Send("Is this biased?".into())
        );
        assert_eq!(parse_line("   \n"), ReplCommand::Empty);
    }

    #[test]
    fn upload_keeps_path_with_spaces() {
        assert_eq!(
            parse_line("/upload my data/loans 2024.csv"),
            ReplCommand::Upload(PathBuf::from("my data/loans 2024.csv"))
        );
    }

    #[test]
    fn commands_that_need_an_argument() {
        assert!(matches!(parse_line("/open"), ReplCommand::Invalid(_)));
        assert!(matches!(parse_line("/delete"), ReplCommand::Invalid(_)));
        assert_eq!(parse_line("/open 2"), ReplCommand::Open("2".into()));
    }

    #[test]
    fn export_arguments_in_any_order() {
        assert_eq!(
            parse_line("/export JSON abc"),
            ReplCommand::Export {
                message_id: Some("abc".into()),
                format: Some(ExportFormat::Json),
            }
        );
        assert_eq!(
            parse_line("/export"),
            ReplCommand::Export {
                message_id: None,
                format: None,
            }
        );
    }

    #[test]
    fn model_with_and_without_name() {
        assert_eq!(parse_line("/model"), ReplCommand::Model(None));
        assert_eq!(
            parse_line("/model claude-3"),
            ReplCommand::Model(Some("claude-3".into()))
        );
    }

    #[test]
    fn unknown_command_is_reported() {
        match parse_line("/frobnicate") {
            ReplCommand::Invalid(msg) => assert!(msg.contains("/frobnicate")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(parse_line("/quit"), ReplCommand::Quit);
    }
}
