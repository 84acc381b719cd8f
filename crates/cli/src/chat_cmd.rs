use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use biasbuster_conversation::{Controller, TurnOutcome};
use biasbuster_core::upload::{ACCEPTED_UPLOAD_EXTENSIONS, is_accepted_upload};
use biasbuster_core::{Conversation, Model};

use crate::config::{export_dir, load_config};
use crate::connect::{Connection, explain};
use crate::export_cmd::{configured_format, export_from_conversation};
use crate::output::{print_history, print_message};

/// Extension gate applied before anything is sent to the server.
pub fn check_upload_path(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }
    if !is_accepted_upload(path) {
        bail!(
            "Unsupported file type: {} (accepted: {})",
            path.display(),
            ACCEPTED_UPLOAD_EXTENSIONS
                .iter()
                .map(|ext| format!(".{ext}"))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}

pub async fn stage_upload(ctl: &mut Controller, path: &Path) -> Result<()> {
    check_upload_path(path)?;
    let staged = ctl
        .attachment_mut()
        .upload_path(path)
        .await
        .map_err(|e| explain(e.into()))?;
    println!("Attached {} ({} bytes).", staged.file_name, staged.size);
    Ok(())
}

pub async fn run_history(json: bool) -> Result<()> {
    let conn = Connection::open(load_config()?)?;
    let mut ctl = conn.controller(None);
    let chats = ctl.refresh_history().await.map_err(explain)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&chats).context("Failed to encode history")?
        );
    } else {
        print_history(&chats);
    }
    Ok(())
}

pub async fn run_new() -> Result<()> {
    let conn = Connection::open(load_config()?)?;
    let mut ctl = conn.controller(None);
    let id = ctl.start_chat().await.map_err(explain)?.to_string();
    ctl.settle_background().await;
    println!("{id}");
    Ok(())
}

pub struct SendArgs {
    pub text: String,
    pub file: Option<PathBuf>,
    pub chat: Option<String>,
    pub model: Option<Model>,
    pub export: bool,
}

pub async fn run_send(args: SendArgs) -> Result<()> {
    let conn = Connection::open(load_config()?)?;
    let mut ctl = conn.controller(args.model);
    if let Some(id) = args.chat {
        ctl.select_chat(Conversation::started(id));
    }
    if let Some(path) = &args.file {
        stage_upload(&mut ctl, path).await?;
    }

    let outcome = ctl.send_turn(&args.text).await.map_err(explain)?;
    ctl.settle_background().await;

    match outcome {
        TurnOutcome::Skipped => bail!("Nothing to send: give a message or --file"),
        TurnOutcome::Discarded => {}
        TurnOutcome::Settled(reply) => {
            if let Some(id) = ctl.chat_id() {
                println!("[chat {id}]");
            }
            print_message(&reply);
            if args.export {
                if reply.report.is_none() {
                    println!("No bias report in this reply; nothing exported.");
                } else {
                    let path = export_from_conversation(
                        ctl.conversation(),
                        Some(&reply.id),
                        configured_format(&conn.config),
                        &export_dir(&conn.config),
                    )?;
                    println!("Exported {}", path.display());
                }
            }
        }
    }
    Ok(())
}

pub async fn run_delete(chat_id: &str) -> Result<()> {
    let conn = Connection::open(load_config()?)?;
    let mut ctl = conn.controller(None);
    ctl.delete_chat(chat_id).await.map_err(explain)?;
    ctl.settle_background().await;
    println!("Deleted chat {chat_id}.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_gate_rejects_unlisted_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.pkl");
        std::fs::write(&path, b"x").unwrap();

        let err = check_upload_path(&path).unwrap_err().to_string();
        assert!(err.contains("Unsupported file type"));
        assert!(err.contains(".csv, .json, .txt, .xlsx"));
    }

    #[test]
    fn upload_gate_accepts_uppercase_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DATA.CSV");
        std::fs::write(&path, b"x").unwrap();

        check_upload_path(&path).unwrap();
    }

    #[test]
    fn upload_gate_reports_missing_file() {
        let err = check_upload_path(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
