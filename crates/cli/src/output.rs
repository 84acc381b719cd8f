use biasbuster_core::{BiasReport, ChatSummary, Message};

/// One transcript line per side of a turn.
pub fn print_message(message: &Message) {
    if message.is_user_turn() {
        println!("you> {}", message.text);
    }
    if !message.response.is_empty() {
        println!("biasbuster> {}", message.response);
    }
    if let Some(report) = &message.report {
        print_report(report);
        println!("  (report id {})", message.id);
    }
}

pub fn print_report(report: &BiasReport) {
    println!("  Result: {}", report.result);
    println!("  Explanation:");
    for line in report.explanation.lines() {
        println!("    {line}");
    }
    println!("  How to Fix:");
    for line in report.how_to_fix.lines() {
        println!("    {line}");
    }
}

/// Numbered chat list, as `/open N` expects it.
pub fn print_history(chats: &[ChatSummary]) {
    if chats.is_empty() {
        println!("No chats yet.");
        return;
    }
    for (i, chat) in chats.iter().enumerate() {
        println!(
            "{:>3}. {}  {}  {}",
            i + 1,
            chat.created_at.format("%Y-%m-%d %H:%M"),
            chat.id,
            truncate(&chat.last_message, 60)
        );
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() <= max_chars {
        return first_line.to_string();
    }
    let cut: String = first_line.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{cut}...")
}
