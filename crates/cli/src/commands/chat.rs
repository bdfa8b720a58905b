//! `supportdesk chat`: interactive support session.
//!
//! After each answer the user is asked whether it helped; `y` records a
//! satisfied verdict, `n` asks for a reason. Anything else is treated as the
//! next question. While a reason is pending, an empty line or `/skip` drops
//! it without recording anything. Slash commands:
//!
//! - `/skip`           dismiss the pending feedback prompt
//! - `/faq`            show the FAQ options at the current level
//! - `/faq <n>`        pick option n
//! - `/faq back`       go up one level
//! - `/faq reset`      back to the top
//! - `/mode agent|rag` switch answer mode
//! - `/reset`          forget the conversation
//! - `/quit`           leave

use std::io::Write;
use std::path::Path;
use supportdesk_agent::{ChatSession, FeedbackState, Mode, SupportDesk};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{load_config, require_api_key};

pub async fn run(config_path: Option<&Path>, agent: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    require_api_key(&config)?;
    let provider = supportdesk_providers::build_from_config(&config);

    eprint!("  Loading indexes...");
    let desk = SupportDesk::from_config(&config, provider).await?;
    eprint!("\r                    \r");

    let mode = Mode::from_agent_flag(agent || config.session.agent_by_default);
    let mut session = desk.new_session_with_mode(mode);

    println!();
    println!("  SupportDesk: Interactive Mode");
    println!();
    println!("  Model:     {}", config.model);
    println!("  Mode:      {}", session.mode);
    println!("  Tools:     {}", desk_tools(&desk));
    if desk.faq().is_some() {
        println!("  FAQ:       type /faq to browse");
    }
    println!();
    println!("  Type your question and press Enter.");
    println!("  Type /quit or Ctrl+D to leave.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(&session)?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            if session.feedback().state() == &FeedbackState::AwaitingReason {
                desk.skip_feedback(&mut session);
                println!();
            }
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            if !slash_command(&desk, &mut session, command) {
                break;
            }
            continue;
        }

        let state = session.feedback().state().clone();
        match state {
            FeedbackState::AwaitingChoice if is_yes(line) => {
                report(desk.choose_yes(&mut session));
                show_caption(&mut session);
                continue;
            }
            FeedbackState::AwaitingChoice if is_no(line) => {
                report(desk.choose_no(&mut session));
                show_caption(&mut session);
                continue;
            }
            FeedbackState::AwaitingReason => {
                report(desk.submit_reason(&mut session, line));
                show_caption(&mut session);
                continue;
            }
            _ => {}
        }

        eprint!("  ...");
        let result = desk.handle_message(&mut session, line).await;
        eprint!("\r     \r");
        match result {
            Ok(answer) => {
                println!();
                for line in answer.lines() {
                    println!("  Assistant > {line}");
                }
                println!();
                show_caption(&mut session);
            }
            Err(e) => {
                eprintln!("  [Error] {e}");
                println!();
            }
        }
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

fn desk_tools(desk: &SupportDesk) -> String {
    let names = desk.tool_names();
    if names.is_empty() {
        "none".into()
    } else {
        names.join(", ")
    }
}

fn prompt(session: &ChatSession) -> std::io::Result<()> {
    let label = match session.feedback().state() {
        FeedbackState::AwaitingChoice => "Helpful? [y/n] or ask again",
        FeedbackState::AwaitingReason => "Reason (/skip to ask something else)",
        _ => "You",
    };
    print!("  {label} > ");
    std::io::stdout().flush()
}

fn show_caption(session: &mut ChatSession) {
    if let Some(caption) = session.feedback_caption() {
        println!("  {caption}");
        println!();
    }
}

fn report<E: std::fmt::Display>(result: Result<(), E>) {
    if let Err(e) = result {
        eprintln!("  [Feedback] {e}");
    }
}

fn is_yes(line: &str) -> bool {
    matches!(line.to_lowercase().as_str(), "y" | "yes")
}

fn is_no(line: &str) -> bool {
    matches!(line.to_lowercase().as_str(), "n" | "no")
}

/// Run a slash command. Returns `false` when the session should end.
fn slash_command(desk: &SupportDesk, session: &mut ChatSession, command: &str) -> bool {
    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("quit" | "exit"), _) => return false,
        (Some("skip"), _) => {
            desk.skip_feedback(session);
            println!();
        }
        (Some("reset"), _) => {
            session.reset();
            println!("  Conversation cleared.\n");
        }
        (Some("mode"), Some("agent")) => set_mode(session, Mode::AgentEnabled),
        (Some("mode"), Some("rag")) => set_mode(session, Mode::AgentDisabled),
        (Some("mode"), _) => println!("  Mode: {} (use /mode agent or /mode rag)\n", session.mode),
        (Some("faq"), arg) => faq_command(desk, session, arg),
        _ => println!("  Commands: /faq [n|back|reset], /mode agent|rag, /skip, /reset, /quit\n"),
    }
    true
}

fn set_mode(session: &mut ChatSession, mode: Mode) {
    session.mode = mode;
    println!("  Mode: {mode}\n");
}

fn faq_command(desk: &SupportDesk, session: &mut ChatSession, arg: Option<&str>) {
    let Some(tree) = desk.faq() else {
        println!("  No FAQ configured (set faq_path in the config).\n");
        return;
    };

    match arg {
        None => {}
        Some("back") => session.faq.back(),
        Some("reset") => session.faq.clear(),
        Some(n) => match n.parse::<usize>() {
            Ok(n) if n >= 1 => {
                if let Err(e) = session.faq.descend(tree, n - 1) {
                    println!("  {e}\n");
                    return;
                }
            }
            _ => {
                println!("  Usage: /faq [n|back|reset]\n");
                return;
            }
        },
    }

    let breadcrumb = session.faq.breadcrumb(tree);
    if !breadcrumb.is_empty() {
        println!("  FAQ: {}", breadcrumb.join(" > "));
    }
    if let Some(answer) = session.faq.answer(tree) {
        println!();
        for line in answer.lines() {
            println!("  {line}");
        }
        println!();
    }
    for (i, node) in session.faq.options(tree).iter().enumerate() {
        let marker = if node.is_leaf() { "?" } else { ">" };
        println!("  {:>2}. {} {}", i + 1, node.label, marker);
    }
    println!();
}
