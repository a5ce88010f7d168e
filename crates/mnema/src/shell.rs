// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnema shell` command implementation.
//!
//! Launches an interactive REPL with a colored prompt and readline history.
//! Every invocation starts a fresh session; the profile, stored history and
//! vector memory carry over between sessions.

use std::time::Instant;

use colored::Colorize;
use mnema_agent::{Agent, TurnState};
use mnema_config::MnemaConfig;
use mnema_core::MnemaError;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{info, warn};

use crate::runtime::build_deps;

/// A line typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
enum ShellInput<'a> {
    Quit,
    ShowProfile,
    ShowSummary,
    Blank,
    Message(&'a str),
}

fn classify(line: &str) -> ShellInput<'_> {
    match line.trim() {
        "/quit" | "/exit" => ShellInput::Quit,
        "/profile" => ShellInput::ShowProfile,
        "/summary" => ShellInput::ShowSummary,
        "" => ShellInput::Blank,
        text => ShellInput::Message(text),
    }
}

/// Runs the `mnema shell` interactive REPL.
pub async fn run_shell(config: MnemaConfig) -> Result<(), MnemaError> {
    let deps = build_deps(&config).await?;
    let mut agent = Agent::new(&config, deps).await?;

    let mut rl = DefaultEditor::new()
        .map_err(|e| MnemaError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{} shell", config.agent.name).bold().green());
    println!(
        "Type {} or {} to leave, {} or {} to inspect memory.\n",
        "/exit".yellow(),
        "/quit".yellow(),
        "/profile".yellow(),
        "/summary".yellow()
    );

    let prompt = format!("{}> ", "you".cyan());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => match classify(&line) {
                ShellInput::Quit => break,
                ShellInput::Blank => continue,
                ShellInput::ShowProfile => {
                    if let Err(e) = agent.refresh_profile().await {
                        warn!(error = %e, "profile refresh failed");
                    }
                    let profile = agent.profile();
                    if profile.is_empty() {
                        println!("{}\n", "nothing known yet".dimmed());
                    } else {
                        println!("{}\n", profile.render());
                    }
                }
                ShellInput::ShowSummary => match agent.latest_summary().await {
                    Ok(Some(text)) => println!("{text}\n"),
                    Ok(None) => println!("{}\n", "no summary yet".dimmed()),
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                },
                ShellInput::Message(text) => {
                    let _ = rl.add_history_entry(line.as_str());
                    let started = Instant::now();
                    let report = agent.turn(text).await;
                    let elapsed = started.elapsed();

                    let label = format!("{}>", config.agent.name);
                    let label = match report.state {
                        TurnState::Error => label.red(),
                        TurnState::DegradedAnswer => label.yellow(),
                        _ => label.green(),
                    };
                    println!("{} {}", label.bold(), report.reply);
                    println!("{}\n", format!("({:.2}s)", elapsed.as_secs_f64()).dimmed());
                }
            },
            // Ctrl+C / Ctrl+D
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    info!(session_id = %agent.session().session_id, "shell session ended");
    agent.shutdown().await
}
