//! UI utilities for the CLI

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, BufRead, IsTerminal, Write};
use stylerag_core::{Citation, Diagnostics, QaResponse, Result};

const PROMPT: &str = "style>";

/// Display startup banner
pub fn display_banner() {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(67, terminal_width.saturating_sub(4)).max(40);

    let top_border = format!("┌{}┐", "─".repeat(banner_width - 2));
    let bottom_border = format!("└{}┘", "─".repeat(banner_width - 2));
    let empty_line = format!("│{}│", " ".repeat(banner_width - 2));

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());

    let lines = [
        "Codestyle Q&A",
        "",
        "Ask how code should be written; answers are grounded",
        "in passages retrieved from the indexed style guides.",
        "",
        "Type 'info' for index details, 'help' for commands.",
    ];

    for line in lines {
        if line.is_empty() {
            println!("{}", empty_line.blue());
            continue;
        }
        let padding = " ".repeat(banner_width.saturating_sub(line.chars().count() + 4));
        println!("{}", format!("│  {}{}│", line, padding).blue());
    }

    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
}

/// Handle input with question history navigation.
///
/// Returns `None` once the user is done: end of input, Ctrl-C or Ctrl-D.
pub async fn handle_input_with_history(history: &mut Vec<String>) -> Result<Option<String>> {
    // Piped input: read a line straight from stdin
    if !io::stdin().is_terminal() {
        return read_piped_line(io::stdin().lock(), history);
    }

    enable_raw_mode()?;
    let result = read_line_raw(history);
    disable_raw_mode()?;
    println!();

    let input = result?;
    if let Some(line) = &input {
        if !line.is_empty() {
            history.push(line.clone());
        }
    }
    Ok(input)
}

/// Read one line from a non-interactive source; `None` at end of input
pub(crate) fn read_piped_line(
    mut reader: impl BufRead,
    history: &mut Vec<String>,
) -> Result<Option<String>> {
    let mut input = String::new();
    if reader.read_line(&mut input)? == 0 {
        return Ok(None);
    }
    let input = input.trim().to_string();
    if !input.is_empty() {
        history.push(input.clone());
    }
    Ok(Some(input))
}

fn redraw(input: &str) -> io::Result<()> {
    print!("\r{} {}  \r{} {}", PROMPT.green().bold(), " ".repeat(60), PROMPT.green().bold(), input);
    io::stdout().flush()
}

/// Line editor in raw mode; the cursor always sits at the end of the line
fn read_line_raw(history: &[String]) -> Result<Option<String>> {
    let mut input = String::new();
    let mut history_index: Option<usize> = None;

    print!("{} ", PROMPT.green().bold());
    io::stdout().flush()?;

    loop {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        if key_event.kind != KeyEventKind::Press {
            continue;
        }

        if key_event.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key_event.code, KeyCode::Char('c') | KeyCode::Char('d'))
        {
            return Ok(None);
        }

        match key_event.code {
            KeyCode::Enter => return Ok(Some(input.trim().to_string())),
            KeyCode::Esc => return Ok(Some(String::new())),
            KeyCode::Char(c) => {
                input.push(c);
                redraw(&input)?;
            }
            KeyCode::Backspace => {
                if input.pop().is_some() {
                    redraw(&input)?;
                }
            }
            KeyCode::Up if !history.is_empty() => {
                let new_index = match history_index {
                    None => history.len() - 1,
                    Some(idx) => idx.saturating_sub(1),
                };
                history_index = Some(new_index);
                input = history[new_index].clone();
                redraw(&input)?;
            }
            KeyCode::Down => {
                if let Some(idx) = history_index {
                    if idx + 1 < history.len() {
                        history_index = Some(idx + 1);
                        input = history[idx + 1].clone();
                    } else {
                        history_index = None;
                        input.clear();
                    }
                    redraw(&input)?;
                }
            }
            _ => {}
        }
    }
}

/// One line of the sources list
pub fn format_source_line(citation: &Citation) -> String {
    format!("• {}", citation)
}

/// The diagnostics panel as plain text
pub fn format_diagnostics(diagnostics: &Diagnostics) -> String {
    [
        format!("Index name: {}", diagnostics.index_name),
        format!("Index size: {}", diagnostics.vector_count),
        format!("Embedding model: {}", diagnostics.embedding_model),
        format!("Vector dimensionality: {}", diagnostics.dimension),
        format!("Generation model: {}", diagnostics.generation_model),
    ]
    .join("\n")
}

/// Print the answer followed by the sources that grounded it
pub fn print_answer(response: &QaResponse) {
    println!();
    if response.answer.is_empty() {
        println!("{}", "No answer available.".yellow());
    } else {
        println!("{}", response.answer.text);
    }

    println!();
    println!("{}", "Sources".bold());
    if response.answer.citations.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for citation in &response.answer.citations {
        println!("  {}", format_source_line(citation));
    }
    println!();
}

/// Print the diagnostics panel
pub fn print_diagnostics(diagnostics: &Diagnostics) {
    println!("{}", "Info".bold());
    for line in format_diagnostics(diagnostics).lines() {
        println!("  {}", line);
    }
    println!();
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {} - Ask a question about code style", "question".green());
    println!("  {} - Show index and model details", "info".green());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  How to name a variable?");
    println!("  Should I use tabs or spaces?");
    println!("  When are exceptions allowed?");
}
