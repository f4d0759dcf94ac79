//! Terminal progress output. Everything here is silenced by quiet mode except errors.

use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

const RULE_WIDTH: usize = 50;

pub fn set_quiet_mode(enabled: bool) {
    QUIET_MODE.store(enabled, Ordering::Relaxed);
}

pub fn is_quiet_mode() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

fn emit(line: ColoredString) {
    if !is_quiet_mode() {
        println!("{line}");
    }
}

/// Spinner for a pipeline step; hidden in quiet mode
pub fn create_spinner(message: &str) -> ProgressBar {
    if is_quiet_mode() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
        .template("{spinner:.cyan.bold} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Replace the spinner with a check line
pub fn finish_spinner(pb: &ProgressBar, message: &str) {
    pb.finish_and_clear();
    print_success(&format!("✔ {message}"));
}

pub fn print_intro(title: &str) {
    emit(format!(" {title} ").on_bright_blue().black().bold());
}

pub fn print_info(message: &str) {
    emit(message.cyan().bold());
}

pub fn print_warning(message: &str) {
    emit(message.yellow().bold());
}

pub fn print_success(message: &str) {
    emit(message.green().bold());
}

pub fn print_error(message: &str) {
    eprintln!("{}", message.red().bold());
}

pub fn print_version(version: &str) {
    println!(
        "{} {} {}",
        "📣 Herald".bright_blue().bold(),
        "version".cyan(),
        version.green()
    );
}

/// Content framed by two horizontal rules
pub fn print_bordered_content(content: &str) {
    let rule = "━".repeat(RULE_WIDTH);
    emit(rule.bright_blue());
    emit(content.normal());
    emit(rule.bright_blue());
}
