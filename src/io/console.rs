//! Highlighted status lines for batch progress. Pure formatting, no state.

use std::{env, fmt::Display};

const RESET: &str = "\x1b[0m";
const BLUE_BG: &str = "\x1b[44m\x1b[97m";
const LIGHT_BLUE_BG: &str = "\x1b[104m\x1b[30m";
const GREEN_BG: &str = "\x1b[102m\x1b[30m";
const RED_BG: &str = "\x1b[41m\x1b[97m";

fn colors_enabled() -> bool {
    env::var_os("NO_COLOR").is_none()
}

fn highlight(code: &str, text: impl Display) -> String {
    if colors_enabled() {
        format!("{code}{text}{RESET}")
    } else {
        text.to_string()
    }
}

pub fn processing(index: usize, total: usize, folder: &str) -> String {
    highlight(
        BLUE_BG,
        format!("⏳ ({index} / {total}) Processing folder: {folder}"),
    )
}

pub fn skipped(folder: &str) -> String {
    highlight(
        LIGHT_BLUE_BG,
        format!("⏩ Skipping folder '{folder}' as #INSTRUMENTAL or #VOCALS tag already exists."),
    )
}

pub fn finished(folder: &str) -> String {
    highlight(GREEN_BG, format!("✅ Finished processing folder: {folder}"))
}

pub fn failed(folder: &str, error: impl Display) -> String {
    highlight(RED_BG, format!("🚩 Error processing folder {folder}: {error}"))
}

pub fn summary(processed: usize, skipped: usize, failed: usize) -> String {
    let text = format!("🏁 Done: {processed} processed, {skipped} skipped, {failed} failed");
    if failed > 0 {
        highlight(RED_BG, text)
    } else {
        highlight(GREEN_BG, text)
    }
}
