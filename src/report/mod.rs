//! Presenters turning statistics into chat text and spreadsheets.
//!
//! - **ranking**: top-N active members
//! - **war_summary**: current war outcome
//! - **export**: `.xlsx` table with grouped date labels

pub mod export;
pub mod ranking;
pub mod war_summary;

pub use export::{date_groups, render_xlsx, DateGroup, ExportError, EXPORT_FILE_NAME};
pub use ranking::{rank_top, render_ranking, top_players_message, Ranking, DEFAULT_TOP_COUNT};
pub use war_summary::{
    render_war_summary, summarize_war, WarOutcome, WarReport, WarResult, WarSummary,
};

/// Shown when the roster could not be fetched or is empty.
pub const NO_DATA_MESSAGE: &str = "⚠️ Could not fetch clan data, or the clan has no members.";

/// Characters Telegram's legacy Markdown treats as markup.
fn is_markup(c: char) -> bool {
    matches!(c, '_' | '*' | '`' | '[')
}

/// Render `text` in bold for Telegram's legacy Markdown.
///
/// Escapes are not allowed inside an entity, so markup characters are
/// written escaped between separate bold runs: `x*y` becomes `*x*\**y*`.
pub fn bold(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut run = String::new();
    for c in text.chars() {
        if is_markup(c) {
            push_bold_run(&mut out, &mut run);
            out.push('\\');
            out.push(c);
        } else {
            run.push(c);
        }
    }
    push_bold_run(&mut out, &mut run);
    out
}

fn push_bold_run(out: &mut String, run: &mut String) {
    if !run.is_empty() {
        out.push('*');
        out.push_str(run);
        out.push('*');
        run.clear();
    }
}
