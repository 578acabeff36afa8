//! Plain-text rendering of a tile for the terminal.

use simplist_core::{TileAction, TileView};

pub fn format_tile(view: &TileView) -> String {
    match view {
        TileView::Empty { message } => message.clone(),
        TileView::Rows { rows } => rows
            .iter()
            .map(|row| {
                let mark = if row.is_done { "x" } else { " " };
                let buttons = if row.actions.contains(&TileAction::Delete(row.index)) {
                    "  (toggle/delete)"
                } else {
                    ""
                };
                format!("{:>2}. [{}] {}{}", row.index, mark, row.label, buttons)
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
