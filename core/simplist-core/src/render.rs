//! Projects a snapshot onto the rows a tile displays.

use serde::Serialize;

use crate::snapshot::Snapshot;
use crate::types::SizeClass;

pub const EMPTY_STATE_MESSAGE: &str = "No todos yet";
pub const EMPTY_TODO_LABEL: &str = "Empty todo";

/// Button attached to a row when the platform supports interactive tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "index", rename_all = "snake_case")]
pub enum TileAction {
    Toggle(usize),
    Delete(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileRow {
    /// Position in the stored list; the address toggle/delete act on.
    pub index: usize,
    pub label: String,
    pub is_done: bool,
    pub actions: Vec<TileAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TileView {
    Empty { message: String },
    Rows { rows: Vec<TileRow> },
}

/// Builds the tile for `size`, truncating again in case the snapshot was taken
/// for a larger family.
pub fn render(size: SizeClass, snapshot: &Snapshot, interactive: bool) -> TileView {
    if snapshot.items.is_empty() {
        return TileView::Empty {
            message: EMPTY_STATE_MESSAGE.to_string(),
        };
    }

    let rows = snapshot
        .items
        .iter()
        .take(size.capacity())
        .enumerate()
        .map(|(index, item)| TileRow {
            index,
            label: if item.text.is_empty() {
                EMPTY_TODO_LABEL.to_string()
            } else {
                item.text.clone()
            },
            is_done: item.is_done,
            actions: if interactive {
                vec![TileAction::Toggle(index), TileAction::Delete(index)]
            } else {
                Vec::new()
            },
        })
        .collect();

    TileView::Rows { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TodoItem;
    use chrono::Utc;

    fn snapshot(items: Vec<TodoItem>) -> Snapshot {
        Snapshot {
            timestamp: Utc::now(),
            total: items.len(),
            items,
        }
    }

    #[test]
    fn empty_snapshot_renders_placeholder() {
        let view = render(SizeClass::Small, &snapshot(Vec::new()), true);
        assert_eq!(
            view,
            TileView::Empty {
                message: "No todos yet".to_string()
            }
        );
    }

    #[test]
    fn empty_text_gets_placeholder_label() {
        let view = render(
            SizeClass::Small,
            &snapshot(vec![TodoItem::new("", true)]),
            false,
        );
        let TileView::Rows { rows } = view else {
            panic!("expected rows");
        };
        assert_eq!(rows[0].label, "Empty todo");
        assert!(rows[0].is_done);
        assert!(rows[0].actions.is_empty());
    }

    #[test]
    fn interactive_rows_carry_their_index() {
        let items = vec![TodoItem::new("a", false), TodoItem::new("b", false)];
        let TileView::Rows { rows } = render(SizeClass::Medium, &snapshot(items), true) else {
            panic!("expected rows");
        };
        assert_eq!(
            rows[1].actions,
            vec![TileAction::Toggle(1), TileAction::Delete(1)]
        );
    }

    #[test]
    fn truncates_to_family_capacity() {
        let items: Vec<TodoItem> = (0..12)
            .map(|i| TodoItem::new(format!("{}", i), false))
            .collect();
        let TileView::Rows { rows } = render(SizeClass::Medium, &snapshot(items), false) else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[4].label, "4");
    }
}
