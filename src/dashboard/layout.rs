use crate::dashboard::config::{DashboardConfig, WidgetWidth};
use eframe::egui::{Pos2, Rect};

/// One visible widget on the dashboard. Its position is its index in
/// [`DashboardLayout::entries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetEntry {
    pub key: String,
    pub width: WidgetWidth,
}

impl WidgetEntry {
    pub fn new(key: impl Into<String>, width: WidgetWidth) -> Self {
        Self {
            key: key.into(),
            width,
        }
    }
}

/// Ordered set of visible widgets for the current session.
///
/// Keys are unique. Presence in the list means the widget is shown; `hide`
/// removes it for the rest of the session. None of the mutations can fail:
/// an unknown key is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardLayout {
    entries: Vec<WidgetEntry>,
}

impl DashboardLayout {
    /// Build a layout from entries, keeping the first occurrence of each key.
    pub fn new(entries: impl IntoIterator<Item = WidgetEntry>) -> Self {
        let mut layout = Self::default();
        for entry in entries {
            if layout.contains(&entry.key) {
                tracing::warn!(widget = %entry.key, "duplicate dashboard widget dropped");
                continue;
            }
            layout.entries.push(entry);
        }
        layout
    }

    /// Layout of `keys` in order, all at half width.
    pub fn from_keys<S: AsRef<str>>(keys: &[S]) -> Self {
        Self::new(
            keys.iter()
                .map(|k| WidgetEntry::new(k.as_ref(), WidgetWidth::Half)),
        )
    }

    pub fn from_config(cfg: &DashboardConfig) -> Self {
        Self::new(
            cfg.widgets
                .iter()
                .map(|slot| WidgetEntry::new(slot.key.clone(), slot.width)),
        )
    }

    pub fn entries(&self) -> &[WidgetEntry] {
        &self.entries
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn width_of(&self, key: &str) -> Option<WidgetWidth> {
        self.entries.iter().find(|e| e.key == key).map(|e| e.width)
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }

    pub fn move_to_top(&mut self, key: &str) {
        let Some(idx) = self.position(key) else {
            tracing::debug!(widget = key, "move_to_top ignored for unknown widget");
            return;
        };
        let entry = self.entries.remove(idx);
        self.entries.insert(0, entry);
    }

    pub fn move_to_bottom(&mut self, key: &str) {
        let Some(idx) = self.position(key) else {
            tracing::debug!(widget = key, "move_to_bottom ignored for unknown widget");
            return;
        };
        let entry = self.entries.remove(idx);
        self.entries.push(entry);
    }

    pub fn toggle_width(&mut self, key: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key == key) {
            entry.width = entry.width.toggled();
        }
    }

    /// Remove `key` for the rest of the session. Returns whether it was shown.
    pub fn hide(&mut self, key: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.key != key);
        before != self.entries.len()
    }

    /// Move `dragged` to the index currently held by `target`.
    ///
    /// Dragging downwards lands after the target, dragging upwards lands
    /// before it. Dropping onto itself or naming an absent key is a no-op.
    pub fn reorder(&mut self, dragged: &str, target: &str) {
        if dragged == target {
            return;
        }
        let (Some(from), Some(to)) = (self.position(dragged), self.position(target)) else {
            tracing::debug!(dragged, target, "reorder ignored for unknown widget");
            return;
        };
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
    }
}

/// Grid cell assigned to an entry by [`place_entries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub key: String,
    pub row: usize,
    pub col: usize,
    pub col_span: usize,
}

/// Flow entries row-major into a grid of `columns` columns.
///
/// Half entries take one column. Full entries span every column; if the
/// current row already holds something they start on the next row, leaving
/// the remainder of that row empty.
pub fn place_entries(entries: &[WidgetEntry], columns: usize) -> Vec<Placement> {
    let columns = columns.max(1);
    let mut placements = Vec::with_capacity(entries.len());
    let mut row = 0;
    let mut col = 0;
    for entry in entries {
        match entry.width {
            WidgetWidth::Full => {
                if col != 0 {
                    row += 1;
                    col = 0;
                }
                placements.push(Placement {
                    key: entry.key.clone(),
                    row,
                    col: 0,
                    col_span: columns,
                });
                row += 1;
            }
            WidgetWidth::Half => {
                placements.push(Placement {
                    key: entry.key.clone(),
                    row,
                    col,
                    col_span: 1,
                });
                col += 1;
                if col == columns {
                    row += 1;
                    col = 0;
                }
            }
        }
    }
    placements
}

/// Closest-center drop resolution: the candidate whose rectangle centre is
/// nearest `pointer` wins. Ties keep the earlier candidate.
pub fn closest_center<'a>(pointer: Pos2, candidates: &'a [(String, Rect)]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|(key, rect)| (key.as_str(), rect.center().distance_sq(pointer)))
        .fold(None, |best: Option<(&str, f32)>, (key, dist)| match best {
            Some((_, best_dist)) if best_dist <= dist => best,
            _ => Some((key, dist)),
        })
        .map(|(key, _)| key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    fn keys(layout: &DashboardLayout) -> Vec<&str> {
        layout.keys()
    }

    #[test]
    fn move_to_bottom_scenario() {
        let mut layout = DashboardLayout::from_keys(&["weather", "system", "events"]);
        layout.move_to_bottom("weather");
        assert_eq!(keys(&layout), vec!["system", "events", "weather"]);
    }

    #[test]
    fn move_to_top_of_first_entry_is_identity() {
        let mut layout = DashboardLayout::from_keys(&["a", "b", "c"]);
        let before = layout.clone();
        layout.move_to_top("a");
        assert_eq!(layout, before);
    }

    #[test]
    fn hide_is_terminal() {
        let mut layout = DashboardLayout::from_keys(&["a", "b", "c"]);
        assert!(layout.hide("b"));
        assert_eq!(keys(&layout), vec!["a", "c"]);
        layout.move_to_top("b");
        layout.move_to_bottom("b");
        layout.toggle_width("b");
        layout.reorder("b", "a");
        assert_eq!(keys(&layout), vec!["a", "c"]);
        assert!(!layout.contains("b"));
        assert!(!layout.hide("b"));
    }

    #[test]
    fn toggle_width_twice_restores() {
        let mut layout = DashboardLayout::from_keys(&["a", "b", "c"]);
        layout.toggle_width("b");
        assert_eq!(layout.width_of("b"), Some(WidgetWidth::Full));
        assert_eq!(keys(&layout), vec!["a", "b", "c"]);
        layout.toggle_width("b");
        assert_eq!(layout.width_of("b"), Some(WidgetWidth::Half));
        assert_eq!(keys(&layout), vec!["a", "b", "c"]);
    }

    #[test]
    fn reorder_moves_to_target_index() {
        let mut layout = DashboardLayout::from_keys(&["a", "b", "c", "d"]);
        layout.reorder("a", "c");
        assert_eq!(keys(&layout), vec!["b", "c", "a", "d"]);
        layout.reorder("d", "b");
        assert_eq!(keys(&layout), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn reorder_onto_self_or_unknown_is_noop() {
        let mut layout = DashboardLayout::from_keys(&["a", "b", "c"]);
        layout.reorder("b", "b");
        layout.reorder("x", "a");
        layout.reorder("a", "x");
        assert_eq!(keys(&layout), vec!["a", "b", "c"]);
    }

    #[test]
    fn construction_drops_duplicate_keys() {
        let layout = DashboardLayout::from_keys(&["a", "b", "a", "c", "b"]);
        assert_eq!(keys(&layout), vec!["a", "b", "c"]);
    }

    #[test]
    fn keys_stay_unique_under_mixed_operations() {
        let mut layout = DashboardLayout::from_keys(&["a", "b", "c", "d", "e"]);
        let ops: &[(&str, &str)] = &[
            ("top", "c"),
            ("drag", "a:e"),
            ("bottom", "c"),
            ("hide", "d"),
            ("drag", "e:b"),
            ("top", "d"),
            ("drag", "c:c"),
            ("bottom", "b"),
        ];
        for (op, arg) in ops {
            match *op {
                "top" => layout.move_to_top(arg),
                "bottom" => layout.move_to_bottom(arg),
                "hide" => {
                    layout.hide(arg);
                }
                "drag" => {
                    let (from, to) = arg.split_once(':').unwrap();
                    layout.reorder(from, to);
                }
                _ => unreachable!(),
            }
            let mut seen = std::collections::HashSet::new();
            assert!(layout.keys().iter().all(|k| seen.insert(*k)));
        }
        assert_eq!(layout.len(), 4);
        assert!(!layout.contains("d"));
    }

    #[test]
    fn full_entries_span_a_row_of_their_own() {
        let layout = DashboardLayout::new(vec![
            WidgetEntry::new("a", WidgetWidth::Half),
            WidgetEntry::new("b", WidgetWidth::Full),
            WidgetEntry::new("c", WidgetWidth::Half),
            WidgetEntry::new("d", WidgetWidth::Half),
            WidgetEntry::new("e", WidgetWidth::Half),
        ]);
        let placed = place_entries(layout.entries(), 2);
        let cells: Vec<(&str, usize, usize, usize)> = placed
            .iter()
            .map(|p| (p.key.as_str(), p.row, p.col, p.col_span))
            .collect();
        assert_eq!(
            cells,
            vec![
                ("a", 0, 0, 1),
                ("b", 1, 0, 2),
                ("c", 2, 0, 1),
                ("d", 2, 1, 1),
                ("e", 3, 0, 1),
            ]
        );
    }

    #[test]
    fn single_column_places_everything_in_its_own_row() {
        let layout = DashboardLayout::from_keys(&["a", "b"]);
        let placed = place_entries(layout.entries(), 0);
        assert_eq!(placed[0].row, 0);
        assert_eq!(placed[1].row, 1);
        assert!(placed.iter().all(|p| p.col == 0 && p.col_span == 1));
    }

    #[test]
    fn closest_center_picks_nearest_card() {
        let cards = vec![
            ("a".to_string(), Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 100.0))),
            ("b".to_string(), Rect::from_min_size(pos2(110.0, 0.0), vec2(100.0, 100.0))),
            ("c".to_string(), Rect::from_min_size(pos2(0.0, 110.0), vec2(210.0, 100.0))),
        ];
        assert_eq!(closest_center(pos2(150.0, 40.0), &cards), Some("b"));
        assert_eq!(closest_center(pos2(120.0, 180.0), &cards), Some("c"));
        assert_eq!(closest_center(pos2(0.0, 0.0), &[]), None);
    }
}
