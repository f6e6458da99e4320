//! Panes: titled widget containers positioned on the dashboard grid.

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::widget::WidgetModel;

/// A pane's row or column position, kept per column-count so a layout
/// arranged for a wide grid survives a switch to a narrow one.
///
/// Older documents stored a single number meaning "this position at any
/// column count"; that shape still deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PositionMap {
    PerColumns(BTreeMap<u32, u32>),
    Legacy(u32),
}

impl Default for PositionMap {
    fn default() -> Self {
        Self::PerColumns(BTreeMap::new())
    }
}

impl PositionMap {
    /// Resolve the position for a grid with the given column count.
    ///
    /// Exact match wins; otherwise the entry for the largest smaller
    /// column count applies, then the smallest recorded one. An empty map
    /// resolves to 1.
    pub fn for_columns(&self, columns: u32) -> u32 {
        match self {
            Self::Legacy(value) => *value,
            Self::PerColumns(map) => {
                if let Some(value) = map.get(&columns) {
                    return *value;
                }
                if let Some((_, value)) = map.range(..columns).next_back() {
                    return *value;
                }
                map.values().next().copied().unwrap_or(1)
            }
        }
    }

    /// Record the position for the given column count, upgrading a legacy
    /// single value to the per-column shape.
    pub fn set_for_columns(&mut self, columns: u32, value: u32) {
        if let Self::Legacy(_) = self {
            *self = Self::PerColumns(BTreeMap::new());
        }
        if let Self::PerColumns(map) = self {
            map.insert(columns, value);
        }
    }
}

/// A titled container holding a vertical stack of widgets.
pub struct PaneModel {
    title: String,
    width: u32,
    /// Horizontal span in grid columns.
    col_width: u32,
    row: PositionMap,
    col: PositionMap,
    widgets: Vec<WidgetModel>,
}

impl Default for PaneModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PaneModel {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            width: 1,
            col_width: 1,
            row: PositionMap::default(),
            col: PositionMap::default(),
            widgets: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = width.max(1);
    }

    pub fn col_width(&self) -> u32 {
        self.col_width
    }

    pub fn set_col_width(&mut self, col_width: u32) {
        self.col_width = col_width.max(1);
    }

    pub fn row(&self) -> &PositionMap {
        &self.row
    }

    pub fn col(&self) -> &PositionMap {
        &self.col
    }

    pub fn set_row(&mut self, row: PositionMap) {
        self.row = row;
    }

    pub fn set_col(&mut self, col: PositionMap) {
        self.col = col;
    }

    /// Record the pane's grid position for the given column count.
    pub fn set_position(&mut self, columns: u32, row: u32, col: u32) {
        self.row.set_for_columns(columns, row);
        self.col.set_for_columns(columns, col);
    }

    pub fn position_for_columns(&self, columns: u32) -> (u32, u32) {
        (self.row.for_columns(columns), self.col.for_columns(columns))
    }

    pub fn widgets(&self) -> &[WidgetModel] {
        &self.widgets
    }

    pub fn widgets_mut(&mut self) -> &mut [WidgetModel] {
        &mut self.widgets
    }

    pub fn add_widget(&mut self, widget: WidgetModel) {
        self.widgets.push(widget);
    }

    /// Remove and dispose the widget at the given index.
    pub fn remove_widget(&mut self, index: usize) {
        if index < self.widgets.len() {
            let mut widget = self.widgets.remove(index);
            widget.dispose();
        }
    }

    pub fn widget_can_move_up(&self, index: usize) -> bool {
        index > 0 && index < self.widgets.len()
    }

    pub fn widget_can_move_down(&self, index: usize) -> bool {
        self.widgets.len() > 1 && index < self.widgets.len() - 1
    }

    /// Swap the widget with its upper neighbor. No-op at the boundary.
    pub fn move_widget_up(&mut self, index: usize) {
        if self.widget_can_move_up(index) {
            self.widgets.swap(index, index - 1);
        }
    }

    /// Swap the widget with its lower neighbor. No-op at the boundary.
    pub fn move_widget_down(&mut self, index: usize) {
        if self.widget_can_move_down(index) {
            self.widgets.swap(index, index + 1);
        }
    }

    /// Grid rows this pane occupies, derived from the stacked widget
    /// heights plus the pane chrome. Never less than four rows.
    pub fn calculated_height(&self) -> u32 {
        let blocks: u32 = self.widgets.iter().map(WidgetModel::height_blocks).sum();
        let pixels = (blocks * 6 + 3) * 10 + 20;
        let rows = pixels.div_ceil(30);
        rows.max(4)
    }

    /// Fan a datasource update out to every widget in the pane.
    pub fn process_datasource_update(&mut self, datasource: &str, data: &Map<String, Value>) {
        for widget in &mut self.widgets {
            widget.process_datasource_update(datasource, data);
        }
    }

    /// Forward user input to the widget at the given index.
    pub fn handle_widget_input(&mut self, index: usize, input: Value) {
        if let Some(widget) = self.widgets.get_mut(index) {
            widget.handle_input(input);
        }
    }

    /// Dispose every widget in the pane.
    pub fn dispose(&mut self) {
        for widget in &mut self.widgets {
            widget.dispose();
        }
        self.widgets.clear();
    }
}
