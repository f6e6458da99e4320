//! Grid layout bookkeeping.
//!
//! The engine does not render; the layout service is the seam where a
//! host (a terminal UI, a web frontend) mirrors pane geometry. The
//! in-memory [`GridLayout`] is both the default implementation and the
//! reference for the expected bookkeeping.


use std::collections::HashMap;

/// Geometry of one pane on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanePlacement {
    pub row: u32,
    pub col: u32,
    pub col_width: u32,
    pub height: u32,
}

/// Receives pane geometry changes from the dashboard.
///
/// Methods take pane identifiers assigned by the dashboard (stable for a
/// pane's lifetime, not reused until a full reload).
pub trait LayoutService: Send {
    fn add_pane(&mut self, pane_id: u64, placement: PanePlacement);

    fn remove_pane(&mut self, pane_id: u64);

    /// The pane moved or resized.
    fn reposition(&mut self, pane_id: u64, placement: PanePlacement);

    /// Everything was cleared, ahead of a dashboard reload.
    fn remove_all(&mut self);

    /// Current column count of the grid.
    fn columns(&self) -> u32;

    /// The user picked a different column count.
    fn set_columns(&mut self, columns: u32);
}

/// In-memory layout tracking pane placements by id.
pub struct GridLayout {
    columns: u32,
    placements: HashMap<u64, PanePlacement>,
}

impl GridLayout {
    pub const DEFAULT_COLUMNS: u32 = 3;
    pub const MAX_COLUMNS: u32 = 12;

    pub fn new(columns: u32) -> Self {
        Self {
            columns: columns.clamp(1, Self::MAX_COLUMNS),
            placements: HashMap::new(),
        }
    }

    pub fn placement(&self, pane_id: u64) -> Option<PanePlacement> {
        self.placements.get(&pane_id).copied()
    }

    pub fn pane_count(&self) -> usize {
        self.placements.len()
    }

    fn clamp(&self, mut placement: PanePlacement) -> PanePlacement {
        placement.col_width = placement.col_width.clamp(1, self.columns);
        placement.col = placement
            .col
            .clamp(1, self.columns - placement.col_width + 1);
        placement.row = placement.row.max(1);
        placement
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COLUMNS)
    }
}

impl LayoutService for GridLayout {
    fn add_pane(&mut self, pane_id: u64, placement: PanePlacement) {
        let placement = self.clamp(placement);
        self.placements.insert(pane_id, placement);
    }

    fn remove_pane(&mut self, pane_id: u64) {
        self.placements.remove(&pane_id);
    }

    fn reposition(&mut self, pane_id: u64, placement: PanePlacement) {
        let placement = self.clamp(placement);
        self.placements.insert(pane_id, placement);
    }

    fn remove_all(&mut self) {
        self.placements.clear();
    }

    fn columns(&self) -> u32 {
        self.columns
    }

    fn set_columns(&mut self, columns: u32) {
        self.columns = columns.clamp(1, Self::MAX_COLUMNS);
        // Panes past the new right edge get pulled back in
        let ids: Vec<u64> = self.placements.keys().copied().collect();
        for id in ids {
            if let Some(placement) = self.placements.get(&id).copied() {
                self.placements.insert(id, self.clamp(placement));
            }
        }
    }
}
