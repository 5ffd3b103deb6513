use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen regions of the previewer
pub struct AppLayout {
    pub search_area: Rect,
    pub list_area: Rect,
    pub preview_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Search line on top, message list (60%) beside the preview (40%), status bar at the
    /// bottom
    pub fn new(area: Rect) -> Self {
        // Rows: search input, panes, status bar
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Search input
                Constraint::Min(3),    // Panes (at least 3 rows)
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        // Columns inside the pane row: message list + preview
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(60), // Message list
                Constraint::Percentage(40), // Preview
            ])
            .split(rows[1]);

        Self { search_area: rows[0], list_area: columns[0], preview_area: columns[1], status_area: rows[2] }
    }
}
