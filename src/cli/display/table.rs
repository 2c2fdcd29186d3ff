//! Table builder wrapper around comfy-table for consistent list display.

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use console::style;

/// Create a standard list table with the given headers.
///
/// Uses the NOTHING preset (no borders) for a clean CLI aesthetic.
pub fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
        );
    table
}

/// Render the table to string with a count header.
pub fn render_list(entity_name: &str, table: &Table, total: usize) -> String {
    if total == 0 {
        return format!("No {entity_name}s found.");
    }
    let noun = if total == 1 {
        entity_name.to_string()
    } else {
        format!("{entity_name}s")
    };
    format!("{} {noun}:\n{table}", style(total).bold())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_list_counts_rows() {
        console::set_colors_enabled(false);
        let mut table = list_table(&["issue", "action"]);
        table.add_row(vec!["acme/widgets#1", "created"]);

        let rendered = render_list("issue", &table, 1);
        assert!(rendered.starts_with("1 issue:\n"));
        assert!(rendered.contains("ISSUE"));
        assert!(rendered.contains("acme/widgets#1"));

        assert_eq!(render_list("issue", &list_table(&["issue"]), 0), "No issues found.");
    }
}
