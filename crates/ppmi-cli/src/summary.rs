use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use ppmi_registry::MeasureRegistry;

use crate::types::DeriveResult;

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

pub fn print_summary(result: &DeriveResult) {
    println!("Table: {}", result.table);
    println!("Output: {}", result.output.display());
    if let Some(path) = &result.long_output {
        println!("Audit table: {}", path.display());
    }
    println!("{} rows x {} columns", result.rows, result.columns);

    if !result.derived.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![header_cell("Measure"), header_cell("Rows")]);
        apply_table_style(&mut table);
        if let Some(column) = table.column_mut(1) {
            column.set_cell_alignment(CellAlignment::Right);
        }
        for measure in &result.derived {
            table.add_row(vec![Cell::new(&measure.name), Cell::new(measure.rows)]);
        }
        println!("{table}");
    }

    if !result.skipped.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![header_cell("Skipped"), header_cell("Reason")]);
        apply_table_style(&mut table);
        for skipped in &result.skipped {
            table.add_row(vec![
                Cell::new(&skipped.name).fg(Color::Yellow),
                Cell::new(&skipped.reason),
            ]);
        }
        println!("{table}");
    }
}

pub fn print_catalog(registry: &MeasureRegistry) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Kind"), header_cell("Measures")]);
    apply_table_style(&mut table);
    table.add_row(vec![
        Cell::new("behavioral"),
        Cell::new(registry.available_behavior().join(", ")),
    ]);
    table.add_row(vec![
        Cell::new("demographic"),
        Cell::new(registry.available_demographics().join(", ")),
    ]);
    println!("{table}");
}

pub fn print_export_measures(title: &str, measures: &[String]) {
    println!("{title}: {}", measures.join(", "));
}
