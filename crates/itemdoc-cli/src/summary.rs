use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use itemdoc_cli::commands::{ExtractResult, InspectResult, RewriteResult};
use itemdoc_model::{IssueSeverity, Report};

pub fn print_inspect(result: &InspectResult) {
    println!("Document: {}", result.source);
    println!("Type: {}", result.kind.as_str());
    if let Some(micro) = &result.micro {
        println!("Microcontroller: {micro}");
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Entity"), header_cell("Count")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (item_type, count) in &result.item_types {
        table.add_row(vec![Cell::new(format!("item ({item_type})")), Cell::new(count)]);
    }
    table.add_row(vec![
        Cell::new("items").add_attribute(Attribute::Bold),
        Cell::new(result.items).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("connectors"), Cell::new(result.connectors)]);
    table.add_row(vec![Cell::new("nodes"), Cell::new(result.nodes)]);
    table.add_row(vec![
        Cell::new("errors"),
        count_cell(result.report.error_count(), Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("warnings"),
        count_cell(result.report.warning_count(), Color::Yellow),
    ]);
    println!("{table}");
    print_issue_table(&result.report);
}

pub fn print_inspect_json(result: &InspectResult) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

/// Print the document text, or where it was written.
pub fn print_rewrite(result: &RewriteResult) {
    if let Some(text) = &result.text {
        print!("{text}");
    }
    if let Some(path) = &result.written {
        print_written(path, result);
    }
    print_issue_table_to_stderr(&result.report);
}

fn print_written(path: &Path, result: &RewriteResult) {
    println!(
        "Wrote {} ({} items, {} connectors, {} nodes)",
        path.display(),
        result.snapshot.items.len(),
        result.snapshot.connectors.len(),
        result.snapshot.nodes.len()
    );
}

pub fn print_extract(result: &ExtractResult) {
    println!("Region: {}", result.source);
    println!("Sub-circuit: {}", result.summary.container);
    let mut table = Table::new();
    table.set_header(vec![header_cell("Pin"), header_cell("Name")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, name) in result.summary.pin_names.iter().enumerate() {
        let name_cell = if name.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(name)
        };
        table.add_row(vec![Cell::new(index), name_cell]);
    }
    println!("{table}");
    println!(
        "Adopted {} items, {} connectors, {} nodes",
        result.summary.items, result.summary.connectors, result.summary.nodes
    );
    print_issue_table(&result.report);
}

fn print_issue_table(report: &Report) {
    if let Some(table) = issue_table(report) {
        println!();
        println!("Issues:");
        println!("{table}");
    }
}

/// Rewritten documents may be on stdout, so issues go to stderr.
fn print_issue_table_to_stderr(report: &Report) {
    if let Some(table) = issue_table(report) {
        eprintln!("Issues:");
        eprintln!("{table}");
    }
}

fn issue_table(report: &Report) -> Option<Table> {
    if report.is_empty() {
        return None;
    }
    let mut issues: Vec<_> = report.issues.iter().collect();
    issues.sort_by_key(|issue| (severity_rank(issue.severity), issue.kind));
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Code"),
        header_cell("Entity"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for issue in issues {
        table.add_row(vec![
            severity_cell(issue.severity),
            Cell::new(issue.kind.as_str()),
            Cell::new(issue.entity.as_deref().unwrap_or("-")),
            Cell::new(&issue.message),
        ]);
    }
    Some(table)
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    if table.column_count() >= 4 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(9)),
            ColumnConstraint::UpperBoundary(Width::Fixed(22)),
            ColumnConstraint::UpperBoundary(Width::Percentage(25)),
            ColumnConstraint::LowerBoundary(Width::Fixed(20)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn severity_cell(severity: IssueSeverity) -> Cell {
    match severity {
        IssueSeverity::Error => Cell::new("ERROR").fg(Color::Red),
        IssueSeverity::Warning => Cell::new("WARN").fg(Color::Yellow),
    }
}

fn severity_rank(severity: IssueSeverity) -> u8 {
    match severity {
        IssueSeverity::Error => 0,
        IssueSeverity::Warning => 1,
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Dim)
}
