use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};
use sheetval_model::RuleCategory;
use sheetval_report::ErrorRow;
use sheetval_rules::{KindInfo, RuleStatistics, RuleSummaryRow};

use sheetval_cli::pipeline::RunOutcome;

const CATEGORIES: [RuleCategory; 5] = [
    RuleCategory::Simple,
    RuleCategory::MultiSimple,
    RuleCategory::Conditional,
    RuleCategory::Multicolumn,
    RuleCategory::Source,
];

pub fn print_run(outcome: &RunOutcome, max_errors: usize) {
    println!("File: {}", outcome.input.display());
    if let Some(sheet) = &outcome.sheet_name {
        println!("Sheet: {sheet}");
    }
    println!("Rows: {}  Rules: {}", outcome.rows, outcome.rules);

    let mut table = Table::new();
    table.set_header(vec![header_cell("Category"), header_cell("Errors")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for category in CATEGORIES {
        let count = outcome
            .summary
            .by_category
            .get(&category)
            .copied()
            .unwrap_or(0);
        if category == RuleCategory::Source && count == 0 {
            continue;
        }
        table.add_row(vec![Cell::new(category.label()), count_cell(count)]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        count_cell(outcome.summary.total_errors).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    if !outcome.summary.errors_by_type.is_empty() {
        let mut by_type = Table::new();
        by_type.set_header(vec![header_cell("Error type"), header_cell("Count")]);
        apply_table_style(&mut by_type);
        align_column(&mut by_type, 1, CellAlignment::Right);
        for (label, count) in &outcome.summary.errors_by_type {
            by_type.add_row(vec![Cell::new(label), count_cell(*count)]);
        }
        println!("{by_type}");
    }

    print_error_rows(&outcome.error_rows, max_errors);

    for path in [
        &outcome.outputs.errors_csv,
        &outcome.outputs.annotated,
        &outcome.outputs.report_json,
    ]
    .into_iter()
    .flatten()
    {
        println!("Wrote {}", path.display());
    }

    let message = Cell::new(&outcome.summary.message).add_attribute(Attribute::Bold);
    let message = if outcome.has_errors() {
        message.fg(Color::Red)
    } else {
        message.fg(Color::Green)
    };
    let mut footer = Table::new();
    footer.load_preset(UTF8_FULL_CONDENSED);
    footer.apply_modifier(UTF8_ROUND_CORNERS);
    footer.add_row(vec![message]);
    println!("{footer}");
}

fn print_error_rows(rows: &[ErrorRow], max_errors: usize) {
    if rows.is_empty() || max_errors == 0 {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Column(s)"),
        header_cell("Coordinate"),
        header_cell("Message"),
        header_cell("Value(s)"),
    ]);
    apply_error_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for row in rows.iter().take(max_errors) {
        table.add_row(vec![
            Cell::new(row.row),
            Cell::new(&row.columns),
            Cell::new(&row.coordinate).fg(Color::Blue),
            Cell::new(&row.message),
            value_cell(&row.values),
        ]);
    }
    println!();
    println!("Errors:");
    println!("{table}");
    if rows.len() > max_errors {
        println!("... {} more (use --errors-csv for the full list)", rows.len() - max_errors);
    }
}

pub fn print_sheets(names: &[String]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Sheet")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, name) in names.iter().enumerate() {
        table.add_row(vec![Cell::new(index + 1), Cell::new(name)]);
    }
    println!("{table}");
}

pub fn print_rules(rows: &[RuleSummaryRow]) {
    if rows.is_empty() {
        println!("No rules defined.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Category"),
        header_cell("Column(s)"),
        header_cell("Rule"),
        header_cell("Message"),
        header_cell("Status"),
    ]);
    apply_error_table_style(&mut table);
    align_column(&mut table, 5, CellAlignment::Center);
    for row in rows {
        let status = if row.active {
            Cell::new("active").fg(Color::Green)
        } else {
            dim_cell("inactive")
        };
        table.add_row(vec![
            Cell::new(&row.id).fg(Color::Blue),
            Cell::new(row.category),
            Cell::new(&row.columns),
            Cell::new(&row.rule),
            Cell::new(&row.message),
            status,
        ]);
    }
    println!("{table}");
}

pub fn print_statistics(stats: &RuleStatistics) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Statistic"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let counts = [
        ("Simple rules", stats.simple_rules),
        ("Multi simple rules", stats.multi_simple_rules),
        ("Conditional rules", stats.conditional_rules),
        ("Multicolumn rules", stats.multicolumn_rules),
        ("Active rules", stats.active_rules),
    ];
    for (label, count) in counts {
        table.add_row(vec![Cell::new(label), Cell::new(count)]);
    }
    table.add_row(vec![
        Cell::new("Total rules").add_attribute(Attribute::Bold),
        Cell::new(stats.total_rules).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("Created"), dim_cell(&stats.created_at)]);
    table.add_row(vec![Cell::new("Last modified"), dim_cell(&stats.last_modified)]);
    table.add_row(vec![Cell::new("Version"), dim_cell(&stats.version)]);
    println!("{table}");
}

pub fn print_kinds(title: &str, kinds: &[KindInfo]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Kind"),
        header_cell("Name"),
        header_cell("Parameters"),
        header_cell("Description"),
    ]);
    apply_error_table_style(&mut table);
    for info in kinds {
        let params = if info.params.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(info.params.join(", "))
        };
        table.add_row(vec![
            Cell::new(info.kind).fg(Color::Blue),
            Cell::new(info.name),
            params,
            Cell::new(info.description),
        ]);
    }
    println!("{title}:");
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_error_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    if table.column_count() == 5 {
        table.set_constraints(vec![
            ColumnConstraint::LowerBoundary(Width::Fixed(5)),
            ColumnConstraint::UpperBoundary(Width::Percentage(25)),
            ColumnConstraint::UpperBoundary(Width::Fixed(16)),
            ColumnConstraint::UpperBoundary(Width::Percentage(45)),
            ColumnConstraint::UpperBoundary(Width::Percentage(25)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn value_cell(values: &str) -> Cell {
    if values.trim_matches([',', ' ']).is_empty() {
        dim_cell("(empty)")
    } else {
        Cell::new(values)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
