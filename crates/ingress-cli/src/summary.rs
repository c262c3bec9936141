use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use ingress_config::MatchTable;
use ingress_model::{Configuration, Pattern};
use ingress_pipeline::IngressOutcome;
use ingress_transform::TransformOutput;

pub fn print_outcome(outcome: &IngressOutcome) {
    println!("Submission: {}", outcome.source_id);
    println!("Entry point: {}", outcome.kind);
    if let Some(submitter) = &outcome.submitter {
        println!("Submitter: {submitter}");
    }
    if let Some(output) = &outcome.output {
        print_output(outcome.transform.as_str(), output);
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Uploaded"), header_cell("Route")]);
    apply_summary_table_style(&mut table);
    for path in &outcome.uploaded {
        let route = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("-")
            .to_ascii_lowercase();
        table.add_row(vec![Cell::new(path.display()), dim_cell(route)]);
    }
    println!("{table}");

    for warning in &outcome.warnings {
        println!("warning: {warning}");
    }
}

pub fn print_output(transform: &str, output: &TransformOutput) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Transform"), header_cell("Rows"), header_cell("Output")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![
        Cell::new(transform).fg(Color::Cyan),
        Cell::new(output.row_count).add_attribute(Attribute::Bold),
        Cell::new(output.csv_path.display()),
    ]);
    table.add_row(vec![
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(output.metadata_path.display()),
    ]);
    println!("{table}");
}

pub fn print_config(source_id: &str, config: &Configuration) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell(source_id)]);
    apply_table_style(&mut table);
    let inputs: Vec<String> = config
        .transform_inputs
        .iter()
        .map(|input| format!("{} [{}]", input.pattern, input.sanity_check))
        .collect();
    let kwargs: Vec<String> = config
        .transform_kwargs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    table.add_row(vec!["config_version".to_string(), config.config_version.to_string()]);
    table.add_row(vec!["secondary_function".to_string(), config.secondary_function.to_string()]);
    table.add_row(vec!["transform".to_string(), config.transform.to_string()]);
    table.add_row(vec!["transform_inputs".to_string(), inputs.join("\n")]);
    table.add_row(vec!["transform_kwargs".to_string(), kwargs.join("\n")]);
    table.add_row(vec![
        "required_files".to_string(),
        patterns_text(config.required_files.as_deref()),
    ]);
    table.add_row(vec![
        "supplementary_distributions".to_string(),
        patterns_text(config.supplementary_distributions.as_deref()),
    ]);
    table.add_row(vec![
        "supplementary_policy".to_string(),
        config
            .supplementary_policy
            .map_or_else(|| "(process default)".to_string(), |policy| format!("{policy:?}")),
    ]);
    println!("{table}");
}

pub fn print_config_table(table: &MatchTable) {
    let mut out = Table::new();
    out.set_header(vec![
        header_cell("#"),
        header_cell("Pattern"),
        header_cell("Entry point"),
        header_cell("Transform"),
        header_cell("Required"),
    ]);
    apply_summary_table_style(&mut out);
    align_column(&mut out, 0, CellAlignment::Right);
    for (index, entry) in table.table().entries().iter().enumerate() {
        out.add_row(vec![
            dim_cell(index + 1),
            Cell::new(&entry.pattern).fg(Color::Cyan),
            Cell::new(entry.config.secondary_function),
            Cell::new(entry.config.transform),
            Cell::new(patterns_text(entry.config.required_files.as_deref())),
        ]);
    }
    println!("{out}");
}

fn patterns_text(patterns: Option<&[Pattern]>) -> String {
    match patterns {
        None => "(missing)".to_string(),
        Some(patterns) => patterns
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}
