//! Rendering of store data for the terminal and for JSON consumers

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table as TextTable, presets};
use dumpdb_formats::table::{Table, Value};
use serde_json::{Map, Number};

/// Create a table with the CLI's standard styling
pub fn create_table() -> TextTable {
    let mut table = TextTable::new();
    table
        .load_preset(presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Render the first `limit` rows of a data table
///
/// Index fields are listed first and marked with `*`.
pub fn render_table(data: &Table, limit: Option<usize>) -> TextTable {
    let order = column_order(data);
    let mut table = create_table();

    table.set_header(order.iter().map(|&pos| {
        let name = &data.columns()[pos].name;
        if data.index_fields().contains(name) {
            Cell::new(format!("{name}*"))
        } else {
            Cell::new(name)
        }
    }));

    let rows = limit.unwrap_or(usize::MAX).min(data.row_count());
    for row in 0..rows {
        table.add_row(order.iter().map(|&pos| {
            let value = &data.columns()[pos].values[row];
            let cell = Cell::new(value.to_string());
            match value {
                Value::Int(_) | Value::Float(_) => cell.set_alignment(CellAlignment::Right),
                _ => cell,
            }
        }));
    }

    table
}

/// Rows as JSON objects keyed by column name
pub fn table_to_json(data: &Table, limit: Option<usize>) -> serde_json::Value {
    let rows = limit.unwrap_or(usize::MAX).min(data.row_count());
    let records: Vec<serde_json::Value> = (0..rows)
        .map(|row| {
            let mut record = Map::new();
            for column in data.columns() {
                record.insert(column.name.clone(), value_to_json(&column.values[row]));
            }
            serde_json::Value::Object(record)
        })
        .collect();

    serde_json::json!({
        "index": data.index_fields(),
        "columns": data.column_names(),
        "row_count": data.row_count(),
        "rows": records,
    })
}

/// Convert one cell to JSON; missing and non-finite values become `null`
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Int(n) => serde_json::Value::from(*n),
        Value::Float(x) => Number::from_f64(*x).map_or(serde_json::Value::Null, Into::into),
        Value::Str(s) => serde_json::Value::from(s.as_str()),
        Value::Timestamp(_) => serde_json::Value::from(value.to_string()),
        Value::Missing => serde_json::Value::Null,
    }
}

/// Format a byte count for humans
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

fn column_order(data: &Table) -> Vec<usize> {
    let index: Vec<usize> = data
        .index_fields()
        .iter()
        .filter_map(|f| data.column_position(f))
        .collect();
    let rest = (0..data.column_count()).filter(|pos| !index.contains(pos));
    index.iter().copied().chain(rest).collect()
}
