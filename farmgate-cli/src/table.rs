//! Builds a [`TableView`] over records from command-line arguments.

use std::collections::BTreeSet;

use farmgate_lib::model::Record;
use farmgate_table::Alignment;
use farmgate_table::Column;
use farmgate_table::ColumnSet;
use farmgate_table::Filter;
use farmgate_table::FilterBar;
use farmgate_table::TableError;
use farmgate_table::TableOptions;
use farmgate_table::TableView;

use crate::args::ViewArgs;
use crate::config::TableConfig;

/// Key of the search filter.
pub const SEARCH: &str = "search";

/// Fields present in any record, the id field first and the rest sorted.
pub fn infer_columns(records: &[Record]) -> Vec<String> {
    let names: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.field_names())
        .filter(|name| *name != "id" && *name != "_id")
        .collect();

    let id_key = ["id", "_id"]
        .into_iter()
        .find(|key| records.iter().any(|r| r.contains(key)));
    id_key
        .into_iter()
        .chain(names)
        .map(String::from)
        .collect()
}

/// Numbers read better right-aligned.
fn alignment_for(key: &str, records: &[Record]) -> Alignment {
    let numeric = records
        .iter()
        .find_map(|r| r.get(key).filter(|v| !v.is_null()))
        .is_some_and(|v| v.as_f64().is_some());
    if numeric { Alignment::Right } else { Alignment::Left }
}

/// `createdAt` -> `Created At`, `unit_price` -> `Unit Price`.
pub fn title_case(key: &str) -> String {
    let mut title = String::with_capacity(key.len() + 4);
    let mut start = true;
    let mut prev_lower = false;
    for c in key.chars() {
        if c == '_' || c == '-' || c == '.' {
            start = true;
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower {
            start = true;
        }
        if start && !title.is_empty() {
            title.push(' ');
        }
        if start {
            title.extend(c.to_uppercase());
        } else {
            title.push(c);
        }
        start = false;
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
    }
    title
}

/// Builds the view for `keys`, applying filters, sort and hidden columns.
///
/// `sample` is only used to pick column alignment.
pub fn build_view(
    keys: &[String],
    sample: &[Record],
    args: &ViewArgs,
    config: &TableConfig,
) -> Result<TableView<Record>, TableError> {
    let columns = keys
        .iter()
        .map(|key| {
            Column::new(key.as_str(), title_case(key))
                .sortable()
                .align(alignment_for(key, sample))
        })
        .collect();
    let mut columns = ColumnSet::new(columns)?;
    for key in &args.hide {
        columns.set_visible(key, false)?;
    }

    let mut search = Filter::search(SEARCH, keys.iter().cloned());
    if args.fuzzy || config.fuzzy_search {
        search = search.fuzzy();
    }
    if let Some(text) = &args.search {
        search = search.with_value(text.as_str());
    }

    let mut filters = FilterBar::new();
    filters.push(search)?;
    for arg in &args.filters {
        let filter = if arg.is_date_range() {
            Filter::date_range(arg.field.as_str(), arg.field.as_str())
        } else {
            Filter::select(arg.field.as_str(), arg.field.as_str())
        };
        filters.push(filter.with_value(arg.value.clone()))?;
    }

    let options = TableOptions::new()
        .page_size(args.page_size.unwrap_or(config.page_size))
        .placeholder(config.placeholder.as_str());

    let mut view = TableView::new(columns)
        .with_options(options)
        .with_filters(filters);
    if let Some(sort) = &args.sort {
        view = view.with_sort(&sort.field, sort.direction)?;
    }
    Ok(view)
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use farmgate_lib::model::Value;

    use super::*;
    use crate::args::Cli;
    use crate::args::Command;

    fn view_args(extra: &[&str]) -> ViewArgs {
        let argv = ["farmgate", "show", "orders.json"].iter().chain(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Show { view, .. } => view,
            Command::Fetch { .. } => unreachable!(),
        }
    }

    fn orders() -> Vec<Record> {
        vec![
            Record::with_id("orders", "o1")
                .set("customer", "Blue Fin")
                .set("amount", 31.95)
                .set("status", "pending"),
            Record::with_id("orders", "o2")
                .set("customer", "Salmon Co")
                .set("amount", 120.0)
                .set("status", "confirmed")
                .set("notes", Value::Null),
        ]
    }

    #[test]
    fn test_infer_columns() {
        assert_eq!(infer_columns(&orders()), ["id", "amount", "customer", "notes", "status"]);
        assert!(infer_columns(&[]).is_empty());

        let mongo: Record = serde_json::from_str(r#"{"_id":"65f0","name":"Kale"}"#).unwrap();
        assert_eq!(infer_columns(&[mongo]), ["_id", "name"]);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("createdAt"), "Created At");
        assert_eq!(title_case("unit_price"), "Unit Price");
        assert_eq!(title_case("buyer.name"), "Buyer Name");
        assert_eq!(title_case("id"), "Id");
    }

    #[test]
    fn test_alignment() {
        let rows = orders();
        assert_eq!(alignment_for("amount", &rows), Alignment::Right);
        assert_eq!(alignment_for("customer", &rows), Alignment::Left);
        assert_eq!(alignment_for("notes", &rows), Alignment::Left);
    }

    #[test]
    fn test_build_view_applies_args() {
        let rows = orders();
        let keys = infer_columns(&rows);
        let args = view_args(&["-f", "status=pending", "--hide", "notes", "--sort", "amount:desc"]);
        let view = build_view(&keys, &rows, &args, &TableConfig::default()).unwrap();
        view.set_rows(rows);

        assert_eq!(view.visible_ids(), vec!["o1"]);
        assert_eq!(view.sort().map(|(k, _)| k).as_deref(), Some("amount"));
        let text = view.render();
        assert!(text.contains("31.95"));
        assert!(!text.contains("Notes"));
    }

    #[test]
    fn test_build_view_search() {
        let rows = orders();
        let keys = infer_columns(&rows);
        let args = view_args(&["--search", "salmon"]);
        let view = build_view(&keys, &rows, &args, &TableConfig::default()).unwrap();
        view.set_rows(rows);
        assert_eq!(view.visible_ids(), vec!["o2"]);
    }

    #[test]
    fn test_build_view_rejects_unknown_sort() {
        let rows = orders();
        let args = view_args(&["--sort", "weight"]);
        let err = build_view(&infer_columns(&rows), &rows, &args, &TableConfig::default()).unwrap_err();
        assert!(matches!(err, TableError::UnknownColumn { .. }));
    }

    #[test]
    fn test_duplicate_filter_rejected() {
        let rows = orders();
        let args = view_args(&["-f", "status=pending", "-f", "status=confirmed"]);
        let err = build_view(&infer_columns(&rows), &rows, &args, &TableConfig::default()).unwrap_err();
        assert!(matches!(err, TableError::DuplicateFilter { .. }));
    }
}
