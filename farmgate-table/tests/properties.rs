//! Behavioural properties of the client-side table.

use farmgate_lib::api::query::Direction;
use farmgate_lib::model::Record;
use farmgate_table::CheckState;
use farmgate_table::Column;
use farmgate_table::ColumnSet;
use farmgate_table::Filter;
use farmgate_table::FilterBar;
use farmgate_table::Selection;
use farmgate_table::SelectionPolicy;
use farmgate_table::TableEvent;
use farmgate_table::TableOptions;
use farmgate_table::TableView;
use rust_decimal::Decimal;

fn numbered(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            Record::with_id("products", format!("p{i:02}"))
                .set("name", format!("Product {i}"))
                .set("category", if i % 3 == 0 { "dairy" } else { "produce" })
        })
        .collect()
}

fn product_view(page_size: usize) -> TableView<Record> {
    let columns = ColumnSet::new(vec![
        Column::new("name", "Name").sortable(),
        Column::new("category", "Category").sortable(),
    ])
    .unwrap();
    let filters = FilterBar::new()
        .with(Filter::search("search", ["name"]))
        .with(Filter::select("category", "category"));
    TableView::new(columns)
        .with_options(
            TableOptions::new()
                .page_size(page_size)
                .show_row_selection(true),
        )
        .with_filters(filters)
}

#[test]
fn test_filters_compose_with_and() {
    let columns = ColumnSet::new(vec![
        Column::new("name", "Name"),
        Column::new("status", "Status"),
    ])
    .unwrap();
    let filters = FilterBar::new()
        .with(Filter::search("search", ["name", "email"]))
        .with(Filter::select("status", "status"));
    let view = TableView::new(columns).with_filters(filters);
    view.set_rows(vec![
        Record::with_id("farmers", "1")
            .set("name", "Green Acres")
            .set("email", "hello@greenacres.test")
            .set("status", "active"),
        Record::with_id("farmers", "2")
            .set("name", "Green Valley")
            .set("email", "gv@valley.test")
            .set("status", "suspended"),
        Record::with_id("farmers", "3")
            .set("name", "Hilltop")
            .set("email", "green@hilltop.test")
            .set("status", "active"),
    ]);

    view.set_search("green").unwrap();
    assert_eq!(view.visible_ids(), vec!["1", "2", "3"]);

    view.set_filter("status", "active").unwrap();
    assert_eq!(view.visible_ids(), vec!["1", "3"]);

    // every visible row passes every active predicate
    let filters = view.filters();
    assert!(view.visible_rows().iter().all(|r| filters.matches(r)));

    view.set_filter("status", "all").unwrap();
    assert_eq!(view.total(), 3);
}

#[test]
fn test_page_slice() {
    let view = product_view(10);
    view.set_rows(numbered(35));
    assert_eq!(view.total_pages(), 4);

    assert_eq!(view.set_page(3), 3);
    let expected: Vec<String> = (20..30).map(|i| format!("p{i:02}")).collect();
    assert_eq!(view.visible_ids(), expected);

    view.set_page(4);
    assert_eq!(view.visible_ids().len(), 5);
}

#[test]
fn test_page_clamps_when_total_shrinks() {
    let view = product_view(10);
    view.set_rows(numbered(50));
    assert_eq!(view.total_pages(), 5);
    view.set_page(4);

    // 17 of 50 rows are dairy
    view.set_filter("category", "dairy").unwrap();
    assert_eq!(view.total(), 17);
    assert_eq!(view.total_pages(), 2);
    assert!(view.page() <= 2);
    assert!(!view.visible_ids().is_empty());
}

#[test]
fn test_page_size_change_resets_page() {
    let view = product_view(10);
    view.set_rows(numbered(50));
    view.set_page(3);
    view.take_events();

    view.set_page_size(20);
    assert_eq!(view.page(), 1);
    assert_eq!(view.total_pages(), 3);
    assert!(view.take_events().contains(&TableEvent::PageChanged {
        page: 1,
        page_size: 20,
    }));
}

#[test]
fn test_sort_is_stable() {
    let view = product_view(50);
    view.set_rows(numbered(12));

    view.toggle_sort("category").unwrap();
    let ids = view.visible_ids();
    let dairy: Vec<&str> = ids[..4].iter().map(String::as_str).collect();
    assert_eq!(dairy, ["p00", "p03", "p06", "p09"]);
    let produce: Vec<&str> = ids[4..].iter().map(String::as_str).collect();
    assert_eq!(produce, ["p01", "p02", "p04", "p05", "p07", "p08", "p10", "p11"]);

    assert_eq!(view.toggle_sort("category").unwrap(), Some(Direction::Desc));
    assert_eq!(view.visible_ids()[0], "p01");
    assert_eq!(view.visible_ids()[8], "p00");

    assert_eq!(view.toggle_sort("category").unwrap(), None);
    assert_eq!(view.visible_ids()[1], "p01");
}

#[test]
fn test_selection_reflects_visible_page() {
    let view = product_view(5);
    view.set_rows(numbered(12));

    assert!(view.toggle_all_on_page());
    assert_eq!(view.check_state(), CheckState::Checked);
    assert_eq!(view.selection_count(), 5);

    view.next_page();
    assert_eq!(view.check_state(), CheckState::Unchecked);
    assert!(view.toggle_row("p07"));
    assert_eq!(view.check_state(), CheckState::Indeterminate);

    // ids persist across pages by default
    assert_eq!(view.selection_count(), 6);

    // rows off the page cannot be toggled
    assert!(!view.toggle_row("p00"));

    // selection survives sort
    view.toggle_sort("name").unwrap();
    assert_eq!(view.selection_count(), 6);
    assert!(view.is_selected("p07"));
}

#[test]
fn test_visible_only_policy_prunes_on_filter() {
    let view = product_view(5).with_selection(Selection::multi().policy(SelectionPolicy::VisibleOnly));
    view.set_rows(numbered(12));
    view.toggle_all_on_page();
    assert_eq!(view.selection_count(), 5);

    view.set_filter("category", "dairy").unwrap();
    // p00 and p03 are dairy rows from the first page
    assert_eq!(view.selected_ids(), vec!["p00", "p03"]);

    view.set_filter("category", "all").unwrap();
    assert_eq!(view.selection_count(), 2);

    view.next_page();
    assert_eq!(view.selection_count(), 0);
    assert_eq!(view.check_state(), CheckState::Unchecked);
}

#[test]
fn test_orders_end_to_end() {
    let columns = ColumnSet::new(vec![
        Column::new("customer", "Customer").sortable(),
        Column::new("amount", "Amount").sortable(),
        Column::new("status", "Status"),
    ])
    .unwrap();
    let filters = FilterBar::new()
        .with(Filter::search("search", ["customer"]))
        .with(Filter::select("status", "status").options(["pending", "confirmed"]));
    let view = TableView::new(columns).with_filters(filters);
    view.set_rows(vec![
        Record::with_id("orders", "o1")
            .set("customer", "Blue Fin")
            .set("amount", Decimal::new(3195, 2))
            .set("status", "pending"),
        Record::with_id("orders", "o2")
            .set("customer", "Salmon Co")
            .set("amount", Decimal::new(12000, 2))
            .set("status", "confirmed"),
    ]);

    view.set_filter("status", "pending").unwrap();
    let rows = view.visible_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].display("amount"), "31.95");

    view.set_page_size(1);
    assert_eq!(view.total_pages(), 1);
    assert_eq!(view.page(), 1);

    let text = view.render();
    assert!(text.contains("31.95"));
    assert!(!text.contains("Salmon Co"));
    assert!(text.contains("Page 1 of 1"));
}

#[test]
fn test_hidden_column_not_rendered_or_exported() {
    let view = product_view(10);
    view.set_rows(numbered(2));
    assert!(!view.toggle_column("category").unwrap());

    assert!(!view.render().contains("Category"));
    assert_eq!(view.export_csv(), "Name\nProduct 0\nProduct 1\n");
}
