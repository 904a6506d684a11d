//! Server-side tables against an in-process page source.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use farmgate_lib::api::FnPageSource;
use farmgate_lib::api::PageSource;
use farmgate_lib::api::query::Direction;
use farmgate_lib::api::query::Page;
use farmgate_lib::api::query::PageRequest;
use farmgate_lib::error::ApiError;
use farmgate_lib::error::Error;
use farmgate_lib::model::Record;
use farmgate_table::Column;
use farmgate_table::ColumnSet;
use farmgate_table::FetchOutcome;
use farmgate_table::Filter;
use farmgate_table::FilterBar;
use farmgate_table::PagingMode;
use farmgate_table::RemoteTable;
use farmgate_table::TableEvent;
use farmgate_table::TableView;

struct Backend {
    rows: Mutex<Vec<Record>>,
    fail: AtomicBool,
    /// Page 1 answers after this delay.
    first_page_delay: Duration,
    requests: Mutex<Vec<PageRequest>>,
}

fn orders(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            Record::with_id("orders", format!("o{i:02}"))
                .set("customer", format!("Customer {i}"))
                .set("status", "pending")
        })
        .collect()
}

fn backend(count: usize, first_page_delay: Duration) -> Arc<Backend> {
    Arc::new(Backend {
        rows: Mutex::new(orders(count)),
        fail: AtomicBool::new(false),
        first_page_delay,
        requests: Mutex::new(Vec::new()),
    })
}

fn source(backend: Arc<Backend>) -> impl PageSource<Record> {
    FnPageSource::new(move |request: PageRequest| {
        let backend = Arc::clone(&backend);
        async move {
            backend.requests.lock().unwrap().push(request.clone());
            if request.page() == 1 && !backend.first_page_delay.is_zero() {
                tokio::time::sleep(backend.first_page_delay).await;
            }
            if backend.fail.load(Ordering::SeqCst) {
                return Err(Error::Api(ApiError::http(503, "upstream unavailable")));
            }
            let page = Page::from_slice(backend.rows.lock().unwrap().as_slice(), &request);
            Ok(page)
        }
    })
}

fn orders_view() -> TableView<Record> {
    let columns = ColumnSet::new(vec![
        Column::new("customer", "Customer").sortable(),
        Column::new("status", "Status"),
    ])
    .unwrap();
    let filters = FilterBar::new()
        .with(Filter::search("search", ["customer"]))
        .with(Filter::select("status", "status"));
    TableView::new(columns).with_filters(filters)
}

#[tokio::test]
async fn test_refresh_loads_page() {
    let backend = backend(30, Duration::ZERO);
    let table = RemoteTable::new(orders_view(), source(Arc::clone(&backend)));
    assert_eq!(table.view().mode(), PagingMode::Server);

    assert!(table.refresh().await.is_loaded());
    let view = table.view();
    assert_eq!(view.visible_ids().len(), 10);
    assert_eq!(view.total(), 30);
    assert_eq!(view.total_pages(), 3);
    assert!(!view.is_loading());

    assert!(table.set_page(3).await.is_loaded());
    assert_eq!(view.visible_ids()[0], "o20");
}

#[tokio::test]
async fn test_request_carries_query() {
    let backend = backend(30, Duration::ZERO);
    let table = RemoteTable::new(orders_view(), source(Arc::clone(&backend)));
    table.refresh().await;
    table.set_page(2).await;

    table.set_search("blue").await.unwrap();
    table.set_filter("status", "pending").await.unwrap();
    table.set_sort("customer", Direction::Desc).await.unwrap();

    let request = table.request();
    assert_eq!(request.page(), 1);
    assert_eq!(request.search_text(), Some("blue"));
    assert_eq!(request.filters(), &[("status".to_string(), "pending".to_string())]);
    assert_eq!(request.sort_by(), Some(("customer", Direction::Desc)));

    let sent = backend.requests.lock().unwrap().last().cloned().unwrap();
    assert_eq!(sent, request);
}

#[tokio::test]
async fn test_query_change_returns_to_first_page() {
    let backend = backend(30, Duration::ZERO);
    let table = RemoteTable::new(orders_view(), source(backend));
    table.refresh().await;
    table.set_page(3).await;
    assert_eq!(table.view().page(), 3);

    table.toggle_sort("customer").await.unwrap();
    assert_eq!(table.view().page(), 1);
}

#[tokio::test]
async fn test_stale_response_is_discarded() {
    let backend = backend(30, Duration::from_millis(50));
    let table = RemoteTable::new(orders_view(), source(backend));
    assert!(table.refresh().await.is_loaded());

    let (slow, fast) = tokio::join!(table.refresh(), async {
        tokio::task::yield_now().await;
        table.set_page(2).await
    });

    assert!(matches!(slow, FetchOutcome::Superseded));
    assert!(fast.is_loaded());
    assert_eq!(table.view().page(), 2);
    assert_eq!(table.view().visible_ids()[0], "o10");
    assert!(!table.view().is_loading());
}

#[tokio::test]
async fn test_failed_fetch_keeps_rows() {
    let backend = backend(30, Duration::ZERO);
    let table = RemoteTable::new(orders_view(), source(Arc::clone(&backend)));
    table.refresh().await;
    let before = table.view().visible_ids();

    backend.fail.store(true, Ordering::SeqCst);
    let outcome = table.set_page(2).await;
    assert!(matches!(outcome, FetchOutcome::Failed(Error::Api(_))));

    let view = table.view();
    assert_eq!(view.visible_ids(), before);
    assert_eq!(view.page(), 1);
    assert_eq!(view.error().as_deref(), Some("HTTP 503: upstream unavailable"));
    assert!(!view.is_loading());
    assert!(view.render().contains("! HTTP 503"));
    assert!(view.render().contains("Page 1 of 3"));

    backend.fail.store(false, Ordering::SeqCst);
    assert!(table.next_page().await.is_loaded());
    assert_eq!(view.error(), None);
    assert_eq!(view.page(), 2);
    assert_eq!(view.visible_ids()[0], "o10");
}

#[tokio::test]
async fn test_failed_page_size_change_restores_size() {
    let backend = backend(30, Duration::ZERO);
    let table = RemoteTable::new(orders_view(), source(Arc::clone(&backend)));
    table.refresh().await;
    table.set_page(3).await;
    table.view().take_events();

    backend.fail.store(true, Ordering::SeqCst);
    assert!(matches!(table.set_page_size(25).await, FetchOutcome::Failed(_)));

    let view = table.view();
    assert_eq!(view.page(), 3);
    assert_eq!(view.page_size(), 10);
    assert_eq!(view.visible_ids()[0], "o20");
    assert_eq!(table.request().limit(), 10);
    assert_eq!(
        view.take_events(),
        vec![
            TableEvent::PageChanged { page: 1, page_size: 25 },
            TableEvent::PageChanged { page: 3, page_size: 10 },
        ]
    );
}

#[tokio::test]
async fn test_shrinking_total_refetches_clamped_page() {
    let backend = backend(50, Duration::ZERO);
    let table = RemoteTable::new(orders_view(), source(Arc::clone(&backend)));
    table.refresh().await;
    assert!(table.set_page(4).await.is_loaded());
    assert_eq!(table.view().visible_ids()[0], "o30");
    table.view().take_events();

    *backend.rows.lock().unwrap() = orders(15);
    assert!(table.refresh().await.is_loaded());

    let view = table.view();
    assert_eq!(view.page(), 2);
    assert_eq!(view.total_pages(), 2);
    assert_eq!(view.visible_ids(), ["o10", "o11", "o12", "o13", "o14"]);
    assert!(!view.is_loading());
    assert_eq!(
        view.take_events(),
        vec![TableEvent::PageChanged { page: 2, page_size: 10 }]
    );

    let pages: Vec<usize> = backend.requests.lock().unwrap().iter().map(PageRequest::page).collect();
    assert_eq!(pages[pages.len() - 2..], [4, 2]);
}

#[tokio::test]
async fn test_close_ignores_late_response() {
    let backend = backend(30, Duration::from_millis(50));
    let table = RemoteTable::new(orders_view(), source(backend));

    let (outcome, ()) = tokio::join!(table.refresh(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        table.close();
    });

    assert!(matches!(outcome, FetchOutcome::Cancelled));
    assert!(table.is_closed());
    assert!(table.view().is_empty());
    assert!(!table.view().is_loading());
    assert!(matches!(table.refresh().await, FetchOutcome::Cancelled));
}
