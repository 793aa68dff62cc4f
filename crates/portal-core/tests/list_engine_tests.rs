use portal_core::{FilterSet, ListConfig, ListEngine, RowPredicate};
use portal_domain::{ColumnDescriptor, ColumnType, Row, SortDirection};

fn columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::url("Link", "Name", "Name"),
        ColumnDescriptor::currency("Paid", "Paid"),
        ColumnDescriptor::date("Due", "Due Date"),
        ColumnDescriptor::text("Status", "Status"),
    ]
}

fn pledges(count: usize) -> Vec<Row> {
    (0..count)
        .map(|n| {
            let paid = if n % 7 == 0 { "n/a".to_string() } else { format!("{}", (n * 37) % 500) };
            Row::new()
                .with("Id", format!("p{n:03}"))
                .with("Name", format!("Pledge {}", (n * 13) % count))
                .with("Paid", paid)
                .with("Due", format!("2024-{:02}-{:02}", n % 12 + 1, n % 28 + 1))
                .with("Status", if n % 3 == 0 { "Closed" } else { "Open" })
        })
        .collect()
}

fn ids(rows: &[Row]) -> Vec<String> {
    rows.iter().filter_map(|row| row.id().map(str::to_string)).collect()
}

fn collect_pages(engine: &mut ListEngine) -> Vec<String> {
    let mut seen = Vec::new();
    engine.first_page();
    loop {
        seen.extend(ids(engine.page()));
        if !engine.next_page() {
            break;
        }
    }
    seen
}

#[test]
fn pages_concatenate_to_the_sorted_source() {
    for size in [1, 3, 10, 64] {
        let mut engine = ListEngine::new(ListConfig::new(columns()).with_page_size(size));
        engine.set_source(pledges(57));
        engine.sort("Paid", SortDirection::Desc);

        let expected = ids(engine.rows());
        assert_eq!(collect_pages(&mut engine), expected, "page size {size}");
        assert_eq!(engine.total_pages(), 57usize.div_ceil(size).max(1));
    }
}

#[test]
fn every_page_stays_within_bounds() {
    let mut engine = ListEngine::new(ListConfig::new(columns()).with_page_size(10));
    engine.set_source(pledges(25));
    for page in 0..=5 {
        engine.set_page(page);
        assert!(engine.page_number() >= 1);
        assert!(engine.page_number() <= engine.total_pages());
        assert!(engine.page().len() <= engine.page_size());
    }
}

#[test]
fn boundary_navigation_is_idempotent() {
    let mut engine = ListEngine::new(ListConfig::new(columns()).with_page_size(10));
    engine.set_source(pledges(25));

    let before = ids(engine.page());
    assert!(!engine.prev_page());
    assert_eq!(ids(engine.page()), before);

    engine.last_page();
    let last = ids(engine.page());
    assert!(!engine.next_page());
    assert!(!engine.next_page());
    assert_eq!(ids(engine.page()), last);
    assert_eq!(engine.page_number(), 3);
}

#[test]
fn currency_sort_treats_garbage_as_zero() {
    let mut engine = ListEngine::new(ListConfig::new(columns()));
    engine.set_source(vec![
        Row::new().with("Id", "b").with("Paid", "10"),
        Row::new().with("Id", "a").with("Paid", 0),
        Row::new().with("Id", "x").with("Paid", "abc"),
    ]);

    engine.sort("Paid", SortDirection::Desc);
    assert_eq!(ids(engine.rows()), vec!["b", "a", "x"]);

    engine.sort("Paid", SortDirection::Asc);
    assert_eq!(ids(engine.rows()), vec!["a", "x", "b"]);
}

#[test]
fn filter_then_clear_restores_original_order() {
    let mut engine = ListEngine::new(ListConfig::new(columns()).with_page_size(5));
    engine.set_source(pledges(40));
    engine.sort("Due", SortDirection::Asc);
    let before = ids(engine.rows());

    engine.filter(
        FilterSet::new()
            .with(RowPredicate::equals("Status", "open"))
            .with(RowPredicate::range("Paid", ColumnType::Currency, Some("100".into()), None)),
    );
    assert!(engine.total_records() < 40);
    assert!(engine
        .rows()
        .iter()
        .all(|row| row.text("Status").as_deref() == Some("Open")));

    engine.clear_filter();
    assert_eq!(ids(engine.rows()), before);
    assert_eq!(engine.page_number(), 1);
}

#[test]
fn new_fetch_keeps_filter_and_sort() {
    let mut engine = ListEngine::new(ListConfig::new(columns()));
    engine.set_source(pledges(10));
    engine.sort("Link", SortDirection::Desc);
    engine.filter(FilterSet::new().with(RowPredicate::equals("Status", "Closed")));

    engine.set_source(pledges(30));
    assert!(engine
        .rows()
        .iter()
        .all(|row| row.text("Status").as_deref() == Some("Closed")));
    let names: Vec<String> = engine
        .rows()
        .iter()
        .filter_map(|row| row.text("Name").map(|n| n.to_lowercase()))
        .collect();
    let mut sorted = names.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(names, sorted);
}
