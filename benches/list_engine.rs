use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use portal_core::{FilterSet, ListConfig, ListEngine, RowPredicate};
use portal_domain::{ColumnDescriptor, Row, SortDirection};

fn build_rows(count: usize) -> Vec<Row> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..count)
        .map(|idx| {
            let close = start + Duration::days((idx % 730) as i64);
            Row::new()
                .with("Id", format!("r{idx}"))
                .with("Name", format!("Pledge {:05}", (idx * 7919) % count))
                .with("Paid", ((idx * 37) % 5000) as f64 + 0.5)
                .with("CloseDate", close.format("%Y-%m-%d").to_string())
                .with("Status", if idx % 3 == 0 { "Open" } else { "Paid" })
        })
        .collect()
}

fn config() -> ListConfig {
    ListConfig::new(vec![
        ColumnDescriptor::text("Name", "Name"),
        ColumnDescriptor::currency("Paid", "Paid"),
        ColumnDescriptor::date("CloseDate", "Close Date"),
        ColumnDescriptor::text("Status", "Status"),
    ])
    .with_page_size(25)
}

fn bench_list_engine(c: &mut Criterion) {
    let rows = build_rows(black_box(10_000));

    c.bench_function("list_sort_currency_10k", |b| {
        b.iter_batched(
            || {
                let mut engine = ListEngine::new(config());
                engine.set_source(rows.clone());
                engine
            },
            |mut engine| engine.sort("Paid", SortDirection::Desc),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("list_sort_date_10k", |b| {
        b.iter_batched(
            || {
                let mut engine = ListEngine::new(config());
                engine.set_source(rows.clone());
                engine
            },
            |mut engine| engine.sort("CloseDate", SortDirection::Asc),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("list_filter_and_page_10k", |b| {
        b.iter_batched(
            || {
                let mut engine = ListEngine::new(config());
                engine.set_source(rows.clone());
                engine
            },
            |mut engine| {
                engine.filter(FilterSet::new().with(RowPredicate::equals("Status", "Open")));
                while engine.next_page() {}
                black_box(engine.page().len())
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_list_engine);
criterion_main!(benches);
