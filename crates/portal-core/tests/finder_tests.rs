mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use common::{FakeSearch, RecordingNotifier};
use portal_core::{finder::ConstituentFinder, CoreError};
use portal_domain::{
    CatalogColumn, ExportFormat, FieldDataType, FilterField, FilterInput, Row,
};

fn fields() -> Vec<FilterField> {
    vec![FilterField {
        key: "city".into(),
        label: "City".into(),
        field_api_name: "MailingCity".into(),
        data_type: FieldDataType::String,
        input: FilterInput::Text,
        lookup_api_name: Some("Contact".into()),
        options: Vec::new(),
        multi_row: false,
        improperly_configured: false,
    }]
}

fn columns() -> Vec<CatalogColumn> {
    vec![
        CatalogColumn {
            label: "Name".into(),
            field_name: "Name".into(),
            lookup_api_name: Some("Contact".into()),
        },
        CatalogColumn {
            label: "Giving Level".into(),
            field_name: "Level".into(),
            lookup_api_name: None,
        },
    ]
}

fn rows(count: usize) -> Vec<Row> {
    (1..=count)
        .map(|n| {
            Row::new()
                .with("Id", format!("r{n:02}"))
                .with("Level", format!("L{n}"))
                .with("Contact", serde_json::json!({ "Name": format!("Person {n}") }))
        })
        .collect()
}

async fn finder(row_count: usize) -> (ConstituentFinder, Arc<FakeSearch>, Arc<RecordingNotifier>) {
    let search = Arc::new(FakeSearch::new(fields(), columns(), rows(row_count)));
    let notices = Arc::new(RecordingNotifier::default());
    let mut finder = ConstituentFinder::new("donors", search.clone(), notices.clone());
    finder.initialize().await.expect("initialize");
    (finder, search, notices)
}

#[tokio::test]
async fn blank_search_makes_no_remote_call() {
    let (mut finder, search, notices) = finder(5).await;

    let count = finder.search().await.expect("blank search");
    assert_eq!(count, 0);
    assert_eq!(search.call_count("search"), 0);
    assert_eq!(notices.last().map(|n| n.title), Some("Blank Search".into()));
    assert!(finder.results().is_empty());
}

#[tokio::test]
async fn half_a_location_is_rejected() {
    let (mut finder, search, notices) = finder(5).await;
    finder.location_mut().radius_miles = Some(25);

    let err = finder.search().await.expect_err("radius without address");
    assert!(matches!(err, CoreError::Validation(_)));
    assert_eq!(
        notices.last().map(|n| n.message),
        Some("Address is required when radius is specified.".into())
    );
    assert_eq!(search.call_count("geocode"), 0);
}

#[tokio::test]
async fn location_search_pages_through_server_results() {
    let (mut finder, search, _) = finder(23).await;
    finder.location_mut().address = Some("1 Main St, Clinton NY".into());
    finder.location_mut().radius_miles = Some(25);

    assert_eq!(finder.search().await.expect("search"), 10);
    assert_eq!(search.call_count("geocode"), 1);
    assert!(finder.criteria().has_location());
    assert_eq!(finder.coverage_label(), "Results: 1-10 of 23");
    assert_eq!(finder.page_label(), "Page 1 of 3");

    assert!(finder.next_page().await.expect("page 2"));
    assert!(finder.next_page().await.expect("page 3"));
    assert!(!finder.next_page().await.expect("past the end"));
    assert_eq!(finder.results().len(), 3);
    assert_eq!(finder.coverage_label(), "Results: 21-23 of 23");
    assert_eq!(search.call_count("search"), 3);

    assert!(finder.grow_page().await.expect("grow"));
    assert_eq!(finder.results().len(), 15);
    assert_eq!(finder.page_label(), "Page 1 of 2");
}

#[tokio::test]
async fn sorting_is_refused_while_rows_are_selected() {
    let (mut finder, search, _) = finder(12).await;
    if let Some(city) = finder.input_mut("city") {
        city.set_value(Some("Utica".into()));
    }
    finder.search().await.expect("search");
    assert_eq!(finder.pager().sort_field(), Some("Contact.Name"));

    finder.set_row_checked("r01", true);
    assert!(finder.sort_locked());
    assert!(!finder.sort_by("Level").await.expect("refused"));
    assert_eq!(search.call_count("search"), 1);

    finder.set_row_checked("r01", false);
    assert!(finder.sort_by("Level").await.expect("sorted"));
    let page = search.last_page.lock().expect("page").clone().expect("request");
    assert_eq!(page.sort_by.as_deref(), Some("Level"));
}

#[tokio::test]
async fn failed_search_drops_previous_totals() {
    let (mut finder, search, notices) = finder(23).await;
    if let Some(city) = finder.input_mut("city") {
        city.set_value(Some("Utica".into()));
    }
    finder.search().await.expect("first search");
    assert_eq!(finder.coverage_label(), "Results: 1-10 of 23");

    search.take_search_down();
    let err = finder.search().await.expect_err("search outage");
    assert!(matches!(err, CoreError::Remote(_)));
    assert_eq!(notices.last().map(|n| n.title), Some("Search failed".into()));
    assert!(finder.results().is_empty());
    assert_eq!(finder.coverage_label(), "Results: 0-0 of 0");
    assert_eq!(finder.page_label(), "Page 1 of 1");
    assert!(!finder.next_page().await.expect("no further pages"));

    assert!(finder.toggle_all());
    assert_eq!(finder.selection().selected_count(), 0);
}

#[tokio::test]
async fn export_sends_exclusions_when_everything_is_selected() {
    let (mut finder, search, _) = finder(4).await;
    if let Some(city) = finder.input_mut("city") {
        city.set_value(Some("Utica".into()));
    }
    finder.search().await.expect("search");
    finder.toggle_all();
    finder.set_row_checked("r02", false);
    assert_eq!(finder.selection().selected_count(), 3);

    let now = NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|date| date.and_hms_opt(8, 5, 9))
        .expect("timestamp");
    let columns = vec!["Contact.Name".to_string(), "Level".to_string()];
    let file = finder
        .export(&columns, ExportFormat::Csv, now)
        .await
        .expect("export");

    let wrapper = search.last_wrapper.lock().expect("wrapper").clone().expect("sent");
    assert!(wrapper.selection.export_all);
    assert_eq!(wrapper.selection.record_ids, vec!["r02"]);
    assert_eq!(wrapper.criteria.filters.len(), 1);
    assert_eq!(file.file_name, "Constituents_extract_20240301_080509.csv");
    assert_eq!(
        file.content,
        "Name,Giving Level\nPerson 1,L1\nPerson 3,L3\nPerson 4,L4\n"
    );
}

#[tokio::test]
async fn export_requires_a_selection() {
    let (finder, search, _) = finder(4).await;
    let now = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("timestamp");
    let err = finder
        .export(&["Level".to_string()], ExportFormat::Xls, now)
        .await
        .expect_err("nothing selected");
    assert!(matches!(err, CoreError::InvalidOperation(_)));
    assert_eq!(search.call_count("export_rows"), 0);
}

#[tokio::test]
async fn campaign_members_use_included_ids() {
    let (mut finder, search, notices) = finder(4).await;
    if let Some(city) = finder.input_mut("city") {
        city.set_value(Some("Utica".into()));
    }
    finder.search().await.expect("search");
    finder.set_row_checked("r03", true);

    let added = finder.add_to_campaign("701A").await.expect("campaign");
    assert_eq!(added, 1);
    let wrapper = search.last_wrapper.lock().expect("wrapper").clone().expect("sent");
    assert!(!wrapper.selection.export_all);
    assert_eq!(wrapper.selection.record_ids, vec!["r03"]);
    assert_eq!(notices.last().map(|n| n.title), Some("Success".into()));
}

#[tokio::test]
async fn saved_filters_round_trip_through_the_backend() {
    let (mut finder, search, notices) = finder(4).await;
    assert_eq!(finder.save_filters("005U").await.expect("nothing"), 0);
    assert_eq!(notices.last().map(|n| n.message), Some("No filter to save".into()));
    assert_eq!(search.call_count("save_filters"), 0);

    if let Some(city) = finder.input_mut("city") {
        city.set_value(Some("Utica".into()));
    }
    finder.location_mut().address = Some("1 Main St".into());
    finder.location_mut().radius_miles = Some(50);
    assert_eq!(finder.save_filters("005U").await.expect("saved"), 3);

    finder.clear();
    assert!(finder.inputs()[0].value.is_none());
    assert_eq!(finder.load_saved_filters("005U").await.expect("restored"), 3);
    assert_eq!(finder.inputs()[0].value.as_deref(), Some("Utica"));
    assert_eq!(finder.location().radius_miles, Some(50));

    finder.delete_saved_filters("005U").await.expect("deleted");
    assert!(finder.location().address.is_none());
    assert_eq!(finder.load_saved_filters("005U").await.expect("none left"), 0);
    assert_eq!(notices.last().map(|n| n.title), Some("No saved filters".into()));
}

#[tokio::test]
async fn checked_rows_become_trip_contacts() {
    let (mut finder, _, _) = finder(3).await;
    if let Some(city) = finder.input_mut("city") {
        city.set_value(Some("Utica".into()));
    }
    finder.search().await.expect("search");
    finder.set_row_checked("r02", true);

    let contacts = finder.selected_contacts("Id", "Contact.Name", &[]);
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].row_id, "r02");
    assert_eq!(contacts[0].name, "Person 2");
}
