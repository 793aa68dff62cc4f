use clap::Args;
use portal_core::{
    format::{display_cell, DefaultFormatters},
    list::LoadOutcome,
    FetchQuery, FilterSet, ListConfig, ListController, RowPredicate,
};
use portal_domain::{ColumnDescriptor, ColumnType, Row, SortDirection};
use serde_json::Value;

use crate::{
    cli::{
        output,
        ui::table_renderer::{Table, TableColumn},
        CliContext,
    },
    PortalError,
};

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Dataset to show (`<data dir>/<dataset>.json`)
    pub dataset: String,

    /// Heading used in messages (defaults to the dataset name)
    #[arg(long)]
    pub title: Option<String>,

    /// Column as `Field[:Label[:type]]`; repeat for more columns
    #[arg(short, long = "column")]
    pub columns: Vec<String>,

    /// Only rows whose parent record is this id
    #[arg(long)]
    pub parent: Option<String>,

    /// Exact match `Field=Value`; repeat to combine
    #[arg(short, long = "filter")]
    pub filters: Vec<String>,

    /// Case-insensitive substring match `Field~Text`
    #[arg(long = "contains")]
    pub contains: Vec<String>,

    /// Field to sort by
    #[arg(short, long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Page to show, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page (defaults to the config)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Print the page as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub async fn run(context: &CliContext, args: ListArgs) -> Result<(), PortalError> {
    let store = context.store()?;
    let title = args.title.clone().unwrap_or_else(|| args.dataset.clone());

    let columns = if args.columns.is_empty() {
        let sample = store.load_dataset(&args.dataset).ok().unwrap_or_default();
        infer_columns(sample.first())
    } else {
        args.columns
            .iter()
            .map(|spec| parse_column(spec))
            .collect::<Result<Vec<_>, _>>()?
    };
    let page_size = args.page_size.unwrap_or(context.config.page_size);
    let config = ListConfig::new(columns).with_page_size(page_size);

    let mut query = FetchQuery::new(&args.dataset);
    if let Some(parent) = &args.parent {
        query = query.with_record(parent);
    }

    let mut controller = ListController::new(
        title.clone(),
        query,
        config,
        store,
        context.notifier.clone(),
    );
    if let LoadOutcome::Failed | LoadOutcome::Cancelled = controller.refresh().await {
        return Err(PortalError::ListUnavailable(title));
    }

    let filters = build_filters(&args.filters, &args.contains)?;
    let engine = controller.engine_mut();
    if !filters.is_empty() {
        engine.filter(filters);
    }
    if let Some(field) = &args.sort {
        let direction = if args.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        engine.sort(field, direction);
    }
    if args.page != 1 && !engine.set_page(args.page) {
        output::warning(format!(
            "Page {} is out of range; showing page 1 of {}",
            args.page,
            engine.total_pages()
        ));
    }

    let engine = controller.engine();
    if args.json {
        println!("{}", serde_json::to_string_pretty(engine.page())?);
        return Ok(());
    }

    let currency = context.config.currency.as_str();
    let formatters = DefaultFormatters::new(currency);
    let mut table = Table::new(engine.columns().iter().map(TableColumn::for_descriptor).collect());
    for row in engine.page() {
        table.add_row(
            engine
                .columns()
                .iter()
                .map(|column| display_cell(row, column, &formatters, currency))
                .collect(),
        );
    }

    output::section(&title);
    println!("{}", table.render());
    let footer = page_footer(
        engine.page_number(),
        engine.total_pages(),
        engine.total_records(),
        engine.show_pagination(),
    );
    println!("{footer}");
    Ok(())
}

/// Parses `Field`, `Field:Label` or `Field:Label:type`.
pub fn parse_column(spec: &str) -> Result<ColumnDescriptor, PortalError> {
    let mut parts = spec.splitn(3, ':').map(str::trim);
    let field = parts
        .next()
        .filter(|field| !field.is_empty())
        .ok_or_else(|| PortalError::InvalidArgument(format!("empty column spec `{spec}`")))?;
    let label = parts.next().filter(|label| !label.is_empty()).unwrap_or(field);
    let column_type = match parts.next() {
        Some(kind) => ColumnType::parse(kind).ok_or_else(|| {
            PortalError::InvalidArgument(format!("unknown column type `{kind}` in `{spec}`"))
        })?,
        None => ColumnType::Text,
    };
    Ok(ColumnDescriptor::new(field, label, column_type))
}

/// Text, number and boolean columns for every field of `sample`.
pub fn infer_columns(sample: Option<&Row>) -> Vec<ColumnDescriptor> {
    let Some(row) = sample else {
        return Vec::new();
    };
    row.fields()
        .iter()
        .filter(|(_, value)| !value.is_object())
        .map(|(field, value)| {
            let column_type = match value {
                Value::Number(_) => ColumnType::Number,
                Value::Bool(_) => ColumnType::Boolean,
                _ => ColumnType::Text,
            };
            ColumnDescriptor::new(field.clone(), field.clone(), column_type)
        })
        .collect()
}

pub fn build_filters(equals: &[String], contains: &[String]) -> Result<FilterSet, PortalError> {
    let mut filters = FilterSet::new();
    for spec in equals {
        let (field, value) = split_pair(spec, '=')?;
        filters.push(RowPredicate::equals(field, value));
    }
    for spec in contains {
        let (field, needle) = split_pair(spec, '~')?;
        filters.push(RowPredicate::contains(field, needle));
    }
    Ok(filters)
}

fn split_pair(spec: &str, separator: char) -> Result<(&str, &str), PortalError> {
    spec.split_once(separator)
        .map(|(field, value)| (field.trim(), value.trim()))
        .filter(|(field, _)| !field.is_empty())
        .ok_or_else(|| {
            PortalError::InvalidArgument(format!("expected `Field{separator}Value`, got `{spec}`"))
        })
}

pub fn page_footer(page: usize, total_pages: usize, total_records: usize, paginated: bool) -> String {
    let records = match total_records {
        1 => "1 record".to_string(),
        n => format!("{n} records"),
    };
    if paginated {
        format!("Page {page} of {total_pages} ({records})")
    } else {
        records
    }
}
