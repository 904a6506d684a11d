mod args;
mod config;
mod error;
mod paths;
mod table;

use std::fs;
use std::fs::File;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use farmgate_lib::MarketplaceClient;
use farmgate_lib::api::ListResponse;
use farmgate_lib::api::PageSource;
use farmgate_lib::api::query::PageRequest;
use farmgate_lib::auth::StaticTokenProvider;
use farmgate_lib::model::Record;
use farmgate_lib::rate_limit::RetryConfig;
use farmgate_table::FetchOutcome;
use farmgate_table::RemoteTable;
use farmgate_table::TableView;
use simplelog::Config as LogConfig;
use simplelog::LevelFilter;
use simplelog::WriteLogger;

use crate::args::Cli;
use crate::args::Command;
use crate::args::ViewArgs;
use crate::config::Config;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("[cli] {}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to `<cache>/latest.log`; the previous run's log is archived.
fn init_logging(verbose: bool) {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else { return };
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }

    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    match File::create(&path) {
        Ok(file) => {
            let _ = WriteLogger::init(level, LogConfig::default(), file);
        }
        Err(e) => eprintln!("warning: cannot create log file {}: {}", path.display(), e),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = match cli.config.or_else(paths::config_file) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Show {
            file,
            resource,
            view,
        } => show(&file, &resource, &view, &config),
        Command::Fetch {
            resource,
            url,
            token,
            view,
        } => fetch(&resource, url, token, &view, &config).await,
    }
}

fn show(file: &Path, resource: &str, args: &ViewArgs, config: &Config) -> Result<(), CliError> {
    let contents = fs::read_to_string(file).map_err(|source| CliError::Read {
        path: file.to_path_buf(),
        source,
    })?;
    let response: ListResponse = serde_json::from_str(&contents).map_err(|source| CliError::Json {
        path: file.to_path_buf(),
        source,
    })?;
    let records = response.into_records(resource);
    log::info!("[cli] loaded {} {} from {}", records.len(), resource, file.display());

    let keys = column_keys(args, &records);
    let view = table::build_view(&keys, &records, args, &config.table)?;
    view.set_rows(records);
    view.set_page(args.page);

    print(&view, args.csv);
    Ok(())
}

async fn fetch(
    resource: &str,
    url: Option<String>,
    token: Option<String>,
    args: &ViewArgs,
    config: &Config,
) -> Result<(), CliError> {
    let url = url
        .or_else(|| config.server.url.clone())
        .ok_or(CliError::MissingUrl)?;
    let provider = match token.or_else(|| config.server.token.clone()) {
        Some(token) => StaticTokenProvider::new(token),
        None => StaticTokenProvider::anonymous(),
    };
    let client = MarketplaceClient::builder()
        .url(url)
        .token_provider(provider)
        .timeout(Duration::from_secs(config.server.timeout_secs))
        .retry_config(RetryConfig::default().max_retries(config.server.max_retries))
        .build()?;

    // Without --columns, one row tells us what the resource looks like.
    let sample: Vec<Record> = if args.columns.is_empty() {
        log::debug!("[cli] sampling {} for columns", resource);
        client.list(resource, &PageRequest::new(1, 1)).await?.into_data()
    } else {
        Vec::new()
    };
    let keys = column_keys(args, &sample);
    let view = table::build_view(&keys, &sample, args, &config.table)?;

    let table = RemoteTable::new(view, client.resource(resource));
    if args.csv {
        let rows = fetch_all(&table).await;
        table.close();
        print!("{}", table.view().export_csv_rows(&rows?));
        return Ok(());
    }

    let mut outcome = table.refresh().await;
    if args.page > 1 && outcome.is_loaded() {
        outcome = table.set_page(args.page).await;
    }
    table.close();

    if let FetchOutcome::Failed(e) = outcome {
        return Err(e.into());
    }
    print(table.view(), false);
    Ok(())
}

/// Walks every page of the filtered result and collects the rows.
async fn fetch_all<S>(table: &RemoteTable<Record, S>) -> Result<Vec<Record>, CliError>
where
    S: PageSource<Record>,
{
    let mut rows = Vec::new();
    let mut outcome = table.refresh().await;
    loop {
        match outcome {
            FetchOutcome::Loaded => rows.extend(table.view().rows()),
            FetchOutcome::Failed(e) => return Err(e.into()),
            FetchOutcome::Superseded | FetchOutcome::Cancelled => break,
        }
        let view = table.view();
        if view.page() >= view.total_pages() {
            break;
        }
        log::debug!("[cli] fetching page {} of {}", view.page() + 1, view.total_pages());
        outcome = table.next_page().await;
    }
    Ok(rows)
}

fn column_keys(args: &ViewArgs, records: &[Record]) -> Vec<String> {
    if args.columns.is_empty() {
        table::infer_columns(records)
    } else {
        args.columns.clone()
    }
}

fn print(view: &TableView<Record>, csv: bool) {
    if csv {
        print!("{}", view.export_csv());
    } else {
        println!("{}", view.render());
    }
}

#[cfg(test)]
mod tests {
    use farmgate_lib::api::VecPageSource;
    use farmgate_table::Column;
    use farmgate_table::ColumnSet;

    use super::*;

    fn customers(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| Record::with_id("restaurants", format!("r{i}")).set("name", format!("Bistro {i}")))
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_all_walks_every_page() {
        let columns = ColumnSet::new(vec![Column::new("name", "Name")]).unwrap();
        let table = RemoteTable::new(TableView::new(columns), VecPageSource::new(customers(23)));

        let rows = fetch_all(&table).await.unwrap();
        assert_eq!(rows.len(), 23);
        assert_eq!(rows[22].id(), Some("r22"));
        assert_eq!(table.view().page(), 3);

        let csv = table.view().export_csv_rows(&rows);
        assert_eq!(csv.lines().count(), 24);
        assert_eq!(table.view().export_csv().lines().count(), 4);
    }
}
