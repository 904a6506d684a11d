use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use clap::Subcommand;
use farmgate_lib::api::query::Direction;
use farmgate_table::FilterValue;

/// farmgate - browse marketplace records as a table
#[derive(Parser, Debug)]
#[command(name = "farmgate", version)]
#[command(about = "Browse marketplace records as a table", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (default: the platform config dir's config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render records from a JSON file (an array or a `{ "data": [...] }` envelope)
    Show {
        file: PathBuf,

        /// Resource name the records belong to
        #[arg(long, default_value = "records")]
        resource: String,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Fetch one page of a backend resource, e.g. `orders` or `admin/farmers`
    Fetch {
        resource: String,

        /// Backend base URL
        #[arg(short, long)]
        url: Option<String>,

        /// Bearer token
        #[arg(long)]
        token: Option<String>,

        #[command(flatten)]
        view: ViewArgs,
    },
}

/// Table state shared by both commands.
#[derive(clap::Args, Debug, Clone)]
pub struct ViewArgs {
    /// Search text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Field filter; repeatable. Dates take FROM..TO with either side optional
    #[arg(short, long = "filter", value_name = "FIELD=VALUE", value_parser = parse_filter)]
    pub filters: Vec<FilterArg>,

    /// Sort column
    #[arg(long, value_name = "FIELD[:asc|desc]", value_parser = parse_sort)]
    pub sort: Option<SortArg>,

    /// Page to show
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Columns to show, in order (default: every field)
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Columns to hide
    #[arg(long, value_delimiter = ',')]
    pub hide: Vec<String>,

    /// Fuzzy search instead of substring
    #[arg(long)]
    pub fuzzy: bool,

    /// Print every filtered row as CSV instead of a page. `fetch` walks
    /// all pages of the resource
    #[arg(long)]
    pub csv: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterArg {
    pub field: String,
    pub value: FilterValue,
}

impl FilterArg {
    pub fn is_date_range(&self) -> bool {
        matches!(self.value, FilterValue::DateRange { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortArg {
    pub field: String,
    pub direction: Direction,
}

fn parse_filter(s: &str) -> Result<FilterArg, String> {
    let (field, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", s))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{}'", s));
    }

    let value = match value.split_once("..") {
        Some((from, to)) => FilterValue::DateRange {
            from: parse_date(from)?,
            to: parse_date(to)?,
        },
        None => FilterValue::Text(value.to_string()),
    };
    Ok(FilterArg {
        field: field.to_string(),
        value,
    })
}

fn parse_date(s: &str) -> Result<Option<NaiveDate>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| format!("invalid date '{}': {}", s, e))
}

fn parse_sort(s: &str) -> Result<SortArg, String> {
    let (field, direction) = match s.split_once(':') {
        Some((field, dir)) => {
            let direction =
                Direction::parse(dir).ok_or_else(|| format!("unknown direction '{}'", dir))?;
            (field, direction)
        }
        None => (s, Direction::Asc),
    };
    Ok(SortArg {
        field: field.trim().to_string(),
        direction,
    })
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_filter_text_and_dates() {
        let text = parse_filter("status=pending").unwrap();
        assert_eq!(text.field, "status");
        assert_eq!(text.value, FilterValue::Text("pending".into()));
        assert!(!text.is_date_range());

        let dates = parse_filter("createdAt=2026-01-01..").unwrap();
        assert_eq!(
            dates.value,
            FilterValue::DateRange {
                from: NaiveDate::from_ymd_opt(2026, 1, 1),
                to: None,
            }
        );

        assert!(parse_filter("status").is_err());
        assert!(parse_filter("=x").is_err());
        assert!(parse_filter("createdAt=2026-13-01..").is_err());
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(
            parse_sort("amount:desc").unwrap(),
            SortArg {
                field: "amount".into(),
                direction: Direction::Desc,
            }
        );
        assert_eq!(parse_sort("name").unwrap().direction, Direction::Asc);
        assert!(parse_sort("name:sideways").is_err());
    }

    #[test]
    fn test_fetch_args() {
        let cli = Cli::try_parse_from([
            "farmgate",
            "fetch",
            "orders",
            "--url",
            "http://localhost:3000/api",
            "-f",
            "status=pending",
            "--sort",
            "amount:desc",
            "--columns",
            "customer,amount",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Command::Fetch { resource, url, view, .. } = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(resource, "orders");
        assert_eq!(url.as_deref(), Some("http://localhost:3000/api"));
        assert_eq!(view.filters.len(), 1);
        assert_eq!(view.columns, ["customer", "amount"]);
        assert_eq!(view.page, 1);
    }
}
