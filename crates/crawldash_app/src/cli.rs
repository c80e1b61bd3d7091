use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use crawldash_core::{
    BrokenLinksFilter, CrawlStatus, Msg, RecordId, SortDirection, SortKey, SortSpec, ViewState,
};
use crawldash_logging::LogDestination;

use crate::config::Overrides;

#[derive(Parser, Debug)]
#[command(
    name = "crawldash",
    version,
    about = "Browse and manage crawl results from the crawler service"
)]
pub(crate) struct Cli {
    /// Path to a RON config file (defaults to ./crawldash.ron when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the crawler service
    #[arg(long, global = true, env = "CRAWLDASH_API_URL")]
    pub api_url: Option<String>,

    /// Rows per page
    #[arg(long, global = true)]
    pub page_size: Option<usize>,

    /// Where log output goes: file, terminal or both
    #[arg(long, global = true)]
    pub log: Option<LogDestination>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            api_url: self.api_url.clone(),
            page_size: self.page_size,
            log: self.log,
            verbose: self.verbose,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    /// Show one page of crawl results
    List(ListArgs),
    /// Submit a URL for analysis
    Add { url: String },
    /// Trigger a crawl of a URL
    Crawl { url: String },
    /// Re-run crawls for records, one after another, stopping at the first failure
    Rerun {
        #[arg(required = true)]
        ids: Vec<RecordId>,
    },
    /// Delete records and their results
    Delete {
        #[arg(required = true)]
        ids: Vec<RecordId>,
    },
    /// Show the full detail of one record
    Show { id: RecordId },
    /// Check that the crawler service is reachable
    Health,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ListArgs {
    /// Case-insensitive substring of URL or title ("" clears it)
    #[arg(long)]
    pub search: Option<String>,

    /// Only show these statuses (repeatable; replaces the saved status filter)
    #[arg(long = "status")]
    pub statuses: Vec<CrawlStatus>,

    /// all, has-broken or no-broken
    #[arg(long)]
    pub broken: Option<BrokenLinksFilter>,

    /// url, title, htmlVersion, internalLinks, externalLinks, brokenLinks, status or createdAt
    #[arg(long)]
    pub sort: Option<SortKey>,

    #[arg(long, conflicts_with = "asc")]
    pub desc: bool,

    #[arg(long)]
    pub asc: bool,

    /// 1-based page number, clamped to the available pages
    #[arg(long)]
    pub page: Option<usize>,

    /// Drop search, status and broken-link filters before applying the others
    #[arg(long)]
    pub clear_filters: bool,
}

/// What a command prints once everything has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Output {
    List,
    Detail,
    Health,
}

/// Messages a command dispatches, split around the initial load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Plan {
    /// Applied to the restored view before anything is fetched.
    pub view: Vec<Msg>,
    /// Whether the record list is loaded first.
    pub load: bool,
    /// Dispatched one at a time after the load has settled.
    pub actions: Vec<Msg>,
    pub output: Output,
}

impl Plan {
    fn list(view: Vec<Msg>, actions: Vec<Msg>) -> Self {
        Self {
            view,
            load: true,
            actions,
            output: Output::List,
        }
    }
}

impl Command {
    pub fn plan(&self, current: &ViewState) -> Plan {
        match self {
            Command::List(args) => {
                let actions = args.page.map(Msg::PageChanged).into_iter().collect();
                Plan::list(args.view_messages(current), actions)
            }
            Command::Add { url } => Plan::list(Vec::new(), vec![Msg::UrlSubmitted(url.clone())]),
            Command::Crawl { url } => Plan::list(
                Vec::new(),
                vec![Msg::CrawlRequested { url: url.clone() }],
            ),
            Command::Rerun { ids } => {
                Plan::list(Vec::new(), vec![Msg::RerunRequested(ids.clone())])
            }
            Command::Delete { ids } => {
                Plan::list(Vec::new(), vec![Msg::DeleteRequested(ids.clone())])
            }
            Command::Show { id } => Plan {
                view: Vec::new(),
                load: true,
                actions: vec![Msg::RecordOpened(*id)],
                output: Output::Detail,
            },
            Command::Health => Plan {
                view: Vec::new(),
                load: false,
                actions: vec![Msg::HealthCheckRequested],
                output: Output::Health,
            },
        }
    }
}

impl ListArgs {
    fn direction(&self) -> Option<SortDirection> {
        match (self.asc, self.desc) {
            (true, _) => Some(SortDirection::Asc),
            (_, true) => Some(SortDirection::Desc),
            _ => None,
        }
    }

    fn view_messages(&self, current: &ViewState) -> Vec<Msg> {
        let mut msgs = Vec::new();
        if self.clear_filters {
            msgs.push(Msg::FiltersCleared);
        }
        if let Some(term) = &self.search {
            msgs.push(Msg::SearchChanged(term.clone()));
        }
        if !self.statuses.is_empty() {
            msgs.extend(CrawlStatus::ALL.into_iter().map(|status| {
                Msg::StatusFilterToggled {
                    status,
                    included: self.statuses.contains(&status),
                }
            }));
        }
        if let Some(filter) = self.broken {
            msgs.push(Msg::BrokenLinksFilterChanged(filter));
        }
        match (self.sort, self.direction()) {
            // Same cycling as clicking a column header.
            (Some(key), None) => msgs.push(Msg::SortClicked(key)),
            (Some(key), Some(direction)) => {
                msgs.push(Msg::SortChanged(SortSpec::new(key, direction)))
            }
            (None, Some(direction)) => msgs.push(Msg::SortChanged(SortSpec::new(
                current.sort().key,
                direction,
            ))),
            (None, None) => {}
        }
        msgs
    }
}
