use std::str::FromStr;
use std::sync::Arc;

use sims_core::error::DASHBOARD_FAILED;
use sims_core::{
    DashboardData, DashboardSession, DashboardSource, DateRange, FetchOutcome, FetchTicket,
    FilterKind, SortDirection, SortKey, StopWords,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, warn};

use crate::render::Renderer;

pub const HELP: &str = "\
Commands:
  next | prev | page N          move between pages
  sort KEY [asc|desc]           sort by date, headline, source, category, sentiment, fact_check
                                (without a direction the column toggles)
  filter KIND [VALUE]           filter by category, sentiment or keyword; no value clears it
  clear                         remove all filters
  range START END               reload for a date range (YYYY-MM-DD, '-' for open)
  reload                        fetch the dashboard again
  keywords | categories | tone  analysis of the loaded news
  show | dashboard              print the current page or the full dashboard
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum BrowseCommand {
    Next,
    Prev,
    Page(usize),
    Sort(SortKey, Option<SortDirection>),
    Filter(FilterKind, Option<String>),
    Clear,
    Range(DateRange),
    Reload,
    Keywords,
    Categories,
    Tone,
    Show,
    Dashboard,
    Help,
    Quit,
}

impl FromStr for BrowseCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(BrowseCommand::Show);
        };
        let rest: Vec<&str> = words.collect();

        let command = match command.to_ascii_lowercase().as_str() {
            "n" | "next" => BrowseCommand::Next,
            "p" | "prev" => BrowseCommand::Prev,
            "page" => {
                let n = rest
                    .first()
                    .and_then(|n| n.parse().ok())
                    .ok_or("Usage: page N")?;
                BrowseCommand::Page(n)
            }
            "sort" => {
                let key = rest.first().ok_or("Usage: sort KEY [asc|desc]")?;
                let key: SortKey = key.parse().map_err(|e: sims_core::Error| e.to_string())?;
                let direction = rest
                    .get(1)
                    .map(|d| d.parse::<SortDirection>())
                    .transpose()
                    .map_err(|e| e.to_string())?;
                BrowseCommand::Sort(key, direction)
            }
            "filter" => {
                let kind = rest.first().ok_or("Usage: filter KIND [VALUE]")?;
                let kind: FilterKind = kind.parse().map_err(|e: sims_core::Error| e.to_string())?;
                let value = (rest.len() > 1).then(|| rest[1..].join(" "));
                BrowseCommand::Filter(kind, value)
            }
            "clear" => BrowseCommand::Clear,
            "range" => {
                let bound = |i: usize| rest.get(i).copied().filter(|b| *b != "-");
                let range = DateRange::parse(bound(0), bound(1)).map_err(|e| e.to_string())?;
                BrowseCommand::Range(range)
            }
            "r" | "reload" => BrowseCommand::Reload,
            "k" | "keywords" => BrowseCommand::Keywords,
            "categories" => BrowseCommand::Categories,
            "tone" => BrowseCommand::Tone,
            "show" => BrowseCommand::Show,
            "dashboard" => BrowseCommand::Dashboard,
            "h" | "help" | "?" => BrowseCommand::Help,
            "q" | "quit" | "exit" => BrowseCommand::Quit,
            other => return Err(format!("Unknown command: {} (try 'help')", other)),
        };
        Ok(command)
    }
}

type FetchResult = (FetchTicket, sims_core::Result<DashboardData>);

/// Interactive dashboard browser. Fetches run as background tasks; only the
/// most recently started one is allowed to replace the loaded data.
pub struct Browser {
    source: Arc<dyn DashboardSource>,
    renderer: Renderer,
    session: DashboardSession,
    range: DateRange,
    keyword_limit: usize,
    results: UnboundedSender<FetchResult>,
}

impl Browser {
    fn fetch(&mut self) {
        let ticket = self.session.begin_fetch();
        let source = self.source.clone();
        let range = self.range;
        let results = self.results.clone();
        debug!("Starting dashboard fetch #{}", ticket.sequence());
        tokio::spawn(async move {
            let result = source.dashboard(&range).await;
            let _ = results.send((ticket, result));
        });
    }

    fn print_page(&self) {
        if self.session.is_loading() && !self.session.is_loaded() {
            println!("Loading...");
            return;
        }
        print!("{}", self.renderer.news_table(&self.session.page(), self.session.view()));
    }

    fn print_dashboard(&self) {
        let keywords = self.session.top_keywords(self.keyword_limit);
        print!(
            "{}",
            self.renderer.dashboard(
                self.session.data(),
                &self.session.page(),
                self.session.view(),
                &keywords
            )
        );
    }

    fn on_result(&mut self, ticket: FetchTicket, result: sims_core::Result<DashboardData>) {
        match result {
            Ok(data) => {
                if self.session.complete_fetch(ticket, data) == FetchOutcome::Applied {
                    self.print_page();
                }
            }
            Err(e) => {
                warn!("Dashboard fetch #{} failed: {}", ticket.sequence(), e);
                if self.session.fail_fetch(ticket, DASHBOARD_FAILED) == FetchOutcome::Applied {
                    println!("{}", DASHBOARD_FAILED);
                }
            }
        }
    }

    /// Applies one command. Returns false when the user asked to quit.
    fn on_command(&mut self, command: BrowseCommand) -> bool {
        match command {
            BrowseCommand::Next => {
                let total_pages = self.session.page().total_pages;
                self.session.view_mut().next_page(total_pages);
                self.print_page();
            }
            BrowseCommand::Prev => {
                self.session.view_mut().prev_page();
                self.print_page();
            }
            BrowseCommand::Page(n) => {
                self.session.view_mut().set_page(n);
                self.print_page();
            }
            BrowseCommand::Sort(key, Some(direction)) => {
                self.session.view_mut().set_sort(key, direction);
                self.print_page();
            }
            BrowseCommand::Sort(key, None) => {
                self.session.view_mut().toggle_sort(key);
                self.print_page();
            }
            BrowseCommand::Filter(kind, value) => {
                match self.session.view_mut().set_filter(kind, value.as_deref()) {
                    Ok(()) => self.print_page(),
                    Err(e) => println!("{}", e),
                }
            }
            BrowseCommand::Clear => {
                self.session.view_mut().clear_filters();
                self.print_page();
            }
            BrowseCommand::Range(range) => {
                self.range = range;
                self.fetch();
                println!("Loading...");
            }
            BrowseCommand::Reload => {
                self.fetch();
                println!("Loading...");
            }
            BrowseCommand::Keywords => {
                print!("{}", self.renderer.keywords(&self.session.top_keywords(self.keyword_limit)))
            }
            BrowseCommand::Categories => print!("{}", self.renderer.categories(&self.session.categories())),
            BrowseCommand::Tone => print!("{}", self.renderer.tone(&self.session.tone())),
            BrowseCommand::Show => self.print_page(),
            BrowseCommand::Dashboard => self.print_dashboard(),
            BrowseCommand::Help => println!("{}", HELP),
            BrowseCommand::Quit => return false,
        }
        true
    }
}

pub async fn run(
    source: Arc<dyn DashboardSource>,
    renderer: Renderer,
    range: DateRange,
    stopwords: StopWords,
    keyword_limit: usize,
) -> anyhow::Result<()> {
    let (results, mut incoming) = mpsc::unbounded_channel();
    let mut browser = Browser {
        source,
        renderer,
        session: DashboardSession::new(stopwords),
        range,
        keyword_limit,
        results,
    };

    println!("Type 'help' for commands.");
    browser.fetch();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some((ticket, result)) = incoming.recv() => browser.on_result(ticket, result),
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.parse::<BrowseCommand>() {
                    Ok(command) => {
                        if !browser.on_command(command) {
                            break;
                        }
                    }
                    Err(message) => println!("{}", message),
                }
            }
        }
    }
    Ok(())
}
