use std::io::IsTerminal;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use sims_client::{ApiClient, ClientConfig};
use sims_core::error::{ARTICLE_FAILED, ARTICLE_NOT_FOUND, DASHBOARD_FAILED};
use sims_core::{
    ArticleId, ArticleQuery, DashboardData, DashboardSession, DashboardSource, DateRange, Error,
    FilterKind, MemorySource, Sentiment, SortDirection, SortKey,
};
use sims_web::AppState;
use tracing::{debug, info, warn};

mod browse;
mod config;
mod duration;
mod logging;
mod render;

use config::Settings;
use duration::HumanDuration;
use render::Renderer;

#[derive(Parser, Debug)]
#[command(name = "sims", author, version, about = "Browse and serve the SIMS news-monitoring dashboard", long_about = None)]
pub struct Cli {
    /// Base URL of the upstream dashboard API
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Settings file (defaults to ./sims.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Upstream request timeout (e.g. 30s, 1m)
    #[arg(long, global = true)]
    timeout: Option<HumanDuration>,
    /// Read dashboard data from a JSON snapshot instead of the API
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Disable coloured output
    #[arg(long, global = true)]
    no_color: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
struct RangeArgs {
    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    start: Option<String>,
    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    end: Option<String>,
}

impl RangeArgs {
    fn parse(&self) -> anyhow::Result<DateRange> {
        Ok(DateRange::parse(self.start.as_deref(), self.end.as_deref())?)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every dashboard section
    Dashboard {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long)]
        json: bool,
    },
    /// One page of the latest news table
    News {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long, default_value = "date")]
        sort: SortKey,
        #[arg(long, default_value = "desc")]
        dir: SortDirection,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        sentiment: Option<Sentiment>,
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        json: bool,
    },
    /// Most frequent headline words
    Keywords {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Distinct news categories
    Categories {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long)]
        json: bool,
    },
    /// Sentiment counts of the latest news
    Tone {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long)]
        json: bool,
    },
    /// Full detail for one article
    Article {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Search the article archive
    Articles {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        sentiment: Option<Sentiment>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Interactive session with paging, sorting and filtering
    Browse {
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Serve the transformed dashboard as a JSON API
    Serve {
        /// Address to listen on (e.g. 127.0.0.1:8080)
        #[arg(long)]
        bind: Option<String>,
    },
}

async fn connect(settings: &Settings) -> anyhow::Result<Arc<dyn DashboardSource>> {
    if let Some(path) = &settings.fixture {
        let source = MemorySource::from_json_file(path)
            .await
            .with_context(|| format!("failed to load fixture '{}'", path.display()))?;
        info!("📂 Using snapshot {}", path.display());
        return Ok(Arc::new(source));
    }
    let config = ClientConfig::new(&settings.api_url, settings.timeout)?;
    debug!("Using upstream API at {}", config.base_url);
    Ok(Arc::new(ApiClient::new(config)?))
}

async fn load_dashboard(source: &dyn DashboardSource, range: &DateRange) -> anyhow::Result<DashboardData> {
    source.dashboard(range).await.map_err(|e| {
        warn!("Dashboard fetch failed: {}", e);
        anyhow!(DASHBOARD_FAILED)
    })
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli, settings: Settings) -> anyhow::Result<()> {
    let renderer = Renderer::new(!cli.no_color && std::io::stdout().is_terminal());

    if let Commands::Serve { bind } = &cli.command {
        let bind = bind.clone().unwrap_or_else(|| settings.bind.clone());
        let addr: SocketAddr = bind
            .parse()
            .with_context(|| format!("invalid bind address '{}'", bind))?;
        let source = connect(&settings).await?;
        let state = AppState::new(source)
            .with_stopwords(settings.stopwords())
            .with_keyword_limit(settings.keyword_limit);
        return sims_web::serve(state, addr).await;
    }

    let source = connect(&settings).await?;
    let mut session = DashboardSession::new(settings.stopwords());

    match cli.command {
        Commands::Dashboard { range, json } => {
            let data = load_dashboard(source.as_ref(), &range.parse()?).await?;
            if json {
                return print_json(&data);
            }
            let ticket = session.begin_fetch();
            session.complete_fetch(ticket, data);
            let keywords = session.top_keywords(settings.keyword_limit);
            print!(
                "{}",
                renderer.dashboard(session.data(), &session.page(), session.view(), &keywords)
            );
        }
        Commands::News {
            range,
            sort,
            dir,
            category,
            sentiment,
            keyword,
            page,
            json,
        } => {
            let data = load_dashboard(source.as_ref(), &range.parse()?).await?;
            let ticket = session.begin_fetch();
            session.complete_fetch(ticket, data);

            let view = session.view_mut();
            view.set_sort(sort, dir);
            view.set_filter(FilterKind::Category, category.as_deref())?;
            view.set_sentiment_filter(sentiment);
            view.set_filter(FilterKind::Keyword, keyword.as_deref())?;
            view.set_page(page);

            let page = session.page();
            if json {
                return print_json(&page);
            }
            print!("{}", renderer.news_table(&page, session.view()));
        }
        Commands::Keywords { range, limit, json } => {
            let data = load_dashboard(source.as_ref(), &range.parse()?).await?;
            let ticket = session.begin_fetch();
            session.complete_fetch(ticket, data);
            let keywords = session.top_keywords(limit.unwrap_or(settings.keyword_limit));
            if json {
                return print_json(&keywords);
            }
            print!("{}", renderer.keywords(&keywords));
        }
        Commands::Categories { range, json } => {
            let data = load_dashboard(source.as_ref(), &range.parse()?).await?;
            let ticket = session.begin_fetch();
            session.complete_fetch(ticket, data);
            let categories = session.categories();
            if json {
                return print_json(&categories);
            }
            print!("{}", renderer.categories(&categories));
        }
        Commands::Tone { range, json } => {
            let data = load_dashboard(source.as_ref(), &range.parse()?).await?;
            let ticket = session.begin_fetch();
            session.complete_fetch(ticket, data);
            let tone = session.tone();
            if json {
                return print_json(&tone);
            }
            print!("{}", renderer.tone(&tone));
        }
        Commands::Article { id, json } => {
            let detail = source.article(&ArticleId(id)).await.map_err(|e| match e {
                Error::NotFound(_) => anyhow!(ARTICLE_NOT_FOUND),
                other => {
                    warn!("Article fetch failed: {}", other);
                    anyhow!(ARTICLE_FAILED)
                }
            })?;
            let view = detail.view();
            if json {
                return print_json(&view);
            }
            print!("{}", renderer.article(&view));
        }
        Commands::Articles {
            range,
            limit,
            offset,
            source: outlet,
            sentiment,
            search,
            json,
        } => {
            let query = ArticleQuery {
                limit,
                offset,
                source: outlet,
                sentiment,
                range: range.parse()?,
                search,
            };
            let list = source.articles(&query).await.map_err(|e| {
                warn!("Article listing failed: {}", e);
                anyhow!(ARTICLE_FAILED)
            })?;
            if json {
                return print_json(&list);
            }
            print!("{}", renderer.article_list(&list, offset));
        }
        Commands::Browse { range } => {
            browse::run(
                source,
                renderer,
                range.parse()?,
                settings.stopwords(),
                settings.keyword_limit,
            )
            .await?;
        }
        Commands::Serve { .. } => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let settings = match Settings::load(cli.config.as_deref(), |key| std::env::var(key).ok()) {
        Ok(settings) => settings.with_overrides(
            cli.api_url.clone(),
            cli.timeout.map(Into::into),
            cli.fixture.clone(),
        ),
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(cli, settings).await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_news_flags() {
        let cli = Cli::try_parse_from([
            "sims",
            "--timeout",
            "1m",
            "news",
            "--sort",
            "headline",
            "--dir",
            "asc",
            "--sentiment",
            "negative",
            "--start",
            "2024-06-01",
            "--page",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.timeout.map(|t| t.0.as_secs()), Some(60));
        match cli.command {
            Commands::News {
                sort,
                dir,
                sentiment,
                page,
                range,
                ..
            } => {
                assert_eq!(sort, SortKey::Headline);
                assert_eq!(dir, SortDirection::Ascending);
                assert_eq!(sentiment, Some(Sentiment::Negative));
                assert_eq!(page, 2);
                assert_eq!(range.start.as_deref(), Some("2024-06-01"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["sims", "tone", "--fixture", "snap.json", "-v"]).unwrap();
        assert_eq!(cli.fixture, Some(PathBuf::from("snap.json")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Cli::try_parse_from(["sims", "news", "--sort", "popularity"]).is_err());
        assert!(Cli::try_parse_from(["sims", "--timeout", "soon", "tone"]).is_err());
    }

    #[tokio::test]
    async fn test_fixture_source() {
        let settings = Settings {
            fixture: Some(PathBuf::from("does-not-exist.json")),
            ..Settings::default()
        };
        let err = connect(&settings).await.err().unwrap();
        assert!(format!("{err:#}").contains("failed to load fixture"));

        let source = connect(&Settings::default()).await.unwrap();
        assert_eq!(source.name(), "api");
    }
}
