// src/main.rs
use std::io;
use std::sync::Mutex;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use cadguide::{
    app::App,
    catalog::{self, BuiltinSource, CatalogEntry, CatalogSource, JsonFileSource},
    cli::{Args, Commands, CompareArgs, ListArgs, RecommendArgs, TrendingArgs},
    compare::{self, Comparison},
    config::Config,
    error_handling::{Context, Result},
    output::{self, Report},
    processor,
    quiz::{AnswerStore, QuizAnswers, QuizResult, ResolvedAnswers, resolve_answers},
    scorer::{self, ScoredEntry},
};

/// RAII wrapper for TUI terminal setup and teardown.
pub struct Tui {
    pub terminal: Terminal<CrosstermBackend<std::io::Stdout>>,
}

impl Tui {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        }));

        Ok(Self { terminal })
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let log_level = if args.verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
    );

    match &args.log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file '{}'", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
        }
        // The TUI owns the terminal; stderr output would corrupt the screen.
        None if args.command.is_none() => {}
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr))
                .init();
        }
    }
    Ok(())
}

fn load_entries(args: &Args, config: &Config) -> Result<Vec<CatalogEntry>> {
    let files: Vec<JsonFileSource> = config
        .catalog
        .paths
        .iter()
        .chain(args.catalogs.iter())
        .map(JsonFileSource::new)
        .collect();

    let mut sources: Vec<&dyn CatalogSource> = Vec::new();
    if config.catalog.include_builtin && !args.no_builtin {
        sources.push(&BuiltinSource);
    }
    for file in &files {
        sources.push(file);
    }

    let loaded = catalog::load_catalog(&sources)?;
    if loaded.rejected > 0 {
        tracing::warn!(rejected = loaded.rejected, "Some catalog records were invalid and skipped");
    }
    tracing::info!(
        entries = loaded.entries.len(),
        inactive = loaded.inactive,
        "Catalog ready"
    );
    Ok(loaded.entries)
}

fn answer_store(config: &Config) -> Option<AnswerStore> {
    if config.quiz.remember_answers {
        AnswerStore::default_location()
    } else {
        None
    }
}

fn run_list(entries: &[CatalogEntry], args: ListArgs) -> Result<()> {
    let query = args.filter.as_deref().unwrap_or("");
    let hits = if query.is_empty() {
        catalog::flat_sorted(entries)
    } else {
        processor::search(entries, query)
    };
    let hits = match args.category.as_deref() {
        Some(category) => processor::filter_by_category(&hits, category),
        None => hits,
    };

    let report = if args.grouped {
        // family view keeps catalog order when unfiltered
        let owned: Vec<CatalogEntry> = if query.is_empty() {
            entries
                .iter()
                .filter(|e| hits.iter().any(|h| h.uid == e.uid))
                .cloned()
                .collect()
        } else {
            hits.into_iter().cloned().collect()
        };
        let groups = processor::group_entries(&owned);
        if args.json { Report::json(&groups)? } else { Report::text(output::render_groups(&groups)) }
    } else if args.json {
        Report::json(&hits)?
    } else {
        Report::text(output::render_entries(&hits))
    };

    output::emit(&report, args.output.as_deref())
}

#[derive(Serialize)]
struct RecommendationReport<'a> {
    answers: &'a QuizResult,
    results: &'a [ScoredEntry],
}

fn run_recommend(entries: &[CatalogEntry], config: &Config, args: RecommendArgs) -> Result<()> {
    let store = answer_store(config);
    let explicit = QuizAnswers {
        primary_use: args.primary_use,
        experience: args.experience,
        budget: args.budget,
        platform: args.platform,
        features: Some(args.features),
    };
    let ResolvedAnswers { result, remember } = resolve_answers(explicit, store.as_ref(), args.saved)
        .context("Failed to resolve recommendation answers")?;

    let ranked = match args.limit {
        Some(limit) => scorer::recommend_top(entries, &result, &config.scoring, limit),
        None => scorer::recommend(entries, &result, &config.scoring),
    };

    if remember
        && let Some(store) = &store
        && let Err(e) = store.save(&result) {
            tracing::warn!("Could not save quiz answers: {:#}", e);
        }

    let report = if args.grouped {
        let groups = scorer::group_scored(&ranked);
        if args.json { Report::json(&groups)? } else { Report::text(output::render_groups(&groups)) }
    } else if args.json {
        Report::json(&RecommendationReport { answers: &result, results: &ranked })?
    } else {
        Report::text(output::render_recommendations(&result, &ranked))
    };

    output::emit(&report, args.output.as_deref())
}

fn run_compare(entries: &[CatalogEntry], args: CompareArgs) -> Result<()> {
    let mut comparison = Comparison::new();
    for selector in &args.entries {
        let entry = compare::find_entry(entries, selector)?;
        comparison.add(entry.clone())?;
    }

    let report = if args.json {
        Report::json(&serde_json::json!({
            "selected": comparison.selected(),
            "features": comparison.feature_matrix(),
        }))?
    } else {
        Report::text(output::render_comparison(&comparison))
    };
    output::emit(&report, None)
}

fn run_trending(entries: &[CatalogEntry], args: TrendingArgs) -> Result<()> {
    let top = catalog::top_rated(entries, args.limit);
    let report = if args.json { Report::json(&top)? } else { Report::text(output::render_entries(&top)) };
    output::emit(&report, None)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let config = Config::load(args.config.as_deref())?;
    let entries = load_entries(&args, &config)?;

    match args.command {
        Some(Commands::List(list_args)) => run_list(&entries, list_args)?,
        Some(Commands::Recommend(rec_args)) => run_recommend(&entries, &config, rec_args)?,
        Some(Commands::Compare(cmp_args)) => run_compare(&entries, cmp_args)?,
        Some(Commands::Trending(trend_args)) => run_trending(&entries, trend_args)?,
        None => {
            // --- TUI Mode ---
            if entries.is_empty() {
                println!("The catalog is empty. Add entries with --catalog <file.json>.");
                return Ok(());
            }

            let mut tui = Tui::new()?;
            let mut app = App::new(entries, config.scoring, answer_store(&config));
            app.run(&mut tui.terminal)?;
        }
    }

    Ok(())
}
