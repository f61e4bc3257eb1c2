mod app;
mod browse;
mod catalog;
mod config;
mod constants;
mod filter;
mod format;
mod input;
mod loader;
mod logging;
mod matcher;
mod sort;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

use app::{App, Launch};
use browse::Browse;
use catalog::{Catalog, MediaKind, MediaRecord};
use config::Config;
use constants::constants;
use sort::{SortKey, sort_by_name, sort_records};

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Browse a sermon archive in the terminal", long_about = None)]
struct Args {
  /// Catalog file to browse instead of the bundled archive (.ron or .json)
  #[arg(short, long)]
  catalog: Option<PathBuf>,

  /// Recordings revealed per page
  #[arg(short, long, default_value_t = constants().page_size)]
  page_size: usize,

  /// Sort key: newest, oldest, title, speaker or most-viewed (aliases: latest, minister, views)
  #[arg(short, long)]
  sort: Option<String>,

  /// Start on the video or audio archive
  #[arg(short, long)]
  kind: Option<MediaKind>,

  /// Initial search text (title, speaker, series, category or tag)
  #[arg(short, long)]
  query: Option<String>,

  /// Print the first page as JSON lines and exit
  #[arg(long)]
  list: bool,

  /// Generate shell completions and exit
  #[arg(long, value_name = "SHELL")]
  completions: Option<Shell>,
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(shell) = args.completions {
    let mut cmd = Args::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
    return Ok(());
  }

  let _log_guard = logging::init_logging().context("Failed to initialize logging")?;
  info!(version = env!("CARGO_PKG_VERSION"), "pew: starting");

  let catalog = match &args.catalog {
    Some(path) => Catalog::from_path(path)?,
    None => Catalog::bundled()?,
  };
  anyhow::ensure!(!catalog.is_empty(), "Catalog has no recordings");
  info!(records = catalog.len(), "pew: catalog ready");
  let config = Config::load();

  if args.list {
    return print_listing(&catalog, &config, &args);
  }

  let launch = Launch {
    kind: args.kind,
    sort: args.sort.clone(),
    query: args.query.clone(),
    page_size: args.page_size,
    loading_delay: constants().loading_delay(),
  };
  let mut app = App::new(catalog, config, launch);

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, &mut app).await;
  ratatui::restore();
  if let Err(ref e) = result {
    error!(err = %e, "pew: exited with error");
  }
  result
}

/// Non-interactive mode: one window of the listing, one JSON object per line.
fn print_listing(catalog: &Catalog, config: &Config, args: &Args) -> Result<()> {
  let kind = args.kind.or(config.kind).unwrap_or(MediaKind::Video);
  let matched: Vec<MediaRecord> =
    catalog.search(args.query.as_deref().unwrap_or(""), Some(kind)).into_iter().cloned().collect();
  let records = match args.sort.as_deref() {
    Some(name) => sort_by_name(matched, name),
    None => sort_records(matched, config.sort.unwrap_or(SortKey::Newest)),
  };
  let browse = Browse::new(records, None, args.page_size, Duration::ZERO);

  let mut out = std::io::stdout().lock();
  for record in browse.visible() {
    let line = serde_json::to_string(record).context("Failed to serialize record")?;
    writeln!(out, "{}", line).context("Failed to write listing")?;
  }
  info!(shown = browse.visible().len(), total = browse.total(), "pew: listed first page");
  Ok(())
}

async fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
  loop {
    app.check_pending()?;

    terminal.draw(|frame| ui::ui(frame, app))?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(app, key)?;
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }
  info!("pew: quit");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cli_defaults() {
    let args = Args::try_parse_from(["pew"]).unwrap();
    assert_eq!(args.page_size, 12);
    assert!(args.sort.is_none());
    assert!(!args.list);
  }

  #[test]
  fn cli_parses_kind_and_sort() {
    let args = Args::try_parse_from(["pew", "--kind", "audio", "--sort", "views", "-p", "20", "-q", "faith"]).unwrap();
    assert_eq!(args.kind, Some(MediaKind::Audio));
    assert_eq!(args.query.as_deref(), Some("faith"));
    assert_eq!(args.sort.as_deref(), Some("views"));
    assert_eq!(args.page_size, 20);
  }

  #[test]
  fn cli_is_well_formed() {
    Args::command().debug_assert();
  }
}
