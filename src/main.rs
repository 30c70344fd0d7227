use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use dealchart::{
    chart_export, data, App, AppConfig, AppEvent, Args, ColorParser, ConfigManager, ConfigStore,
    ConfigUpdate, Theme, APP_NAME,
};
use ratatui::DefaultTerminal;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use tracing_subscriber::EnvFilter;

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(
    mut terminal: DefaultTerminal,
    mut app: App,
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
) -> Result<()> {
    render(&mut terminal, &mut app)?;

    loop {
        if crossterm::event::poll(std::time::Duration::from_millis(25))? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(std::time::Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(eyre!(msg));
                    }
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

/// Log file in use, or None when logging is off.
fn init_logging(args: &Args, config: &AppConfig) -> Result<Option<PathBuf>> {
    let level = match args.log_level {
        Some(level) => level.as_str().to_string(),
        None if config.logging.enabled => config.logging.level.to_lowercase(),
        None => return Ok(None),
    };
    let path = args
        .log_file
        .clone()
        .or_else(|| config.logging.file.clone())
        .or_else(|| dirs::cache_dir().map(|d| d.join(APP_NAME).join("dealchart.log")))
        .ok_or_else(|| eyre!("Could not determine a log file location"))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", APP_NAME, level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(Some(path))
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        let manager = ConfigManager::new(APP_NAME)?;
        match manager.write_default_config(args.force) {
            Ok(path) => {
                println!("Wrote default configuration to {}", path.display());
                return Ok(Some(()));
            }
            Err(e) => {
                eprintln!("Error generating config: {}", e);
                std::process::exit(1);
            }
        }
    }
    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;

    let config = AppConfig::load(APP_NAME).unwrap_or_else(|e| {
        eprintln!("Warning: {}. Using default configuration.", e);
        AppConfig::default()
    });
    if let Some(path) = init_logging(&args, &config)? {
        tracing::info!(
            "{} {} logging to {}",
            APP_NAME,
            env!("CARGO_PKG_VERSION"),
            path.display()
        );
    }

    let points = match &args.data {
        Some(path) => data::load_data(path, args.format)?,
        None => data::pipeline_data(),
    };

    let widget_config = config.widget_config()?;
    let mut store = ConfigStore::with_config(widget_config, config.palette_table())?;
    store.update(ConfigUpdate::try_from(&args)?)?;
    if let Some(search) = &args.search {
        store.set_search(search.clone());
    }
    if !args.only.is_empty() {
        store.set_filters(args.only.iter().cloned());
    }
    store.on_change(|config| {
        tracing::info!(
            chart = %config.chart_kind,
            scheme = %config.color_scheme,
            title = %config.title,
            "widget configuration changed"
        );
    });

    if args.print_spec || args.export.is_some() {
        let spec = dealchart::select_chart(store.config(), &store.filtered_colorized(&points));
        if args.print_spec {
            println!("{}", serde_json::to_string_pretty(&spec)?);
        }
        if let Some(path) = &args.export {
            chart_export::write_chart_png(
                path,
                &spec,
                store.config(),
                config.export.width,
                config.export.height,
            )?;
            println!("Exported {}", path.display());
        }
        return Ok(());
    }

    let theme = Theme::from_config(&config.theme)?;
    let (tx, rx) = channel::<AppEvent>();
    let mut app = App::new_with_theme(tx.clone(), store, points, theme)
        .with_export(config.export.clone())
        .with_parser(ColorParser::new());
    if let Some(path) = &args.data {
        app = app.with_source(path.clone(), args.format);
    }
    if args.debug || config.debug.enabled {
        app.enable_debug();
    }

    let terminal = ratatui::init();
    let result = run(terminal, app, tx, rx);
    ratatui::restore();
    if let Err(e) = result {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealchart::ChartKind;

    #[test]
    fn test_args_to_config_update() {
        let args = Args::parse_from(["dealchart", "--chart", "bar", "--size", "120"]);
        let mut store = ConfigStore::new(dealchart::PaletteTable::builtin());
        store.update(ConfigUpdate::try_from(&args).unwrap()).unwrap();
        assert_eq!(store.config().chart_kind, ChartKind::Bar);
        assert_eq!(store.config().size, 120.0);
    }

    #[test]
    fn test_logging_disabled_by_default() {
        let args = Args::parse_from(["dealchart"]);
        assert_eq!(init_logging(&args, &AppConfig::default()).unwrap(), None);
    }
}
