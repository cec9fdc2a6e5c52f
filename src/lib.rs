//! `pf`: load a `.pf` workflow document, compute it, and report the results.

/// High-level command line app
mod app;
/// Definition of command-line args
mod args;
/// Workflow documents: names, loading and saving
mod document;
/// Combined command-line run settings
mod settings;
/// Text UI
mod ui;

// exported for tests:
pub use app::App;
pub use args::Args;
pub use document::Document;
pub use settings::Settings;

/// Run the command-line app.
pub fn run() -> Result<(), anyhow::Error> {
    use clap::Parser;
    let settings: Settings = Args::parse().try_into()?;
    simple_logging::log_to_stderr(log_level(settings.verbose));
    App::new(settings).run()
}

/// Log level for the number of times `-v` was given.
fn log_level(verbose: u8) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}
