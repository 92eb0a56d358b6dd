use clap::Parser;
use edit_anchor::cli::commands::{cmd_apply, cmd_clear, cmd_edit, cmd_list};
use edit_anchor::cli::config::{
    Cli, Commands, build_agent_settings, load_config, resolve_store_path, resolve_trace_path,
};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = load_config(cli.config.as_deref());
    let settings = build_agent_settings(&config);
    let store_path = resolve_store_path(&cli, &config);
    let trace_path = resolve_trace_path(&cli, &config);

    match &cli.command {
        Commands::Apply { page, output } => {
            let report = cmd_apply(page, output.as_deref(), store_path, trace_path, settings)?;
            if report.unresolved() > 0 {
                tracing::info!(unresolved = report.unresolved(), "some edits could not be placed");
            }
        }
        Commands::Edit {
            page,
            target,
            text,
            output,
        } => {
            cmd_edit(page, target, text, output.as_deref(), store_path, settings)?;
        }
        Commands::List { url } => {
            cmd_list(url, store_path)?;
        }
        Commands::Clear { url, all } => {
            cmd_clear(url.as_deref(), *all, store_path)?;
        }
    }

    Ok(())
}
