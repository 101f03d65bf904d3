use anyhow::Result;
use icon_font::cli;
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    // Process CLI arguments first (before logging init for cleaner output)
    let options = match cli::process_cli() {
        cli::CliResult::Exit(code) => {
            if code == 0 {
                return Ok(());
            }
            std::process::exit(code);
        }
        cli::CliResult::Continue(options) => options,
    };
    // --log-level takes precedence, then ICON_FONT_LOG, then config (applied later).
    icon_font::debug::init_log_bridge(options.log_level);

    log::info!("Starting icon-font {}", icon_font::VERSION);

    let runtime = Runtime::new()?;
    let result = runtime.block_on(icon_font::app::run(&options));
    runtime.shutdown_timeout(std::time::Duration::from_secs(2));

    if let Err(ref e) = result {
        log::error!("{:#}", e);
    }
    result
}
