use anyhow::Result;
use auto_slideshow::cli::Cli;
use auto_slideshow::component::Slideshow;
use auto_slideshow::config::{load_settings, save_settings};
use auto_slideshow::init;
use auto_slideshow::signal::setup_shutdown_signal;
use clap::Parser;
use console::style;
use log::{error, info};
use std::process::ExitCode;

fn main() -> ExitCode {
    init::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("{} {:#}", style("錯誤:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let shutdown_signal = setup_shutdown_signal()?;

    let settings = cli.merge_settings(load_settings(&cli.config)?);
    let config = cli.slideshow_config(&settings)?;

    if cli.save_config {
        save_settings(&cli.config, &settings)?;
        info!("設定已儲存到 {}", cli.config.display());
    }

    println!("{}", style("=== 幻燈片影片產生 ===").cyan().bold());

    let slideshow = Slideshow::new(config, shutdown_signal);
    let report = slideshow.run()?;
    slideshow.print_summary(&report);

    Ok(())
}
