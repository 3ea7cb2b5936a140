use std::env;

use clap::Parser;
use log::*;
use secrecy::ExposeSecret;

use changelog_pr::{
    Args, Result, action, command::open_pr, config::ActionConfig,
    forge::github::Github, git::GitCli,
};

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("changelog_pr")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

async fn run(config: &ActionConfig) -> Result<()> {
    let forge = Github::new(config.remote.clone())?;
    let git = GitCli::default();

    let pull = open_pr::execute(config, &forge, &git).await?;
    action::set_output("pr-number", &pull.number.to_string())?;

    Ok(())
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    let config = match ActionConfig::try_from(&args) {
        Ok(config) => config,
        Err(err) => {
            action::set_failed(&err.to_string());
            return Err(err.into());
        }
    };

    action::add_mask(config.remote.token.expose_secret());

    let runner_debug = env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1");
    initialize_logger(config.debug || runner_debug)?;

    if let Err(err) = run(&config).await {
        error!("{err}");
        action::set_failed(&err.to_string());
        return Err(err.into());
    }

    Ok(())
}
