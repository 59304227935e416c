//! # Spiderline Entry Point
//!
//! Builds one Spider from the command line, reads its first response and
//! prints the body or the extracted values.

use anyhow::{Context, Result};
use spiderline::cmd_args::CommandLineArgs;
use spiderline::{config, Rule, SpiderBuilder};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = CommandLineArgs::parse();
    init_tracing(args.verbose());

    let profile = config::load_profile(args.profile(), &config::get_profile_path())?;

    let mut builder = SpiderBuilder::new(args.url())
        .user_agent(&profile.user_agent)
        .overwrite(profile.overwrite_cookies)
        .options(profile.options.clone());
    if let Some(body) = args.body() {
        builder = builder.body(body);
    }
    if let Some(header) = args.header_text() {
        builder = builder.header(header);
    }
    if let Some(cookie) = args.cookie() {
        builder = builder.cookie(cookie);
    }
    let mut spider = builder.build().context("Failed to build request")?;

    if args.json() {
        let prepared = spider.model().prepare()?;
        println!("{}", serde_json::to_string_pretty(&prepared)?);
    }

    let rule = match (args.css(), args.regex()) {
        (Some(css), _) => Some(Rule::css(css)),
        (None, Some(regex)) => Some(Rule::regex(regex)),
        (None, None) => None,
    };

    if let Some(rule) = rule {
        for value in spider.find(&rule)? {
            println!("{value}");
        }
        return Ok(());
    }

    let response = spider
        .read_response()?
        .context("No request was pending")?;
    if args.json() {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else if args.verbose() {
        eprintln!(
            "{} {} ({}ms)",
            response.status(),
            response.url(),
            response.elapsed_ms()
        );
    }
    print!("{}", response.text());
    Ok(())
}

/// Log level comes from SPIDERLINE_LOG_LEVEL; verbose raises the default to debug
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "error" };
    #[allow(clippy::disallowed_methods)]
    let log_level = std::env::var("SPIDERLINE_LOG_LEVEL")
        .unwrap_or_else(|_| default_level.to_string())
        .to_lowercase();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_writer(std::io::stderr)
        .init();
}
