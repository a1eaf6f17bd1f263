// src/bin/scrape_images.rs
// DOCUMENTATION: Command line front end for the social image scraper
// PURPOSE: Print candidate images for a place as JSON on stdout
//
// Usage: scrape_images "<query>" [--max-images N] [--platforms reddit pinterest flickr]
// Progress goes to stderr so stdout can be piped into other tools.

use anyhow::{bail, Result};
use clap::Parser;
use dotenv::dotenv;
use std::process;
use travelblogr_api::services::{ImageScraper, Platform, DEFAULT_MAX_IMAGES};

// --- ANSI colors for the terminal ---
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";

/// Search Reddit, Pinterest and Flickr for images of a place
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Search term, e.g. "Lisbon Portugal"
    query: String,

    /// Images fetched per platform
    #[arg(long, default_value_t = DEFAULT_MAX_IMAGES, value_parser = positive_count)]
    max_images: usize,

    /// Platforms to search (all when omitted)
    #[arg(long, num_args = 1.., value_enum)]
    platforms: Vec<Platform>,
}

fn positive_count(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl Args {
    fn platforms(&self) -> Vec<Platform> {
        if self.platforms.is_empty() {
            Platform::ALL.to_vec()
        } else {
            self.platforms.clone()
        }
    }
}

async fn run(args: Args) -> Result<()> {
    if args.query.trim().is_empty() {
        bail!("the search query must not be empty");
    }
    let platforms = args.platforms();

    eprintln!(
        "{}🔍 Searching images for '{}' on {}{}",
        CYAN,
        args.query,
        platforms
            .iter()
            .map(|p| p.display_name())
            .collect::<Vec<_>>()
            .join(", "),
        RESET
    );

    let scraper = ImageScraper::new()?;
    let result = scraper.scrape(&args.query, args.max_images, &platforms).await;

    println!("{}", serde_json::to_string_pretty(&result)?);

    eprintln!(
        "\n{}{}✅ Total: {} images{}",
        BOLD, GREEN, result.total_images, RESET
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(args).await {
        eprintln!("{}❌ {:#}{}", RED, e, RESET);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(items: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("scrape_images").chain(items.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let parsed = parse(&["Paris France"]).unwrap();
        assert_eq!(parsed.query, "Paris France");
        assert_eq!(parsed.max_images, DEFAULT_MAX_IMAGES);
        assert_eq!(parsed.platforms(), Platform::ALL.to_vec());
    }

    #[test]
    fn test_options() {
        let parsed = parse(&[
            "--platforms",
            "reddit",
            "flickr",
            "--max-images",
            "5",
            "Porto",
        ])
        .unwrap();
        assert_eq!(parsed.query, "Porto");
        assert_eq!(parsed.max_images, 5);
        assert_eq!(parsed.platforms(), vec![Platform::Reddit, Platform::Flickr]);
    }

    #[test]
    fn test_invalid_input() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["Rom", "--max-images", "viele"]).is_err());
        assert!(parse(&["Rom", "--max-images", "0"]).is_err());
        assert!(parse(&["Rom", "--platforms", "instagram"]).is_err());
        assert!(parse(&["Rom", "--verbose"]).is_err());
        assert!(parse(&["Rom", "Lissabon"]).is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
