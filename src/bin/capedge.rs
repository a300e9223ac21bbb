//! Command-line front end for the CapEdge client.
//!
//! Reads session cookies from `CAPEDGE_COOKIES`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use capedge_client::{render_transcript_file, CapEdgeClient, CompanyProfile, IpoFiling, Transcript};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "capedge", version, about = "Earnings transcripts and IPO filings from CapEdge")]
struct Cli {
    /// Log requests and extraction details
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print JSON instead of tables where supported
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search companies by name or ticker
    Search {
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// List earnings call transcripts
    Transcripts {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Only this company (CIK)
        #[arg(long, conflicts_with = "ticker")]
        cik: Option<u64>,
        /// Only this company (ticker or name, resolved through search)
        #[arg(long)]
        ticker: Option<String>,
    },
    /// Most recent transcripts from the first page
    Latest {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Print or save a company's latest transcript
    Fetch {
        /// Ticker symbol
        ticker: String,
        /// Company name to try when the ticker finds nothing
        #[arg(long)]
        name: Option<String>,
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Save every transcript published in the last N hours
    Recent {
        #[arg(long, default_value_t = 24)]
        hours: i64,
        #[arg(long, default_value = "transcripts")]
        dir: PathBuf,
    },
    /// List the latest IPO and follow-on filings
    Ipos {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Company profiles for recent IPO filers
    Profiles {
        #[arg(long, default_value_t = 15)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let client = CapEdgeClient::from_env()?;

    match cli.cmd {
        Command::Search { query, limit } => search(&client, &query, limit, cli.json),
        Command::Transcripts { page, cik, ticker } => {
            let cik = match ticker {
                Some(t) => Some(resolve_cik(&client, &t, None)?),
                None => cik,
            };
            let result = client.list_transcripts(page, cik)?;
            if cli.json {
                return print_json(&result);
            }
            println!("Total available: {}", result.total);
            println!();
            print_transcripts(&result.data);
            Ok(())
        }
        Command::Latest { limit } => {
            let transcripts = client.latest_transcripts(limit)?;
            if cli.json {
                return print_json(&transcripts);
            }
            print_transcripts(&transcripts);
            Ok(())
        }
        Command::Fetch {
            ticker,
            name,
            output,
        } => fetch(&client, &ticker, name.as_deref(), output.as_deref()),
        Command::Recent { hours, dir } => recent(&client, hours, &dir),
        Command::Ipos { page, limit } => {
            let result = client.list_ipo_filings(page, limit)?;
            if cli.json {
                return print_json(&result);
            }
            println!("Total filings: {}", result.total);
            println!();
            print_ipos(&result.data);
            Ok(())
        }
        Command::Profiles { limit } => profiles(&client, limit, cli.json),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn search(client: &CapEdgeClient, query: &str, limit: usize, json: bool) -> Result<()> {
    let mut companies = client.search_company(query)?;
    companies.truncate(limit);
    if json {
        return print_json(&companies);
    }
    if companies.is_empty() {
        println!("No companies match {query:?}");
    }
    for c in &companies {
        println!("{} ({}) - CIK: {}", c.name, c.ticker.as_deref().unwrap_or("-"), c.cik);
    }
    Ok(())
}

fn resolve_cik(client: &CapEdgeClient, ticker: &str, name: Option<&str>) -> Result<u64> {
    if let Some(cik) = client.find_company_cik(ticker)? {
        return Ok(cik);
    }
    if let Some(name) = name {
        log::info!("No match for {ticker}, trying {name:?}");
        if let Some(cik) = client.find_company_cik(name)? {
            return Ok(cik);
        }
    }
    bail!("Could not find a CIK for {ticker}")
}

fn print_transcripts(transcripts: &[Transcript]) {
    for t in transcripts {
        println!(
            "{:6} | {} | Q{} {} | {}",
            t.ticker,
            t.day(),
            t.quarter,
            t.year,
            t.company_name
        );
    }
}

fn fetch(client: &CapEdgeClient, ticker: &str, name: Option<&str>, output: Option<&Path>) -> Result<()> {
    let cik = resolve_cik(client, ticker, name)?;
    let result = client.list_transcripts_for_company(cik, 1)?;
    let Some(latest) = result.data.first() else {
        bail!("No transcripts found for {ticker}");
    };
    eprintln!("{} ({}) Q{} {}", latest.title, latest.day(), latest.quarter, latest.year);

    let body = client.fetch_transcript(latest)?;
    if body.is_empty() {
        bail!("Transcript page for {ticker} has no transcript content yet");
    }

    match output {
        Some(path) => {
            fs::write(path, render_transcript_file(latest, &body))
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Saved to {}", path.display());
        }
        None => print!("{body}"),
    }
    Ok(())
}

fn recent(client: &CapEdgeClient, hours: i64, dir: &Path) -> Result<()> {
    let cutoff = cutoff(Utc::now(), hours)?;
    println!("Fetching transcripts since {}", cutoff.format("%Y-%m-%d %H:%M"));

    let transcripts = client.recent_transcripts(cutoff)?;
    if transcripts.is_empty() {
        println!("No transcripts found in the last {hours} hours.");
        return Ok(());
    }
    print_transcripts(&transcripts);
    println!();

    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    // One failed fetch must not stop the rest.
    let mut saved = 0usize;
    for t in &transcripts {
        let path = dir.join(t.file_name());
        match save_transcript(client, t, &path) {
            Ok(true) => {
                saved += 1;
                println!("  {} Q{} {}: OK -> {}", t.ticker, t.quarter, t.year, path.display());
            }
            Ok(false) => println!("  {} Q{} {}: SKIP (no content)", t.ticker, t.quarter, t.year),
            Err(e) => println!("  {} Q{} {}: ERROR ({e:#})", t.ticker, t.quarter, t.year),
        }
    }
    println!();
    println!("Saved {saved} of {} transcripts to {}", transcripts.len(), dir.display());
    Ok(())
}

/// `now` minus `hours`, refusing negative or unrepresentable spans.
fn cutoff(now: DateTime<Utc>, hours: i64) -> Result<DateTime<Utc>> {
    if hours < 0 {
        bail!("--hours must not be negative, got {hours}");
    }
    Duration::try_hours(hours)
        .and_then(|span| now.checked_sub_signed(span))
        .with_context(|| format!("--hours {hours} reaches past the supported date range"))
}

fn save_transcript(client: &CapEdgeClient, transcript: &Transcript, path: &Path) -> Result<bool> {
    let body = client.fetch_transcript(transcript)?;
    if body.is_empty() {
        return Ok(false);
    }
    fs::write(path, render_transcript_file(transcript, &body))
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(true)
}

fn format_date(iso: &str) -> String {
    match DateTime::parse_from_rfc3339(iso) {
        Ok(dt) => dt.format("%b %d, %Y").to_string(),
        Err(_) if iso.is_empty() => "-".to_string(),
        Err(_) => iso.get(..10).unwrap_or(iso).to_string(),
    }
}

fn print_ipos(filings: &[IpoFiling]) {
    println!("{:<10} {:<12} {:<14} {:<12} Company", "Form", "Type", "Date", "CIK");
    println!("{}", "-".repeat(90));
    for f in filings {
        let company: String = f.company_name.chars().take(38).collect();
        println!(
            "{:<10} {:<12} {:<14} {:<12} {}",
            f.form_type,
            f.registration_kind(),
            format_date(&f.date),
            f.cik,
            company
        );
    }
}

fn short_company_name(name: &str) -> &str {
    let name = name.split(',').next().unwrap_or(name);
    let name = name.split(" Inc").next().unwrap_or(name);
    name.split(" Corp").next().unwrap_or(name).trim()
}

fn profiles(client: &CapEdgeClient, limit: usize, json: bool) -> Result<()> {
    let filings = client.list_ipo_filings(1, 100)?;
    let ipos: Vec<&IpoFiling> = filings
        .data
        .iter()
        .filter(|f| !f.is_follow_on)
        .take(limit)
        .collect();
    eprintln!("Found {} recent IPO filings", ipos.len());

    let mut found: Vec<CompanyProfile> = Vec::new();
    for ipo in ipos {
        let name = &ipo.company_name;
        let ticker = match client.find_ticker(ipo.cik, short_company_name(name)) {
            Ok(Some(t)) => Some(t),
            Ok(None) => client.find_ticker(ipo.cik, name).ok().flatten(),
            Err(e) => {
                eprintln!("{name}: ERROR ({e})");
                continue;
            }
        };
        let Some(ticker) = ticker else {
            eprintln!("{name}: no ticker");
            continue;
        };
        match client.company_profile(ipo.cik, &ticker) {
            Ok(Some(profile)) => {
                eprintln!("{name}: OK ({ticker})");
                found.push(profile);
            }
            Ok(None) => eprintln!("{name}: no data for {ticker}"),
            Err(e) => eprintln!("{name}: ERROR ({e})"),
        }
    }

    if json {
        return print_json(&found);
    }
    for p in &found {
        print_profile(p);
    }
    Ok(())
}

fn format_market_cap(value: Option<f64>) -> String {
    match value {
        None => "-".to_string(),
        Some(v) if v >= 1_000_000_000.0 => format!("${:.2}B", v / 1_000_000_000.0),
        Some(v) if v >= 1_000_000.0 => format!("${:.2}M", v / 1_000_000.0),
        Some(v) => format!("${}", group_thousands(v)),
    }
}

fn format_price(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("${v:.2}"))
}

/// Whole units with `,` between thousands.
fn group_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0.0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn print_profile(p: &CompanyProfile) {
    println!();
    println!("{}", p.name);
    println!("  Ticker: {} | Exchange: {}", p.ticker, p.exchange.as_deref().unwrap_or("-"));
    println!("  Sector: {}", p.sector.as_deref().unwrap_or("-"));
    println!("  Industry: {}", p.industry.as_deref().unwrap_or("-"));
    if !p.description.is_empty() {
        let mut desc: String = p.description.chars().take(200).collect();
        if desc.len() < p.description.len() {
            desc.push_str("...");
        }
        println!();
        println!("  {desc}");
    }
    println!();
    println!("  Price: {}", format_price(p.price));
    println!("  Market Cap: {}", format_market_cap(p.market_cap));
    println!(
        "  P/E Ratio: {}",
        p.pe_ratio.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
    );
    println!(
        "  52-Week Range: {} - {}",
        format_price(p.week_52_low),
        format_price(p.week_52_high)
    );
    if let Some(site) = &p.website {
        println!("  Website: {site}");
    }
    if let Some(address) = &p.address {
        println!("  Address: {address}");
    }
    println!("{}", "-".repeat(80));
}
