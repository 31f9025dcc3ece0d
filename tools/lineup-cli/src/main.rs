//! Props Lineup CLI
//!
//! Offline lineup generation from an exported prop sheet:
//! - generate: draw lineups for one mix or all seven, optionally into a workbook
//! - mixes: list the mix tokens

mod export;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;

use lineup_engine::{build_pool, generate, sanitize_lineup, Lineup, LineupRequest, MixType};
use prop_registry::{HomeAway, PropSnapshot};

use export::MixLineups;

#[derive(Parser)]
#[command(name = "lineup-cli")]
#[command(about = "Generate prop lineups from a sheet export")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate lineups from a CSV or JSON sheet
    Generate {
        /// Sheet file (.csv or .json)
        #[arg(short, long)]
        sheet: PathBuf,

        /// Mix token, or "all" for every mix
        #[arg(short, long, default_value = "3_OVER_3_UNDER")]
        mix: String,

        /// Maximum lineups per mix
        #[arg(long, default_value = "10")]
        max: usize,

        /// Seed for reproducible draws
        #[arg(long)]
        seed: Option<u64>,

        /// Allowed tags, comma-separated (default: all)
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Matchups to keep, e.g. "LAL vs BOS"
        #[arg(long)]
        games: Vec<String>,

        /// Sports to keep, comma-separated
        #[arg(long, value_delimiter = ',')]
        sports: Vec<String>,

        /// Keep only Home or Away props
        #[arg(long)]
        home_away: Option<String>,

        /// Write one worksheet per mix to this workbook
        #[arg(long)]
        xlsx: Option<PathBuf>,
    },

    /// List the available mix tokens
    Mixes,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { sheet, mix, max, seed, tags, games, sports, home_away, xlsx } => {
            let home_away = match home_away.as_deref() {
                Some(raw) => match HomeAway::parse(raw) {
                    Some(side) => Some(side),
                    None => bail!("Invalid home/away value '{raw}', expected Home or Away"),
                },
                None => None,
            };
            let mixes = parse_mixes(&mix)?;
            let request = LineupRequest {
                home_away,
                filter_tags: tags,
                filter_games: games,
                sports,
                max_lineups: max,
                seed,
                ..LineupRequest::default()
            };
            run_generate(&sheet, &mixes, request, xlsx).await
        }
        Commands::Mixes => {
            println!("{}", "🎲 Available mixes".cyan().bold());
            for mix in MixType::ALL {
                let spec = mix.spec();
                println!("  {:<16} {} over / {} under", mix.token().green(), spec.over, spec.under);
            }
            Ok(())
        }
    }
}

fn parse_mixes(raw: &str) -> Result<Vec<MixType>> {
    if raw.trim().eq_ignore_ascii_case("all") {
        return Ok(MixType::ALL.to_vec());
    }
    Ok(vec![raw.parse::<MixType>()?])
}

async fn run_generate(
    sheet: &Path,
    mixes: &[MixType],
    request: LineupRequest,
    xlsx: Option<PathBuf>,
) -> Result<()> {
    let snapshot = PropSnapshot::load_from_file(sheet)
        .await
        .with_context(|| format!("failed loading sheet {}", sheet.display()))?;
    println!("📋 Loaded {} props from {}", snapshot.len(), sheet.display());

    let filter = request.pool_filter();
    let pool = build_pool(&snapshot, &filter);
    println!("🎯 Candidate pool: {} props", pool.len());
    println!();

    let mut results = Vec::with_capacity(mixes.len());
    for mix in mixes {
        let lineups = generate(
            pool.iter().copied(),
            mix.token(),
            request.max_lineups,
            &filter.allowed_tags,
            &request.filter_games,
            request.seed,
        )?;

        print_lineups(*mix, &lineups);
        results.push(MixLineups {
            mix: mix.token().to_string(),
            lineups: lineups.iter().map(sanitize_lineup).collect(),
        });
    }

    if let Some(path) = xlsx {
        export::write_workbook(&path, &results)?;
        let message = format!("✅ Wrote {} worksheets to {}", results.len(), path.display());
        println!("{}", message.green());
    }
    Ok(())
}

fn print_lineups(mix: MixType, lineups: &[Lineup<'_>]) {
    println!("{}", format!("📊 {mix}: {} lineups", lineups.len()).cyan().bold());
    if lineups.is_empty() {
        println!("    {}", "No lineups could be drawn from this pool".dimmed());
        println!();
        return;
    }

    for (idx, lineup) in lineups.iter().enumerate() {
        println!("  {}", format!("Lineup {}", idx + 1).bold());
        for pick in lineup.picks() {
            let tag = match pick.tag {
                Some(tag) if tag.is_over() => tag.as_str().green(),
                Some(tag) => tag.as_str().red(),
                None => "-".dimmed(),
            };
            println!("    {:<24} {:<6} vs {:<6} {}", pick.player, pick.team, pick.opponent, tag);
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixes() {
        assert_eq!(parse_mixes("all").unwrap().len(), 7);
        assert_eq!(parse_mixes("ALL").unwrap().len(), 7);
        assert_eq!(parse_mixes("6_UNDER").unwrap(), vec![MixType::SixUnder]);
        assert!(parse_mixes("6_under").is_err());
        assert!(parse_mixes("7_OVER").is_err());
    }
}
