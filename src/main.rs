// GDN Campaign Country Optimizer - CLI
// Batch mode: spend.xlsx + revenue.csv in, two partition CSVs out

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use gdn_optimizer::{
    filter_rows, run_pipeline, write_partition_csv, CampaignSelection, CountryResolver,
    SpendLayout, EXCLUDED_FILE, PERFORMING_FILE,
};

struct CliArgs {
    spend_path: PathBuf,
    revenue_path: PathBuf,
    out_dir: PathBuf,
    campaigns: Option<Vec<i64>>,
    leading_rows: usize,
}

fn print_usage() {
    eprintln!("Usage: gdn-optimizer <spend.xlsx> <revenue.csv> [out-dir]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --campaigns 1,2,3   Restrict output to these campaign ids");
    eprintln!(
        "  --skip-rows N       Leading spreadsheet rows to discard (default {})",
        SpendLayout::DEFAULT_LEADING_ROWS
    );
}

fn parse_args() -> Result<CliArgs> {
    let mut positional: Vec<String> = Vec::new();
    let mut campaigns = None;
    let mut leading_rows = SpendLayout::DEFAULT_LEADING_ROWS;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--campaigns" => {
                let list = args
                    .next()
                    .context("--campaigns requires a comma-separated id list")?;
                let ids = list
                    .split(',')
                    .map(|s| {
                        s.trim()
                            .parse::<i64>()
                            .with_context(|| format!("Invalid campaign id: '{}'", s))
                    })
                    .collect::<Result<Vec<i64>>>()?;
                campaigns = Some(ids);
            }
            "--skip-rows" => {
                leading_rows = args
                    .next()
                    .context("--skip-rows requires a number")?
                    .parse::<usize>()
                    .context("--skip-rows must be a non-negative integer")?;
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => positional.push(other.to_string()),
        }
    }

    if positional.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    Ok(CliArgs {
        spend_path: PathBuf::from(&positional[0]),
        revenue_path: PathBuf::from(&positional[1]),
        out_dir: positional
            .get(2)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
        campaigns,
        leading_rows,
    })
}

fn read_input(path: &Path, label: &str) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {} file: {}", label, path.display()))
}

fn main() -> Result<()> {
    let args = parse_args()?;

    println!("📊 GDN Campaign Country Optimizer");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load both inputs (pipeline does not run with either missing)
    println!("\n📂 Loading input files...");
    let spend_bytes = read_input(&args.spend_path, "spend")?;
    let revenue_bytes = read_input(&args.revenue_path, "revenue")?;
    println!("✓ Spend:   {} ({} bytes)", args.spend_path.display(), spend_bytes.len());
    println!("✓ Revenue: {} ({} bytes)", args.revenue_path.display(), revenue_bytes.len());

    // 2. Run the pipeline
    println!("\n⚖️  Reconciling...");
    let layout = SpendLayout::new(args.leading_rows);
    let countries = CountryResolver::builtin();
    let report = run_pipeline(&spend_bytes, &revenue_bytes, &layout, &countries)?;
    println!("✓ {}", report.summary());

    // 3. Apply campaign filter when requested; full partitions otherwise
    let (performing, excluded) = match &args.campaigns {
        Some(ids) => {
            let selection = CampaignSelection::all_of(ids.iter().copied());
            let performing = filter_rows(&report.performing, &selection);
            let excluded = filter_rows(&report.excluded, &selection);
            println!(
                "✓ Campaign filter {:?}: {} performing, {} excluded rows kept",
                selection.ids(),
                performing.len(),
                excluded.len()
            );
            (performing, excluded)
        }
        None => (report.performing.clone(), report.excluded.clone()),
    };

    // 4. Write both partitions
    println!("\n💾 Writing exports...");
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create output dir: {}", args.out_dir.display()))?;

    let performing_path = args.out_dir.join(PERFORMING_FILE);
    fs::write(&performing_path, write_partition_csv(&performing)?)
        .with_context(|| format!("Failed to write {}", performing_path.display()))?;
    println!("✓ {} ({} rows)", performing_path.display(), performing.len());

    let excluded_path = args.out_dir.join(EXCLUDED_FILE);
    fs::write(&excluded_path, write_partition_csv(&excluded)?)
        .with_context(|| format!("Failed to write {}", excluded_path.display()))?;
    println!("✓ {} ({} rows)", excluded_path.display(), excluded.len());

    println!("\n✅ Done");
    Ok(())
}
