//! Return to Form CLI - workbook generator

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use return_to_form::prelude::*;
use return_to_form::template::{DEFAULT_WEEKS, MAX_WEEKS};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rtf")]
#[command(
    author,
    version,
    about = "Generate the Return to Form training workbook (XLSX)",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    generate: GenerateArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the workbook (default)
    Generate(GenerateArgs),

    /// List all sheets in a workbook
    Sheets {
        /// Input workbook file
        input: PathBuf,
    },

    /// Show information about a workbook
    Info {
        /// Input workbook file
        input: PathBuf,
    },

    /// Re-read a generated workbook and run the acceptance checks
    Check {
        /// Input workbook file
        input: PathBuf,
    },
}

#[derive(Args, Clone)]
struct GenerateArgs {
    /// Number of training weeks
    #[arg(short, long, default_value_t = DEFAULT_WEEKS,
          value_parser = clap::value_parser!(u32).range(1..=MAX_WEEKS as i64))]
    weeks: u32,

    /// Directory to write the workbook into
    #[arg(short = 'd', long, default_value = ".")]
    output_dir: PathBuf,

    /// Output file (overrides --output-dir and the default file name)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Color palette
    #[arg(long, value_enum, default_value_t = ThemeArg::DarkKnight)]
    theme: ThemeArg,

    /// Omit the creation timestamp so reruns produce identical bytes
    #[arg(long)]
    reproducible: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ThemeArg {
    DarkKnight,
    CrimsonRed,
    SpecialOps,
    ArcticBlue,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::DarkKnight => Theme::DARK_KNIGHT,
            ThemeArg::CrimsonRed => Theme::CRIMSON_RED,
            ThemeArg::SpecialOps => Theme::SPECIAL_OPS,
            ThemeArg::ArcticBlue => Theme::ARCTIC_BLUE,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        None => generate_workbook(&cli.generate),
        Some(Commands::Generate(args)) => generate_workbook(&args),
        Some(Commands::Sheets { input }) => list_sheets(&input),
        Some(Commands::Info { input }) => show_info(&input),
        Some(Commands::Check { input }) => check_file(&input),
    }
}

fn generate_workbook(args: &GenerateArgs) -> Result<()> {
    let plan = PlanConfig {
        weeks: args.weeks,
        output_dir: args.output_dir.clone(),
        output: args.output.clone(),
        created: (!args.reproducible).then(chrono::Utc::now),
        theme: args.theme.into(),
        ..PlanConfig::default()
    };

    let report = generate(&plan)
        .with_context(|| format!("Failed to write '{}'", plan.output_path().display()))?;

    tracing::info!(
        file = %report.path.display(),
        sheets = report.sheet_count,
        theme = plan.theme.name,
        "template created"
    );
    Ok(())
}

fn open(input: &Path) -> Result<Workbook> {
    Workbook::open(input).with_context(|| format!("Failed to open '{}'", input.display()))
}

fn list_sheets(input: &Path) -> Result<()> {
    let workbook = open(input)?;

    for (i, sheet) in workbook.worksheets().enumerate() {
        println!("{}\t{}", i, sheet.name());
    }

    Ok(())
}

fn show_info(input: &Path) -> Result<()> {
    let workbook = open(input)?;

    println!("File: {}", input.display());
    if let Some(title) = &workbook.properties().title {
        println!("Title: {}", title);
    }
    println!("Sheets: {}", workbook.sheet_count());

    for (i, sheet) in workbook.worksheets().enumerate() {
        let formula_count = sheet.formula_cells().count();

        println!();
        println!("  Sheet {}: \"{}\"", i, sheet.name());

        if let Some(range) = sheet.used_range() {
            println!(
                "    Used range: {} ({} rows x {} columns)",
                range.to_a1_string(),
                range.row_count(),
                range.col_count()
            );
        } else {
            println!("    Used range: empty");
        }
        println!("    Merged ranges: {}", sheet.merged_regions().len());
        println!("    Formulas: {}", formula_count);
    }

    Ok(())
}

fn check_file(input: &Path) -> Result<()> {
    let workbook = open(input)?;
    let report = check_workbook(workbook).context("Failed to calculate formulas")?;

    println!("Sheets: {}", report.sheet_count);
    if let Some(weeks) = report.weeks {
        println!("Weeks: {}", weeks);
    }
    println!("Formulas checked: {}", report.formula_count);

    if !report.passed() {
        for failure in &report.failures {
            println!("FAIL: {}", failure);
        }
        bail!("{} check(s) failed", report.failures.len());
    }

    println!("All checks passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_is_default() {
        let cli = Cli::try_parse_from(["rtf", "--weeks", "8", "--reproducible"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.generate.weeks, 8);
        assert!(cli.generate.reproducible);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["rtf"]).unwrap();
        assert_eq!(cli.generate.weeks, 12);
        assert_eq!(cli.generate.output_dir, PathBuf::from("."));
        assert!(cli.generate.output.is_none());
        assert_eq!(Theme::from(cli.generate.theme), Theme::DARK_KNIGHT);
    }

    #[test]
    fn test_theme_flag() {
        let cli = Cli::try_parse_from(["rtf", "generate", "--theme", "special-ops"]).unwrap();
        let Some(Commands::Generate(args)) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(Theme::from(args.theme), Theme::SPECIAL_OPS);
        assert!(Cli::try_parse_from(["rtf", "--theme", "neon"]).is_err());
    }

    #[test]
    fn test_week_range_enforced() {
        assert!(Cli::try_parse_from(["rtf", "generate", "--weeks", "0"]).is_err());
        assert!(Cli::try_parse_from(["rtf", "generate", "--weeks", "53"]).is_err());
    }

    #[test]
    fn test_subcommands() {
        let cli = Cli::try_parse_from(["rtf", "check", "plan.xlsx"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Check { .. })));
    }
}
