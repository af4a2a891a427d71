use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use media_renamer_core::{
    app_paths, load_config, process_folder, BatchOptions, BatchOutcome, BatchReport,
    IdentityResolver, NamingRule, RenameStatus, RuleKind, RuleSelection,
};
use std::path::PathBuf;

mod prompt;

use prompt::ConsolePrompter;

#[derive(Debug, Parser)]
#[command(name = "media-renamer-cli")]
#[command(about = "Renames photos and videos to timestamp + camera model names")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Rename(RenameArgs),
    /// Lists the available rules.
    Rules,
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
}

#[derive(Debug, Args)]
struct RenameArgs {
    #[arg(long)]
    folder: PathBuf,
    #[arg(long, value_parser = parse_rule_kind)]
    rule: RuleKind,
    /// Regex removed (strip-prefix) or replaced (replace) in the lowercased name.
    #[arg(long)]
    regex: Option<String>,
    #[arg(long)]
    replacement: Option<String>,
    /// Signed minute offset for time-shift.
    #[arg(long, allow_hyphen_values = true)]
    minutes: Option<String>,
    #[arg(long, default_value_t = false)]
    apply: bool,
    /// Skip the parameter confirmation before applying.
    #[arg(long, default_value_t = false)]
    yes: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn parse_rule_kind(value: &str) -> Result<RuleKind, String> {
    value.parse::<RuleKind>().map_err(|err| {
        let ids: Vec<_> = RuleKind::ALL.iter().map(|kind| kind.id()).collect();
        format!("{err} (expected one of: {})", ids.join(", "))
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rename(args) => cmd_rename(args),
        Commands::Rules => {
            cmd_rules();
            Ok(())
        }
        Commands::Config(config) => match config.action {
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

fn init_logger(verbose: bool) {
    if std::env::var("RUST_LOG").is_ok() {
        env_logger::init();
        return;
    }
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new().filter_level(level).init();
}

fn cmd_rename(args: RenameArgs) -> Result<()> {
    init_logger(args.verbose);

    let config = load_config()?;
    let selection = RuleSelection {
        kind: args.rule,
        regex: args.regex,
        replacement: args.replacement,
        minutes: args.minutes,
    };
    let rule = NamingRule::from_selection(&selection, &config.rule_settings())?;

    let mut prompter = ConsolePrompter::default();
    if args.apply && !args.yes && !prompter.confirm_parameters(&args.folder, &selection) {
        eprintln!("Conversion cancelled.");
        return Ok(());
    }

    let provider = config.metadata_provider();
    let mut resolver = IdentityResolver::new(config.identity_table());
    let options = BatchOptions {
        dry_run: !args.apply,
        photo_extensions: config.normalized_photo_extensions(),
    };

    let outcome = process_folder(
        &args.folder,
        &rule,
        &mut resolver,
        &provider,
        &mut prompter,
        &options,
    )?;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcome.report())?),
        OutputFormat::Table => print_table(outcome.report()),
    }

    match outcome {
        BatchOutcome::Cancelled(_) => eprintln!("Conversion cancelled."),
        BatchOutcome::Completed(report) if report.dry_run => eprintln!(
            "Dry run: no files were renamed. Pass --apply to rename {} file(s).",
            report.stats.planned
        ),
        BatchOutcome::Completed(_) => eprintln!("Conversion finished."),
    }

    Ok(())
}

fn cmd_rules() {
    for kind in RuleKind::ALL {
        println!("{:<14} {}", kind.id(), kind.label());
    }
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    println!("config file: {}", paths.config_path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn print_table(report: &BatchReport) {
    println!("source -> target (status)");
    for entry in &report.entries {
        let target = entry
            .target
            .as_ref()
            .map(|t| t.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        let status = match &entry.status {
            RenameStatus::Renamed => "renamed".to_string(),
            RenameStatus::Planned => "planned".to_string(),
            RenameStatus::Unchanged => "unchanged".to_string(),
            RenameStatus::Failed { error } => format!("failed: {error}"),
        };
        println!("{} -> {} ({})", entry.source.display(), target, status);
    }

    println!(
        "\nsummary: rule={} scanned={} renamed={} planned={} unchanged={} failed={}",
        report.rule,
        report.stats.scanned,
        report.stats.renamed,
        report.stats.planned,
        report.stats.unchanged,
        report.stats.failed
    );
}
