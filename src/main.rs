use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hueprint::logger::{self, init_logging};
use hueprint::{hex_to_rgb, rgb_to_hsl, AnalysisReport, AnalysisSession, Config, SurveyAnswer, SurveyAnswers};
use hueprint::{log_info, log_warn};

#[derive(Parser, Debug)]
#[command(name = "hueprint", about = "Personal color palette harmonizer")]
struct Cli {
    /// Data directory holding config.json and logs/ (overrides HUEPRINT_HOME)
    #[arg(long)]
    home: Option<PathBuf>,

    /// Print debug output on stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a captured session file and print the palettes
    Analyze {
        session: PathBuf,
        /// Emit the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify an undertone from the three questionnaire answers
    Undertone {
        vein: SurveyAnswer,
        jewelry: SurveyAnswer,
        beach: SurveyAnswer,
    },
    /// Show RGB and HSL for a #rrggbb color
    Convert { hex: String },
    /// Write the default configuration file
    InitConfig {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let result = run();
    let _ = logger::finalize_logs();
    result
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::locate(cli.home)?;
    let settings = config.load()?;

    init_logging(
        &config.log_dir,
        settings.log_retention_count,
        settings.stream_logs,
        cli.verbose,
    )?;
    if let Some(path) = logger::log_path() {
        log_info!("Log file: {}", path.display());
    }

    match cli.command {
        Command::Analyze { session, json } => {
            let loaded = AnalysisSession::load_from_file(&session)?;
            let report = loaded
                .analyze(&settings.sample_requirements)
                .with_context(|| format!("Cannot analyze {}", session.display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Command::Undertone { vein, jewelry, beach } => {
            let answers = SurveyAnswers {
                vein_test: vein,
                jewelry_test: jewelry,
                beach_test: beach,
            };
            println!("{}", answers.undertone());
        }
        Command::Convert { hex } => {
            let rgb = hex_to_rgb(&hex)?;
            let hsl = rgb_to_hsl(rgb);
            println!("{}  rgb({}, {}, {})  hsl({:.1}, {:.1}%, {:.1}%)", rgb, rgb.r, rgb.g, rgb.b, hsl.h, hsl.s, hsl.l);
        }
        Command::InitConfig { force } => {
            if config.config_path().exists() && !force {
                log_warn!("Config already exists at {}", config.config_path().display());
                anyhow::bail!("{} exists; pass --force to overwrite", config.config_path().display());
            }
            config.save(&Default::default())?;
            log_info!("Wrote default config to {}", config.config_path().display());
            println!("Wrote {}", config.config_path().display());
        }
    }

    Ok(())
}

fn print_report(report: &AnalysisReport) {
    println!("Undertone: {}", report.undertone);
    println!("Depth:     {} (hair black point {})", report.depth, report.features.hair_black_point);
    println!("Colors:    {}", report.colors.join(" "));

    for (i, palette) in report.palettes.iter().enumerate() {
        println!();
        println!("Palette {}", i + 1);
        println!("  Base:      {}", palette.base_colors.join(" "));
        println!("  Accent:    {}", palette.accent_colors.join(" "));
        println!("  Undertone: {}", palette.undertone_colors.join(" "));
    }
}
