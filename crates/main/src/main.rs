use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use exam_seating_report::enrich::{assemble_schedule, Room, ScheduleRequest, SeatingMap};
use exam_seating_report::language::{expand_by_language, reconcile_selections, selection_summary, Class};
use exam_seating_report::{ReportBuilder, ReportGenerator, ReportKind, ScheduleResult};
use log::info;
use serde_json::json;

type CliResult = Result<(), Box<dyn Error>>;

/// Renders exam seating reports from schedule JSON files.
///
/// The institution logo is read from `logo.png` in `--assets-dir`, the
/// `EXAM_SEATING_ASSETS_DIR` directory, or `assets/` next to the binary. A
/// grey placeholder is drawn when none is found.
#[derive(Parser)]
#[command(author, version, about = "Exam seating report generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the room by room class summary.
    Summary(RenderArgs),

    /// Render the full roster of every room.
    Detailed(RenderArgs),

    /// Render both reports.
    #[command(aliases = ["both"])]
    All(RenderArgs),

    /// Print the per-language virtual classes of a class list.
    #[command(name = "expand-classes", aliases = ["expand_classes"])]
    ExpandClasses {
        /// JSON array of class records.
        #[arg(long)]
        input: PathBuf,

        /// Virtual class ids to fold back into a class selection.
        #[arg(long = "select", value_delimiter = ',')]
        select: Vec<String>,
    },

    /// Build a schedule JSON from an allocator seating map.
    Assemble {
        /// Request header: title, date, session and selected class ids.
        #[arg(long)]
        request: PathBuf,

        /// JSON object mapping room numbers to seated roll numbers.
        #[arg(long)]
        seating: PathBuf,

        /// JSON array of class records.
        #[arg(long)]
        classes: PathBuf,

        /// JSON array of exam room records.
        #[arg(long)]
        rooms: Option<PathBuf>,

        /// Where to write the schedule; printed to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct RenderArgs {
    /// Schedule result JSON.
    #[arg(long)]
    input: PathBuf,

    /// Directory the PDF files are written to.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Directory holding `logo.png`.
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Add one outline entry per room to the detailed report.
    #[cfg(feature = "bookmarks")]
    #[arg(long)]
    bookmarks: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Summary(args) => render(&args, &[ReportKind::Summary]),
        Commands::Detailed(args) => render(&args, &[ReportKind::Detailed]),
        Commands::All(args) => render(&args, &[ReportKind::Summary, ReportKind::Detailed]),
        Commands::ExpandClasses { input, select } => expand_classes(&input, &select),
        Commands::Assemble {
            request,
            seating,
            classes,
            rooms,
            output,
        } => assemble(&request, &seating, &classes, rooms.as_deref(), output.as_deref()),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}

fn generator(args: &RenderArgs) -> Result<ReportGenerator, Box<dyn Error>> {
    let mut builder = ReportBuilder::new();
    if let Some(dir) = &args.assets_dir {
        builder = builder.with_assets_dir(dir);
    }
    Ok(builder.build()?)
}

fn render(args: &RenderArgs, kinds: &[ReportKind]) -> CliResult {
    let schedule: ScheduleResult = read_json(&args.input)?;
    let generator = generator(args)?;
    fs::create_dir_all(&args.output_dir)?;

    for kind in kinds {
        let artifact = match kind {
            #[cfg(feature = "bookmarks")]
            ReportKind::Detailed if args.bookmarks => generator.generate_detailed_with_bookmarks(&schedule)?,
            _ => generator.generate(&schedule, *kind)?,
        };
        let path = artifact.save_in(&args.output_dir)?;
        println!("{}", path.display());
    }

    info!(
        "{} students in {} rooms",
        schedule.total_students(),
        schedule.room_assignments.len()
    );
    Ok(())
}

fn expand_classes(input: &Path, select: &[String]) -> CliResult {
    let classes: Vec<Class> = read_json(input)?;
    let expanded = expand_by_language(&classes);

    let output = if select.is_empty() {
        serde_json::to_value(&expanded)?
    } else {
        json!({
            "selection": reconcile_selections(select, &expanded),
            "summary": selection_summary(select, &expanded),
        })
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn assemble(
    request: &Path,
    seating: &Path,
    classes: &Path,
    rooms: Option<&Path>,
    output: Option<&Path>,
) -> CliResult {
    let request: ScheduleRequest = read_json(request)?;
    let seating: SeatingMap = read_json(seating)?;
    let classes: Vec<Class> = read_json(classes)?;
    let rooms: Vec<Room> = match rooms {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    let schedule = assemble_schedule(&request, &seating, &classes, &rooms);
    let text = serde_json::to_string_pretty(&schedule)?;
    match output {
        Some(path) => {
            fs::write(path, text)?;
            info!("wrote schedule with {} rooms to {}", schedule.room_assignments.len(), path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
