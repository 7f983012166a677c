//! Harlequin: indexed access to grounded captioning datasets in COCO format.
//!
//! A harlequin dataset is a COCO annotation file in which every image
//! carries a caption and every box may point at the caption phrase that
//! describes it. This crate loads such a file, lets callers walk samples
//! by position or look them up by id, searches captions, and writes single
//! samples back out as images or JSON.
//!
//! # Modules
//!
//! - [`ir`]: dataset records and the COCO JSON codec
//! - [`store`]: lookup tables over a parsed annotation file
//! - [`dataset`]: the sample accessor
//! - [`search`]: caption search
//! - [`show`]: saving samples as images or JSON
//! - [`validation`]: dataset checks and reporting
//! - [`error`]: error types for harlequin operations

pub mod dataset;
pub mod error;
pub mod ir;
pub mod search;
pub mod show;
pub mod store;
pub mod validation;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use dataset::HarlequinDataset;
pub use error::HarlequinError;
pub use search::{search, Pattern, SearchMatches, SearchOptions};
pub use store::AnnotationStore;

/// The harlequin CLI application.
#[derive(Parser)]
#[command(name = "harlequin")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search captions and print the matching samples.
    #[command(after_help = SEARCH_EXAMPLES)]
    Search(SearchArgs),
    /// Save samples as images, annotated images or JSON.
    Show(ShowArgs),
    /// Validate an annotation file.
    Validate(ValidateArgs),
}

const SEARCH_EXAMPLES: &str = r#"Examples:
    harlequin search --search "a blue dog runs through a field ." --root data/harlequin/images --ann-file data/harlequin/annotations/instances_test.json
    harlequin search --search "a \w+ dog runs through a field ." --root data/harlequin/images --ann-file data/harlequin/annotations/instances_test.json --idx"#;

/// Dataset location shared by the subcommands that open a dataset.
#[derive(clap::Args)]
struct DatasetArgs {
    /// Directory image file names are relative to.
    #[arg(long)]
    root: PathBuf,

    /// COCO annotation file.
    #[arg(long = "ann-file", alias = "ann_file")]
    ann_file: PathBuf,
}

impl DatasetArgs {
    fn open(&self) -> Result<HarlequinDataset, HarlequinError> {
        HarlequinDataset::open(&self.root, &self.ann_file)
    }
}

#[derive(clap::Args)]
struct SearchArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Pattern to look for in captions (regular expression).
    #[arg(long, default_value = "")]
    search: String,

    /// Print matching indices only, one per line.
    #[arg(long)]
    idx: bool,

    /// Match letter case exactly.
    #[arg(long)]
    case_sensitive: bool,

    /// Match the pattern as plain text.
    #[arg(long)]
    literal: bool,
}

#[derive(clap::Args)]
struct ShowArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Indices of the samples to save.
    #[arg(short, long, num_args = 1.., default_values_t = [0usize])]
    index: Vec<usize>,

    /// What to save for each sample.
    #[arg(short, long, value_enum, default_value_t = show::VisualizeMode::Annotation)]
    visualize: show::VisualizeMode,

    /// Output path template; `{i}` is replaced by the sample index and
    /// `{id}` by the sample id. A width such as `{i:04d}` zero-pads; any
    /// other placeholder is an error. Defaults to image_{i}.png,
    /// annotation_{i}.png or data_{i}.json depending on the mode.
    #[arg(short, long)]
    output: Option<String>,
}

#[derive(clap::Args)]
struct ValidateArgs {
    /// COCO annotation file.
    #[arg(long = "ann-file", alias = "ann_file")]
    ann_file: PathBuf,

    /// Also check image files under this directory.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Run the harlequin CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), HarlequinError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Search(args)) => run_search(args),
        Some(Commands::Show(args)) => run_show(args),
        Some(Commands::Validate(args)) => run_validate(args),
        None => {
            println!("harlequin {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Indexed access and caption search for grounded COCO datasets.");
            println!();
            println!("Run 'harlequin --help' for usage information.");
            Ok(())
        }
    }
}

fn run_search(args: SearchArgs) -> Result<(), HarlequinError> {
    let opts = SearchOptions {
        ignore_case: !args.case_sensitive,
        literal: args.literal,
    };
    let pattern = Pattern::new(&args.search, &opts)?;

    let dataset = args.dataset.open()?;
    let matches = search(&dataset, &pattern)?;
    let report = search::SearchReport::new(&dataset, &matches)?;

    if args.idx {
        print!("{}", report.indices_only());
    } else {
        print!("{}", report);
    }
    Ok(())
}

fn run_show(args: ShowArgs) -> Result<(), HarlequinError> {
    let dataset = args.dataset.open()?;
    let written = show::show(
        &dataset,
        &args.index,
        args.visualize,
        args.output.as_deref(),
    )?;

    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), HarlequinError> {
    let dataset = ir::io_coco_json::read_coco_json(&args.ann_file)?;

    let opts = validation::ValidateOptions {
        strict: args.strict,
        image_root: args.root,
    };
    let report = validation::validate_dataset(&dataset, &opts);

    match args.output.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&report.to_json()).map_err(|source| {
                HarlequinError::DataWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            println!("{}", json);
        }
        _ => print!("{}", report),
    }

    let has_errors = report.error_count() > 0;
    let has_warnings = report.warning_count() > 0;

    if has_errors || (opts.strict && has_warnings) {
        Err(HarlequinError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    } else {
        Ok(())
    }
}
