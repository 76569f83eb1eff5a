use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use sample_gallery::imaging::caption::load_font;
use sample_gallery::{
    get_dimensions, label_counts, show_gallery, Config, Dataset, DimensionSummary, Gallery,
    GalleryOptions,
};

mod ui;

#[derive(Parser, Debug)]
#[command(name = "sample-gallery")]
#[command(about = "Browse and summarise image-classification datasets")]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a gallery window
    Show(GalleryArgs),
    /// Render a gallery figure to an image file
    Render(RenderArgs),
    /// Print the width and height of every image
    Dims(DataArgs),
    /// Print per-label row counts
    Counts(CountsArgs),
    /// Prefix image paths and write the table out
    Rewrite(RewriteArgs),
}

#[derive(Args, Debug, Clone)]
struct DataArgs {
    /// Dataset: a .csv or .json table, or an image folder with one subfolder per label
    #[arg(long, required = true)]
    data: PathBuf,

    /// Apply the configured path prefix before use
    #[arg(long)]
    rewrite_paths: bool,
}

#[derive(Args, Debug, Clone)]
struct GalleryArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Number of images to show
    #[arg(short = 'n', long)]
    num_images: Option<usize>,

    /// Show a random sample
    #[arg(long, overrides_with = "no_randomize")]
    randomize: bool,

    /// Show the first rows instead of a random sample
    #[arg(long, overrides_with = "randomize")]
    no_randomize: bool,

    /// Caption tiles with the file name
    #[arg(long, overrides_with = "no_add_name")]
    add_name: bool,

    #[arg(long, overrides_with = "add_name")]
    no_add_name: bool,

    /// Caption tiles with the predicted probability
    #[arg(long, overrides_with = "no_add_prob")]
    add_prob: bool,

    #[arg(long, overrides_with = "add_prob")]
    no_add_prob: bool,

    /// Highlight misclassified samples
    #[arg(long, overrides_with = "no_flag_mistakes")]
    flag_mistakes: bool,

    #[arg(long, overrides_with = "flag_mistakes")]
    no_flag_mistakes: bool,

    /// Seed for the random sample
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug, Clone)]
struct RenderArgs {
    #[command(flatten)]
    gallery: GalleryArgs,

    /// Output image (format from extension)
    #[arg(long, short = 'o', required = true)]
    output: PathBuf,

    /// Font for captions drawn into the figure (overrides the configured one)
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct CountsArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Name shown in the summary heading
    #[arg(long, default_value = sample_gallery::summary::DEFAULT_NAME)]
    name: String,
}

#[derive(Args, Debug, Clone)]
struct RewriteArgs {
    #[arg(long, required = true)]
    data: PathBuf,

    /// Prefix to apply (overrides the configured one)
    #[arg(long)]
    prefix: Option<PathBuf>,

    /// Output table (.csv or .json)
    #[arg(long, short = 'o', required = true)]
    output: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .init();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.cmd {
        Command::Show(args) => {
            let dataset = load_dataset(&args.data, &config)?;
            let options = gallery_options(&args, &config);
            let rng = gallery_rng(&args, &config);

            tracing::info!("🎨 Opening gallery for {} samples", dataset.len());
            ui::viewer::run(dataset, options, rng).map_err(|e| anyhow!("Viewer failed: {}", e))?;
        }
        Command::Render(args) => {
            let dataset = load_dataset(&args.gallery.data, &config)?;
            let options = gallery_options(&args.gallery, &config);
            let mut rng = gallery_rng(&args.gallery, &config);

            if let Some(gallery) = show_gallery(&dataset, &options, &mut rng)? {
                let figure = match args.font.as_ref().or(config.font_path.as_ref()) {
                    Some(font_path) => {
                        let font = load_font(font_path)
                            .with_context(|| format!("Failed to load font {}", font_path.display()))?;
                        gallery.compose_captioned(&font)
                    }
                    None => {
                        print_captions(&gallery);
                        gallery.compose()
                    }
                };
                figure
                    .save(&args.output)
                    .with_context(|| format!("Failed to write {}", args.output.display()))?;
                tracing::info!("✅ Gallery written to {}", args.output.display());
            }
        }
        Command::Dims(args) => {
            let dataset = load_dataset(&args, &config)?;
            let (widths, heights) = get_dimensions(&dataset)?;

            for ((sample, width), height) in dataset.samples().iter().zip(&widths).zip(&heights) {
                println!("{}\t{}\t{}", sample.path().display(), width, height);
            }
            if let Some(summary) = DimensionSummary::from_dimensions(&widths, &heights) {
                println!("{}", summary);
            }
        }
        Command::Counts(args) => {
            let dataset = load_dataset(&args.data, &config)?;
            print!("{}", label_counts(&dataset, &args.name));
        }
        Command::Rewrite(args) => run_rewrite(&args, &config)?,
    }

    Ok(())
}

fn load_dataset(args: &DataArgs, config: &Config) -> Result<Dataset> {
    let mut dataset = Dataset::open(&args.data)
        .with_context(|| format!("Failed to load {}", args.data.display()))?;

    if args.rewrite_paths {
        dataset.update_image_paths(&config.path_rewrite());
    }

    Ok(dataset)
}

fn run_rewrite(args: &RewriteArgs, config: &Config) -> Result<()> {
    let mut dataset = Dataset::open(&args.data)
        .with_context(|| format!("Failed to load {}", args.data.display()))?;

    let mut rewrite = config.path_rewrite();
    if args.prefix.is_some() {
        rewrite.prefix = args.prefix.clone();
    }
    if rewrite.prefix.is_none() {
        tracing::warn!("No path prefix configured, table is written unchanged");
    }

    dataset.update_image_paths(&rewrite);
    dataset
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    tracing::info!("✅ Wrote {} rows to {}", dataset.len(), args.output.display());
    Ok(())
}

/// Resolve a `--x`/`--no-x` pair; clap keeps only the last one given
fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Config defaults, overridden by whatever was given on the command line
fn gallery_options(args: &GalleryArgs, config: &Config) -> GalleryOptions {
    let defaults = config.gallery;
    GalleryOptions {
        num_images: args.num_images.unwrap_or(defaults.num_images),
        randomize: flag_pair(args.randomize, args.no_randomize).unwrap_or(defaults.randomize),
        add_name: flag_pair(args.add_name, args.no_add_name).unwrap_or(defaults.add_name),
        add_prob: flag_pair(args.add_prob, args.no_add_prob).unwrap_or(defaults.add_prob),
        flag_mistakes: flag_pair(args.flag_mistakes, args.no_flag_mistakes)
            .unwrap_or(defaults.flag_mistakes),
    }
}

fn gallery_rng(args: &GalleryArgs, config: &Config) -> StdRng {
    match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => config.rng(),
    }
}

/// Without a caption font the figure has no text, so captions go to stdout in grid order
fn print_captions(gallery: &Gallery) {
    let columns = gallery.grid.columns;
    for (i, tile) in gallery.tiles.iter().enumerate() {
        if let Some(caption) = &tile.caption {
            println!(
                "[{},{}] {}",
                i / columns,
                i % columns,
                caption.replace('\n', "  ")
            );
        }
    }
}
