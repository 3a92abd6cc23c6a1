use anyhow::Context;
use clap::{Parser, Subcommand};
use mi_align::config::{load_config_or_default, Config, ConfigFormat};
use mi_align::logging::{init_logging, new_correlation_id};
use mi_align::visualization::{print_accuracy, print_level_table, print_report};
use mi_align::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "align")]
#[command(about = "Rigid image registration by normalized mutual information")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (TOML, or JSON when it starts with '{')
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the rigid transform mapping a target image onto a reference
    Align {
        /// Path to the reference (fixed) image
        #[arg(short, long)]
        reference: PathBuf,

        /// Path to the target (moving) image
        #[arg(short, long)]
        target: PathBuf,

        /// Maximum number of pyramid downscaling steps
        #[arg(long)]
        max_layers: Option<usize>,

        /// Size ratio between pyramid levels
        #[arg(long)]
        downscale: Option<f64>,

        /// Strategy at the coarsest level (global or local)
        #[arg(short, long)]
        strategy: Option<Strategy>,

        /// Seed for the basin-hopping displacements
        #[arg(long)]
        seed: Option<u64>,

        /// Write the alignment report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the registered target image
        #[arg(short, long)]
        warped: Option<PathBuf>,
    },

    /// Print the normalized mutual information of two images
    Score {
        #[arg(short = 'a', long)]
        first: PathBuf,

        #[arg(short = 'b', long)]
        second: PathBuf,

        /// Histogram bins per image
        #[arg(long, default_value = "100")]
        bins: usize,
    },

    /// Distort an image by a known transform, align it back and report the error
    Demo {
        /// Source image; a synthetic scene is rendered when omitted
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Rotation in degrees
        #[arg(long, allow_negative_numbers = true)]
        rotation: Option<f64>,

        /// Shift along rows in pixels
        #[arg(long, allow_negative_numbers = true)]
        shift_row: Option<f64>,

        /// Shift along columns in pixels
        #[arg(long, allow_negative_numbers = true)]
        shift_col: Option<f64>,

        /// Skip the intensity inversion
        #[arg(long)]
        no_invert: bool,

        /// Output directory for images and report
        #[arg(short, long, default_value = "results/demo")]
        output: PathBuf,
    },

    /// Write the default configuration to a file
    Config {
        #[arg(short, long)]
        output: PathBuf,

        /// toml or json
        #[arg(short, long, default_value = "toml")]
        format: ConfigFormat,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config_or_default(cli.config.as_deref().and_then(Path::to_str));

    match cli.verbose {
        0 => {}
        1 => config.logging.global_level = "info".to_string(),
        2 => config.logging.global_level = "debug".to_string(),
        _ => config.logging.global_level = "trace".to_string(),
    }
    let _guard = init_logging(&config.logging)?;

    match cli.command {
        Commands::Align {
            reference,
            target,
            max_layers,
            downscale,
            strategy,
            seed,
            output,
            warped,
        } => {
            if let Some(max_layers) = max_layers {
                config.alignment.pyramid.max_layers = max_layers;
            }
            if let Some(downscale) = downscale {
                config.alignment.pyramid.downscale = downscale;
            }
            if let Some(strategy) = strategy {
                config.alignment.strategy = strategy;
            }
            if seed.is_some() {
                config.alignment.basin_hopping.seed = seed;
            }
            handle_align(&config, reference, target, output, warped)?;
        }
        Commands::Score { first, second, bins } => {
            handle_score(&config, first, second, bins)?;
        }
        Commands::Demo {
            source,
            rotation,
            shift_row,
            shift_col,
            no_invert,
            output,
        } => {
            let distortion = &mut config.demo.distortion;
            if let Some(rotation) = rotation {
                distortion.rotation_degrees = rotation;
            }
            if let Some(shift_row) = shift_row {
                distortion.shift_rows = shift_row;
            }
            if let Some(shift_col) = shift_col {
                distortion.shift_cols = shift_col;
            }
            if no_invert {
                distortion.invert = false;
            }
            handle_demo(&config, source, output)?;
        }
        Commands::Config { output, format } => {
            Config::default().save_to_file(&output, format)?;
            println!("Default configuration written to {:?}", output);
        }
    }

    Ok(())
}

fn load_checked(config: &Config, path: &Path) -> anyhow::Result<Image> {
    let image = load_image(path)?;
    validate_image_size(&image.view(), config.image.min_size, config.image.max_size)
        .with_context(|| format!("Rejected image {:?}", path))?;
    Ok(image)
}

fn handle_align(
    config: &Config,
    reference_path: PathBuf,
    target_path: PathBuf,
    output: Option<PathBuf>,
    warped: Option<PathBuf>,
) -> anyhow::Result<()> {
    println!("Loading images...");
    let reference = load_checked(config, &reference_path)?;
    let target = load_checked(config, &target_path)?;
    println!(
        "Reference: {}x{}, Target: {}x{}",
        reference.ncols(),
        reference.nrows(),
        target.ncols(),
        target.nrows()
    );

    new_correlation_id();
    println!("Running {} alignment...", config.alignment.strategy);
    let report = Aligner::new(config.alignment.clone()).align_with_report(&reference.view(), &target.view())?;

    print_report(&report);
    print_level_table(&report.levels);

    if let Some(output_path) = output {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&output_path, json)?;
        println!("Report saved to {:?}", output_path);
    }

    if let Some(warped_path) = warped {
        let registered = warp(&target.view(), &report.transform, config.alignment.interpolation);
        save_image(&registered.view(), &warped_path)?;
        println!("Registered image saved to {:?}", warped_path);
    }

    Ok(())
}

fn handle_score(config: &Config, first: PathBuf, second: PathBuf, bins: usize) -> anyhow::Result<()> {
    let a = load_checked(config, &first)?;
    let b = load_checked(config, &second)?;
    let score = nmi_with_bins(&a.view(), &b.view(), bins)?;
    println!("NMI: {:.6}", score);
    Ok(())
}

fn handle_demo(config: &Config, source: Option<PathBuf>, output_dir: PathBuf) -> anyhow::Result<()> {
    std::fs::create_dir_all(&output_dir)?;

    let original = match source {
        Some(path) => load_checked(config, &path)?,
        None => {
            println!(
                "Rendering synthetic {0}x{0} scene (seed {1})...",
                config.demo.scene_size, config.demo.seed
            );
            SyntheticScene::square(config.demo.scene_size)
                .with_seed(config.demo.seed)
                .render()?
        }
    };

    let truth = &config.demo.distortion;
    println!(
        "Applying rotation {:.1}°, shift ({}, {}) px, invert: {}",
        truth.rotation_degrees, truth.shift_rows, truth.shift_cols, truth.invert
    );
    let altered = truth.apply(&original.view());

    new_correlation_id();
    let report = Aligner::new(config.alignment.clone()).align_with_report(&original.view(), &altered.view())?;
    let expected = truth.expected_correction(original.dim());
    let accuracy = evaluate_alignment(&original.view(), &altered.view(), &report.transform, &expected)?;

    print_report(&report);
    print_level_table(&report.levels);
    print_accuracy(&accuracy);

    let registered = warp(&altered.view(), &report.transform, config.alignment.interpolation);
    save_image(&original.view(), output_dir.join("original.png"))?;
    save_image(&altered.view(), output_dir.join("altered.png"))?;
    save_image(&registered.view(), output_dir.join("registered.png"))?;

    let summary = serde_json::json!({
        "ground_truth": truth,
        "expected_correction": expected,
        "report": report,
        "accuracy": accuracy,
    });
    let results_file = output_dir.join("demo_report.json");
    std::fs::write(&results_file, serde_json::to_string_pretty(&summary)?)?;
    println!("\nResults saved to {:?}", output_dir);

    Ok(())
}
