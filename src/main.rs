//! Command-line driver for vessel seed preparation.
//!
//! ```bash
//! # Full batch run over every case under the configured root
//! vesselseeds run --config config.toml
//!
//! # Profile one mesh and keep its depth table
//! vesselseeds profile case_01/aorta.obj --output aorta.json
//!
//! # Convert a point file to the `x y z` text format
//! vesselseeds export centerline_full.obj
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use vesselseeds::config::load_config;
use vesselseeds::entry::{export_points_txt, profile_mesh, run_pipeline};
use vesselseeds::io::output::write_depth_table;
use vesselseeds::processing::depth_profile::{
    EmptyBandPolicy, DEFAULT_BAND_HALF_WIDTH, DEFAULT_STRIDE,
};
use vesselseeds::processing::ProfileOptions;

#[derive(Parser, Debug)]
#[command(name = "vesselseeds")]
#[command(version, about = "Depth profiles and centerline seeds for vessel meshes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the configured pipeline stages over every case
    Run {
        /// Pipeline configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Profile a single mesh and print its depth midpoints
    Profile {
        /// Mesh or point file (obj, stl, txt, xyz)
        mesh: PathBuf,

        /// Distance between sampled depths
        #[arg(long, default_value_t = DEFAULT_STRIDE)]
        stride: u32,

        /// Half-width of each depth band
        #[arg(long, default_value_t = DEFAULT_BAND_HALF_WIDTH)]
        half_width: u32,

        /// Fail on the first empty depth band instead of skipping it
        #[arg(long)]
        fail_on_empty: bool,

        /// Write the depth table as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rewrite a point file as `x y z` lines with three decimals
    Export {
        input: PathBuf,

        /// Output file, defaults to the input with a .txt extension
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Run { config } => {
            let config = load_config(&config)?;
            let reports = run_pipeline(&config)?;
            let mut failures = 0;
            for report in &reports {
                println!(
                    "{}: {} succeeded, {} failed",
                    report.stage,
                    report.succeeded.len(),
                    report.failed.len()
                );
                for (path, err) in &report.failed {
                    println!("  {}: {:#}", path.display(), err);
                }
                failures += report.failed.len();
            }
            if failures > 0 {
                anyhow::bail!("{} items failed", failures);
            }
        }
        Command::Profile {
            mesh,
            stride,
            half_width,
            fail_on_empty,
            output,
        } => {
            let options = ProfileOptions {
                stride,
                band_half_width: half_width,
                empty_band: if fail_on_empty {
                    EmptyBandPolicy::Fail
                } else {
                    EmptyBandPolicy::Skip
                },
                ..ProfileOptions::default()
            };
            let profile = profile_mesh(&mesh, options)?;
            println!(
                "dominant axis {} (length {:.3})",
                profile.dominant.axis, profile.dominant.length
            );
            for (depth, p) in profile.depths.iter() {
                println!("{:>6}  {:.3} {:.3} {:.3}", depth, p.x, p.y, p.z);
            }
            for region in &profile.end_regions {
                println!(
                    "{:>5.0}%  start {:.3} {:.3} {:.3}  finish {:.3} {:.3} {:.3}",
                    region.percentage * 100.0,
                    region.start.x,
                    region.start.y,
                    region.start.z,
                    region.finish.x,
                    region.finish.y,
                    region.finish.z
                );
            }
            if let Some(output) = output {
                write_depth_table(&output, &profile.depths)?;
                println!("wrote {}", output.display());
            }
        }
        Command::Export { input, output } => {
            let written = export_points_txt(&input, output.as_deref())?;
            println!("wrote {}", written.display());
        }
    }
    Ok(())
}
