use rambody::{guiding_center_trajectory, NoSupplementary, ReaderConfig, Snapshot};

use anyhow::{Context, Result};
use clap::Parser;
use log::{warn, LevelFilter};

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Decode Rambody snapshot outputs")]
struct Args {
    /// Snapshot directory (output_XXXXX), or run directory with --trajectory
    path: PathBuf,

    /// YAML reader configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the guiding center trajectory of every snapshot in PATH as CSV
    #[arg(long)]
    trajectory: bool,

    /// Skip the force mesh
    #[arg(long)]
    no_mesh: bool,

    /// Decode the AMR octree
    #[arg(long)]
    amr: bool,

    /// Log decode statistics
    #[arg(short, long)]
    verbose: bool,
}

// load here to keep main clean
fn load_config(args: &Args) -> Result<ReaderConfig> {
    let mut cfg = match &args.config {
        Some(path) => ReaderConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ReaderConfig::default(),
    };

    if args.no_mesh {
        cfg.load_mesh = false;
    }
    if args.amr {
        cfg.load_amr = true;
    }
    cfg.verbose |= args.verbose;
    Ok(cfg)
}

fn print_trajectory(args: &Args, cfg: &ReaderConfig) -> Result<()> {
    let points = guiding_center_trajectory(&args.path, cfg)?;

    println!("snapshot,time_myr,x,y,z");
    for p in points {
        println!("{},{},{},{},{}", p.snap_id, p.time, p.x.x, p.x.y, p.x.z);
    }
    Ok(())
}

fn print_snapshot(args: &Args, cfg: &ReaderConfig) -> Result<()> {
    let snap = Snapshot::open(&args.path, cfg, &NoSupplementary)
        .with_context(|| format!("failed to open snapshot {}", args.path.display()))?;

    let h = &snap.header;
    println!("snapshot {} ({})", snap.snap_id, snap.path.display());
    println!("  boxlen = {}, ndim = {}, ncpu = {}, levels {}..{}", h.boxlen, h.ndim, h.ncpu, h.levelmin, h.levelmax);
    println!("  time = {:.3} Myr", h.time);

    let gc = &snap.guiding_center;
    println!("  guiding center x = ({:.3}, {:.3}, {:.3})", gc.x.x, gc.x.y, gc.x.z);
    println!("  guiding center v = ({:.3}, {:.3}, {:.3})", gc.v.x, gc.v.y, gc.v.z);
    println!("  bound particles = {}", snap.particles.len());
    if let Some(rc) = snap.particles.mean_radius() {
        println!("  mean rc = {rc:.4}");
    }

    match &snap.mesh {
        Some(Ok(mesh)) => println!("  mesh points = {} (nx = {})", mesh.len(), mesh.nx),
        Some(Err(e)) => warn!("mesh unavailable: {e}"),
        None => {}
    }

    match &snap.amr {
        Some(Ok(amr)) => {
            for (level, cells) in &amr.levels {
                println!("  amr level {level}: {} cells", cells.len());
            }
        }
        Some(Err(e)) => warn!("amr unavailable: {e}"),
        None => {}
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    let cfg = load_config(&args)?;

    if args.trajectory {
        print_trajectory(&args, &cfg)
    } else {
        print_snapshot(&args, &cfg)
    }
}
