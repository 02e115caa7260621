use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use eyre::{Context, Result, bail};
use log::{info, warn};

use patrol::config::{Params, Stepping, VisitedSet};
use patrol::generate::random_grid;
use patrol::render;

#[derive(Parser, Debug)]
#[command(name = "patrol", version, about = "Simulate a guard patrol and find loop-inducing obstacles")]
struct Cli {
    /// Grid file; stdin when omitted
    input: Option<PathBuf>,

    /// Generate a random WxH grid instead of reading one
    #[arg(long, value_name = "WxH", conflicts_with = "input")]
    random: Option<String>,

    /// Seed for --random
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Obstacle density for --random
    #[arg(long, default_value_t = 0.02)]
    density: f32,

    /// Run the obstruction search on one thread
    #[arg(long)]
    sequential: bool,

    #[arg(long, value_enum, default_value_t = Stepping::Segment)]
    stepping: Stepping,

    #[arg(long, value_enum, default_value_t = VisitedSet::Auto)]
    visited: VisitedSet,

    /// Print the patrol as text
    #[arg(long)]
    show: bool,

    /// Save PNG renders into this directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Pixels per cell in PNG renders
    #[arg(long, default_value_t = 8)]
    scale: usize,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn parse_dims(s: &str) -> Result<(usize, usize)> {
    let Some((w, h)) = s.split_once(['x', 'X']) else {
        bail!("expected WxH, got {s:?}");
    };
    let w: usize = w.trim().parse().wrap_err_with(|| format!("bad width in {s:?}"))?;
    let h: usize = h.trim().parse().wrap_err_with(|| format!("bad height in {s:?}"))?;
    if w == 0 || h == 0 {
        bail!("grid dimensions must be positive, got {s:?}");
    }
    Ok((w, h))
}

fn read_grid(cli: &Cli) -> Result<String> {
    if let Some(dims) = &cli.random {
        let (w, h) = parse_dims(dims)?;
        info!("generating {w}x{h} grid, seed={}, density={}", cli.seed, cli.density);
        return Ok(random_grid(w, h, cli.density, cli.seed));
    }
    match &cli.input {
        Some(path) => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read grid from {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .wrap_err("failed to read grid from stdin")?;
            Ok(text)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let text = read_grid(&cli)?;
    let params = Params {
        parallel: !cli.sequential,
        stepping: cli.stepping,
        visited: cli.visited,
        ..Params::default()
    };

    let (report, timings) = patrol::solve(&text, &params).wrap_err("malformed grid")?;
    info!(
        "visited={} loop_obstacles={}",
        report.visited,
        report.loop_obstacles()
    );

    println!("Visited cells:          {}", report.visited);
    println!("Loop-inducing obstacles: {}", report.loop_obstacles());

    if cli.show {
        println!();
        print!(
            "{}",
            render::render_ascii(&report.layout, &report.path, &report.loop_cells)
        );
    }

    eprintln!("\nTimings:");
    for t in &timings {
        eprintln!("  {:20} {:8.1} ms", t.name, t.ms);
    }

    if let Some(out_dir) = &cli.out_dir {
        std::fs::create_dir_all(out_dir)
            .wrap_err_with(|| format!("failed to create {}", out_dir.display()))?;

        let w = report.layout.index.width();
        let h = report.layout.index.height();
        let Some(scale) = render::fit_scale(w, h, cli.scale) else {
            bail!("{w}x{h} grid is too large to render");
        };
        if scale < cli.scale {
            warn!(
                "render scale lowered from {} to {scale} to stay within {} pixels",
                cli.scale,
                render::MAX_PIXELS
            );
        }
        let save = |name: &str, rgba: &[u8]| -> Result<()> {
            let path = out_dir.join(name);
            let big = render::upscale(rgba, w, h, scale);
            image::save_buffer(
                &path,
                &big,
                (w * scale) as u32,
                (h * scale) as u32,
                image::ColorType::Rgba8,
            )
            .wrap_err_with(|| format!("failed to save {}", path.display()))?;
            eprintln!("Saved {}", path.display());
            Ok(())
        };

        save("patrol.png", &render::render_patrol(&report.layout, &report.path, &[]))?;
        save(
            "loops.png",
            &render::render_patrol(&report.layout, &report.path, &report.loop_cells),
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dims() {
        assert_eq!(parse_dims("130x40").unwrap(), (130, 40));
        assert_eq!(parse_dims("8X8").unwrap(), (8, 8));
        assert!(parse_dims("0x5").is_err());
        assert!(parse_dims("12").is_err());
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["patrol", "--random", "20x10", "--sequential", "--stepping", "cell"]);
        assert_eq!(cli.random.as_deref(), Some("20x10"));
        assert!(cli.sequential);
        assert_eq!(cli.stepping, Stepping::Cell);
        assert_eq!(cli.visited, VisitedSet::Auto);
    }

    #[test]
    fn test_read_grid_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("grid.txt");
        std::fs::write(&path, "..\n^.\n").unwrap();
        let cli = Cli::parse_from(["patrol".into(), path.clone().into_os_string()]);
        assert_eq!(read_grid(&cli).unwrap(), "..\n^.\n");
    }
}
