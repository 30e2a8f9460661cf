//! tritrace CLI - build the tracer over a demo scene and exercise it.

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;
use tritrace::prelude::*;

mod scene;

/// Verbosity level chosen on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verbosity {
    Quiet,
    Debug,
    Trace,
}

impl Verbosity {
    fn directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Debug => "tritrace=debug",
            Verbosity::Trace => "tritrace=trace",
        }
    }
}

/// `RUST_LOG` wins unless a flag was given.
fn init_tracing(verbosity: Option<Verbosity>) {
    let filter = match verbosity {
        Some(v) => EnvFilter::new(v.directive()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut verbosity = None;
    let mut config_path: Option<PathBuf> = None;
    let mut filtered_args: Vec<&str> = Vec::new();
    let mut iter = args[1..].iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-v" | "--verbose" => verbosity = Some(Verbosity::Debug),
            "-vv" | "--trace" => verbosity = Some(Verbosity::Trace),
            "-q" | "--quiet" => verbosity = Some(Verbosity::Quiet),
            "-c" | "--config" => {
                let path = iter.next().context("--config needs a file path")?;
                config_path = Some(PathBuf::from(path));
            }
            _ => filtered_args.push(arg),
        }
    }
    init_tracing(verbosity);

    let config = match &config_path {
        Some(path) => TracerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TracerConfig::default(),
    };

    let Some(&command) = filtered_args.first() else {
        print_help(&args[0]);
        return Ok(());
    };
    let count = |default: usize| -> Result<usize> {
        match filtered_args.get(1) {
            Some(n) => n.parse().with_context(|| format!("not a count: {n}")),
            None => Ok(default),
        }
    };

    match command {
        "info" | "i" => cmd_info(config),
        "bench" | "b" => cmd_bench(config, count(1 << 20)?),
        "lights" | "l" => cmd_lights(config, count(100_000)?),
        "config" => cmd_config(&config),
        "help" | "h" | "-h" | "--help" => {
            print_help(&args[0]);
            Ok(())
        }
        other => {
            print_help(&args[0]);
            bail!("unknown command: {other}");
        }
    }
}

fn print_help(prog: &str) {
    println!(
        "tritrace {} (built {} {})",
        env!("CARGO_PKG_VERSION"),
        env!("TRITRACE_BUILD_DATE"),
        env!("TRITRACE_BUILD_TIME")
    );
    println!();
    println!("Usage: {} [options] <command> [count]", prog);
    println!();
    println!("Commands:");
    println!("  i, info          Build the demo scene and print tree statistics");
    println!("  b, bench [N]     Trace N random camera rays through the demo scene");
    println!("  l, lights [N]    Draw N light samples and report the mean weight");
    println!("  config           Print the effective configuration as JSON");
    println!("  h, help          Show this help");
    println!();
    println!("Options:");
    println!("  -c, --config <file.json>  Tracer configuration");
    println!("  -v, --verbose             Debug output");
    println!("  -vv, --trace              Trace output (very verbose)");
    println!("  -q, --quiet               Errors only");
    println!();
    println!("Without a flag, RUST_LOG selects the log filter.");
}

fn build_scene(config: TracerConfig) -> Result<TriangleTracer> {
    let mut tracer = TriangleTracer::new(config)?;
    let t0 = Instant::now();
    let written = scene::populate(&mut tracer);
    tracer.update()?;
    tracing::info!(
        faces = written,
        elapsed_ms = t0.elapsed().as_secs_f64() * 1e3,
        "demo scene ready"
    );
    Ok(tracer)
}

fn cmd_info(config: TracerConfig) -> Result<()> {
    let tracer = build_scene(config)?;
    let bvh = tracer.bvh();

    println!("Faces:          {} / {}", tracer.face_count(), tracer.config().max_faces);
    println!("Tree capacity:  {}", bvh.capacity());
    println!("Tree height:    {}", bvh.height());
    println!("Leaves:         {}", bvh.leaf_count());
    println!("Stack slots:    {} x {}", tracer.config().stack_slots, tracer.config().stack_depth());
    if let Some(bounds) = bvh.root_bounds() {
        println!("Scene bounds:   {:?}", bounds);
    }
    Ok(())
}

fn cmd_bench(config: TracerConfig, count: usize) -> Result<()> {
    let mut tracer = build_scene(config)?;
    let rays = scene::camera_rays(count, 7);

    let t0 = Instant::now();
    let hits = tracer.hit_batch(&rays);
    let elapsed = t0.elapsed().as_secs_f64();

    let hit_count = hits.iter().flatten().count();
    let mut per_material = std::collections::BTreeMap::<u32, usize>::new();
    for hit in hits.iter().flatten() {
        *per_material.entry(tracer.material_id(hit.face)).or_default() += 1;
    }

    println!("Rays:       {}", rays.len());
    println!("Hits:       {} ({:.1}%)", hit_count, 100.0 * hit_count as f64 / rays.len().max(1) as f64);
    println!("Time:       {:.3} s ({:.2} Mrays/s)", elapsed, rays.len() as f64 / elapsed / 1e6);
    for (material, n) in per_material {
        println!("  material {:<3} {}", material, n);
    }
    Ok(())
}

fn cmd_lights(config: TracerConfig, count: usize) -> Result<()> {
    let mut tracer = build_scene(config)?;
    let lights = tracer.update_emissive_index(&scene::materials());
    if lights == 0 {
        bail!("demo scene has no emissive faces");
    }

    let mut rng = StdRng::from_entropy();
    let mut sum = 0.0f64;
    let mut visible = 0usize;
    for _ in 0..count {
        let reference = Vec3::new(rng.gen_range(-0.9..0.9), rng.gen_range(0.05..1.0), rng.gen_range(-0.9..0.9));
        let sample = tracer.sample_light_position(reference, &mut rng)?;
        sum += sample.weight as f64;

        // Shadow ray from the light towards the reference point
        let to_ref = reference - sample.position;
        let occluded = tracer
            .hit(sample.position, to_ref)
            .is_some_and(|h| h.distance < 1.0 - tracer.config().eps);
        if !occluded {
            visible += 1;
        }
    }

    println!("Emissive faces:  {}", lights);
    println!("Samples:         {}", count);
    println!("Mean weight:     {:.4}", sum / count.max(1) as f64);
    println!("Unoccluded:      {:.1}%", 100.0 * visible as f64 / count.max(1) as f64);
    Ok(())
}

fn cmd_config(config: &TracerConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
