use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use typist::batch::run_batch;
use typist::config::TyperConfig;
use typist::engine::generate_trajectory;
use typist::model::Trajectory;
use typist::playback::{play_trajectory, PlaybackOptions, PlaybackOutcome, TerminalTarget};
use typist::sim::stats as trajectory_stats;

#[derive(Debug, Args, Clone)]
struct SimArgs {
    /// Text to type
    #[arg(required_unless_present = "input")]
    text: Option<String>,

    /// Input text file, or '-' for stdin
    #[arg(long, value_name = "PATH", conflicts_with = "text")]
    input: Option<PathBuf>,

    /// Target words per minute (defaults to the config's default_wpm)
    #[arg(long)]
    wpm: Option<f64>,

    /// Keyboard layout: qwerty or azerty. Other names use a reduced grid.
    #[arg(long, default_value = "qwerty")]
    layout: String,

    /// Optional RNG seed (for reproducible runs)
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file overriding model parameters; missing keys keep their defaults
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Debug, Parser)]
#[command(name = "typist")]
#[command(about = "Synthetic human keystroke trajectories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a keystroke trajectory (JSON)
    Generate {
        #[command(flatten)]
        sim: SimArgs,

        /// Output trajectory file (defaults to stdout)
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Emit the trajectory even if the run did not converge
        #[arg(long)]
        allow_truncated: bool,
    },

    /// Replay a freshly generated trajectory in the terminal
    Demo {
        #[command(flatten)]
        sim: SimArgs,

        /// Countdown seconds before playback starts
        #[arg(long, default_value_t = 0)]
        countdown: u64,

        /// Playback speed multiplier for delays (0 replays instantly)
        #[arg(long, default_value_t = 1.0)]
        time_scale: f64,
    },

    /// Run many simulations and report timing statistics
    Batch {
        #[command(flatten)]
        sim: SimArgs,

        /// Number of simulated runs
        #[arg(long, default_value_t = 100)]
        runs: usize,
    },
}

fn read_input(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == std::ffi::OsStr::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }

    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_output(path: &PathBuf, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

struct Resolved {
    text: String,
    wpm: f64,
    cfg: TyperConfig,
}

fn resolve(sim: &SimArgs) -> Result<Resolved> {
    let text = match (&sim.text, &sim.input) {
        (_, Some(path)) => read_input(path)?,
        (Some(text), None) => text.clone(),
        (None, None) => return Err(anyhow!("provide TEXT or --input")),
    };

    let cfg = match &sim.config {
        Some(path) => TyperConfig::from_json_file(path)?,
        None => TyperConfig::default(),
    };
    let wpm = sim.wpm.unwrap_or(cfg.default_wpm);

    Ok(Resolved { text, wpm, cfg })
}

fn simulate(sim: &SimArgs) -> Result<(Trajectory, TyperConfig)> {
    let resolved = resolve(sim)?;
    let mut rng = rng_from_seed(sim.seed);
    let trajectory = generate_trajectory(
        &resolved.text,
        resolved.wpm,
        &sim.layout,
        resolved.cfg.clone(),
        &mut rng,
    )?;
    Ok((trajectory, resolved.cfg))
}

fn countdown(stop: &AtomicBool, secs: u64) -> Result<()> {
    if secs == 0 {
        return Ok(());
    }
    eprintln!("Starting in {secs}s...");
    for remaining in (1..=secs).rev() {
        if stop.load(Ordering::SeqCst) {
            return Err(anyhow!("aborted"));
        }
        eprintln!("{remaining}...");
        std::thread::sleep(Duration::from_secs(1));
    }
    if stop.load(Ordering::SeqCst) {
        return Err(anyhow!("aborted"));
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            sim,
            output,
            allow_truncated,
        } => {
            let (trajectory, cfg) = simulate(&sim)?;
            let stats = trajectory_stats(&trajectory, cfg.avg_word_length);
            eprintln!(
                "Generated: {} events ({} errors, {} swaps, {} backspaces), {:.2}s, session {:.1} WPM",
                stats.events,
                stats.errors,
                stats.swaps,
                stats.backspaces,
                stats.total_time,
                trajectory.session_wpm
            );

            if trajectory.truncated && !allow_truncated {
                return Err(anyhow!(
                    "simulation did not converge within the step budget (pass --allow-truncated to keep it)"
                ));
            }

            let json = serde_json::to_string_pretty(&trajectory)
                .context("failed to serialize trajectory")?;
            if let Some(out) = output {
                write_output(&out, &json)?;
            } else {
                println!("{json}");
            }
        }
        Command::Demo {
            sim,
            countdown: countdown_secs,
            time_scale,
        } => {
            let (trajectory, _cfg) = simulate(&sim)?;

            let stop = Arc::new(AtomicBool::new(false));
            {
                let stop = stop.clone();
                ctrlc::set_handler(move || {
                    stop.store(true, Ordering::SeqCst);
                })
                .context("failed to install Ctrl+C handler")?;
            }

            eprintln!(
                "Demo (target {:.1} WPM, session {:.1} WPM)",
                trajectory.target_wpm, trajectory.session_wpm
            );
            countdown(stop.as_ref(), countdown_secs)?;

            println!("{}", "-".repeat(40));
            let mut target = TerminalTarget::new(io::stdout().lock());
            let outcome = play_trajectory(
                &trajectory,
                &mut target,
                PlaybackOptions { time_scale },
                stop.as_ref(),
            )?;
            drop(target);
            println!();
            println!("{}", "-".repeat(40));

            if let PlaybackOutcome::Aborted { events_applied } = outcome {
                eprintln!(
                    "Aborted after {events_applied} of {} events.",
                    trajectory.events.len()
                );
                return Err(anyhow!("aborted"));
            }

            println!("Total simulated time: {:.4}s", trajectory.total_time);
            let mistakes = trajectory
                .events
                .iter()
                .filter(|e| e.kind.is_mistake())
                .count();
            if mistakes > 0 {
                println!("Errors made and corrected: {mistakes}");
            }
            if trajectory.truncated {
                eprintln!("Warning: simulation did not converge within the step budget.");
            }
        }
        Command::Batch { sim, runs } => {
            let resolved = resolve(&sim)?;
            eprintln!(
                "Running {runs} simulations (target {:.1} WPM)...",
                resolved.wpm
            );

            let started = Instant::now();
            let summary = run_batch(
                &resolved.text,
                resolved.wpm,
                &sim.layout,
                &resolved.cfg,
                runs,
                sim.seed,
            )?;
            let elapsed = started.elapsed();

            println!("Estimated mean time : {:.4} s", summary.mean);
            println!("Standard deviation  : {:.4} s", summary.std_dev);
            println!(
                "Min / max           : {:.4} s / {:.4} s",
                summary.min, summary.max
            );
            println!("Truncated runs      : {}", summary.truncated_runs);
            println!("Computation time    : {:.4} s", elapsed.as_secs_f64());
        }
    }

    Ok(())
}
