use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use parking_lot::Mutex;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use tick_timing::reactor::Reactor;
use tick_timing::timing::report;
use tick_timing::{Instrumentation, Sample, TickTypeSummary, TimingConfig, TimingStats};

#[derive(Debug, Parser)]
#[command(about = "Run a scripted event loop and show where its latency went")]
struct Opt {
    /// Ring capacity (overrides TICK_TIMING_MAX_SAMPLES)
    #[arg(long)]
    max_samples: Option<usize>,

    /// Chance of recording each tick, 0.0–1.0 (overrides TICK_TIMING_SAMPLE_PROBABILITY)
    #[arg(long)]
    probability: Option<f64>,

    /// Seed for the sampling gate
    #[arg(long)]
    seed: Option<u64>,

    /// Print samples and summary as JSON instead of a table
    #[arg(long)]
    json: bool,
}

/// What the scripted loop captured right before it stopped.
#[derive(Debug, Serialize)]
struct Capture {
    now_us: u64,
    samples: Vec<Sample>,
    summary: Vec<TickTypeSummary>,
    stats: TimingStats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let opt = Opt::parse();

    // ── 1. Resolve configuration ─────────────────────────────────
    let mut config = TimingConfig::from_env().context("reading TICK_TIMING_* settings")?;
    if let Some(n) = opt.max_samples {
        config.max_samples = n;
    }
    if let Some(p) = opt.probability {
        config.sample_probability = p;
    }
    if let Some(seed) = opt.seed {
        config.seed = Some(seed);
    }

    // ── 2. Enable instrumentation ────────────────────────────────
    let instr = Arc::new(Instrumentation::new()?);
    instr
        .enable_with(&config)
        .context("enabling tick timing")?;

    // ── 3. Script the loop ───────────────────────────────────────
    let captured: Arc<Mutex<Option<Capture>>> = Arc::new(Mutex::new(None));
    let mut reactor = Reactor::new(instr.clone());

    reactor.add_timer(Duration::from_millis(20), "sleep_short", |r| {
        r.next_tick(|_| std::thread::sleep(Duration::from_millis(100)));
        std::thread::sleep(Duration::from_millis(200));
    });
    reactor.add_timer(Duration::from_millis(500), "sleep_long", |_| {
        std::thread::sleep(Duration::from_millis(300));
    });
    let sink = captured.clone();
    reactor.add_timer(Duration::from_millis(1_500), "collect", move |r| {
        let instr = r.instrumentation();
        *sink.lock() = Some(Capture {
            now_us: instr.now(),
            samples: instr.samples(),
            summary: instr.summary(),
            stats: instr.stats(),
        });
        r.stop();
    });

    reactor.run();

    // ── 4. Report ────────────────────────────────────────────────
    let Some(capture) = captured.lock().take() else {
        return Ok(());
    };

    if opt.json {
        println!("{}", serde_json::to_string_pretty(&capture)?);
        return Ok(());
    }

    println!();
    println!("********** now = {} μs", capture.now_us);
    print!(
        "{}",
        report::render_with_wall_time(&capture.samples, capture.now_us, chrono::Local::now())
    );
    println!("**********");
    println!();
    for row in &capture.summary {
        let p = &row.latency_us;
        println!(
            "  {:<20} n={:<5} busy={:>5.1}%  p50={:>8}μs  p99={:>8}μs  max={:>8}μs",
            row.tick_type,
            p.count,
            row.share * 100.0,
            p.p50,
            p.p99,
            p.max
        );
    }
    println!(
        "  seen={} sampled={} evicted={} discarded={}",
        capture.stats.ticks_seen,
        capture.stats.ticks_sampled,
        capture.stats.evicted,
        capture.stats.discarded
    );

    Ok(())
}
