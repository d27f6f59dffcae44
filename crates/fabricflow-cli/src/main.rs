use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use fabricflow::core::{
    bench::{self, BenchOpts},
    run, Algorithm, Bandwidth, TopologyKind, TopologyParams,
};
use fabricflow::utils::{read_config, write_dot, write_graph};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rand::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    analyze: AnalyzeArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Time fabric construction and max-flow over increasing server counts
    Bench(BenchArgs),
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Run a built-in scenario
    #[arg(short, long, value_enum, conflicts_with = "filepath")]
    example: Option<Example>,

    /// Path to a topology configuration (.json or .dhall)
    #[arg(short, long)]
    filepath: Option<PathBuf>,

    /// Random seed. Drawn at random and logged if omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write the annotated graph (.json or .msgpack)
    #[arg(short, long, default_value = "TE-graph.json")]
    output: PathBuf,

    /// Where to write the Graphviz rendering, if drawing is enabled
    #[arg(long, default_value = "theoretical-traffic.dot")]
    dot: PathBuf,

    /// Max-flow algorithm
    #[arg(long, value_enum, default_value_t = Algo::Dinic)]
    algo: Algo,
}

#[derive(Args, Debug)]
struct BenchArgs {
    /// Smallest server count
    #[arg(long, default_value_t = 8)]
    from: usize,

    /// Largest server count (inclusive)
    #[arg(long, default_value_t = 128)]
    to: usize,

    /// Server count increment
    #[arg(long, default_value_t = 8)]
    step: usize,

    /// Base random seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Max-flow algorithm
    #[arg(long, value_enum, default_value_t = Algo::Dinic)]
    algo: Algo,

    /// Measure sizes concurrently
    #[arg(long)]
    parallel: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Example {
    Clos,
    #[value(name = "block2block")]
    Block2Block,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Algo {
    Dinic,
    EdmondsKarp,
}

impl From<Algo> for Algorithm {
    fn from(algo: Algo) -> Self {
        match algo {
            Algo::Dinic => Algorithm::Dinic,
            Algo::EdmondsKarp => Algorithm::EdmondsKarp,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match cli.command {
        Some(Command::Bench(args)) => run_bench(args),
        None => analyze(cli.analyze),
    }
}

fn analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let (kind, params, draw) = match (args.example, &args.filepath) {
        (Some(example), _) => {
            let (kind, params) = example_scenario(example);
            (kind, params, true)
        }
        (None, Some(path)) => {
            let config = read_config(path)
                .with_context(|| format!("failed to read configuration {}", path.display()))?;
            (config.topology, config.params(), config.draw_graph)
        }
        (None, None) => anyhow::bail!("no scenario given: pass --example or --filepath"),
    };
    let seed = args.seed.unwrap_or_else(|| thread_rng().gen());
    info!("using seed {seed}");
    let algo = Algorithm::from(args.algo);
    let analysis = run(kind, &params, &algo, StdRng::seed_from_u64(seed))?;

    println!("maximum flow: {}", analysis.value);
    println!("sources: {}", analysis.sources.join(", "));
    println!("sinks: {}", analysis.sinks.join(", "));
    for ((from, to), label) in &analysis.labels {
        println!("  {from} -> {to}: {label}");
    }

    write_graph(&analysis.graph, &args.output).with_context(|| failed_write(&args.output))?;
    info!("wrote graph to {}", args.output.display());
    if draw {
        write_dot(&analysis.graph, &args.dot).with_context(|| failed_write(&args.dot))?;
        info!("wrote rendering to {}", args.dot.display());
    }
    Ok(())
}

fn run_bench(args: BenchArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.step > 0, "step must be positive");
    anyhow::ensure!(args.from <= args.to, "--from must not exceed --to");
    let sizes = (args.from..=args.to).step_by(args.step).collect::<Vec<_>>();
    let opts = BenchOpts::builder()
        .seed(args.seed)
        .algorithm(args.algo.into())
        .parallel(args.parallel)
        .build();

    let bar = ProgressBar::new(sizes.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
        bar.set_style(style);
    }
    let records = bench::sweep(&sizes, &opts, |record| {
        bar.set_message(format!("{} servers", record.servers));
        bar.inc(1);
    })?;
    bar.finish_and_clear();

    println!("servers\tnodes\tlinks\tmax_flow\tmillis");
    for r in &records {
        println!(
            "{}\t{}\t{}\t{}\t{:.3}",
            r.servers,
            r.nodes,
            r.links,
            r.value,
            r.elapsed.as_secs_f64() * 1e3
        );
    }
    Ok(())
}

/// Eight servers on four leaves under two spines, two sources and two sinks. The block-to-block
/// variant also meshes the leaves.
fn example_scenario(example: Example) -> (TopologyKind, TopologyParams) {
    let caps = |cs: &[f64]| cs.iter().copied().map(Bandwidth::new).collect::<Vec<_>>();
    let params = TopologyParams::builder()
        .servers(8)
        .leaves(4)
        .spines(2)
        .servers_per_leaf(2)
        .capacities(caps(&[10.0, 40.0, 100.0]))
        .sources(2)
        .sinks(2);
    match example {
        Example::Clos => (TopologyKind::Clos, params.build()),
        Example::Block2Block => (
            TopologyKind::Block2Block,
            params.block_capacities(caps(&[10.0, 25.0])).build(),
        ),
    }
}

fn failed_write(path: &Path) -> String {
    format!("failed to write {}", path.display())
}
