//! Rank the pages of a web graph
//!
//! Run with: trueno-rank urls.txt links.txt

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use trueno_rank::config::{DEFAULT_DAMPING, DEFAULT_MAX_DELTA, DEFAULT_MAX_ITERATIONS};
use trueno_rank::report::DEFAULT_TOP;
use trueno_rank::{load_text_graph, pagerank, DanglingPolicy, OperatorKind, RankConfig, Ranking};

/// Dangling-node handling.
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
enum CliDangling {
    /// Dangling nodes only teleport; their link mass is dropped (pseudorank).
    #[default]
    Drop,
    /// Dangling nodes link uniformly to every node.
    Uniform,
}

impl From<CliDangling> for DanglingPolicy {
    fn from(d: CliDangling) -> Self {
        match d {
            CliDangling::Drop => DanglingPolicy::Drop,
            CliDangling::Uniform => DanglingPolicy::Uniform,
        }
    }
}

/// Transition operator representation.
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
enum CliOperator {
    /// Materialized N×N matrix.
    #[default]
    Dense,
    /// CSR links plus scalar teleportation.
    Sparse,
}

impl From<CliOperator> for OperatorKind {
    fn from(o: CliOperator) -> Self {
        match o {
            CliOperator::Dense => OperatorKind::Dense,
            CliOperator::Sparse => OperatorKind::Sparse,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "trueno-rank",
    version,
    about = "Compute PageRank of a web graph by power iteration.",
    long_about = None
)]
struct CliArgs {
    /// File with one node label (URL) per line.
    nodes: PathBuf,

    /// File with one `<source> <target>` node index pair per line.
    links: PathBuf,

    #[arg(short, long, default_value_t = DEFAULT_DAMPING)]
    /// The damping factor β (probability of following a link).
    damping: f64,

    #[arg(short = 't', long, default_value_t = DEFAULT_MAX_DELTA)]
    /// The L2 distance between iterations below which to stop.
    max_delta: f64,

    #[arg(short = 'i', long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    /// Maximum number of iterations.
    max_iterations: usize,

    #[arg(long, value_enum, default_value_t = CliDangling::Drop)]
    /// How nodes without out-links are handled.
    dangling: CliDangling,

    #[arg(long, value_enum, default_value_t = CliOperator::Dense)]
    /// Transition operator representation.
    operator: CliOperator,

    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP)]
    /// Number of top-ranked nodes to print.
    top: usize,

    #[arg(short, long)]
    /// Also write the full ranking to `<BASE>_ranks.parquet`.
    parquet_out: Option<PathBuf>,
}

impl CliArgs {
    fn config(&self) -> RankConfig {
        RankConfig::default()
            .with_damping(self.damping)
            .with_max_delta(self.max_delta)
            .with_max_iterations(self.max_iterations)
            .with_dangling(self.dangling.into())
            .with_operator(self.operator.into())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let config = args.config();
    config.validate()?;

    log::info!("Starting Page Rank Analysis");
    let graph = load_text_graph(&args.nodes, &args.links).await?;

    log::info!(
        "Calculating Page Rank ({:?} operator, {:?} dangling policy)",
        config.operator,
        config.dangling
    );
    let result = pagerank(&graph, &config)?;

    let ranking = Ranking::new(&graph, &result).with_shown(args.top);
    print!("{ranking}");

    if let Some(base) = &args.parquet_out {
        write_parquet(&ranking, base).await?;
    }

    Ok(())
}

#[cfg(feature = "storage")]
async fn write_parquet(ranking: &Ranking, base: &std::path::Path) -> Result<()> {
    ranking.write_parquet(base).await?;
    log::info!("Saved ranking to {}_ranks.parquet", base.display());
    Ok(())
}

#[cfg(not(feature = "storage"))]
#[allow(clippy::unused_async)]
async fn write_parquet(_ranking: &Ranking, _base: &std::path::Path) -> Result<()> {
    anyhow::bail!("Parquet output requires the `storage` feature")
}
