//! Web ranking example
//!
//! Builds a small site graph, ranks it under both dangling-node policies and
//! persists the graph and ranking to Parquet.
//!
//! Run with: cargo run --example web_ranking

use trueno_rank::{
    pagerank, DanglingPolicy, LinkGraph, NodeId, OperatorKind, RankConfig, Ranking,
    TransitionMatrix,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🦀 trueno-rank Example\n");

    // 1. Build a web graph
    println!("📊 Building link graph...");
    let urls = vec![
        "https://blog.example/",
        "https://blog.example/about",
        "https://blog.example/post-1",
        "https://blog.example/post-2",
        "https://blog.example/archive",
        "https://cdn.example/logo.png",
    ];
    let links = vec![
        (NodeId(0), NodeId(1)), // home → about
        (NodeId(0), NodeId(2)), // home → post-1
        (NodeId(0), NodeId(3)), // home → post-2
        (NodeId(0), NodeId(4)), // home → archive
        (NodeId(1), NodeId(0)), // about → home
        (NodeId(2), NodeId(0)), // post-1 → home
        (NodeId(2), NodeId(3)), // post-1 → post-2
        (NodeId(3), NodeId(0)), // post-2 → home
        (NodeId(3), NodeId(2)), // post-2 → post-1
        (NodeId(4), NodeId(2)), // archive → post-1
        (NodeId(4), NodeId(3)), // archive → post-2
        (NodeId(4), NodeId(5)), // archive → logo (dangling)
    ];
    let graph = LinkGraph::from_labeled_links(urls.iter().map(|u| (*u).to_string()).collect(), &links)?;

    println!(
        "  ✅ Graph built: {} nodes, {} links, {} dangling\n",
        graph.num_nodes(),
        graph.num_links(),
        graph.dangling_nodes().len()
    );

    // 2. Inspect the transition matrix
    println!("🔍 Column sums of the transition matrix (Drop policy):");
    let matrix = TransitionMatrix::build(&graph, &RankConfig::default())?;
    for (col, sum) in matrix.column_sums().iter().enumerate() {
        println!("    {:<32} {sum:.4}", urls[col]);
    }

    // 3. Rank under both policies
    for policy in [DanglingPolicy::Drop, DanglingPolicy::Uniform] {
        let config = RankConfig::default()
            .with_dangling(policy)
            .with_operator(OperatorKind::Sparse);
        let result = pagerank(&graph, &config)?;

        println!(
            "\n📊 {policy:?} policy: {} iterations, delta {:.2e}, converged: {}",
            result.iterations, result.delta, result.converged
        );
        print!("{}", Ranking::new(&graph, &result).with_shown(5));
    }

    // 4. Persist to Parquet
    println!("\n💾 Saving to Parquet...");
    let path = std::env::temp_dir().join("example_site");
    graph.write_parquet(&path).await?;
    let result = pagerank(&graph, &RankConfig::default())?;
    Ranking::new(&graph, &result).write_parquet(&path).await?;
    println!("  ✅ Saved to {}_links.parquet", path.display());
    println!("  ✅ Saved to {}_nodes.parquet", path.display());
    println!("  ✅ Saved to {}_ranks.parquet", path.display());

    // 5. Load from Parquet
    println!("\n📂 Loading from Parquet...");
    let loaded = LinkGraph::read_parquet(&path).await?;
    println!(
        "  ✅ Loaded: {} nodes, {} links",
        loaded.num_nodes(),
        loaded.num_links()
    );
    assert_eq!(loaded.num_nodes(), graph.num_nodes());

    println!("\n✨ Example complete!");

    Ok(())
}
