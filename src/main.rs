//! Classify 28x28 digit images with a pretrained MLP.
//!
//! Usage:
//!   mlp-digits --weights w1 w2 w3 w4 --biases b1 b2 b3 b4 --images image1.bin image2.bin
//!
//! Without `--images`, image paths are read from stdin, one per line, until EOF or `q`.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use log::info;
use mlp_digits::io::{load_matrix, load_network};
use mlp_digits::{MlpNetwork, Topology};

#[derive(Parser, Debug)]
#[command(author, version, about = "Classify 28x28 digit images with a pretrained MLP")]
struct Args {
    /// Weight files, one per layer, in order
    #[arg(short, long, num_args = 1..)]
    weights: Vec<PathBuf>,

    /// Bias files, one per layer, in order
    #[arg(short, long, num_args = 1..)]
    biases: Vec<PathBuf>,

    /// JSON topology describing the layer shapes (default: the 784-128-64-20-10 digit network)
    #[cfg(feature = "serde")]
    #[arg(long)]
    topology: Option<PathBuf>,

    /// JSON model file; replaces --weights/--biases/--topology
    #[cfg(feature = "serde")]
    #[arg(long, conflicts_with_all = ["weights", "biases", "topology"])]
    model: Option<PathBuf>,

    /// Raw image files to classify
    #[arg(short, long, num_args = 1..)]
    images: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let net = build_network(&args)?;
    info!("network ready: {} layers", net.num_layers());

    if !args.images.is_empty() {
        for path in &args.images {
            classify(&net, path)?;
        }
        return Ok(());
    }

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read image path from stdin")?;
        let path = line.trim();
        if path.is_empty() {
            continue;
        }
        if path == "q" {
            break;
        }
        classify(&net, Path::new(path))?;
    }
    Ok(())
}

fn build_network(args: &Args) -> anyhow::Result<MlpNetwork> {
    #[cfg(feature = "serde")]
    if let Some(model) = &args.model {
        return MlpNetwork::load_json(model)
            .with_context(|| format!("failed to load model {}", model.display()));
    }

    #[cfg(feature = "serde")]
    let topology = match &args.topology {
        Some(p) => Topology::load_json(p)?,
        None => Topology::digits(),
    };
    #[cfg(not(feature = "serde"))]
    let topology = Topology::digits();

    if args.weights.is_empty() || args.biases.is_empty() {
        bail!("--weights and --biases are required");
    }
    Ok(load_network(topology, &args.weights, &args.biases)?)
}

fn classify(net: &MlpNetwork, path: &Path) -> anyhow::Result<()> {
    let image = load_matrix(path, net.topology().input)?;
    let mut input = image.clone();
    input.vectorize();
    let digit = net.infer(&input)?;

    println!("Image processed:");
    print!("{image}");
    println!(
        "Mlp result: {} at probability: {}",
        digit.value, digit.probability
    );
    Ok(())
}
