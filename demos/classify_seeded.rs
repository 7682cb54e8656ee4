use mlp_digits::{Matrix, MlpNetwork, Topology};

fn main() -> mlp_digits::Result<()> {
    // Random (untrained) weights: the prediction is meaningless, the plumbing is not.
    let net = MlpNetwork::new_with_seed(Topology::digits(), 0)?;

    // A crude vertical stroke, like a "1".
    let mut image = Matrix::new(28, 28)?;
    for row in 4..24 {
        image[(row, 13)] = 1.0;
        image[(row, 14)] = 0.8;
    }
    print!("{image}");

    let mut input = image.clone();
    input.vectorize();
    let probs = net.forward(&input)?;
    for (class, p) in probs.as_slice().iter().enumerate() {
        println!("{class}: {p:.4}");
    }

    let digit = net.infer(&input)?;
    println!("prediction: {digit}");
    Ok(())
}
