use mlp_digits::{ActivationType, Dims, LayerSpec, Matrix, MlpNetwork, Topology};

fn main() -> mlp_digits::Result<()> {
    // 4 -> 3 -> 2 network over a 2x2 "image".
    let topology = Topology::new(
        Dims::new(2, 2),
        vec![
            LayerSpec::dense(4, 3, ActivationType::Relu),
            LayerSpec::dense(3, 2, ActivationType::Softmax),
        ],
    )?;

    let weights = vec![
        Matrix::from_rows(&[
            &[1.0, 0.0, 0.0, 0.0],
            &[0.0, 1.0, 1.0, 0.0],
            &[0.0, 0.0, 0.0, 1.0],
        ])?,
        Matrix::from_rows(&[&[1.0, -1.0, 1.0], &[-1.0, 1.0, -1.0]])?,
    ];
    let biases = vec![Matrix::new(3, 1)?, Matrix::new(2, 1)?];
    let net = MlpNetwork::with_topology(topology, weights, biases)?;

    for pixels in [[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 1.0, 0.0]] {
        let mut x = Matrix::from_vec(2, 2, pixels.to_vec())?;
        x.vectorize();
        println!("{:?} -> {}", pixels, net.infer(&x)?);
    }
    Ok(())
}
