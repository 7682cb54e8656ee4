fn main() -> mlp_digits::Result<()> {
    use mlp_digits::{Matrix, MlpNetwork, Topology};

    let net = MlpNetwork::new_with_seed(Topology::digits(), 42)?;

    let path = "target/tmp_digits.json";
    net.save_json(path)?;
    let loaded = MlpNetwork::load_json(path)?;

    let input = Matrix::from_vec(784, 1, vec![0.25; 784])?;
    let a = net.infer(&input)?;
    let b = loaded.infer(&input)?;
    assert_eq!(a, b);
    println!("saved and loaded network: {path} -> {b}");
    Ok(())
}
