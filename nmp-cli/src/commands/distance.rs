use anyhow::Result;

use super::{PackOptions, PointResolver};

pub fn run(options: &PackOptions, from: &str, to: &str) -> Result<()> {
    let mut resolver = PointResolver::new(options);
    let a = resolver.resolve(from)?;
    let b = resolver.resolve(to)?;

    let km = nmp::distance(a, b);
    tracing::debug!(from = ?a, to = ?b, km, "Computed distance");
    println!("{:.3} km", km);

    Ok(())
}
