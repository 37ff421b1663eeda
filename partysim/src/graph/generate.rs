use rand::Rng;

use crate::graph::matrix::WeightMatrix;

/// Anything that can produce an n x n friendship graph for a given edge density.
pub trait GraphGenerator {
    fn generate(&mut self, n: usize, density: f64) -> anyhow::Result<WeightMatrix>;
}

fn check_args(n: usize, density: f64) -> anyhow::Result<()> {
    anyhow::ensure!(n > 0, "graph needs at least one person");
    anyhow::ensure!(
        density.is_finite() && (0.0..=1.0).contains(&density),
        "density must be in [0, 1], got {}",
        density
    );
    Ok(())
}

/// Random graph: each unordered pair is connected with probability `density`
/// and gets a weight drawn uniformly from [0, 1). Diagonal is zero.
pub struct RandomGraph<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomGraph<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_rng(self) -> R {
        self.rng
    }
}

impl<R: Rng> GraphGenerator for RandomGraph<R> {
    fn generate(&mut self, n: usize, density: f64) -> anyhow::Result<WeightMatrix> {
        check_args(n, density)?;
        let mut w = vec![vec![0.0; n]; n];
        for a in 0..n {
            for b in (a + 1)..n {
                if self.rng.random::<f64>() < density {
                    let v = self.rng.random::<f64>();
                    w[a][b] = v;
                    w[b][a] = v;
                }
            }
        }
        WeightMatrix::new(w)
    }
}

/// Deterministic graph generator for testing and demos.
///
/// Not meant to be realistic. People are placed on a line; everyone within
/// `density * (n - 1)` positions of each other is connected, and the weight
/// decays with distance (0.95 for direct neighbours).
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticGraph;

impl GraphGenerator for SyntheticGraph {
    fn generate(&mut self, n: usize, density: f64) -> anyhow::Result<WeightMatrix> {
        check_args(n, density)?;
        let reach = density * (n.saturating_sub(1)) as f64;
        let mut w = vec![vec![0.0; n]; n];
        for a in 0..n {
            for b in 0..n {
                let d = (a as i64 - b as i64).abs() as f64;
                if d >= 1.0 && d <= reach {
                    w[a][b] = 0.95 * (-0.35 * (d - 1.0)).exp();
                }
            }
        }
        WeightMatrix::new(w)
    }
}
