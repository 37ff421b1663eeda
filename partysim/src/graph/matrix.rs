use serde::{Deserialize, Serialize};

/// Tolerance used when checking that w[a][b] == w[b][a].
pub const SYMMETRY_TOL: f64 = 1e-9;

/// Dense symmetric friendship-weight matrix. W[a][b] is the strength of the
/// friendship between person a and person b.
///
/// Construction validates shape, sign and symmetry; the only mutation is
/// `set_symmetric`, which writes both halves at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct WeightMatrix {
    w: Vec<Vec<f64>>,
}

impl WeightMatrix {
    pub fn new(rows: Vec<Vec<f64>>) -> anyhow::Result<Self> {
        let m = Self { w: rows };
        m.check()?;
        Ok(m)
    }

    /// n x n matrix of zeros (no relationships).
    pub fn zeros(n: usize) -> Self {
        Self { w: vec![vec![0.0; n]; n] }
    }

    pub fn check(&self) -> anyhow::Result<()> {
        let n = self.w.len();
        anyhow::ensure!(n > 0, "weight matrix is empty");
        anyhow::ensure!(self.w.iter().all(|r| r.len() == n), "weight matrix must be square (n x n)");
        for a in 0..n {
            for b in 0..n {
                let v = self.w[a][b];
                anyhow::ensure!(v.is_finite(), "weight ({}, {}) is not finite", a, b);
                anyhow::ensure!(v >= 0.0, "weight ({}, {}) is negative: {}", a, b, v);
                if b > a {
                    anyhow::ensure!(
                        (v - self.w[b][a]).abs() <= SYMMETRY_TOL,
                        "weight matrix not symmetric at ({}, {}): {} vs {}",
                        a,
                        b,
                        v,
                        self.w[b][a]
                    );
                }
            }
        }
        Ok(())
    }

    /// Number of persons.
    pub fn len(&self) -> usize {
        self.w.len()
    }

    pub fn is_empty(&self) -> bool {
        self.w.is_empty()
    }

    pub fn get(&self, a: usize, b: usize) -> f64 {
        self.w[a][b]
    }

    pub fn row(&self, a: usize) -> &[f64] {
        &self.w[a]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.w
    }

    pub fn row_sum(&self, a: usize) -> f64 {
        self.w[a].iter().sum()
    }

    pub fn total(&self) -> f64 {
        self.w.iter().map(|r| r.iter().sum::<f64>()).sum()
    }

    /// Writes `v` into both (a, b) and (b, a).
    pub(crate) fn set_symmetric(&mut self, a: usize, b: usize, v: f64) {
        self.w[a][b] = v;
        self.w[b][a] = v;
    }

    pub fn is_symmetric(&self) -> bool {
        let n = self.w.len();
        (0..n).all(|a| (a + 1..n).all(|b| (self.w[a][b] - self.w[b][a]).abs() <= SYMMETRY_TOL))
    }
}

impl TryFrom<Vec<Vec<f64>>> for WeightMatrix {
    type Error = anyhow::Error;

    fn try_from(rows: Vec<Vec<f64>>) -> anyhow::Result<Self> {
        Self::new(rows)
    }
}

impl From<WeightMatrix> for Vec<Vec<f64>> {
    fn from(m: WeightMatrix) -> Self {
        m.w
    }
}
