use std::path::Path;

use anyhow::Context;

use crate::graph::matrix::WeightMatrix;

/// Load a friendship weight matrix from CSV. Numeric cells are kept; rows
/// without any numeric cell (e.g. a `p0,p1,...` header) and non-numeric label
/// columns are ignored; `nan`/`inf` cells count as labels, not numbers. The
/// result must be square, symmetric and non-negative.
pub fn load_weight_matrix_csv(path: impl AsRef<Path>) -> anyhow::Result<WeightMatrix> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open weight CSV: {}", path.display()))?;

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("bad CSV record at row {}", line + 1))?;
        let row_vals: Vec<f64> = record
            .iter()
            .filter_map(|field| field.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .collect();
        if !row_vals.is_empty() {
            rows.push(row_vals);
        }
    }
    anyhow::ensure!(!rows.is_empty(), "weight matrix empty or unparsable");
    WeightMatrix::new(rows).with_context(|| format!("invalid weight matrix in {}", path.display()))
}

/// Write a weight matrix as CSV with a `p0,p1,...` header.
pub fn write_weight_matrix_csv(path: impl AsRef<Path>, graph: &WeightMatrix) -> anyhow::Result<()> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create weight CSV: {}", path.display()))?;
    wtr.write_record((0..graph.len()).map(|i| format!("p{}", i)))?;
    for row in graph.rows() {
        wtr.write_record(row.iter().map(|v| v.to_string()))?;
    }
    wtr.flush().context("flush weight CSV failed")?;
    Ok(())
}
