//! Agent table loading from CSV or Parquet files

use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use polars::prelude::*;
use crate::data::{Agent, AgentTable};
use crate::error::AnalyzerError;

/// Column names expected in an agent table file, in row order
pub const AGENT_COLUMNS: [&str; 5] = ["x", "y", "v", "theta", "battery"];

/// Load an agent table; the format is picked from the file extension
pub fn load_agent_table(path: &Path) -> Result<AgentTable> {
    log::info!("Reading agent table: {}", path.display());

    // Check if the file exists
    if !path.exists() {
        return Err(AnalyzerError::missing(format!(
            "agent table not found: {}",
            path.display()
        ))
        .into());
    }

    let df = match path.extension().and_then(|e| e.to_str()) {
        Some("parquet") => LazyFrame::scan_parquet(path, Default::default())?.collect()?,
        _ => CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
            .finish()?,
    };

    log::debug!("File schema: {:?}", df.schema());
    log::info!("Loaded {} agent rows", df.height());

    agents_from_frame(&df)
}

/// Convert a data frame with the agent columns into an agent table
pub fn agents_from_frame(df: &DataFrame) -> Result<AgentTable> {
    let row_count = df.height();
    if row_count == 0 {
        return Err(AnalyzerError::invalid("agent table is empty").into());
    }

    // Cast every column to f64 so integer-typed CSV columns load too
    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(AGENT_COLUMNS.len());
    for name in AGENT_COLUMNS {
        let column = df
            .column(name)
            .with_context(|| format!("agent table has no `{}` column", name))?
            .cast(&DataType::Float64)?;
        let values = column.f64()?;

        let mut out = Vec::with_capacity(row_count);
        for (row, value) in values.into_iter().enumerate() {
            match value {
                Some(v) => out.push(v),
                None => {
                    return Err(AnalyzerError::invalid(format!(
                        "null `{}` value at row {}",
                        name, row
                    ))
                    .into())
                }
            }
        }
        columns.push(out);
    }

    let agents = (0..row_count)
        .map(|i| Agent {
            id: i as u32,
            x: columns[0][i],
            y: columns[1][i],
            v: columns[2][i],
            theta: columns[3][i],
            battery: columns[4][i],
        })
        .collect();

    Ok(AgentTable::from_agents(agents)?)
}
