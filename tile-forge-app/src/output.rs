use crate::error::AppError;
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use wfc_core::{Grid, RuleTable};

/// Formats a fully collapsed grid as text.
///
/// Format: variant names separated by single spaces along X, one line per row (Y).
pub fn format_grid(grid: &Grid, rules: &RuleTable) -> Result<String> {
    let mut out = String::new();
    for y in 0..grid.dim() {
        let mut line = Vec::with_capacity(grid.dim());
        for x in 0..grid.dim() {
            let cell = grid.get(x, y).ok_or_else(|| {
                anyhow::anyhow!("Internal error: Failed to access grid cell ({},{})", x, y)
            })?;
            let Some(variant) = cell.collapsed_variant() else {
                if cell.is_contradiction() {
                    bail!("Grid cell ({},{}) has a contradiction (0 possibilities), cannot save.", x, y);
                }
                bail!(
                    "Grid cell ({},{}) is not collapsed ({} possibilities), cannot save.",
                    x,
                    y,
                    cell.entropy()
                );
            };
            let name = rules
                .name_of(variant)
                .with_context(|| format!("Variant {} is not part of the rule table", variant.0))?;
            line.push(name);
        }
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    Ok(out)
}

/// Saves the final collapsed grid to a file in a simple text format.
///
/// Nothing is written if the grid is not fully collapsed.
pub fn save_grid_to_file(grid: &Grid, rules: &RuleTable, output_path: &Path) -> Result<()> {
    log::info!("Attempting to save grid to {:?}...", output_path);
    let text = format_grid(grid, rules)?;

    let file = File::create(output_path)
        .map_err(AppError::from)
        .with_context(|| format!("Failed to create output file: {:?}", output_path))?;
    let mut writer = io::BufWriter::new(file);
    writer
        .write_all(text.as_bytes())
        .with_context(|| format!("Failed to write grid to {:?}", output_path))?;
    writer
        .flush()
        .context("Failed to flush writer for output file")?;
    log::info!("Successfully saved grid to {:?}", output_path);

    Ok(())
}

/// Output path of grid `index` in a batch: `out.txt` becomes `out_3.txt`.
pub fn batch_output_path(base: &Path, index: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .map_or_else(|| "output".into(), |s| s.to_string_lossy().into_owned());
    let file_name = match base.extension() {
        Some(ext) => format!("{stem}_{index}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{index}"),
    };
    base.with_file_name(file_name)
}
