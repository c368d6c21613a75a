//! Handles the core execution logic for the single-grid and batch modes.

use crate::{
    config::{Settings, VisualizationMode},
    error::AppError,
    output,
    progress::{ConsoleProgressReporter, ProgressReporter},
    visualization::{GlyphAtlas, TerminalCanvas},
};
use anyhow::{bail, Context, Result};
use log::{error, info, warn};
use rayon::prelude::*;
use std::time::Duration;
use wfc_core::{
    compile_rules, run_generation, run_generation_observed, BaseTile, CollapseObserver,
    GenerationStats, Grid, RuleTable, WfcError,
};
use wfc_rules::{default_catalogue, loader::load_from_file};

/// Loads the catalogue named by the settings, or compiles the built-in one.
pub fn load_rules(settings: &Settings) -> Result<RuleTable, AppError> {
    let rules = match &settings.rule_file {
        Some(path) => {
            info!("Loading rules from: {:?}", path);
            load_from_file(path)?
        }
        None => {
            info!("No rule file given, using the built-in catalogue");
            compile_catalogue(&default_catalogue())?
        }
    };
    info!("Rules loaded: {} variants", rules.len());
    Ok(rules)
}

/// Compiles an in-memory catalogue.
pub fn compile_catalogue(tiles: &[BaseTile]) -> Result<RuleTable, AppError> {
    compile_rules(tiles).map_err(|e| AppError::WfcCore(WfcError::from(e)))
}

/// Forwards solver events to whichever collaborators are enabled.
#[derive(Default)]
struct RunObserver {
    canvas: Option<TerminalCanvas>,
    reporter: Option<ConsoleProgressReporter>,
}

impl CollapseObserver for RunObserver {
    fn on_cell_collapsed(&mut self, pos: usize, variant: &str) {
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.on_cell_collapsed(pos, variant);
        }
        if let Some(reporter) = self.reporter.as_mut() {
            reporter.on_cell_collapsed(pos, variant);
        }
    }

    fn on_reset(&mut self) {
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.on_reset();
        }
        if let Some(reporter) = self.reporter.as_mut() {
            reporter.on_reset();
        }
    }
}

/// Generates one grid, renders it if requested and saves it to the output path.
///
/// A contradiction on the final attempt is returned as an error after the
/// partial grid has been rendered.
pub fn run_single(
    settings: &Settings,
    rules: &RuleTable,
    report_interval: Option<Duration>,
) -> Result<GenerationStats> {
    info!("Initializing grid: {0}x{0}", settings.size);
    let mut grid = Grid::new(settings.size, rules).map_err(AppError::from)?;

    let mut observer = RunObserver::default();
    if settings.visualization_mode == VisualizationMode::Terminal {
        let mut canvas = TerminalCanvas::new(settings.size, GlyphAtlas::from_rules(rules));
        canvas.bind_all();
        observer.canvas = Some(canvas);
    }
    if let Some(interval) = report_interval {
        observer.reporter = Some(ConsoleProgressReporter::new(interval, grid.len()));
    }

    let result = run_generation_observed(&mut grid, rules, &settings.wfc_config(0), &mut observer);

    if let Some(canvas) = &observer.canvas {
        print!("{}", canvas.render());
    }

    match result {
        Ok(stats) => {
            if let Some(reporter) = observer.reporter.as_mut() {
                reporter.finish(&stats)?;
            }
            output::save_grid_to_file(&grid, rules, &settings.output_path)?;
            Ok(stats)
        }
        Err(e) => {
            if let Some(reporter) = observer.reporter.as_mut() {
                reporter.fail(&e)?;
            }
            warn!(
                "{} of {} cells collapsed, {} without candidates",
                grid.collapsed_count(),
                grid.len(),
                grid.contradictions().len()
            );
            Err(anyhow::Error::new(AppError::from(e)).context("Generation failed"))
        }
    }
}

fn generate_one(settings: &Settings, rules: &RuleTable, index: usize) -> Result<GenerationStats> {
    let mut grid = Grid::new(settings.size, rules).map_err(AppError::from)?;
    let stats = run_generation(&mut grid, rules, &settings.wfc_config(index), |_: usize, _: &str| {})
        .map_err(AppError::from)
        .with_context(|| format!("Grid {index} failed"))?;
    let path = output::batch_output_path(&settings.output_path, index);
    output::save_grid_to_file(&grid, rules, &path)?;
    Ok(stats)
}

/// Generates `settings.batch` independent grids in parallel.
///
/// Every task owns its grid; the rule table is shared read-only. Grid `i` is
/// written next to the output path with `_i` appended to the file stem.
pub fn run_batch(settings: &Settings, rules: &RuleTable) -> Result<Vec<GenerationStats>> {
    if settings.visualization_mode != VisualizationMode::None {
        warn!("Visualization is not available in batch mode, ignoring it");
    }
    info!(
        "Generating {} grids of {}x{} in parallel",
        settings.batch, settings.size, settings.size
    );

    let results: Vec<(usize, Result<GenerationStats>)> = (0..settings.batch)
        .into_par_iter()
        .map(|index| (index, generate_one(settings, rules, index)))
        .collect();

    let mut stats = Vec::with_capacity(results.len());
    let mut failures = 0;
    for (index, result) in results {
        match result {
            Ok(s) => {
                info!("Grid {} done in {:?} ({} attempt(s))", index, s.elapsed, s.attempts);
                stats.push(s);
            }
            Err(e) => {
                error!("{:#}", e);
                failures += 1;
            }
        }
    }
    if failures > 0 {
        bail!("{} of {} grids failed to generate", failures, settings.batch);
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;
    use wfc_rules::{LoadError, RuleError};

    #[test]
    fn test_default_rules_without_file() {
        let rules = load_rules(&Settings::default()).unwrap();
        assert_eq!(rules.len(), 12);
    }

    #[test]
    fn test_empty_catalogue_is_a_core_error() {
        assert!(matches!(
            compile_catalogue(&[]),
            Err(AppError::WfcCore(WfcError::Rules(RuleError::EmptyCatalogue)))
        ));
    }

    #[test]
    fn test_missing_rule_file() {
        let settings = Settings {
            rule_file: Some(PathBuf::from("/no/such/rules.ron")),
            ..Settings::default()
        };
        assert!(matches!(
            load_rules(&settings),
            Err(AppError::Rules(LoadError::Io(_)))
        ));
    }

    #[test]
    fn test_run_single_writes_output() {
        let rules = compile_rules(&[BaseTile::new("0", 0b0000), BaseTile::new("4", 0b1111)])
            .unwrap();
        let dir = tempdir().unwrap();
        let settings = Settings {
            size: 3,
            seed: Some(9),
            output_path: dir.path().join("grid.txt"),
            visualization_mode: VisualizationMode::Terminal,
            ..Settings::default()
        };

        let stats = run_single(&settings, &rules, Some(Duration::ZERO)).unwrap();
        assert_eq!(stats.collapses, 9);
        let text = std::fs::read_to_string(&settings.output_path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_run_batch_writes_every_grid() {
        let rules = compile_rules(&[BaseTile::new("0", 0b0000), BaseTile::new("4", 0b1111)])
            .unwrap();
        let dir = tempdir().unwrap();
        let settings = Settings {
            size: 4,
            seed: Some(1),
            batch: 3,
            output_path: dir.path().join("grid.txt"),
            ..Settings::default()
        };

        let stats = run_batch(&settings, &rules).unwrap();
        assert_eq!(stats.len(), 3);
        for index in 0..3 {
            assert!(dir.path().join(format!("grid_{index}.txt")).exists());
        }
    }

    #[test]
    fn test_contradiction_is_a_core_error() {
        let rules = compile_catalogue(&[
            BaseTile::new("straight", 0b1010),
            BaseTile::new("end", 0b1000),
        ])
        .unwrap();
        let dir = tempdir().unwrap();
        let settings = Settings {
            size: 7,
            seed: Some(5),
            output_path: dir.path().join("grid.txt"),
            ..Settings::default()
        };

        let err = run_single(&settings, &rules, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::WfcCore(WfcError::Contradiction { .. }))
        ));
        assert!(!settings.output_path.exists());
    }
}
