use proptest::prelude::*;
use wfc_core::{
    compile_rules, run_generation, run_generation_observed, BaseTile, CollapseObserver, Direction,
    Grid, PropagationMode, RuleTable, SelectionStrategy, WfcConfig, WfcError,
};
use wfc_rules::default_catalogue;

#[derive(Default)]
struct Recorder {
    resets: u32,
    events: Vec<(usize, String)>,
}

impl CollapseObserver for Recorder {
    fn on_cell_collapsed(&mut self, pos: usize, variant: &str) {
        self.events.push((pos, variant.to_owned()));
    }

    fn on_reset(&mut self) {
        self.resets += 1;
        self.events.clear();
    }
}

fn assert_valid_adjacency(grid: &Grid, rules: &RuleTable) {
    for cell in grid.cells() {
        let here = cell.collapsed_variant().expect("grid fully collapsed");
        for direction in [Direction::Right, Direction::Down] {
            if let Some(neighbor) = grid.neighbor_cell(cell.pos(), direction) {
                let there = neighbor.collapsed_variant().expect("grid fully collapsed");
                assert!(
                    rules.permits(here, there, direction),
                    "{} at {} does not permit {} toward {}",
                    rules.name_of(here).unwrap(),
                    cell.pos(),
                    rules.name_of(there).unwrap(),
                    direction
                );
            }
        }
    }
}

fn mode_strategy() -> impl Strategy<Value = PropagationMode> {
    prop_oneof![Just(PropagationMode::Local), Just(PropagationMode::Cascade)]
}

fn selection_strategy() -> impl Strategy<Value = SelectionStrategy> {
    prop_oneof![
        Just(SelectionStrategy::RandomLowest),
        Just(SelectionStrategy::FirstMinimum)
    ]
}

#[test]
fn test_single_cell_grid() {
    let rules = compile_rules(&default_catalogue()).unwrap();
    let mut grid = Grid::new(1, &rules).unwrap();
    let mut seen = Vec::new();
    let config = WfcConfig::builder().seed(11).build();

    let stats = run_generation(&mut grid, &rules, &config, |pos: usize, name: &str| {
        seen.push((pos, name.to_owned()));
    })
    .unwrap();

    assert_eq!(stats.collapses, 1);
    assert_eq!(stats.narrowed, 0);
    assert_eq!(stats.attempts, 1);
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, 0);
    assert!(rules.id_of(&seen[0].1).is_some());
}

#[test]
fn test_each_cell_reported_once() {
    let rules = compile_rules(&default_catalogue()).unwrap();
    let mut grid = Grid::new(8, &rules).unwrap();
    let mut recorder = Recorder::default();
    let config = WfcConfig::builder().seed(5).max_attempts(50).build();

    let stats = run_generation_observed(&mut grid, &rules, &config, &mut recorder)
        .expect("default catalogue fills an 8x8 grid");
    assert_eq!(stats.collapses, 64);

    let mut positions: Vec<usize> = recorder.events.iter().map(|(pos, _)| *pos).collect();
    positions.sort_unstable();
    assert_eq!(positions, (0..64).collect::<Vec<_>>());
    for (pos, name) in &recorder.events {
        assert_eq!(rules.id_of(name), grid.collapsed_variant(*pos));
    }
}

#[test]
fn test_same_seed_same_events() {
    let rules = compile_rules(&default_catalogue()).unwrap();
    let config = WfcConfig::builder().seed(1234).build();

    let mut first = Recorder::default();
    let mut grid = Grid::new(6, &rules).unwrap();
    let first_result = run_generation_observed(&mut grid, &rules, &config, &mut first);

    let mut second = Recorder::default();
    let mut other = Grid::new(6, &rules).unwrap();
    let second_result = run_generation_observed(&mut other, &rules, &config, &mut second);

    assert_eq!(first.events, second.events);
    assert_eq!(first_result.is_ok(), second_result.is_ok());
    assert_eq!(grid, other);
}

#[test]
fn test_grid_is_reused_across_requests() {
    let rules = compile_rules(&[BaseTile::new("0", 0b0000), BaseTile::new("4", 0b1111)]).unwrap();
    let mut grid = Grid::new(4, &rules).unwrap();

    for seed in 0..5 {
        let config = WfcConfig::builder().seed(seed).build();
        let stats = run_generation(&mut grid, &rules, &config, |_: usize, _: &str| {}).unwrap();
        assert_eq!(stats.collapses, 16);
        assert!(grid.is_fully_collapsed());
    }
}

#[test]
fn test_retries_reset_the_observer() {
    let rules = compile_rules(&[BaseTile::new("end", 0b1000), BaseTile::new("cross", 0b1111)])
        .unwrap();
    for seed in 0..20 {
        let mut grid = Grid::new(5, &rules).unwrap();
        let mut recorder = Recorder::default();
        let config = WfcConfig::builder().seed(seed).max_attempts(3).build();

        match run_generation_observed(&mut grid, &rules, &config, &mut recorder) {
            Ok(stats) => {
                assert_eq!(recorder.resets, stats.attempts);
                assert_eq!(recorder.events.len(), 25);
            }
            Err(WfcError::Contradiction { .. }) => assert_eq!(recorder.resets, 3),
            Err(other) => panic!("unexpected error {other}"),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_success_means_valid_adjacency(
        seed in any::<u64>(),
        dim in 1usize..8,
        mode in mode_strategy(),
        strategy in selection_strategy(),
    ) {
        let rules = compile_rules(&default_catalogue()).unwrap();
        let mut grid = Grid::new(dim, &rules).unwrap();
        let config = WfcConfig::builder()
            .seed(seed)
            .propagation_mode(mode)
            .selection_strategy(strategy)
            .build();

        match run_generation(&mut grid, &rules, &config, |_: usize, _: &str| {}) {
            Ok(stats) => {
                prop_assert_eq!(stats.collapses, dim * dim);
                prop_assert!(grid.is_fully_collapsed());
                assert_valid_adjacency(&grid, &rules);
            }
            Err(WfcError::Contradiction { pos, x, y }) => {
                prop_assert_eq!(pos, y * dim + x);
                prop_assert!(grid.contradictions().contains(&pos));
            }
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }

    #[test]
    fn prop_blank_and_cross_always_fills_uniformly(
        seed in any::<u64>(),
        dim in 1usize..7,
        mode in mode_strategy(),
    ) {
        let rules = compile_rules(&[BaseTile::new("0", 0b0000), BaseTile::new("4", 0b1111)])
            .unwrap();
        let mut grid = Grid::new(dim, &rules).unwrap();
        let config = WfcConfig::builder().seed(seed).propagation_mode(mode).build();

        let stats = run_generation(&mut grid, &rules, &config, |_: usize, _: &str| {});
        prop_assert!(stats.is_ok());
        let first = grid.collapsed_variant(0);
        prop_assert!(first.is_some());
        for pos in 0..grid.len() {
            prop_assert_eq!(grid.collapsed_variant(pos), first);
        }
    }

    #[test]
    fn prop_dead_ends_succeed_or_report_contradiction(seed in any::<u64>(), dim in 2usize..6) {
        let rules = compile_rules(&[BaseTile::new("end", 0b1000)]).unwrap();
        let mut grid = Grid::new(dim, &rules).unwrap();
        let config = WfcConfig::builder().seed(seed).build();

        match run_generation(&mut grid, &rules, &config, |_: usize, _: &str| {}) {
            Ok(_) => assert_valid_adjacency(&grid, &rules),
            Err(WfcError::Contradiction { .. }) => prop_assert!(!grid.contradictions().is_empty()),
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }
}
