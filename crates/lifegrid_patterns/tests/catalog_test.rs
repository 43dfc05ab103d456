//! Integration tests for the pattern catalog.

use lifegrid_core::{initialize, PatternProvider, Strategy};
use lifegrid_patterns::{Pattern, PatternCatalog};

#[test]
fn test_random_fill_is_reproducible() {
    let mut a = PatternCatalog::new(1234);
    let mut b = PatternCatalog::new(1234);
    let mut c = PatternCatalog::new(4321);

    let first = a.initial_cells("Random", 30);
    assert_eq!(first, b.initial_cells("random", 30));
    assert_ne!(first, c.initial_cells("Random", 30));

    // Roughly half the cells, nowhere near empty or full.
    assert!(first.len() > 300 && first.len() < 600, "{}", first.len());
    assert!(first.iter().all(|&(x, y)| x < 30 && y < 30));
}

#[test]
fn test_unknown_name_gives_empty_grid() {
    let mut catalog = PatternCatalog::new(0);
    assert!(catalog.initial_cells("Pulsar", 25).is_empty());
}

#[test]
fn test_large_pattern_truncated_on_small_grid() {
    let mut catalog = PatternCatalog::new(0);
    let full = catalog.cells(Pattern::GliderGun, 50);
    let clipped = catalog.cells(Pattern::GliderGun, 25);

    assert!(clipped.len() < full.len());
    assert!(clipped.iter().all(|&(x, y)| x < 25 && y < 25));
    assert!(clipped.is_subset(&full));
}

#[test]
fn test_catalog_oscillators_have_period_two() {
    let mut catalog = PatternCatalog::new(0);
    for name in ["Blinker", "Toad", "Beacon"] {
        let cells = catalog.initial_cells(name, 25);
        let mut sim = initialize(25, cells.iter().copied(), Strategy::Sequential).unwrap();
        sim.tick().unwrap();
        let back = sim.tick().unwrap();
        assert_eq!(back.live_cells(), cells, "{name}");
    }
}

#[test]
fn test_names_cover_catalog() {
    let names: Vec<_> = PatternCatalog::names().collect();
    assert_eq!(names.len(), Pattern::ALL.len());
    assert!(names.contains(&"Loafer Synth"));
}
