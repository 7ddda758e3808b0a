// Integration tests for the partitioning simulator

use partsim::allocator::{DynamicOptions, FitAlgorithm, Mode, SimError};
use partsim::memory::process::{Backing, ProcessId};
use partsim::memory::{MemorySpace, FIXED_PARTITION_SIZES, KIB, MIB};
use partsim::simulation::Simulation;

fn simulation(mode: Mode, fit: FitAlgorithm, coalesce: bool) -> Simulation {
    Simulation::new(MemorySpace::default(), mode, DynamicOptions { fit, coalesce })
        .expect("Simulation creation failed")
}

fn add(sim: &mut Simulation, size: u64) -> ProcessId {
    sim.add_process(size as f64).expect("Process creation failed")
}

/// Check the layout invariant and process/region consistency
fn assert_consistent(sim: &Simulation) {
    let result = sim.verify();
    assert!(result.is_ok(), "Inconsistent state: {:?}", result);
}

/// Build free blocks of 512 KiB, 2 MiB and 1 MiB at increasing addresses,
/// separated by small allocated spacers, followed by an allocated tail.
fn fragment(sim: &mut Simulation) {
    let layout = [
        (512 * KIB, false),
        (64 * KIB, true),
        (2 * MIB, false),
        (64 * KIB, true),
        (MIB, false),
    ];
    let mut to_free = Vec::new();
    let mut used = 0;
    for (size, keep) in layout {
        let id = add(sim, size);
        sim.allocate(id).expect("Setup allocation failed");
        used += size;
        if !keep {
            to_free.push(id);
        }
    }
    let tail_size = sim.memory_space().usable_size() - used;
    let tail = add(sim, tail_size);
    sim.allocate(tail).expect("Setup allocation failed");
    for id in to_free {
        assert!(sim.deallocate(id));
    }

    let free: Vec<u64> = sim
        .regions()
        .iter()
        .filter(|r| !r.occupied)
        .map(|r| r.size)
        .collect();
    assert_eq!(free, vec![512 * KIB, 2 * MIB, MIB]);
}

fn allocated_block(sim: &Simulation, id: ProcessId) -> u64 {
    let view = sim.process(id).expect("Unknown process");
    let Some(Backing::Block(start)) = view.backing else {
        panic!("Expected a dynamic block, got {:?}", view.backing);
    };
    sim.regions()
        .iter()
        .find(|r| r.start == start)
        .map(|r| r.size)
        .expect("Backing block not in region list")
}

// === FIT ALGORITHMS ===

#[test]
fn test_first_fit_takes_first_hole_that_fits() {
    let mut sim = simulation(Mode::Dynamic, FitAlgorithm::First, true);
    fragment(&mut sim);
    let id = add(&mut sim, 600 * KIB);

    sim.allocate(id).expect("Allocation failed");

    let start = sim.memory_space().usable_start() + 512 * KIB + 64 * KIB;
    assert_eq!(sim.process(id).unwrap().backing, Some(Backing::Block(start)));
    assert_eq!(allocated_block(&sim, id), 600 * KIB);
    assert_consistent(&sim);
}

#[test]
fn test_best_fit_takes_smallest_sufficient_hole() {
    let mut sim = simulation(Mode::Dynamic, FitAlgorithm::Best, true);
    fragment(&mut sim);
    let id = add(&mut sim, 600 * KIB);

    sim.allocate(id).expect("Allocation failed");

    let start = sim.memory_space().usable_start() + 512 * KIB + 64 * KIB + 2 * MIB + 64 * KIB;
    assert_eq!(sim.process(id).unwrap().backing, Some(Backing::Block(start)));
    assert_consistent(&sim);
}

#[test]
fn test_worst_fit_takes_largest_hole() {
    let mut sim = simulation(Mode::Dynamic, FitAlgorithm::Worst, true);
    fragment(&mut sim);
    let id = add(&mut sim, 600 * KIB);

    sim.allocate(id).expect("Allocation failed");

    let start = sim.memory_space().usable_start() + 512 * KIB + 64 * KIB;
    assert_eq!(sim.process(id).unwrap().backing, Some(Backing::Block(start)));
    assert_consistent(&sim);
}

#[test]
fn test_external_fragmentation_blocks_large_request() {
    let mut sim = simulation(Mode::Dynamic, FitAlgorithm::First, true);
    fragment(&mut sim);
    let before = sim.regions();

    // 3.5 MiB is free in total, but no single hole holds 3 MiB
    let id = add(&mut sim, 3 * MIB);
    let result = sim.allocate(id);

    assert!(matches!(result, Err(SimError::AllocationFailure { .. })));
    assert!(!sim.process(id).unwrap().allocated);
    assert_eq!(sim.regions(), before);
    assert!(sim.stats().external_fragmentation > 0.0);
}

// === STATIC MODE ===

#[test]
fn test_static_first_fit_scenario() {
    let mut sim = simulation(Mode::Static, FitAlgorithm::First, true);
    let a = add(&mut sim, 1536 * KIB);
    let b = add(&mut sim, 3 * MIB);

    sim.allocate(a).expect("Allocation failed");
    sim.allocate(b).expect("Allocation failed");

    assert_eq!(sim.process(a).unwrap().backing, Some(Backing::Partition(1)));
    assert_eq!(sim.process(b).unwrap().backing, Some(Backing::Partition(2)));

    let regions = sim.regions();
    assert_eq!(regions.len(), FIXED_PARTITION_SIZES.len());
    assert_eq!(regions[1].owner.as_deref(), Some("P1"));
    assert_eq!(regions[2].owner.as_deref(), Some("P2"));
    assert!(regions[1].size >= 1536 * KIB);
    assert_consistent(&sim);
}

#[test]
fn test_static_partitions_never_change_shape() {
    let mut sim = simulation(Mode::Static, FitAlgorithm::First, true);
    let ids: Vec<ProcessId> = (0..5).map(|_| add(&mut sim, 100 * KIB)).collect();
    for &id in &ids {
        sim.allocate(id).expect("Allocation failed");
    }
    let extra = add(&mut sim, KIB);
    assert!(matches!(
        sim.allocate(extra),
        Err(SimError::AllocationFailure { .. })
    ));
    for &id in &ids {
        sim.deallocate(id);
    }

    let sizes: Vec<u64> = sim.regions().iter().map(|r| r.size).collect();
    assert_eq!(sizes, FIXED_PARTITION_SIZES.to_vec());
    assert_consistent(&sim);
}

// === DEALLOCATION ===

#[test]
fn test_deallocation_is_idempotent() {
    for mode in [Mode::Static, Mode::Dynamic] {
        let mut sim = simulation(mode, FitAlgorithm::First, true);
        let a = add(&mut sim, MIB);
        let b = add(&mut sim, MIB);
        sim.allocate(a).expect("Allocation failed");
        sim.allocate(b).expect("Allocation failed");

        assert!(sim.deallocate(a));
        let after_once = sim.regions();
        assert!(!sim.deallocate(a));

        assert_eq!(sim.regions(), after_once);
        assert!(!sim.process(a).unwrap().allocated);
        assert!(sim.process(b).unwrap().allocated);
        assert_consistent(&sim);
    }
}

#[test]
fn test_split_then_coalesce_round_trip() {
    let mut sim = simulation(Mode::Dynamic, FitAlgorithm::Best, true);
    fragment(&mut sim);
    let before: Vec<(u64, u64)> = sim.regions().iter().map(|r| (r.start, r.size)).collect();

    let id = add(&mut sim, 700 * KIB);
    sim.allocate(id).expect("Allocation failed");
    assert_ne!(sim.regions().len(), before.len());
    sim.deallocate(id);

    let after: Vec<(u64, u64)> = sim.regions().iter().map(|r| (r.start, r.size)).collect();
    assert_eq!(after, before);
}

#[test]
fn test_without_coalescing_free_neighbours_stay_split() {
    let mut sim = simulation(Mode::Dynamic, FitAlgorithm::First, false);
    let a = add(&mut sim, MIB);
    let b = add(&mut sim, MIB);
    sim.allocate(a).expect("Allocation failed");
    sim.allocate(b).expect("Allocation failed");

    sim.deallocate(a);
    sim.deallocate(b);

    assert_eq!(sim.regions().len(), 3);
    assert!(sim.region_list().has_adjacent_free());
    assert_consistent(&sim);
}

#[test]
fn test_coalescing_reaches_fixpoint() {
    let mut sim = simulation(Mode::Dynamic, FitAlgorithm::First, true);
    let ids: Vec<ProcessId> = (0..6).map(|_| add(&mut sim, 512 * KIB)).collect();
    for &id in &ids {
        sim.allocate(id).expect("Allocation failed");
    }
    // Free every other block, then the ones between them
    for &id in ids.iter().step_by(2) {
        sim.deallocate(id);
        assert!(!sim.region_list().has_adjacent_free());
    }
    for &id in ids.iter().skip(1).step_by(2) {
        sim.deallocate(id);
        assert!(!sim.region_list().has_adjacent_free());
    }

    assert_eq!(sim.regions().len(), 1);
    assert_consistent(&sim);
}

// === MODE SWITCHING ===

#[test]
fn test_mode_switch_resets_allocations() {
    let mut sim = simulation(Mode::Static, FitAlgorithm::First, true);
    let a = add(&mut sim, MIB);
    let b = add(&mut sim, 4 * MIB);
    sim.allocate(a).expect("Allocation failed");
    sim.allocate(b).expect("Allocation failed");

    sim.set_mode(Mode::Dynamic).expect("Mode switch failed");

    assert_eq!(sim.mode(), Mode::Dynamic);
    assert!(sim.processes().iter().all(|p| !p.allocated && p.backing.is_none()));
    let regions = sim.regions();
    assert_eq!(regions.len(), 1);
    assert!(!regions[0].occupied);
    assert_eq!(regions[0].size, sim.memory_space().usable_size());

    sim.allocate(a).expect("Allocation failed");
    sim.set_mode(Mode::Static).expect("Mode switch failed");

    assert!(!sim.process(a).unwrap().allocated);
    assert!(sim.regions().iter().all(|r| !r.occupied));
    assert_eq!(sim.regions().len(), FIXED_PARTITION_SIZES.len());
    assert_consistent(&sim);
}

#[test]
fn test_dynamic_option_change_resets_allocations() {
    let mut sim = simulation(Mode::Dynamic, FitAlgorithm::First, true);
    let a = add(&mut sim, MIB);
    sim.allocate(a).expect("Allocation failed");

    sim.set_dynamic_options(FitAlgorithm::Worst, false)
        .expect("Option change failed");

    assert!(!sim.process(a).unwrap().allocated);
    assert_eq!(sim.regions().len(), 1);
    assert_eq!(
        sim.dynamic_options(),
        DynamicOptions {
            fit: FitAlgorithm::Worst,
            coalesce: false
        }
    );
    // Registry survives resets
    assert_eq!(sim.processes().len(), 1);
}

#[test]
fn test_reset_keeps_mode() {
    let mut sim = simulation(Mode::Static, FitAlgorithm::First, true);
    let a = add(&mut sim, MIB);
    sim.allocate(a).expect("Allocation failed");

    sim.reset().expect("Reset failed");

    assert_eq!(sim.mode(), Mode::Static);
    assert!(!sim.process(a).unwrap().allocated);
    sim.allocate(a).expect("Allocation after reset failed");
    assert_consistent(&sim);
}

// === ERRORS ===

#[test]
fn test_invalid_process_size_is_not_registered() {
    let mut sim = simulation(Mode::Dynamic, FitAlgorithm::First, true);

    assert!(matches!(
        sim.add_process(0.0),
        Err(SimError::InvalidProcessSize { .. })
    ));
    assert!(matches!(
        sim.add_process(-5.0),
        Err(SimError::InvalidProcessSize { .. })
    ));
    assert!(sim.processes().is_empty());

    // The simulation stays usable after the failure
    let id = add(&mut sim, KIB);
    assert!(sim.allocate(id).is_ok());
}

#[test]
fn test_allocating_twice_is_rejected() {
    let mut sim = simulation(Mode::Dynamic, FitAlgorithm::First, true);
    let id = add(&mut sim, MIB);
    sim.allocate(id).expect("Allocation failed");
    let before = sim.regions();

    let result = sim.allocate(id);

    assert!(matches!(result, Err(SimError::AlreadyAllocated { .. })));
    assert_eq!(sim.regions(), before);
    assert_consistent(&sim);
}

#[test]
fn test_request_larger_than_memory_fails_in_both_modes() {
    for mode in [Mode::Static, Mode::Dynamic] {
        let mut sim = simulation(mode, FitAlgorithm::First, true);
        let too_big = sim.memory_space().usable_size() + 1;
        let id = add(&mut sim, too_big);

        let err = sim.allocate(id).unwrap_err();
        assert!(err.to_string().contains("P1"), "Unexpected message: {}", err);
        assert!(!sim.process(id).unwrap().allocated);
    }
}
