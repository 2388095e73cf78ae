//! Raw PassMark marks to the engine's 0-100 scale and tiers.

use rigbalance_core::component::{ComponentType, Tier};

/// Upper bounds (exclusive) of each CPU Mark bucket and the score it maps to.
const CPU_BUCKETS: [(u32, u8); 7] = [
    (2_000, 10),
    (5_000, 20),
    (10_000, 35),
    (15_000, 50),
    (20_000, 65),
    (28_000, 80),
    (40_000, 92),
];

/// Same for G3D Mark.
const GPU_BUCKETS: [(u32, u8); 7] = [
    (1_000, 5),
    (3_000, 15),
    (6_000, 30),
    (10_000, 50),
    (15_000, 65),
    (20_000, 80),
    (28_000, 92),
];

fn bucket(buckets: &[(u32, u8)], mark: u32) -> u8 {
    buckets
        .iter()
        .find(|(bound, _)| mark < *bound)
        .map_or(100, |(_, score)| *score)
}

pub fn cpu_score(cpu_mark: u32) -> u8 {
    bucket(&CPU_BUCKETS, cpu_mark)
}

pub fn gpu_score(g3d_mark: u32) -> u8 {
    bucket(&GPU_BUCKETS, g3d_mark)
}

pub fn normalized_score(kind: ComponentType, mark: u32) -> u8 {
    match kind {
        ComponentType::Cpu => cpu_score(mark),
        ComponentType::Gpu => gpu_score(mark),
    }
}

pub fn tier(normalized_score: u8) -> Tier {
    match normalized_score {
        0..=29 => Tier::Low,
        30..=59 => Tier::Mid,
        60..=84 => Tier::High,
        _ => Tier::Ultra,
    }
}
