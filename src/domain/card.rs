use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const COLUMNS: usize = 5;
pub const ROWS: usize = 5;

/// B-I-N-G-O column ranges, inclusive.
const COLUMN_RANGES: [(u8, u8); COLUMNS] = [(1, 15), (16, 30), (31, 45), (46, 60), (61, 75)];

/// Rejection sampling over 15 candidates picking 5 converges almost
/// immediately; the ceiling only exists so a bad RNG cannot spin forever.
const MAX_SAMPLE_ATTEMPTS: usize = 64;

/// A 5x5 bingo card stored column-major, each column sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card(pub [[u8; ROWS]; COLUMNS]);

impl Card {
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng>(rng: &mut R) -> Self {
        let mut grid = [[0u8; ROWS]; COLUMNS];
        for (col, &(min, max)) in COLUMN_RANGES.iter().enumerate() {
            grid[col] = column_numbers(rng, min, max);
        }
        Card(grid)
    }

    pub fn numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().flatten().copied()
    }

    pub fn contains(&self, number: u8) -> bool {
        self.0.iter().any(|column| column.contains(&number))
    }
}

fn column_numbers<R: Rng>(rng: &mut R, min: u8, max: u8) -> [u8; ROWS] {
    let mut numbers: Vec<u8> = Vec::with_capacity(ROWS);
    let mut attempts = 0;
    while numbers.len() < ROWS && attempts < MAX_SAMPLE_ATTEMPTS {
        attempts += 1;
        let n = rng.gen_range(min..=max);
        if !numbers.contains(&n) {
            numbers.push(n);
        }
    }
    if numbers.len() < ROWS {
        // Ceiling hit: finish the column from the untaken candidates.
        let mut remaining: Vec<u8> = (min..=max).filter(|n| !numbers.contains(n)).collect();
        remaining.shuffle(rng);
        numbers.extend(remaining.into_iter().take(ROWS - numbers.len()));
    }
    numbers.sort_unstable();
    let mut column = [0u8; ROWS];
    column.copy_from_slice(&numbers);
    column
}
