use super::*;

/// Uniformly random placement, reproducible from `seed`.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMineGenerator {
    seed: u64,
}

impl RandomMineGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MineGenerator for RandomMineGenerator {
    fn place_mines(self, board: &mut Board, mine_count: CellCount) -> CellCount {
        use rand::prelude::*;

        let total_cells = board.total_cells() as usize;
        let columns = board.columns();
        let mine_count = (mine_count as usize).min(total_cells);

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let picks = rand::seq::index::sample(&mut rng, total_cells, mine_count);
        let placed = board.set_mines(picks.into_iter().map(|index| {
            let row = (index / usize::from(columns)) as Coord;
            let col = (index % usize::from(columns)) as Coord;
            (row, col)
        }));

        // double check mine count
        if placed as usize != mine_count {
            log::warn!(
                "Generated board mine count mismatch, actual: {}, requested: {}",
                placed,
                mine_count
            );
        }
        placed
    }
}
