use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use treedb::types::row::Row;

#[derive(Debug, Clone, Copy)]
pub enum KeyOrder {
    Ascending,
    Descending,
    Shuffled,
}

pub struct DataGenerator {
    seed: u64,
}

impl DataGenerator {
    pub fn new() -> Self {
        Self { seed: 42 }
    }

    pub fn generate_row(&self, id: u32) -> Row {
        Row::new(id, format!("user{}", id), format!("person{}@example.com", id))
    }

    /// Ids `1..=count` in the requested order. Shuffling is seeded so runs
    /// are comparable.
    pub fn generate_ids(&self, count: u32, order: KeyOrder) -> Vec<u32> {
        let mut ids: Vec<u32> = (1..=count).collect();
        match order {
            KeyOrder::Ascending => {}
            KeyOrder::Descending => ids.reverse(),
            KeyOrder::Shuffled => {
                let mut rng = StdRng::seed_from_u64(self.seed);
                ids.shuffle(&mut rng);
            }
        }
        ids
    }
}
