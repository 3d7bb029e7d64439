use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tch::Tensor;

/// Approximately normal weights: each value is the sum of three uniform
/// draws on `[-range, range)` (Irwin-Hall with n = 3).
pub struct IrwinHallInit {
    rng: StdRng,
    range: f64,
}

impl IrwinHallInit {
    pub fn new(seed: u64, range: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            range,
        }
    }

    pub fn sample(&mut self) -> f64 {
        (0..3).map(|_| self.uniform()).sum()
    }

    fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>() * 2.0 * self.range - self.range
    }

    /// A `[rows, cols]` double tensor filled in row-major order.
    pub fn matrix(&mut self, rows: i64, cols: i64) -> Tensor {
        let values: Vec<f64> = (0..rows * cols).map(|_| self.sample()).collect();
        Tensor::from_slice(&values).view([rows, cols])
    }
}
