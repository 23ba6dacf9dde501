//! Ideal executor backed by the statevector engine.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;
use tracing::{debug, instrument};

use qmit_ir::Circuit;
use qmit_mitigate::{Executor, ExecutorError, ExecutorResult, MitigationConfig};

use crate::statevector::outcome_probability;

/// Executes circuits without noise.
///
/// In exact mode the returned value is the true outcome probability, as if
/// infinitely many shots were taken. With a seed, `shots` samples are drawn
/// from a generator seeded afresh on every call from the configured seed
/// mixed with the circuit's instruction and unitary counts. The same circuit
/// always yields the same estimate regardless of call order, while the
/// folded and padded variants of one run draw independent streams.
#[derive(Debug, Clone)]
pub struct IdealExecutor {
    target: Option<String>,
    seed: Option<u64>,
    max_qubits: u32,
}

impl IdealExecutor {
    /// Exact executor targeting the all-ones outcome.
    pub fn new() -> Self {
        Self {
            target: None,
            seed: None,
            max_qubits: 20,
        }
    }

    /// Executor using the target and seed of `config`.
    pub fn from_config(config: &MitigationConfig) -> Self {
        Self {
            target: config.target.clone(),
            seed: config.seed,
            ..Self::new()
        }
    }

    /// Set the target outcome, highest classical bit first.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Sample with the given seed instead of returning exact probabilities.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the largest circuit accepted.
    #[must_use]
    pub fn with_max_qubits(mut self, max_qubits: u32) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Run synchronously.
    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    pub fn probability(&self, circuit: &Circuit, shots: u32) -> ExecutorResult<f64> {
        if shots == 0 {
            return Err(ExecutorError::InvalidShots(shots));
        }
        if circuit.num_qubits() > self.max_qubits {
            return Err(ExecutorError::InvalidCircuit(format!(
                "{} qubits exceeds the simulator limit of {}",
                circuit.num_qubits(),
                self.max_qubits
            )));
        }

        let start = Instant::now();
        let all_ones;
        let target = match &self.target {
            Some(t) => t.as_str(),
            None => {
                all_ones = "1".repeat(circuit.num_clbits() as usize);
                all_ones.as_str()
            }
        };
        let exact = outcome_probability(circuit, target)?;

        let p = match self.seed {
            None => exact,
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(circuit_seed(seed, circuit));
                let hits = (0..shots).filter(|_| rng.r#gen::<f64>() < exact).count();
                hits as f64 / f64::from(shots)
            }
        };

        debug!(
            "Simulated {} instructions for '{}': p = {:.4} in {:?}",
            circuit.len(),
            target,
            p,
            start.elapsed()
        );
        Ok(p)
    }
}

/// Derive the sampling seed for one circuit.
fn circuit_seed(seed: u64, circuit: &Circuit) -> u64 {
    const GOLDEN: u64 = 0x9e37_79b9_7f4a_7c15;
    let mut z = seed
        ^ (circuit.len() as u64).wrapping_mul(GOLDEN)
        ^ (circuit.num_unitary_ops() as u64).rotate_left(32);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

impl Default for IdealExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Executor for IdealExecutor {
    fn name(&self) -> &str {
        "ideal-statevector"
    }

    async fn execute(&self, circuit: &Circuit, shots: u32) -> ExecutorResult<f64> {
        self.probability(circuit, shots)
    }
}
