//! Circuit execution interface.

use async_trait::async_trait;

use qmit_ir::Circuit;

use crate::error::ExecutorResult;

/// Runs a circuit and reports the probability of a designated outcome.
///
/// Implementations measure `shots` repetitions of `circuit` and return the
/// empirical frequency of their target bitstring over the circuit's classical
/// bits. Given the same seed, an implementation must return the same value
/// for the same circuit regardless of call order or concurrency.
///
/// The orchestrator may call `execute` concurrently from one task, so
/// implementations must be `Send + Sync`.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Name used in logs and reports.
    fn name(&self) -> &str;

    /// Execute `circuit` for `shots` repetitions.
    async fn execute(&self, circuit: &Circuit, shots: u32) -> ExecutorResult<f64>;
}

/// Adapts a synchronous closure into an [`Executor`].
///
/// ```
/// use qmit_mitigate::{Executor, FnExecutor};
/// use qmit_ir::Circuit;
///
/// # tokio_test_block(async {
/// let exec = FnExecutor::new("constant", |_c: &Circuit, _shots| Ok(0.5));
/// let p = exec.execute(&Circuit::bell().unwrap(), 100).await.unwrap();
/// assert_eq!(p, 0.5);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub struct FnExecutor<F> {
    name: String,
    f: F,
}

impl<F> FnExecutor<F>
where
    F: Fn(&Circuit, u32) -> ExecutorResult<f64> + Send + Sync,
{
    /// Wrap `f` under the given name.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

#[async_trait]
impl<F> Executor for FnExecutor<F>
where
    F: Fn(&Circuit, u32) -> ExecutorResult<f64> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, circuit: &Circuit, shots: u32) -> ExecutorResult<f64> {
        (self.f)(circuit, shots)
    }
}
