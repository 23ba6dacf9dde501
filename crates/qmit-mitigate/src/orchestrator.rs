//! RAW, DD, ZNE and HYBRID estimates from one base circuit.
//!
//! A run first builds every transformed circuit, then executes them and
//! finally fits the two extrapolations:
//!
//! ```text
//! base ──────────────┬──────────────────────────► RAW
//!   │                └─ fold(s) ───────────────► ZNE    = fit[(1, RAW), (s, ·)]
//!   └─ decouple ─────┬──────────────────────────► DD
//!                    └─ fold(s) ───────────────► HYBRID = fit[(1, DD),  (s, ·)]
//! ```
//!
//! The hybrid branch folds the decoupled circuit, pulses included. Padding is
//! never recomputed on a folded circuit.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use qmit_compile::{CompileError, PassManagerBuilder, PropertySet, ScaleFactor, Schedule};
use qmit_ir::Circuit;

use crate::config::{Dispatch, MitigationConfig};
use crate::error::{ExecutorError, MitigationError, QmitResult};
use crate::executor::Executor;
use crate::extrapolate::{Estimate, OutOfRangeWarning, extrapolate};
use crate::stage::{CircuitRole, Stage};

/// Cooperative cancellation flag shared between a run and its caller.
///
/// Cancelling stops further stages from being dispatched; executions already
/// in flight are allowed to finish.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// An out-of-range estimate, tagged with the stage that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MitigationWarning {
    /// ZNE or HYBRID.
    pub stage: Stage,
    /// The warning raised by the extrapolator.
    pub warning: OutOfRangeWarning,
}

impl std::fmt::Display for MitigationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.stage, self.warning)
    }
}

/// The four estimates of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationResult {
    /// Probability measured on the base circuit.
    pub raw: f64,
    /// Zero-noise estimate from folding the base circuit.
    pub zne: f64,
    /// Probability measured on the decoupled circuit.
    pub dd: f64,
    /// Zero-noise estimate from folding the decoupled circuit.
    pub hybrid: f64,
    /// Non-fatal warnings, in stage order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<MitigationWarning>,
}

impl MitigationResult {
    /// Value of one stage.
    pub fn get(&self, stage: Stage) -> f64 {
        match stage {
            Stage::Raw => self.raw,
            Stage::Dd => self.dd,
            Stage::Zne => self.zne,
            Stage::Hybrid => self.hybrid,
        }
    }
}

/// One executor call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Circuit that was executed.
    pub role: CircuitRole,
    /// Stage that dispatched it.
    pub stage: Stage,
    /// Noise-scale factor of the circuit.
    pub scale: u32,
    /// Returned probability.
    pub probability: f64,
    /// Instruction count of the executed circuit.
    pub num_instructions: usize,
    /// Wall-clock time of the call.
    pub elapsed_ms: u64,
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationRun {
    /// The four estimates.
    pub result: MitigationResult,
    /// Fit behind `result.zne`.
    pub zne: Estimate,
    /// Fit behind `result.hybrid`.
    pub hybrid: Estimate,
    /// Every executor call, in stage order.
    pub executions: Vec<ExecutionRecord>,
}

/// A circuit waiting to be executed.
#[derive(Debug, Clone)]
struct Job {
    role: CircuitRole,
    circuit: Circuit,
}

/// Runs the mitigation pipeline against one executor.
///
/// ```no_run
/// use std::sync::Arc;
/// use qmit_ir::Circuit;
/// use qmit_mitigate::{FnExecutor, MitigationConfig, Mitigator};
///
/// # async fn demo() -> qmit_mitigate::QmitResult<()> {
/// let executor = Arc::new(FnExecutor::new("stub", |_c: &Circuit, _shots| Ok(0.8)));
/// let mitigator = Mitigator::new(executor, MitigationConfig::default());
/// let run = mitigator.run(&Circuit::ghz(3).unwrap()).await?;
/// println!("hybrid estimate: {}", run.result.hybrid);
/// # Ok(())
/// # }
/// ```
pub struct Mitigator {
    executor: Arc<dyn Executor>,
    config: MitigationConfig,
    cancel: CancelToken,
}

impl Mitigator {
    /// Create a mitigator with a fresh cancellation token.
    pub fn new(executor: Arc<dyn Executor>, config: MitigationConfig) -> Self {
        Self {
            executor,
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Use an externally owned cancellation token.
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that cancels runs of this mitigator.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The configuration.
    pub fn config(&self) -> &MitigationConfig {
        &self.config
    }

    /// The executor.
    pub fn executor(&self) -> &dyn Executor {
        self.executor.as_ref()
    }

    /// Run all four stages on `base`.
    pub async fn run(&self, base: &Circuit) -> QmitResult<MitigationRun> {
        run_with_cancel(base, self.executor.as_ref(), &self.config, &self.cancel).await
    }
}

/// Run all four stages on `base` and return the estimates.
pub async fn run(
    base: &Circuit,
    executor: &dyn Executor,
    config: &MitigationConfig,
) -> QmitResult<MitigationResult> {
    run_with_cancel(base, executor, config, &CancelToken::new())
        .await
        .map(|run| run.result)
}

/// Run all four stages on `base`, honouring `cancel` between stages.
#[instrument(skip_all, fields(circuit = base.name(), executor = executor.name()))]
pub async fn run_with_cancel(
    base: &Circuit,
    executor: &dyn Executor,
    config: &MitigationConfig,
    cancel: &CancelToken,
) -> QmitResult<MitigationRun> {
    config.validate()?;

    let jobs = plan(base, config)?;
    info!(
        "Mitigating '{}' on '{}': {} executions, {:?} dispatch",
        base.name(),
        executor.name(),
        jobs.len(),
        config.dispatch
    );

    let timeout = config.timeout();
    let executions = match config.dispatch {
        Dispatch::Concurrent => {
            if cancel.is_cancelled() {
                return Err(MitigationError::Cancelled { stage: Stage::Raw });
            }
            try_join_all(
                jobs.iter()
                    .map(|job| execute_job(executor, job, config.shots, timeout)),
            )
            .await?
        }
        Dispatch::Sequential => {
            let mut records = Vec::with_capacity(jobs.len());
            for stage in Stage::ALL {
                if cancel.is_cancelled() {
                    return Err(MitigationError::Cancelled { stage });
                }
                info!("Dispatching {stage} stage");
                for job in jobs.iter().filter(|j| j.role.stage() == stage) {
                    records.push(execute_job(executor, job, config.shots, timeout).await?);
                }
            }
            records
        }
    };

    let (result, zne, hybrid) = combine(&executions)?;
    info!(
        "Mitigation complete: raw={:.4} dd={:.4} zne={:.4} hybrid={:.4}",
        result.raw, result.dd, result.zne, result.hybrid
    );

    Ok(MitigationRun {
        result,
        zne,
        hybrid,
        executions,
    })
}

fn transform(stage: Stage) -> impl FnOnce(CompileError) -> MitigationError {
    move |source| MitigationError::Transform { stage, source }
}

/// Build every circuit the run will execute, in stage order.
fn plan(base: &Circuit, config: &MitigationConfig) -> QmitResult<Vec<Job>> {
    let (pm, mut props) = PassManagerBuilder::new()
        .with_durations(config.durations.clone())
        .with_decoupling(config.pulse_sequence.clone())
        .build();
    let mut decoupled = base.clone();
    pm.run(&mut decoupled, &mut props)
        .map_err(transform(Stage::Dd))?;
    if let Some(schedule) = props.get::<Schedule>() {
        debug!(
            "Decoupled circuit: duration {}, {} idle windows totalling {}",
            schedule.total_duration,
            schedule.idle.len(),
            schedule.total_idle()
        );
    }
    info!(
        "Inserted {} pulses with '{}'",
        decoupled.len() - base.len(),
        config.pulse_sequence.name()
    );

    let mut folded = Vec::new();
    let mut folded_decoupled = Vec::new();
    for scale in config.folded_scales() {
        let factor = ScaleFactor::new(scale).map_err(transform(Stage::Zne))?;
        let (pm, _) = PassManagerBuilder::new()
            .with_folding_policy(factor, config.fold_policy)
            .build();

        let mut circuit = base.clone();
        pm.run(&mut circuit, &mut PropertySet::new())
            .map_err(transform(Stage::Zne))?;
        folded.push(Job {
            role: CircuitRole::Folded(scale),
            circuit,
        });

        let mut circuit = decoupled.clone();
        pm.run(&mut circuit, &mut PropertySet::new())
            .map_err(transform(Stage::Hybrid))?;
        folded_decoupled.push(Job {
            role: CircuitRole::FoldedDecoupled(scale),
            circuit,
        });
    }

    let mut jobs = vec![
        Job {
            role: CircuitRole::Base,
            circuit: base.clone(),
        },
        Job {
            role: CircuitRole::Decoupled,
            circuit: decoupled,
        },
    ];
    jobs.extend(folded);
    jobs.extend(folded_decoupled);
    Ok(jobs)
}

async fn execute_job(
    executor: &dyn Executor,
    job: &Job,
    shots: u32,
    timeout: Option<Duration>,
) -> QmitResult<ExecutionRecord> {
    let role = job.role;
    let stage = role.stage();
    let started = Instant::now();

    let call = executor.execute(&job.circuit, shots);
    let outcome = match timeout {
        Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
            MitigationError::ExecutionTimeout {
                stage,
                role,
                timeout: limit,
            }
        })?,
        None => call.await,
    };
    let probability = outcome.map_err(|source| MitigationError::Execution {
        stage,
        role,
        source,
    })?;
    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        return Err(MitigationError::Execution {
            stage,
            role,
            source: ExecutorError::InvalidProbability(probability),
        });
    }

    let elapsed_ms = started.elapsed().as_millis().try_into().unwrap_or(u64::MAX);
    debug!("{stage}: {role} circuit returned {probability:.4} in {elapsed_ms} ms");
    Ok(ExecutionRecord {
        role,
        stage,
        scale: role.scale(),
        probability,
        num_instructions: job.circuit.len(),
        elapsed_ms,
    })
}

/// Fit both extrapolations from the recorded executions.
fn combine(executions: &[ExecutionRecord]) -> QmitResult<(MitigationResult, Estimate, Estimate)> {
    let mut raw = f64::NAN;
    let mut dd = f64::NAN;
    let mut zne_tail = Vec::new();
    let mut hybrid_tail = Vec::new();
    for record in executions {
        match record.role {
            CircuitRole::Base => raw = record.probability,
            CircuitRole::Decoupled => dd = record.probability,
            CircuitRole::Folded(s) => zne_tail.push((f64::from(s), record.probability)),
            CircuitRole::FoldedDecoupled(s) => {
                hybrid_tail.push((f64::from(s), record.probability));
            }
        }
    }

    let fit = |stage: Stage, anchor: f64, tail: Vec<(f64, f64)>| {
        let mut points = Vec::with_capacity(tail.len() + 1);
        points.push((1.0, anchor));
        points.extend(tail);
        extrapolate(&points).map_err(|source| MitigationError::Extrapolation { stage, source })
    };
    let zne = fit(Stage::Zne, raw, zne_tail)?;
    let hybrid = fit(Stage::Hybrid, dd, hybrid_tail)?;

    let warnings: Vec<MitigationWarning> = [(Stage::Zne, &zne), (Stage::Hybrid, &hybrid)]
        .into_iter()
        .filter_map(|(stage, est)| est.warning.map(|warning| MitigationWarning { stage, warning }))
        .collect();
    for w in &warnings {
        warn!("{w}");
    }

    let result = MitigationResult {
        raw,
        zne: zne.value,
        dd,
        hybrid: hybrid.value,
        warnings,
    };
    Ok((result, zne, hybrid))
}
