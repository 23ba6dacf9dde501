//! Pass manager for running transform pipelines.

use tracing::{debug, info, instrument};

use qmit_ir::Circuit;

use crate::durations::DurationTable;
use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::{
    AlapScheduleAnalysis, FoldPolicy, PadDynamicalDecoupling, ScaleFactor, UnitaryFolding,
};
use crate::property::PropertySet;
use crate::pulse::PulseSequence;

/// Manages and executes a sequence of passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given circuit.
    #[instrument(skip(self, circuit, properties), fields(circuit = circuit.name()))]
    pub fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            circuit.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(circuit, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(circuit, properties)?;
                debug!("Pass {} completed, ops: {}", pass.name(), circuit.len());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, depth: {}, ops: {}",
            circuit.depth(),
            circuit.len()
        );

        Ok(())
    }

    /// Names of the configured passes, in order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for mitigation pipelines.
///
/// Decoupling, when configured, always runs before folding: padding is
/// computed on the unscaled circuit and the padded circuit, pulses included,
/// is then folded. When a duration table is present the pipeline ends with an
/// [`AlapScheduleAnalysis`] of the final circuit.
///
/// ```
/// use qmit_compile::{DurationTable, PassManagerBuilder, PulseSequence, ScaleFactor};
/// use qmit_ir::Circuit;
///
/// let (pm, mut props) = PassManagerBuilder::new()
///     .with_durations(DurationTable::ibm_eagle())
///     .with_decoupling(PulseSequence::Xx)
///     .with_folding(ScaleFactor::new(3).unwrap())
///     .build();
/// assert_eq!(
///     pm.pass_names(),
///     vec!["pad_dynamical_decoupling", "unitary_folding", "alap_schedule_analysis"]
/// );
///
/// let mut circuit = Circuit::bell().unwrap();
/// pm.run(&mut circuit, &mut props).unwrap();
/// ```
pub struct PassManagerBuilder {
    decoupling: Option<PulseSequence>,
    folding: Option<(ScaleFactor, FoldPolicy)>,
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with no passes configured.
    pub fn new() -> Self {
        Self {
            decoupling: None,
            folding: None,
            properties: PropertySet::new(),
        }
    }

    /// Set the device duration table.
    #[must_use]
    pub fn with_durations(mut self, durations: DurationTable) -> Self {
        self.properties.durations = Some(durations);
        self
    }

    /// Set the starting property set.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// Pad idle windows with `sequence`.
    #[must_use]
    pub fn with_decoupling(mut self, sequence: PulseSequence) -> Self {
        self.decoupling = Some(sequence);
        self
    }

    /// Fold to `scale` with exact folding.
    #[must_use]
    pub fn with_folding(self, scale: ScaleFactor) -> Self {
        self.with_folding_policy(scale, FoldPolicy::Exact)
    }

    /// Fold to `scale` with the given policy.
    #[must_use]
    pub fn with_folding_policy(mut self, scale: ScaleFactor, policy: FoldPolicy) -> Self {
        self.folding = Some((scale, policy));
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();

        if let Some(sequence) = self.decoupling {
            pm.add_pass(PadDynamicalDecoupling::new(sequence));
        }

        if let Some((scale, policy)) = self.folding {
            pm.add_pass(UnitaryFolding::new(scale).with_policy(policy));
        }

        if self.properties.durations.is_some() {
            pm.add_pass(AlapScheduleAnalysis);
        }

        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::{Schedule, fold, insert_decoupling};
    use qmit_ir::{ClbitId, QubitId};

    fn staggered() -> Circuit {
        let mut c = Circuit::with_size("staggered", 2, 2);
        for _ in 0..3 {
            c.x(QubitId(0)).unwrap();
        }
        c.cx(QubitId(0), QubitId(1)).unwrap();
        c.measure(QubitId(0), ClbitId(0)).unwrap();
        c.measure(QubitId(1), ClbitId(1)).unwrap();
        c
    }

    fn table() -> DurationTable {
        DurationTable::new()
            .with_gate("x", 50)
            .with_gate("cx", 300)
            .with_gate("measure", 500)
    }

    #[test]
    fn test_empty_pass_manager() {
        let pm = PassManager::new();
        assert!(pm.is_empty());
        let mut c = staggered();
        pm.run(&mut c, &mut PropertySet::new()).unwrap();
        assert_eq!(c, staggered());
    }

    #[test]
    fn test_builder_without_durations_skips_analysis() {
        let (pm, props) = PassManagerBuilder::new()
            .with_folding(ScaleFactor::new(5).unwrap())
            .build();
        assert_eq!(pm.pass_names(), vec!["unitary_folding"]);
        assert!(props.durations.is_none());
    }

    #[test]
    fn test_pipeline_matches_fold_of_padded() {
        let base = staggered();
        let (pm, mut props) = PassManagerBuilder::new()
            .with_durations(table())
            .with_decoupling(PulseSequence::Xx)
            .with_folding(ScaleFactor::new(3).unwrap())
            .build();

        let mut piped = base.clone();
        pm.run(&mut piped, &mut props).unwrap();

        let expected = fold(&insert_decoupling(&base, &PulseSequence::Xx, &table()).unwrap(), 3)
            .unwrap();
        assert_eq!(piped, expected);
        assert_eq!(piped.num_unitary_ops(), 18);

        let schedule = props.get::<Schedule>().unwrap();
        assert_eq!(schedule.entries.len(), piped.len());
    }

    #[test]
    fn test_decoupling_without_durations_fails() {
        let (pm, mut props) = PassManagerBuilder::new()
            .with_decoupling(PulseSequence::Xx)
            .build();
        let mut c = staggered();
        assert!(pm.run(&mut c, &mut props).is_err());
    }
}
