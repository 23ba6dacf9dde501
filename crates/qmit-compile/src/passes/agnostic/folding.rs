//! Unitary folding for noise scaling.
//!
//! Folding replaces every gate `U` with `U (U⁻¹ U)^k`, which leaves the ideal
//! action of the circuit unchanged while multiplying the gate count (and so,
//! to first order, the accumulated gate noise) by `2k + 1`. Barriers and
//! measurements are copied through untouched.

use serde::{Deserialize, Serialize};
use tracing::debug;

use qmit_ir::Circuit;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// How folded copies of a gate are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoldPolicy {
    /// `U (U⁻¹ U)^k` with the true inverse. Works for any gate.
    #[default]
    Exact,
    /// `U^scale`. Only valid when every gate is self-inverse; any other gate
    /// is rejected with [`CompileError::NotSelfInverse`].
    Local,
}

/// An odd noise-scale factor ≥ 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ScaleFactor(u32);

impl ScaleFactor {
    /// The unscaled factor.
    pub const ONE: ScaleFactor = ScaleFactor(1);

    /// Validate a raw scale factor.
    pub fn new(scale: u32) -> CompileResult<Self> {
        if scale == 0 || scale % 2 == 0 {
            return Err(CompileError::InvalidScale(scale));
        }
        Ok(Self(scale))
    }

    /// The factor as an integer.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Number of `(U⁻¹, U)` pairs appended after each gate.
    pub fn folds(self) -> u32 {
        (self.0 - 1) / 2
    }
}

impl TryFrom<u32> for ScaleFactor {
    type Error = CompileError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ScaleFactor> for u32 {
    fn from(scale: ScaleFactor) -> Self {
        scale.0
    }
}

impl std::fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fold `circuit` to noise scale `scale` using exact folding.
///
/// ```
/// use qmit_compile::fold;
/// use qmit_ir::Circuit;
///
/// let bell = Circuit::bell().unwrap();
/// let folded = fold(&bell, 3).unwrap();
/// assert_eq!(folded.num_unitary_ops(), 3 * bell.num_unitary_ops());
/// assert!(fold(&bell, 2).is_err());
/// ```
pub fn fold(circuit: &Circuit, scale: u32) -> CompileResult<Circuit> {
    fold_with_policy(circuit, ScaleFactor::new(scale)?, FoldPolicy::Exact)
}

/// Fold `circuit` to `scale` with the given policy.
pub fn fold_with_policy(
    circuit: &Circuit,
    scale: ScaleFactor,
    policy: FoldPolicy,
) -> CompileResult<Circuit> {
    let mut out = Circuit::empty_like(circuit);
    if scale == ScaleFactor::ONE {
        for inst in circuit.instructions() {
            out.push(inst.clone())?;
        }
        return Ok(out);
    }

    for (index, inst) in circuit.instructions().iter().enumerate() {
        let Some(inverse) = inst.inverse() else {
            out.push(inst.clone())?;
            continue;
        };

        match policy {
            FoldPolicy::Exact => {
                out.push(inst.clone())?;
                for _ in 0..scale.folds() {
                    out.push(inverse.clone())?;
                    out.push(inst.clone())?;
                }
            }
            FoldPolicy::Local => {
                if !inst.is_self_inverse() {
                    return Err(CompileError::NotSelfInverse {
                        gate: inst.name().to_string(),
                        index,
                    });
                }
                for _ in 0..scale.get() {
                    out.push(inst.clone())?;
                }
            }
        }
    }

    debug!(
        "Folded '{}' at scale {}: {} -> {} instructions",
        circuit.name(),
        scale,
        circuit.len(),
        out.len()
    );
    Ok(out)
}

/// Transformation pass wrapping [`fold_with_policy`].
#[derive(Debug, Clone, Copy)]
pub struct UnitaryFolding {
    scale: ScaleFactor,
    policy: FoldPolicy,
}

impl UnitaryFolding {
    /// Exact folding at `scale`.
    pub fn new(scale: ScaleFactor) -> Self {
        Self {
            scale,
            policy: FoldPolicy::Exact,
        }
    }

    /// Use a different folding policy.
    #[must_use]
    pub fn with_policy(mut self, policy: FoldPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Pass for UnitaryFolding {
    fn name(&self) -> &'static str {
        "unitary_folding"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, _properties: &mut PropertySet) -> CompileResult<()> {
        *circuit = fold_with_policy(circuit, self.scale, self.policy)?;
        Ok(())
    }

    fn should_run(&self, _circuit: &Circuit, _properties: &PropertySet) -> bool {
        self.scale != ScaleFactor::ONE
    }
}
