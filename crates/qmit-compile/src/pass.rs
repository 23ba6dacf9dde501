//! Pass trait and types for circuit transforms.

use qmit_ir::Circuit;

use crate::error::CompileResult;
use crate::property::PropertySet;

/// The kind of pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Reads the circuit and writes to the `PropertySet`.
    Analysis,
    /// Replaces the circuit with a transformed one.
    Transformation,
}

/// A pass over a circuit.
///
/// Transformation passes replace `circuit` with a freshly built circuit; the
/// free functions they wrap ([`fold`](crate::fold),
/// [`insert_decoupling`](crate::insert_decoupling)) never mutate their input.
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Get the kind of this pass.
    fn kind(&self) -> PassKind;

    /// Run the pass.
    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()>;

    /// Check if this pass should run based on current state.
    fn should_run(&self, _circuit: &Circuit, _properties: &PropertySet) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestPass;

    impl Pass for TestPass {
        fn name(&self) -> &'static str {
            "test"
        }

        fn kind(&self) -> PassKind {
            PassKind::Analysis
        }

        fn run(&self, _circuit: &mut Circuit, _properties: &mut PropertySet) -> CompileResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_pass_kind() {
        let pass = TestPass;
        assert_eq!(pass.kind(), PassKind::Analysis);
        assert_eq!(pass.name(), "test");
        assert!(pass.should_run(&Circuit::new("c"), &PropertySet::new()));
    }
}
