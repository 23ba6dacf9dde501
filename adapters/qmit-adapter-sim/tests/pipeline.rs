//! The mitigation pipeline on the ideal executor.

use std::sync::Arc;

use qmit_adapter_sim::IdealExecutor;
use qmit_compile::PulseSequence;
use qmit_ir::Circuit;
use qmit_mitigate::{Dispatch, MitigationConfig, Mitigator, Stage, run};

#[tokio::test]
async fn test_grover_all_stages_agree_without_noise() {
    let config = MitigationConfig::default();
    let result = run(&Circuit::grover3().unwrap(), &IdealExecutor::new(), &config)
        .await
        .unwrap();
    for stage in Stage::ALL {
        assert!(
            (result.get(stage) - 0.78125).abs() < 1e-9,
            "{stage}: {}",
            result.get(stage)
        );
    }
    assert!(result.warnings.is_empty());
}

#[tokio::test]
async fn test_grover_multi_scale_xy4() {
    let config = MitigationConfig::default()
        .with_scale_factors([1, 3, 5])
        .with_pulse_sequence(PulseSequence::Xy4)
        .with_dispatch(Dispatch::Sequential);
    let outcome = Mitigator::new(Arc::new(IdealExecutor::new()), config)
        .run(&Circuit::grover3().unwrap())
        .await
        .unwrap();
    assert_eq!(outcome.executions.len(), 6);
    assert!((outcome.result.hybrid - 0.78125).abs() < 1e-9);
    assert!((outcome.result.zne - 0.78125).abs() < 1e-9);
}

#[tokio::test]
async fn test_seeded_runs_reproduce() {
    let config = MitigationConfig::default().with_seed(2024).with_shots(1000);
    let executor = IdealExecutor::from_config(&config);
    let circuit = Circuit::ghz(3).unwrap();
    let a = run(&circuit, &executor, &config).await.unwrap();
    let b = run(&circuit, &executor, &config).await.unwrap();
    assert_eq!(a, b);
    assert!((a.raw - 0.5).abs() < 0.1);
}
