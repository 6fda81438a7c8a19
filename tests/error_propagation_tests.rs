// tests/error_propagation_tests.rs
//! Error propagation and handling tests
//!
//! Checks that module-local errors (filter design, parameter validation,
//! configuration loading) surface as the unified `SsvepError` with the
//! originating context intact.

use ssvep_core::cca::{canonical_correlation, CcaOptions, CoefficientConvention};
use ssvep_core::config::{ConfigError, SsvepConfig};
use ssvep_core::detection::{preprocess, CcaDetector, FrequencyDetector};
use ssvep_core::error::{ErrorContext, ProcessingStage, SsvepError, SsvepErrorBuilder, SsvepResult};
use ssvep_core::filters::FilterSettings;
use ssvep_core::signal::{build_reference_bank, reference_signal, ReferenceBank, SignalMatrix};
use ssvep_core::simulation::{SimulatorConfig, SsvepSimulator};

fn noisy_trial() -> SignalMatrix {
    SsvepSimulator::new(SimulatorConfig::default())
        .unwrap()
        .generate_trial(10.0)
        .unwrap()
}

/// Filter design failures become processing errors at the filtering stage
#[test]
fn test_filter_error_conversion() {
    let settings = FilterSettings {
        order: 12,
        notch_enabled: false,
        ..FilterSettings::default()
    };

    let err = settings.apply(&noisy_trial(), 256.0).unwrap_err();

    match &err {
        SsvepError::Processing { stage, reason, context } => {
            assert_eq!(*stage, ProcessingStage::Filtering);
            assert!(reason.contains("Order must be"), "{}", reason);
            assert_eq!(context.component, "filters");
            assert!(context.file.is_none(), "conversion must not claim a source location");
        }
        _ => panic!("Expected Processing error, got: {:?}", err),
    }

    let display = format!("{}", err);
    assert!(display.contains("PROCESSING"));
    assert!(display.contains("Filtering"));
}

/// Validation failures keep the offending field name
#[test]
fn test_validation_error_conversion() {
    let err = SsvepSimulator::new(SimulatorConfig {
        num_channels: 0,
        ..SimulatorConfig::default()
    })
    .unwrap_err();

    match err {
        SsvepError::InvalidParameter { parameter, .. } => assert_eq!(parameter, "num_channels"),
        other => panic!("Expected InvalidParameter error, got: {:?}", other),
    }

    let err = reference_signal(256.0, 512, 10.0, 0).unwrap_err();
    match err {
        SsvepError::InvalidParameter { parameter, .. } => assert_eq!(parameter, "num_harmonics"),
        other => panic!("Expected InvalidParameter error, got: {:?}", other),
    }
}

/// Configuration loader errors convert into configuration errors
#[test]
fn test_config_error_conversion() {
    fn load() -> SsvepResult<SsvepConfig> {
        let config = ssvep_core::config::ConfigLoader::from_toml_str("[analysis]\nnum_harmonics = 0")?;
        Ok(config)
    }

    match load().unwrap_err() {
        SsvepError::Configuration { component, reason, .. } => {
            assert_eq!(component, "config_loader");
            assert!(reason.contains("Harmonic count"), "{}", reason);
        }
        other => panic!("Expected Configuration error, got: {:?}", other),
    }

    let direct: SsvepError = ConfigError::FileNotFound("ssvep.toml".to_string()).into();
    assert!(format!("{}", direct).contains("ssvep.toml"));
}

/// Shape errors carry the source location of the failing check
#[test]
fn test_error_context_preservation() {
    let trial = noisy_trial();
    let short_reference = reference_signal(256.0, 500, 10.0, 2).unwrap();
    let options = CcaOptions::new(CoefficientConvention::Correlation);

    let err = canonical_correlation(&trial, &short_reference, &options).unwrap_err();

    assert!(err.is_shape_error());
    let context = err.context();
    assert_eq!(context.component, "cca");
    assert_eq!(context.operation, "canonical_correlation");
    assert!(context.file.is_some_and(|f| f.ends_with("cca.rs")));
    assert!(context.line.is_some());

    let display = format!("{}", err);
    assert!(display.contains("512"));
    assert!(display.contains("500"));
}

/// Errors raised deep inside a detector reach the caller unchanged
#[test]
fn test_error_propagation_through_detection() {
    let mut simulator = SsvepSimulator::new(SimulatorConfig::default()).unwrap();
    let (trials, _) = simulator.generate_trials(&[8.0, 12.0], 1).unwrap();
    let bank = build_reference_bank(256.0, 512, &[8.0, 12.0], 2).unwrap();

    let err = CcaDetector::new(CcaOptions::new(CoefficientConvention::Squared))
        .predict(&trials, &[0, 7], &bank)
        .unwrap_err();
    match err {
        SsvepError::InvalidParameter { parameter, reason, .. } => {
            assert_eq!(parameter, "channels");
            assert!(reason.contains('7'));
        }
        other => panic!("Expected InvalidParameter error, got: {:?}", other),
    }

    let mut config = SsvepConfig::default();
    config.filtering.high_cutoff_hz = 200.0;
    let err = preprocess(&trials, &config).unwrap_err();
    assert!(matches!(err, SsvepError::Processing { stage: ProcessingStage::Filtering, .. }));
}

/// A detector that produces no scores fails at the classification stage under its own name
#[test]
fn test_empty_scores_fail_classification() {
    struct Silent;

    impl FrequencyDetector for Silent {
        fn score_trial(&self, _trial: &SignalMatrix, _bank: &ReferenceBank) -> SsvepResult<Vec<f64>> {
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "silent"
        }
    }

    let bank = build_reference_bank(256.0, 512, &[8.0, 12.0], 2).unwrap();
    let err = Silent.predict_trial(&noisy_trial(), &bank).unwrap_err();

    match &err {
        SsvepError::Processing { stage, context, .. } => {
            assert_eq!(*stage, ProcessingStage::Classification);
            assert_eq!(context.component, "silent");
            assert_eq!(context.operation, "predict_trial");
        }
        other => panic!("Expected Processing error, got: {:?}", other),
    }
}

/// Invalid solver options are rejected before any computation
#[test]
fn test_invalid_regularization() {
    let trial = noisy_trial();
    let reference = reference_signal(256.0, 512, 10.0, 2).unwrap();
    let options = CcaOptions::new(CoefficientConvention::Correlation).with_regularization(-1.0);

    match canonical_correlation(&trial, &reference, &options).unwrap_err() {
        SsvepError::InvalidParameter { parameter, .. } => assert_eq!(parameter, "regularization"),
        other => panic!("Expected InvalidParameter error, got: {:?}", other),
    }
}

/// Non-finite samples are an input error, not a numerical warning
#[test]
fn test_non_finite_input() {
    let mut samples = vec![0.5; 64];
    samples[10] = f64::NAN;
    let signal = SignalMatrix::from_channel(&samples).unwrap();
    let reference = reference_signal(64.0, 64, 5.0, 1).unwrap();

    let err = canonical_correlation(&signal, &reference, &CcaOptions::new(CoefficientConvention::Squared))
        .unwrap_err();
    assert!(matches!(err, SsvepError::InvalidParameter { .. }));
}

/// Builder pattern sets component and operation on every variant
#[test]
fn test_error_builder_pattern() {
    let errors = vec![
        SsvepErrorBuilder::new("bank", "build").invalid_shape("4 columns", "3 columns"),
        SsvepErrorBuilder::new("bank", "build").invalid_parameter("frequencies", "empty"),
        SsvepErrorBuilder::new("bank", "build").configuration("no stimulus set"),
        SsvepErrorBuilder::new("bank", "build").processing(ProcessingStage::Covariance, "too few samples"),
    ];

    for err in &errors {
        assert_eq!(err.context().component, "bank");
        assert_eq!(err.context().operation, "build");
        assert!(!format!("{}", err).is_empty());
    }
    assert!(errors[0].is_shape_error());
    assert!(!errors[1].is_shape_error());
}

/// Error context serializes for structured logs
#[test]
fn test_error_context_serialization() {
    let context = ErrorContext::new("fbcca", "sub_band_components").add_info("sub_band", "2");

    let json = serde_json::to_value(&context).unwrap();
    assert_eq!(json["component"], "fbcca");
    assert_eq!(json["operation"], "sub_band_components");
    assert_eq!(json["additional_info"]["sub_band"], "2");
}

/// Errors can cross thread boundaries
#[test]
fn test_error_thread_safety() {
    use std::thread;

    let handles: Vec<_> = (0..4)
        .map(|i| {
            thread::spawn(move || {
                let err = SsvepErrorBuilder::new("worker", "score")
                    .invalid_parameter("trial", &format!("trial {} rejected", i));
                assert_send_sync(&err);
                assert_error_trait(&err);
                err
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let err = handle.join().unwrap();
        assert!(format!("{}", err).contains(&format!("trial {}", i)));
    }
}

fn assert_send_sync<T: Send + Sync>(_value: &T) {}

fn assert_error_trait<T: std::error::Error>(_value: &T) {}
