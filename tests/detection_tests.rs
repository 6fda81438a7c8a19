// tests/detection_tests.rs
//! End-to-end detection on simulated SSVEP trials

use ssvep_core::cca::{CcaOptions, CoefficientConvention};
use ssvep_core::config::SsvepConfig;
use ssvep_core::detection::{
    accuracy_percent, best_point, extract_features, preprocess, CcaDetector, FbccaDetector, FoccaDetector,
    FrequencyDetector, MsiDetector, WeightSweep,
};
use ssvep_core::filters::FilterSettings;
use ssvep_core::signal::{ReferenceBank, TrialSet};
use ssvep_core::simulation::{SimulatorConfig, SsvepSimulator};

const ALL_CHANNELS: [usize; 4] = [0, 1, 2, 3];

fn simulated_session(noise_std: f64, trials_per_frequency: usize) -> (SsvepConfig, TrialSet, Vec<usize>, ReferenceBank) {
    let config = SsvepConfig::default();
    let mut simulator = SsvepSimulator::new(SimulatorConfig {
        noise_std,
        ..SimulatorConfig::default()
    })
    .unwrap();

    let (trials, labels) = simulator
        .generate_trials(&config.analysis.stimulus_frequencies_hz, trials_per_frequency)
        .unwrap();
    let bank = config.reference_bank(trials.num_samples()).unwrap();
    (config, trials, labels, bank)
}

fn accuracy_of(detector: &dyn FrequencyDetector, trials: &TrialSet, labels: &[usize], bank: &ReferenceBank) -> f64 {
    let predictions = detector.predict(trials, &ALL_CHANNELS, bank).unwrap();
    assert_eq!(predictions.len(), labels.len());
    accuracy_percent(labels, &predictions).unwrap()
}

#[test]
fn every_detector_classifies_clean_trials() {
    let (config, trials, labels, bank) = simulated_session(0.4, 3);

    let detectors: Vec<Box<dyn FrequencyDetector>> = vec![
        Box::new(CcaDetector::new(config.cca_options())),
        Box::new(FoccaDetector::from_config(&config)),
        Box::new(FbccaDetector::from_config(&config)),
        Box::new(MsiDetector::default()),
    ];

    for detector in &detectors {
        let accuracy = accuracy_of(detector.as_ref(), &trials, &labels, &bank);
        assert!(accuracy >= 90.0, "{} reached only {}%", detector.name(), accuracy);
    }
}

#[test]
fn scores_follow_bank_order() {
    let (config, trials, _, bank) = simulated_session(0.3, 1);
    let detector = CcaDetector::new(config.cca_options());

    // Second trial is driven at the second bank frequency
    let trial = trials.trial_channels(1, &ALL_CHANNELS).unwrap();
    let scores = detector.score_trial(&trial, &bank).unwrap();

    assert_eq!(scores.len(), bank.len());
    assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
    assert_eq!(detector.predict_trial(&trial, &bank).unwrap(), 1);
}

#[test]
fn squared_convention_does_not_change_cca_decisions() {
    let (_, trials, _, bank) = simulated_session(0.5, 2);

    let rho = CcaDetector::new(CcaOptions::new(CoefficientConvention::Correlation));
    let rho_squared = CcaDetector::new(CcaOptions::new(CoefficientConvention::Squared));

    assert_eq!(
        rho.predict(&trials, &ALL_CHANNELS, &bank).unwrap(),
        rho_squared.predict(&trials, &ALL_CHANNELS, &bank).unwrap()
    );
}

#[test]
fn single_channel_selection_still_detects() {
    let (config, trials, labels, bank) = simulated_session(0.2, 2);
    let detector = CcaDetector::new(config.cca_options());

    let predictions = detector.predict(&trials, &config.analysis.channels, &bank).unwrap();
    assert!(accuracy_percent(&labels, &predictions).unwrap() >= 90.0);
}

#[test]
fn bank_length_must_match_trials() {
    let (config, trials, _, _) = simulated_session(0.5, 1);
    let short_bank = config.reference_bank(trials.num_samples() - 1).unwrap();

    let err = CcaDetector::new(config.cca_options())
        .predict(&trials, &ALL_CHANNELS, &short_bank)
        .unwrap_err();
    assert!(err.is_shape_error());
}

#[test]
fn out_of_range_channel_is_rejected() {
    let (config, trials, _, bank) = simulated_session(0.5, 1);
    let result = MsiDetector::default().predict(&trials, &[0, 9], &bank);
    assert!(result.is_err());

    let result = FoccaDetector::from_config(&config).predict(&trials, &[], &bank);
    assert!(result.is_err());
}

#[test]
fn feature_matrix_holds_every_coefficient() {
    let (config, trials, labels, bank) = simulated_session(0.3, 2);

    let features = extract_features(&trials, &ALL_CHANNELS, &bank, &config.cca_options()).unwrap();

    // 4 channels vs 4 reference columns: 4 coefficients per frequency
    assert_eq!(features.dim(), (trials.num_trials(), 4 * bank.len()));
    assert!(features.iter().all(|v| (0.0..=1.0).contains(v)));

    // First coefficient of the driven frequency dominates its row
    for (row, &label) in features.rows().into_iter().zip(&labels) {
        let leading: Vec<f64> = (0..bank.len()).map(|f| row[f * 4]).collect();
        let best = leading.iter().cloned().fold(f64::MIN, f64::max);
        assert_eq!(leading[label], best);
    }
}

#[test]
fn fusion_sweep_covers_grid() {
    let (config, trials, labels, bank) = simulated_session(0.5, 2);

    let points = WeightSweep::fusion(&config)
        .run(&trials, &labels, &ALL_CHANNELS, &bank)
        .unwrap();

    assert_eq!(points.len(), 20);
    assert!(points.iter().all(|p| (0.0..=100.0).contains(&p.accuracy_percent)));
    assert_eq!((points[0].a, points[0].b), (0.0, 0.0));
    assert_eq!((points[19].a, points[19].b), (1.5, 1.0));

    let best = best_point(&points).unwrap();
    assert!(points.iter().all(|p| p.accuracy_percent <= best.accuracy_percent));
}

#[test]
fn filter_bank_sweep_matches_direct_detector() {
    let (config, trials, labels, bank) = simulated_session(0.5, 1);
    let sweep = WeightSweep::new(
        ssvep_core::detection::SweepMethod::FilterBank {
            filter: config.filtering.clone(),
            sub_bands_hz: config.filter_bank.sub_bands_hz.clone(),
            sampling_rate_hz: config.analysis.sampling_rate_hz,
        },
        config.cca_options(),
        vec![1.25],
        vec![0.25],
    );

    let points = sweep.run(&trials, &labels, &ALL_CHANNELS, &bank).unwrap();
    let direct = FbccaDetector::from_config(&config).with_weights(1.25, 0.25);
    let predictions = direct.predict(&trials, &ALL_CHANNELS, &bank).unwrap();

    assert_eq!(points.len(), 1);
    assert_eq!(points[0].accuracy_percent, accuracy_percent(&labels, &predictions).unwrap());
}

#[test]
fn preprocessing_removes_powerline_interference() {
    let mut config = SsvepConfig::default();
    let mut simulator = SsvepSimulator::new(SimulatorConfig {
        noise_std: 0.3,
        powerline_amplitude: 3.0,
        ..SimulatorConfig::default()
    })
    .unwrap();
    let (trials, labels) = simulator
        .generate_trials(&config.analysis.stimulus_frequencies_hz, 2)
        .unwrap();
    let bank = config.reference_bank(trials.num_samples()).unwrap();
    let detector = CcaDetector::new(config.cca_options());

    let cleaned = preprocess(&trials, &config).unwrap();
    assert_eq!(cleaned.num_trials(), trials.num_trials());
    assert_eq!(cleaned.num_samples(), trials.num_samples());
    assert!(accuracy_of(&detector, &cleaned, &labels, &bank) >= 90.0);

    // Disabled filtering leaves the trials untouched
    config.filtering = FilterSettings::disabled();
    assert_eq!(preprocess(&trials, &config).unwrap(), trials);
}

#[test]
fn preprocessing_applies_common_average_reference() {
    let mut config = SsvepConfig::default();
    config.filtering = FilterSettings::disabled();
    config.analysis.common_average_reference = true;

    let (_, trials, _, _) = simulated_session(0.5, 1);
    let referenced = preprocess(&trials, &config).unwrap();

    for idx in 0..referenced.num_trials() {
        let trial = referenced.trial(idx).unwrap();
        for row in trial.view().rows() {
            assert!(row.sum().abs() < 1e-9);
        }
    }

    config.analysis.car_reference_channel = Some(0);
    let referenced = preprocess(&trials, &config).unwrap();
    let original = trials.trial(0).unwrap();
    let rereferenced = referenced.trial(0).unwrap();
    assert_eq!(rereferenced.channel(0), original.channel(0));
    let expected = &original.view().column(2) - &original.view().column(0);
    assert!(rereferenced
        .view()
        .column(2)
        .iter()
        .zip(expected.iter())
        .all(|(a, b)| (a - b).abs() < 1e-12));
}
