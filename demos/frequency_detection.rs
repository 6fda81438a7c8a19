// demos/frequency_detection.rs
//! Frequency detection walkthrough on simulated SSVEP trials

use ssvep_core::config::ConfigLoader;
use ssvep_core::detection::{
    accuracy_percent, best_point, extract_features, preprocess, CcaDetector, FbccaDetector, FoccaDetector,
    FrequencyDetector, MsiDetector, WeightSweep,
};
use ssvep_core::simulation::{SimulatorConfig, SsvepSimulator};
use ssvep_core::canonical_correlation;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("SSVEP Frequency Detection Example");
    println!("=================================");

    // Load configuration (defaults when no ssvep.toml is present)
    let mut config = ConfigLoader::new().load()?;
    config.analysis.channels = vec![0, 1, 2, 3];
    println!("Configuration loaded");
    println!("  - Sampling rate: {} Hz", config.analysis.sampling_rate_hz);
    println!("  - Stimuli: {:?} Hz", config.analysis.stimulus_frequencies_hz);
    println!("  - Harmonics: {}", config.analysis.num_harmonics);
    println!("  - Convention: {:?}", config.analysis.convention);

    // Simulate a session with powerline interference
    let mut simulator = SsvepSimulator::new(SimulatorConfig {
        sampling_rate_hz: config.analysis.sampling_rate_hz,
        noise_std: 0.8,
        powerline_amplitude: 1.5,
        ..SimulatorConfig::default()
    })?;
    let (raw, labels) = simulator.generate_trials(&config.analysis.stimulus_frequencies_hz, 5)?;
    println!("\nSimulated {} trials of {} samples x {} channels",
             raw.num_trials(), raw.num_samples(), raw.num_channels());

    let trials = preprocess(&raw, &config)?;
    let bank = config.reference_bank(trials.num_samples())?;
    let channels = &config.analysis.channels;

    // Canonical correlations of the first trial against every reference set
    println!("\nTrial 0 (label {}):", labels[0]);
    let first = trials.trial_channels(0, channels)?;
    for (frequency, reference) in bank.iter() {
        let rho = canonical_correlation(&first, reference, &config.cca_options())?;
        println!("  {:>5.1} Hz: {:?}", frequency, rho.values());
        for warning in rho.warnings() {
            println!("    warning: {}", warning);
        }
    }

    // Compare detectors
    println!("\nDetector accuracy:");
    let detectors: Vec<Box<dyn FrequencyDetector>> = vec![
        Box::new(CcaDetector::new(config.cca_options())),
        Box::new(FoccaDetector::from_config(&config)),
        Box::new(FbccaDetector::from_config(&config)),
        Box::new(MsiDetector::default()),
    ];
    for detector in &detectors {
        let predictions = detector.predict(&trials, channels, &bank)?;
        println!("  {:<6} {:>6.1}%", detector.name(), accuracy_percent(&labels, &predictions)?);
    }

    // Tune the fusion weights
    let points = WeightSweep::fusion(&config).run(&trials, &labels, channels, &bank)?;
    if let Some(best) = best_point(&points) {
        println!("\nBest fusion weights: a = {}, b = {} ({:.1}%)", best.a, best.b, best.accuracy_percent);
    }

    // Feature matrix for an external classifier
    let features = extract_features(&trials, channels, &bank, &config.cca_options())?;
    println!("\nFeature matrix: {} trials x {} features", features.nrows(), features.ncols());

    Ok(())
}
