// In tests/decompose_tests.rs

use efficient_ssa::{decompose, decompose_spectrum, SsaError, SsaMethod};
use ndarray::{s, Array1, ArrayView2, Axis};
use std::f64::consts::PI;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

const METHODS: [&str; 2] = ["classic", "accelerated"];

fn sine_signal() -> Array1<f64> {
    Array1::linspace(0.0, 10.0, 100).mapv(f64::sin)
}

fn noisy_signal(n: usize, seed: u64) -> Array1<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 0.2).unwrap();
    Array1::from_shape_fn(n, |i| {
        let t = i as f64 * 0.15;
        1.5 * (0.7 * t).sin() + 0.5 * (3.1 * t).sin() + noise.sample(&mut rng)
    })
}

// Helper for comparing components allowing for a sign flip per column
fn assert_components_close_with_sign_flips(
    left: ArrayView2<f64>,
    right: ArrayView2<f64>,
    tolerance: f64,
    context: &str,
) {
    assert_eq!(left.dim(), right.dim(), "Array dimensions differ for {}", context);
    for c_idx in 0..left.ncols() {
        let col1 = left.column(c_idx);
        let col2 = right.column(c_idx);
        let direct = col1.iter().zip(col2.iter()).map(|(a, b)| (a - b).abs()).fold(0.0f64, f64::max);
        let flipped = col1.iter().zip(col2.iter()).map(|(a, b)| (a + b).abs()).fold(0.0f64, f64::max);
        assert!(
            direct.min(flipped) < tolerance,
            "Column {} mismatch for {} (even with sign flip check). Max diff: {}",
            c_idx,
            context,
            direct.min(flipped)
        );
    }
}

#[test]
fn sine_scenario_has_expected_shape_for_both_methods() {
    let signal = sine_signal();
    for method in METHODS {
        let rc = decompose(signal.view(), 20, 5, method).unwrap();
        assert_eq!(rc.dim(), (100, 5), "method {}", method);
    }
}

#[test]
fn sine_scenario_methods_agree() {
    let signal = sine_signal();
    let classic = decompose(signal.view(), 20, 5, "classic").unwrap();
    let accelerated = decompose(signal.view(), 20, 5, "accelerated").unwrap();
    // A pure sinusoid spans a rank-2 row space, with or without column centring.
    // The two methods may rotate modes inside that pair, so compare the pair sum.
    let classic_pair = classic.slice(s![.., 0..2]).sum_axis(Axis(1));
    let accelerated_pair = accelerated.slice(s![.., 0..2]).sum_axis(Axis(1));
    for (t, (c, a)) in classic_pair.iter().zip(accelerated_pair.iter()).enumerate() {
        assert!((c - a).abs() < 1e-6, "pair sum differs at t = {}: {} vs {}", t, c, a);
        assert!((a - signal[t]).abs() < 1e-6, "pair sum misses the signal at t = {}", t);
    }
    for rc in [&classic, &accelerated] {
        let residual = rc.slice(s![.., 2..]).iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(residual < 1e-6, "trailing components should vanish, max {}", residual);
    }
}

#[test]
fn zero_mean_windows_make_the_methods_agree_per_component() {
    // Periods 20 and 25 divide K = 100, so centring leaves the trajectory unchanged
    let signal = Array1::from_shape_fn(114, |i| {
        let i = i as f64;
        2.0 * (2.0 * PI * i / 20.0).sin() + (2.0 * PI * i / 25.0 + 0.4).cos()
    });
    let classic = decompose(signal.view(), 15, 4, "classic").unwrap();
    let accelerated = decompose(signal.view(), 15, 4, "accelerated").unwrap();
    assert_components_close_with_sign_flips(classic.view(), accelerated.view(), 1e-6, "zero-mean windows");
}

#[test]
fn shape_holds_across_valid_parameters() {
    let signal = noisy_signal(64, 1);
    for method in METHODS {
        for lag in [2, 3, 10, 31] {
            for num_components in [1, lag / 2 + 1, lag] {
                let rc = decompose(signal.view(), lag, num_components, method).unwrap();
                assert_eq!(rc.dim(), (64, num_components), "{} lag {} comps {}", method, lag, num_components);
            }
        }
    }
}

#[test]
fn full_reconstruction_recovers_the_signal() {
    let signal = noisy_signal(240, 42);
    let lag = 48;
    for method in METHODS {
        let rc = decompose(signal.view(), lag, lag, method).unwrap();
        let rebuilt = rc.sum_axis(ndarray::Axis(1));
        let diff = (&rebuilt - &signal).mapv(|v| v * v).sum().sqrt();
        let norm = signal.mapv(|v| v * v).sum().sqrt();
        assert!(diff / norm < 1e-6, "{} relative error {}", method, diff / norm);
    }
}

#[test]
fn spectral_values_are_non_increasing() {
    let signal = noisy_signal(180, 9);
    for method in [SsaMethod::Classic, SsaMethod::Accelerated] {
        let spectrum = decompose_spectrum(signal.view(), 30, method).unwrap();
        assert_eq!(spectrum.num_modes(), 30);
        assert_eq!(spectrum.signal_len(), 180);
        for w in spectrum.values.windows(2) {
            assert!(w[0] >= w[1], "{} spectrum not ordered: {:?}", method, spectrum.values);
        }
    }
}

#[test]
fn lag_bounds_are_enforced() {
    let signal = sine_signal();
    for method in METHODS {
        for lag in [0, 1, 50, 51, 99] {
            let err = decompose(signal.view(), lag, 1, method).unwrap_err();
            assert!(matches!(err, SsaError::LagOutOfRange { .. }), "{} lag {}: {:?}", method, lag, err);
            assert!(err.is_range_violation());
        }
        assert!(decompose(signal.view(), 49, 1, method).is_ok());
    }
}

#[test]
fn component_bounds_are_enforced() {
    let signal = sine_signal();
    for method in METHODS {
        for num_components in [0, 21, 100] {
            let err = decompose(signal.view(), 20, num_components, method).unwrap_err();
            assert!(matches!(err, SsaError::ComponentsOutOfRange { .. }), "{}: {:?}", method, err);
        }
    }
}

#[test]
fn unknown_method_is_a_configuration_violation() {
    let signal = sine_signal();
    let err = decompose(signal.view(), 20, 5, "unknown").unwrap_err();
    assert!(matches!(err, SsaError::UnknownMethod(ref m) if m == "unknown"));
    assert!(err.is_configuration_violation());
}

#[test]
fn range_violations_are_reported_before_method_errors() {
    let signal = sine_signal();
    let err = decompose(signal.view(), 1, 5, "unknown").unwrap_err();
    assert!(matches!(err, SsaError::LagOutOfRange { .. }));
}

#[test]
fn empty_signal_is_rejected() {
    let signal = Array1::<f64>::zeros(0);
    let err = decompose(signal.view(), 2, 1, "classic").unwrap_err();
    assert!(matches!(err, SsaError::InvalidSignal(_)));
}

#[test]
fn classic_is_bit_identical_across_calls() {
    let signal = noisy_signal(150, 77);
    let first = decompose(signal.view(), 25, 6, "classic").unwrap();
    let second = decompose(signal.view(), 25, 6, "classic").unwrap();
    assert_eq!(first, second);
}

#[test]
fn accelerated_is_reproducible_within_tolerance() {
    let signal = noisy_signal(150, 77);
    let first = decompose(signal.view(), 25, 6, "accelerated").unwrap();
    let second = decompose(signal.view(), 25, 6, "accelerated").unwrap();
    for (a, b) in first.iter().zip(second.iter()) {
        assert!((a - b).abs() < 1e-12);
    }
}
