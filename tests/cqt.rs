use quaver::{cqt, io};

#[test]
fn silence_two_seconds() {
    // 2 s of silence at 44.1 kHz, 3 octaves above A0.
    let signal = io::silence(44100, 2.0);
    let spec = cqt::cqt(&signal, 44100, 512, 27.5, 36, 12, 0.5).unwrap();

    assert_eq!(spec.dim(), (36, 172)); // floor(88200 / 512)
    assert!(spec.iter().all(|&v| v.abs() < 1e-6));
}

#[test]
fn sine_energy_concentrates_at_matching_bin() {
    // 440 Hz is exactly bin 48 above fmin 27.5 at 12 bins per octave:
    // 12 * log2(440 / 27.5) = 48.
    let sr = 44100;
    let signal = io::tone(440.0, sr, 1.0);
    let spec = cqt::cqt(&signal, sr, 512, 27.5, 60, 12, 0.5).unwrap();

    assert_eq!(spec.dim(), (60, 86));

    // Average magnitude per row over interior frames, away from the
    // start/end edge effects.
    let interior = 10..60;
    let row_mean = |row: usize| -> f32 {
        let sum: f32 = interior.clone().map(|n| spec[(row, n)]).sum();
        sum / interior.len() as f32
    };

    let mut peak_row = 0;
    let mut peak_mean = 0.0f32;
    for row in 0..60 {
        let mean = row_mean(row);
        if mean > peak_mean {
            peak_mean = mean;
            peak_row = row;
        }
    }
    assert_eq!(peak_row, 48, "energy should peak at the 440 Hz bin");

    // Markedly higher than rows two or more bins away.
    assert!(row_mean(48) > 1.3 * row_mean(46));
    assert!(row_mean(48) > 1.3 * row_mean(50));
    assert!(row_mean(48) > 2.0 * row_mean(44));
    assert!(row_mean(48) > 2.0 * row_mean(52));

    // Sustained across the interior, not a single lucky frame.
    for n in interior {
        assert!(
            spec[(48, n)] > 2.0 * spec[(44, n)],
            "frame {} lost concentration",
            n
        );
        assert!(spec[(48, n)] > 2.0 * spec[(52, n)]);
    }
}

#[test]
fn frame_count_is_exact_floor_division() {
    // n_frame = floor(len / hop), independent of the octave count.
    let cases = [
        (1000usize, 64usize, 24usize, 15usize),
        (1024, 64, 24, 16),
        (1023, 64, 24, 15),
        (1000, 250, 24, 4),
        (1000, 63, 12, 15), // single octave allows an odd hop
    ];

    for &(len, hop, n_bins, expected) in &cases {
        let signal = vec![0.01f32; len];
        let spec = cqt::cqt(&signal, 8000, hop, 50.0, n_bins, 12, 0.5).unwrap();
        assert_eq!(
            spec.dim(),
            (n_bins, expected),
            "len={} hop={} n_bins={}",
            len,
            hop,
            n_bins
        );
    }
}

#[test]
fn output_is_nonnegative_and_finite() {
    let sr = 22050;
    let signal = io::tone(220.0, sr, 0.5);
    let spec = cqt::cqt(&signal, sr, 256, 55.0, 36, 12, 1.0).unwrap();

    assert!(spec.iter().all(|&v| v.is_finite() && v >= 0.0));
    assert!(spec.iter().any(|&v| v > 0.0));
}

#[test]
fn config_defaults_cover_piano_range() {
    // The default layout (nine octaves above A0) on a short recording.
    let signal = io::tone(261.6, 44100, 0.25); // middle C
    let config = cqt::CqtConfig::default();
    let spec = config.compute(&signal).unwrap();

    assert_eq!(spec.shape()[0], 324);
    assert_eq!(spec.shape()[1], signal.len() / config.hop_length);
}
