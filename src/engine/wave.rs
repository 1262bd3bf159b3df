use crate::model::MS_PER_HOUR;

/// Peak vertical excursion of the wave in pixels.
pub const AMPLITUDE: f64 = 40.0;

const TERMS: [(f64, f64, f64); 3] = [
    // (weight, frequency per hour, phase)
    (0.3, 0.050, 0.0),
    (0.25, 0.031, 1.3),
    (0.2, 0.017, 2.1),
];

pub fn hours_of(t_ms: f64) -> f64 {
    t_ms / MS_PER_HOUR
}

/// Vertical offset of the wave at `hours` since the epoch. The weights sum to 0.75,
/// so the result stays inside `[-AMPLITUDE, AMPLITUDE]`.
pub fn y_offset(hours: f64) -> f64 {
    let (w1, f1, p1) = TERMS[0];
    let (w2, f2, p2) = TERMS[1];
    let (w3, f3, p3) = TERMS[2];
    AMPLITUDE * (w1 * (f1 * hours + p1).sin() + w2 * (f2 * hours + p2).cos() + w3 * (f3 * hours + p3).sin())
}

/// Wave offset for a millisecond timestamp.
pub fn y_offset_ms(t_ms: f64) -> f64 {
    y_offset(hours_of(t_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_by_amplitude() {
        let mut h = -50_000.0;
        while h < 600_000.0 {
            let y = y_offset(h);
            assert!(y.abs() <= AMPLITUDE, "y={y} at h={h}");
            h += 13.7;
        }
    }

    #[test]
    fn deterministic() {
        for h in [0.0, 1.5, 473_000.25, -12.0] {
            assert_eq!(y_offset(h), y_offset(h));
        }
    }

    #[test]
    fn continuous_at_small_steps() {
        let a = y_offset(480_000.0);
        let b = y_offset(480_000.01);
        assert!((a - b).abs() < 0.1);
    }
}
