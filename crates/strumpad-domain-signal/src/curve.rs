use strumpad_ports::config::{ConfigError, CurveConfig, SpreadMode};

/// Shape a normalized input through a response curve.
///
/// `t` is clamped into [0, 1]. Direct maps 0 -> min and 1 -> max, inverse
/// flips that, and central treats 0.5 as the input that produces `max` with
/// both ends producing `min`. `curve` biases the response: 1 is linear,
/// above 1 flattens the low end of `t`.
///
/// Total even for degenerate configs: a zero-width range yields a constant
/// `min`. `multiplier` does not participate here (see `effective_max`).
pub fn shape(config: &CurveConfig, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let span = config.max - config.min;
    match config.spread {
        SpreadMode::Central => {
            let distance_from_center = (t - 0.5).abs() * 2.0;
            config.max - distance_from_center.powf(config.curve) * span
        }
        SpreadMode::Inverse => config.max - t.powf(config.curve) * span,
        SpreadMode::Direct => config.min + t.powf(config.curve) * span,
    }
}

/// Upper bound of the range a configuration UI should report. A multiplier
/// below 1 compresses the displayed range; the shaped output itself is
/// never rescaled.
pub fn effective_max(config: &CurveConfig) -> f32 {
    if config.multiplier < 1.0 {
        config.min + (config.max - config.min) * config.multiplier
    } else {
        config.max
    }
}

/// Where a shaped value sits inside the configured range, for display.
/// Divides by the range width, so it requires a validated config.
pub fn normalized(config: &CurveConfig, value: f32) -> f32 {
    (value - config.min) / (config.max - config.min)
}

/// Load-time validation. Rejects non-positive curve exponents and
/// zero-width ranges so the per-sample path never divides by zero.
pub fn validate_curve(name: &str, config: &CurveConfig) -> Result<(), ConfigError> {
    if !(config.curve > 0.0) {
        return Err(ConfigError::NonPositiveCurve {
            name: name.to_string(),
            value: config.curve,
        });
    }
    if config.max == config.min {
        return Err(ConfigError::ZeroWidthCurveRange {
            name: name.to_string(),
        });
    }
    Ok(())
}
