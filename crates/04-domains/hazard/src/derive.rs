//! Effective field parameters, decay and dose arithmetic, and flag
//! derivation. Everything here is pure.

use crate::types::{flags, Exposure, HazardField, HazardType};
use fixed_point::{Q16, Q48};

/// Field parameters after inheriting type defaults for zero values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldParams {
    pub exposure_rate: Q16,
    pub decay_rate: Q16,
    pub uncertainty: Q16,
}

pub fn effective_params(field: &HazardField, kind: Option<&HazardType>) -> FieldParams {
    FieldParams {
        exposure_rate: inherit(field.exposure_rate, kind.map(|k| k.default_exposure_rate)),
        decay_rate: inherit(field.decay_rate, kind.map(|k| k.default_decay_rate)),
        uncertainty: inherit(field.uncertainty, kind.map(|k| k.default_uncertainty)).clamp01(),
    }
}

/// `own`, or `default` when `own` is zero.
pub(crate) fn inherit(own: Q16, default: Option<Q16>) -> Q16 {
    match default {
        Some(default) if own.is_zero() => default,
        _ => own,
    }
}

/// Intensity after `tick_delta` ticks of linear decay, floored at zero.
pub fn decayed(intensity: Q16, decay_rate: Q16, tick_delta: u64) -> Q16 {
    let loss = decay_rate.max(Q16::ZERO).saturating_mul_int(tick_delta);
    intensity.saturating_sub(loss).max(Q16::ZERO)
}

/// Dose delivered over `tick_delta` ticks:
/// `intensity * rate * falloff * sensitivity * tick_delta`.
pub fn dose(intensity: Q16, rate: Q16, falloff: Q16, sensitivity: Q16, tick_delta: u64) -> Q48 {
    let sensitivity = if sensitivity.is_zero() {
        Q16::ONE
    } else {
        sensitivity
    };
    intensity
        .widen()
        .saturating_mul(rate.widen())
        .saturating_mul(falloff.widen())
        .saturating_mul(sensitivity.widen())
        .saturating_mul_int(tick_delta)
        .max(Q48::ZERO)
}

pub fn field_flags(field: &HazardField, params: &FieldParams) -> u32 {
    if field.intensity <= Q16::ZERO {
        flags::FIELD_DEPLETED
    } else if params.decay_rate > Q16::ZERO {
        flags::FIELD_DECAYING
    } else {
        0
    }
}

pub fn exposure_flags(exposure: &Exposure) -> u32 {
    if exposure.is_over_limit() {
        flags::EXPOSURE_OVER_LIMIT
    } else {
        0
    }
}

/// `accumulated / limit`; zero for unlimited receptors.
pub fn exposure_ratio(exposure: &Exposure) -> Q16 {
    Q48::ratio_of(exposure.accumulated, exposure.limit)
}
