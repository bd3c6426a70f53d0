use std::time::Duration;

use crate::config::{DurationValue, Phase, RequestTemplate};
use crate::error::PhaseError;

/// One executable step of a phase.
///
/// `duration == None` means a single wave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub target_vus: u32,
    pub duration: Option<Duration>,
    pub request: Option<RequestTemplate>,
}

impl Segment {
    /// Request used by this segment: its own override or `base`.
    #[must_use]
    pub fn effective_request<'req>(&'req self, base: &'req RequestTemplate) -> &'req RequestTemplate {
        self.request.as_ref().unwrap_or(base)
    }
}

fn phase_duration(
    phase: &Phase,
    field: &'static str,
    value: &DurationValue,
) -> Result<Duration, PhaseError> {
    value
        .to_duration()
        .map_err(|err| PhaseError::InvalidDuration {
            phase: phase.display_name().to_owned(),
            field,
            value: value.to_string(),
            reason: err.to_string(),
        })
}

/// Validates a phase and expands it into the ordered segments to run.
///
/// A staircase phase whose duration is shorter than one increment yields
/// no segments.
///
/// # Errors
///
/// Returns a [`PhaseError`] describing the first rule the phase violates.
pub fn resolve_phase(phase: &Phase) -> Result<Vec<Segment>, PhaseError> {
    let name = || phase.display_name().to_owned();

    if phase.single_request == Some(true) {
        return Ok(vec![Segment {
            target_vus: 1,
            duration: None,
            request: phase.request.clone(),
        }]);
    }

    let Some(duration_value) = phase.duration.as_ref() else {
        return Err(PhaseError::DurationNotSpecified { phase: name() });
    };
    // `single_request = false` still counts as declared.
    if phase.single_request.is_some() {
        return Err(PhaseError::MutuallyExclusive { phase: name() });
    }

    let target_vus = phase.target_vus.unwrap_or(0);
    if target_vus == 0 {
        return Err(PhaseError::TargetVusRequired { phase: name() });
    }
    if phase.increment.is_some() && phase.target_vus.is_none() {
        return Err(PhaseError::TargetVusRequiredWithIncrement { phase: name() });
    }

    let increment_vus = phase.increment_vus.filter(|vus| *vus != 0);
    let ramp = match (phase.increment.as_ref(), increment_vus) {
        (Some(increment), Some(step_vus)) => Some((increment, step_vus)),
        (None, None) => None,
        (Some(_), None) | (None, Some(_)) => {
            return Err(PhaseError::IncrementPairing { phase: name() });
        }
    };

    let duration = phase_duration(phase, "duration", duration_value)?;
    let Some((increment_value, step_vus)) = ramp else {
        return Ok(vec![Segment {
            target_vus,
            duration: Some(duration),
            request: phase.request.clone(),
        }]);
    };

    let increment = phase_duration(phase, "increment", increment_value)?;
    let steps = duration
        .as_nanos()
        .checked_div(increment.as_nanos())
        .unwrap_or(0);
    let mut segments = Vec::new();
    let mut vus = target_vus;
    let mut step: u128 = 0;
    while step < steps {
        segments.push(Segment {
            target_vus: vus,
            duration: Some(increment),
            request: phase.request.clone(),
        });
        vus = vus.saturating_add(step_vus);
        step = step.saturating_add(1);
    }
    Ok(segments)
}
