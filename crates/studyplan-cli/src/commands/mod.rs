pub mod chapter;
pub mod config;
pub mod plan;
pub mod progress;
pub mod subject;

use studyplan_core::PHASE_COUNT;

/// Parse a comma-separated weight list, e.g. "10,40,30,20".
///
/// Only the shape is checked here; the sum-to-100 rule is enforced by the
/// core when the weights are used.
pub(crate) fn parse_weights(raw: &str) -> Result<[u32; PHASE_COUNT], Box<dyn std::error::Error>> {
    let parts: Vec<u32> = raw
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<_, _>>()?;
    let weights: [u32; PHASE_COUNT] = parts
        .try_into()
        .map_err(|_| format!("expected exactly {PHASE_COUNT} comma-separated weights"))?;
    Ok(weights)
}
