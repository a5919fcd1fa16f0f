// Concurrent visitor movement
//
// Every member of a batch is an independent remote call. Members are polled together
// in the caller's task; the batch settles only when all of them have settled, and the
// outcomes come back in input order whatever order the calls completed in.

use futures::future::join_all;
use rand::Rng;
use serde_json::json;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::controllers::Visitor;
use crate::error::SdkError;
use crate::types::Position;

/// One explicit per-visitor destination
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisitorMove {
    pub visitor_id: u64,
    pub destination: Position,
    pub teleport: bool,
}

impl VisitorMove {
    pub fn new(visitor_id: u64, x: f64, y: f64, teleport: bool) -> Self {
        Self {
            visitor_id,
            destination: Position::new(x, y),
            teleport,
        }
    }
}

/// Settled result of one batch member
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub visitor_id: u64,
    pub result: Result<Position, SdkError>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Reject radii that cannot describe an interval
pub fn validate_radius(sdk_method: &'static str, radius: f64) -> Result<(), SdkError> {
    if radius.is_finite() && radius >= 0.0 {
        Ok(())
    } else {
        Err(SdkError::validation(
            sdk_method,
            "scatterVisitorsBy must be a finite, non-negative number",
            json!({ "scatterVisitorsBy": radius }),
        ))
    }
}

/// Reject targets whose scatter box cannot be represented: a non-finite coordinate, or
/// one whose `c - r`/`c + r` overflows
pub fn validate_target(sdk_method: &'static str, target: Position, radius: f64) -> Result<(), SdkError> {
    validate_radius(sdk_method, radius)?;

    let representable = [target.x, target.y]
        .iter()
        .all(|c| c.is_finite() && (c - radius).is_finite() && (c + radius).is_finite());
    if representable {
        Ok(())
    } else {
        Err(SdkError::validation(
            sdk_method,
            "target coordinates and their scatter range must be finite",
            json!({ "x": target.x, "y": target.y, "scatterVisitorsBy": radius }),
        ))
    }
}

/// Jitter `target` independently per axis within `[target - r, target + r)`.
/// A zero radius returns the target unchanged.
pub fn scatter<R: Rng>(target: Position, radius: f64, rng: &mut R) -> Position {
    Position {
        x: jitter(target.x, radius, rng),
        y: jitter(target.y, radius, rng),
    }
}

fn jitter<R: Rng>(center: f64, radius: f64, rng: &mut R) -> f64 {
    let low = center - radius;
    let high = center + radius;
    // also covers radii too small to register at this magnitude
    if radius <= 0.0 || low >= high || !(high - low).is_finite() {
        return center;
    }
    rng.gen_range(low..high)
}

/// One move per visitor toward a shared target, in the given visitor order
pub fn plan_move_all<R: Rng>(
    visitor_ids: impl IntoIterator<Item = u64>,
    target: Position,
    radius: f64,
    teleport: bool,
    rng: &mut R,
) -> Vec<VisitorMove> {
    visitor_ids
        .into_iter()
        .map(|visitor_id| VisitorMove {
            visitor_id,
            destination: scatter(target, radius, rng),
            teleport,
        })
        .collect()
}

/// Issue every move concurrently and join them, one outcome per input entry.
///
/// Entries naming a visitor missing from `visitors`, or one already claimed earlier in
/// the same batch, settle as validation failures without a network call.
pub async fn dispatch_moves(visitors: &mut BTreeMap<u64, Visitor>, moves: Vec<VisitorMove>) -> Vec<BatchOutcome> {
    const METHOD: &str = "move_visitors";

    if moves.is_empty() {
        return Vec::new();
    }

    let known: HashSet<u64> = visitors.keys().copied().collect();
    let mut slots: HashMap<u64, &mut Visitor> = visitors.iter_mut().map(|(id, visitor)| (*id, visitor)).collect();

    let pending: Vec<_> = moves
        .into_iter()
        .map(|planned| {
            let slot = slots.remove(&planned.visitor_id);
            let already_claimed = slot.is_none() && known.contains(&planned.visitor_id);

            async move {
                let result = match slot {
                    Some(visitor) => visitor.move_visitor(planned.destination, planned.teleport).await,
                    None => {
                        let reason = if already_claimed {
                            "visitor appears more than once in this batch"
                        } else {
                            "visitor is not in the cached visitor set"
                        };
                        Err(SdkError::validation(
                            METHOD,
                            reason,
                            json!({
                                "visitorId": planned.visitor_id,
                                "moveTo": planned.destination,
                                "teleport": planned.teleport,
                            }),
                        ))
                    }
                };

                BatchOutcome {
                    visitor_id: planned.visitor_id,
                    result,
                }
            }
        })
        .collect();

    let dispatched = pending.len();
    let outcomes = join_all(pending).await;

    let failed = outcomes.iter().filter(|outcome| !outcome.is_success()).count();
    if failed > 0 {
        tracing::warn!("Batch move settled: {} of {} moves failed", failed, dispatched);
    } else {
        tracing::info!("Batch move settled: {} moves succeeded", dispatched);
    }

    outcomes
}
