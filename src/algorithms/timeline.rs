use chrono::{Duration, NaiveDateTime};

use crate::models::{CustomerId, Seconds, TicketId, TrajectoryRecord, WalkPlan};

/// How long a customer stays on each cell of a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DwellSchedule {
    /// Seconds per walked cell
    pub step_seconds: Seconds,

    /// Pick seconds for each entry of `WalkPlan::pickup_steps`
    pub pick_seconds: Vec<Seconds>,

    /// Seconds spent paying at the final cell
    pub checkout_seconds: Seconds,
}

impl DwellSchedule {
    /// Seconds spent on cell `idx` of the walk (checkout excluded)
    fn dwell_at(&self, plan: &WalkPlan, idx: usize) -> (Seconds, bool) {
        match plan.pickup_steps.iter().position(|&step| step == idx) {
            Some(slot) => (self.pick_seconds.get(slot).copied().unwrap_or(0), true),
            None => (self.step_seconds, false),
        }
    }

    /// Total simulated seconds, one trajectory record each
    pub fn total_seconds(&self, plan: &WalkPlan) -> u64 {
        if plan.cells.is_empty() {
            return 0;
        }
        let walk: u64 = (0..plan.cells.len())
            .map(|idx| u64::from(self.dwell_at(plan, idx).0))
            .sum();
        walk + u64::from(self.checkout_seconds)
    }
}

/// Checkout dwell: a per-unit scanning time plus one step of the customer's pace,
/// saturating at `Seconds::MAX`
pub fn checkout_seconds(total_quantity: u32, seconds_per_unit: Seconds, step_seconds: Seconds) -> Seconds {
    total_quantity
        .saturating_mul(seconds_per_unit)
        .saturating_add(step_seconds)
}

/// Expands a walk into one record per simulated second, starting at `start`.
///
/// Timestamps increase by exactly one second per record. Picking seconds are
/// flagged; walking and checkout seconds are not.
pub fn simulate(
    plan: &WalkPlan,
    schedule: &DwellSchedule,
    customer_id: &CustomerId,
    ticket_id: &TicketId,
    start: NaiveDateTime,
) -> Vec<TrajectoryRecord> {
    let capacity = usize::try_from(schedule.total_seconds(plan)).unwrap_or(0);
    let mut records = Vec::with_capacity(capacity);
    let mut now = start;
    let tick = Duration::seconds(1);

    let mut emit = |x: i32, y: i32, is_picking: bool, seconds: Seconds| {
        for _ in 0..seconds {
            records.push(TrajectoryRecord {
                customer_id: customer_id.clone(),
                ticket_id: ticket_id.clone(),
                x,
                y,
                is_picking,
                timestamp: now,
            });
            now += tick;
        }
    };

    for (idx, cell) in plan.cells.iter().enumerate() {
        let (seconds, is_picking) = schedule.dwell_at(plan, idx);
        emit(cell.x, cell.y, is_picking, seconds);
    }

    if let Some(last) = plan.cells.last() {
        emit(last.x, last.y, false, schedule.checkout_seconds);
    }

    records
}
