// Trajectory records produced by the time simulator

use crate::models::{CustomerId, TicketId};
use chrono::NaiveDateTime;

/// Timestamp layout used for ticket input and trajectory output
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Position of one customer during one simulated second
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrajectoryRecord {
    pub customer_id: CustomerId,
    pub ticket_id: TicketId,
    pub x: i32,
    pub y: i32,
    pub is_picking: bool,
    pub timestamp: NaiveDateTime,
}

impl TrajectoryRecord {
    /// Formats the record as a `;`-delimited output row
    pub fn to_row(&self) -> String {
        format!(
            "{};{};{};{};{};{}",
            self.customer_id,
            self.ticket_id,
            self.x,
            self.y,
            u8::from(self.is_picking),
            self.timestamp.format(TIMESTAMP_FORMAT)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_to_row() {
        let record = TrajectoryRecord {
            customer_id: "c1".into(),
            ticket_id: "t9".into(),
            x: 3,
            y: 4,
            is_picking: true,
            timestamp: NaiveDate::from_ymd_opt(2023, 11, 2)
                .unwrap()
                .and_hms_opt(9, 29, 5)
                .unwrap(),
        };
        assert_eq!(record.to_row(), "c1;t9;3;4;1;2023-11-02 09:29:05");
    }
}
