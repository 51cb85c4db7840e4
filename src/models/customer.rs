// Customer movement profile

use crate::models::{CustomerId, Seconds};

/// Movement configuration of one customer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerProfile {
    pub customer_id: CustomerId,

    /// Seconds spent on each walked cell
    pub step_seconds: Seconds,
}

impl CustomerProfile {
    pub fn new<S: Into<CustomerId>>(customer_id: S, step_seconds: Seconds) -> Self {
        Self {
            customer_id: customer_id.into(),
            step_seconds,
        }
    }
}
