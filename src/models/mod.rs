// Models module - exports all model types

mod article;
mod cell;
mod customer;
mod route;
mod store;
mod ticket;
mod trajectory;

// Re-export model types
pub use self::article::{PickTimeCatalog, PickTimeTable, PICK_TIERS};
pub use self::cell::Cell;
pub use self::customer::CustomerProfile;
pub use self::route::{Route, WalkPlan};
pub use self::store::{LayoutEntry, LayoutRole, StoreGrid, MAX_FLOOR_CELLS};
pub use self::ticket::{group_baskets, CustomerBasket, TicketLine};
pub use self::trajectory::{TrajectoryRecord, TIMESTAMP_FORMAT};

// Common type aliases for improved code readability
pub type ArticleId = String;
pub type CustomerId = String;
pub type TicketId = String;
/// Walking distance in grid steps (edge count)
pub type Distance = u32;
pub type Seconds = u32;
