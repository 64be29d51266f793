pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod seed;
pub mod services;
pub mod state;
pub mod store;
pub mod time;

pub use error::ScheduleError;
pub use models::*;
pub use state::ScheduleCellState;
pub use time::{ClockTime, DateRange};
