pub mod annual;
pub mod net_interest;
pub mod schedule;
