pub mod adjustment;
pub mod dashboard;
pub mod payout;
pub mod policy;
