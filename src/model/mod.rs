pub mod adjustment;
pub mod payout;
pub mod policy;
pub mod sale;
