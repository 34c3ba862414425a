pub mod common;
pub mod leaderboard;
pub mod profile;
pub mod qr_code;
pub mod reconciliation;
pub mod scan;
pub mod user;
