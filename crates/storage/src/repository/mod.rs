pub mod leaderboard;
pub mod qr_code;
pub mod scan;
pub mod user;
