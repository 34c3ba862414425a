pub mod admin;
pub mod leaderboard;
pub mod profile;
pub mod scan;
