pub mod cooldown;
pub mod point_decay;
pub mod qr_generation;
pub mod reconciliation;
pub mod scan_transaction;
