mod qr_code;
mod scan;
mod user;

pub use qr_code::*;
pub use scan::*;
pub use user::*;
