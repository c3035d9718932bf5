//! One module per operator command. Each takes an authenticated client and
//! returns a typed outcome; printing happens in the binary.

pub mod fetch_picking;
pub mod fetch_status;
pub mod update_records;
pub mod update_salla;
pub mod update_status;
pub mod validate;

