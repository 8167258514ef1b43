pub mod identity;
pub mod sentinel;
