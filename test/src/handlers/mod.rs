//! Route handlers. Access rules live in the security configuration, not here.

pub mod home;
pub mod spitters;
pub mod spittles;
