//! Command handlers grouped by resource.

pub(crate) mod products;
pub(crate) mod session;
pub(crate) mod uploads;
pub(crate) mod users;
