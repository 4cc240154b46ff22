pub mod cluster;
pub mod lifecycle;
pub mod notify;
pub mod tags;
