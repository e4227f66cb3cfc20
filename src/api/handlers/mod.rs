pub mod appointment;
pub mod category;
pub mod constraint;
pub mod customer;
pub mod health;
pub mod job;
pub mod schedule;
pub mod station;
