pub mod appointment;
pub mod category;
pub mod constraint;
pub mod customer;
pub mod job;
pub mod meeting;
pub mod station;
