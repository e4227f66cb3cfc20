pub mod sqlite_station_repo;
pub mod sqlite_constraint_repo;
pub mod sqlite_customer_repo;
pub mod sqlite_category_repo;
pub mod sqlite_appointment_repo;
pub mod sqlite_job_repo;

pub mod postgres_station_repo;
pub mod postgres_constraint_repo;
pub mod postgres_customer_repo;
pub mod postgres_category_repo;
pub mod postgres_appointment_repo;
pub mod postgres_job_repo;
