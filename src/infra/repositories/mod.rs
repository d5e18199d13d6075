pub mod sqlite_catalog_repo;
pub mod sqlite_customer_repo;
pub mod sqlite_job_repo;
pub mod sqlite_message_log_repo;
pub mod sqlite_reservation_repo;
