pub mod availability;
pub mod booking_flow;
pub mod calendar_sync;
pub mod clock;
pub mod dashboard;
pub mod flex;
pub mod format;
pub mod notifications;
pub mod reservation_service;
pub mod sweeps;
pub mod templates;
