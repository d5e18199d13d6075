pub mod calendar;
pub mod customer;
pub mod job;
pub mod menu;
pub mod message;
pub mod message_log;
pub mod reservation;
pub mod salon;
pub mod staff;
