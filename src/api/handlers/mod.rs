pub mod calendar;
pub mod catalog;
pub mod customers;
pub mod dashboard;
pub mod health;
pub mod messaging;
pub mod ops;
pub mod reservations;
