pub mod factory;
pub mod google;
pub mod line;
pub mod repositories;
