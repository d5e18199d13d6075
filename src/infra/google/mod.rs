pub mod google_calendar_client;
