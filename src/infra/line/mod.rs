pub mod line_messaging_client;
