pub mod http_reminder_service;
