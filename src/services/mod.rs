pub mod admin_service;
pub mod auth_service;
pub mod booking_service;
pub mod mailer;
pub mod notification_service;
pub mod payment_service;
pub mod room_service;
