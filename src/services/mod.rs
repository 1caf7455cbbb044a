pub mod mailer;
pub mod reminder;
