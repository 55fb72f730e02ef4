pub mod complaints;
pub mod otp;
pub mod scheduler;
pub mod security;
pub mod sms;
