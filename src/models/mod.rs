pub mod attendance;
pub mod child;
pub mod kindergarten;
pub mod language;
pub mod otp;
pub mod payment;
pub mod provider;
pub mod registration;
pub mod review;
pub mod staff;
pub mod user;
