pub mod admin;
pub mod auth;
pub mod auth_otp_routes;
pub mod kindergartens;
pub mod owner;
pub mod profile;
pub mod providers;
pub mod registrations;
