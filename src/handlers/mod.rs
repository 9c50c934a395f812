pub(crate) mod auth;
pub(crate) mod auth_otp;
pub(crate) mod kindergartens;
pub(crate) mod owner_dashboard;
pub(crate) mod profile;
pub(crate) mod providers;
pub(crate) mod registrations;
pub(crate) mod reviews;
