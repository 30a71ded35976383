pub mod actions;
pub mod analytics;
pub mod api_error;
pub mod batch;
pub mod identity;
pub mod lifecycle;
pub mod location;
pub mod navigation;
pub mod product;
pub mod registration;
pub mod role;
pub mod tracking;
pub mod weather;

#[cfg(feature = "qr")]
pub mod qr;
