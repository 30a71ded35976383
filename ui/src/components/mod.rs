pub mod action_panel;
pub mod analytics_view;
pub mod app;
pub mod auth_state;
pub mod batch_forms;
pub mod batch_qr;
pub mod batch_views;
pub mod dashboard_view;
pub mod local_store;
pub mod login_view;
pub mod product_views;
pub mod register_view;
pub mod scanner;
pub mod settings_view;
pub mod sidebar;
pub mod timer;
pub mod tracking_view;
pub mod weather_widget;
