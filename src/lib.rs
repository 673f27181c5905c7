pub mod app;
pub mod dashboard;
pub mod logging;
pub mod model;
pub mod postal_code;
pub mod settings;
pub mod sources;
pub mod storage;
