pub mod catalog;
pub mod manager;
pub mod resolver;
pub mod routes;
pub mod tier;
pub mod validator;

pub use manager::LicenseManager;
pub use validator::EnvLicenseValidator;
