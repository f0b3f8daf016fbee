pub mod error;
pub mod interfaces;
pub mod service;
pub mod validator;
