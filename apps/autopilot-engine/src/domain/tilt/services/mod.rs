//! Tilt Domain Services

mod tilt_service;

pub use tilt_service::TiltService;
