pub mod activation;
pub mod config;
pub mod error;
pub mod gradient_check;
pub mod init;
pub mod network;

pub use activation::Activation;
pub use config::NetworkConfig;
pub use error::NetworkError;
pub use gradient_check::{gradient_check, GradientCheck};
pub use network::{Activations, Network, ParameterRef};
