// Domain layer - Pure data types and window logic
pub mod connection;
pub mod telemetry;
pub mod window;
