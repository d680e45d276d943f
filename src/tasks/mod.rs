pub mod monitor;
pub mod sensor;
