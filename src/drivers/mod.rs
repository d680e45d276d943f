pub mod current;
pub mod mqtt;
pub mod thermometer;
pub mod webhook;
