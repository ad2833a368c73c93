pub mod rest;

pub use rest::FinnhubClient;
