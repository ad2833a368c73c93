pub mod finnhub;
pub mod lifecycle;
pub mod selector;
pub mod snapshot;

pub use finnhub::FinnhubClient;
pub use lifecycle::{Engine, EngineHandle};
pub use selector::{select_best, SignalSelector};
pub use snapshot::IndicatorClient;
