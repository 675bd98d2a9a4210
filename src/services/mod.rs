//! External collaborator seams and the in-process implementations the
//! binaries run with.

pub mod execution;
pub mod market_data;
pub mod paper;
pub mod replay;

pub use execution::{ExecutionGateway, SignalReport, SignalSink};
pub use market_data::MarketDataProvider;
pub use paper::{LogSignalSink, PaperGateway};
pub use replay::ReplayMarketData;
