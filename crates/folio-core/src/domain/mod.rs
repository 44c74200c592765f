//! 포트폴리오 도메인 모델.

pub mod market_data;
pub mod option_contract;
pub mod position;
pub mod snapshot;

pub use market_data::{OptionQuote, StockQuote};
pub use option_contract::OptionContract;
pub use position::{OptionPosition, StockPosition};
pub use snapshot::{MarketDataSection, MetadataSection, PortfolioSnapshot, PositionSection};
