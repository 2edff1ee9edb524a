pub mod currency;
pub mod market_data;
pub mod price;
pub mod report;
pub mod settings;
pub mod transaction;
