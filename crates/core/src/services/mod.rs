pub mod currency_service;
pub mod netting_service;
pub mod normalizer_service;
pub mod position_service;
pub mod price_service;
pub mod valuation_service;
