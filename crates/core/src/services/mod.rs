pub mod alert_service;
pub mod currency_service;
pub mod market_service;
pub mod portfolio_service;
pub mod valuation_service;
pub mod watchlist_service;
