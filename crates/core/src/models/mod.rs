pub mod alert;
pub mod analytics;
pub mod chart;
pub mod coin;
pub mod currency;
pub mod market;
pub mod portfolio;
pub mod price;
pub mod settings;
pub mod state;
pub mod watchlist;
