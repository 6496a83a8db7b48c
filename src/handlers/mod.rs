pub mod backtest;
pub mod dividend;
pub mod error;
pub mod quote;
