pub mod backtest;
pub mod dividend;
pub mod market;
pub mod yahoo;
