//! Strategy risk engine.
//!
//! Classifies trading strategies into low / medium / high risk tiers from
//! their performance metrics, and synthesizes archetype-appropriate risk
//! metrics (volatility, beta, alpha, Sharpe ratio, VaR) for backtest results
//! that only report summary figures.

pub mod backtest;
pub mod db;
pub mod metrics;
pub mod models;
