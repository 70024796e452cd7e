//! Backtest orchestration: fold a backtest summary and archetype risk metrics
//! into a strategy's performance record.
//!
//! The summary figures come from the caller's backtest feed. This module only
//! validates the request, fills in the risk figures, re-derives the risk tier
//! and reports the outcome.

use std::fmt;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::metrics::{RandomSource, RiskMetricsGenerator};
use crate::models::{PerformanceMetrics, RiskTransition, StrategyRecord};

/// Summary figures produced by a backtest feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BacktestSummary {
    /// Fractional return over the window (0.085 = 8.5%)
    pub total_return: f64,

    /// Fraction of profitable trades (0.0 to 1.0)
    pub win_rate: f64,

    /// Peak-to-trough decline; sign is ignored
    pub max_drawdown: f64,

    pub total_trades: u32,

    /// Average holding period in days
    pub avg_trade_duration: f64,

    /// Gross profit / gross loss
    pub profit_factor: f64,
}

/// A backtest to fold into a strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: Decimal,
    pub summary: BacktestSummary,
}

impl BacktestRequest {
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        initial_capital: Decimal,
        summary: BacktestSummary,
    ) -> Self {
        Self {
            start_date,
            end_date,
            initial_capital,
            summary,
        }
    }

    /// Check the window and capital.
    pub fn validate(&self) -> Result<()> {
        if self.end_date < self.start_date {
            bail!(
                "Backtest end date {} is before start date {}",
                self.end_date,
                self.start_date
            );
        }
        if self.initial_capital <= Decimal::ZERO {
            bail!("Initial capital must be positive, got {}", self.initial_capital);
        }
        Ok(())
    }

    /// Length of the window in days (inclusive of both ends).
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// Outcome of folding a backtest into a strategy.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub strategy_id: String,
    pub strategy_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: Decimal,
    pub final_capital: Decimal,
    pub profit_factor: f64,
    pub performance: PerformanceMetrics,
    pub transition: RiskTransition,
}

impl fmt::Display for BacktestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.performance;
        let pct = |v: Option<f64>| v.unwrap_or(0.0) * 100.0;
        let num = |v: Option<f64>| v.unwrap_or(0.0);

        writeln!(f, "\n{:=^60}", " BACKTEST RESULTS ")?;
        writeln!(f)?;
        writeln!(f, "Strategy: {} ({})", self.strategy_name, self.strategy_id)?;
        writeln!(f, "Period: {} to {}",
            self.start_date.format("%Y-%m-%d"),
            self.end_date.format("%Y-%m-%d"))?;
        writeln!(f)?;
        writeln!(f, "--- Capital ---")?;
        writeln!(f, "Initial:     ${:.2}", self.initial_capital)?;
        writeln!(f, "Final:       ${:.2}", self.final_capital)?;
        writeln!(f, "Return:      {:.2}%", pct(p.total_return))?;
        writeln!(f)?;
        writeln!(f, "--- Trades ---")?;
        writeln!(f, "Total:       {}", p.total_trades.unwrap_or(0))?;
        writeln!(f, "Win Rate:    {:.1}%", pct(p.win_rate))?;
        writeln!(f, "Avg Hold:    {:.1} days", num(p.avg_trade_duration))?;
        writeln!(f, "Profit Factor: {:.2}", self.profit_factor)?;
        writeln!(f)?;
        writeln!(f, "--- Risk Metrics ---")?;
        writeln!(f, "Max Drawdown: {:.2}%", pct(p.max_drawdown).abs())?;
        writeln!(f, "Volatility:   {:.2}%", pct(p.volatility))?;
        writeln!(f, "Std Dev:      {:.2}%", pct(p.standard_deviation))?;
        writeln!(f, "Sharpe Ratio: {:.2}", num(p.sharpe_ratio))?;
        writeln!(f, "Beta:         {:.2}", num(p.beta))?;
        writeln!(f, "Alpha:        {:.2}%", pct(p.alpha))?;
        writeln!(f, "VaR (95%):    {:.2}%", pct(p.value_at_risk))?;
        writeln!(f)?;
        if self.transition.changed() {
            writeln!(
                f,
                "Risk Level:  {} -> {}",
                self.transition.previous, self.transition.current
            )?;
        } else {
            writeln!(f, "Risk Level:  {}", self.transition.current)?;
        }
        writeln!(f, "{:=^60}", "")?;
        Ok(())
    }
}

/// Folds backtest summaries into strategies, drawing risk metrics from `R`.
pub struct BacktestRunner<R: RandomSource> {
    generator: RiskMetricsGenerator,
    source: R,
}

impl<R: RandomSource> BacktestRunner<R> {
    pub fn new(generator: RiskMetricsGenerator, source: R) -> Self {
        Self { generator, source }
    }

    /// Run a backtest request against a strategy.
    ///
    /// On success the strategy's performance is replaced with the merged
    /// record and its risk tier re-derived. On validation failure the
    /// strategy is left untouched.
    pub fn run(
        &mut self,
        strategy: &mut StrategyRecord,
        request: &BacktestRequest,
    ) -> Result<BacktestReport> {
        request.validate()?;

        let summary = &request.summary;
        let growth = Decimal::try_from(summary.total_return)
            .context("Total return is not a finite number")?;
        let final_capital = (request.initial_capital * (dec!(1) + growth)).round_dp(2);

        let mut performance = strategy.performance().cloned().unwrap_or_default();
        performance.total_return = Some(summary.total_return);
        performance.win_rate = Some(summary.win_rate);
        performance.max_drawdown = Some(summary.max_drawdown);
        performance.total_trades = Some(summary.total_trades);
        performance.avg_trade_duration = Some(summary.avg_trade_duration);

        let generated = self.generator.generate_with(
            &mut self.source,
            &strategy.archetype,
            summary.total_return,
            summary.max_drawdown,
            summary.win_rate,
        );
        generated.apply_to(&mut performance);

        let transition = strategy.update_performance(performance.clone());

        info!(
            strategy = %strategy.id,
            archetype = %strategy.archetype,
            days = request.days(),
            from = transition.previous.as_str(),
            to = transition.current.as_str(),
            "Backtest complete"
        );

        Ok(BacktestReport {
            strategy_id: strategy.id.clone(),
            strategy_name: strategy.name.clone(),
            start_date: request.start_date,
            end_date: request.end_date,
            initial_capital: request.initial_capital,
            final_capital,
            profit_factor: summary.profit_factor,
            performance,
            transition,
        })
    }
}
