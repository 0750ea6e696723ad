//! Per-ticker fundamental and market metrics.
//!
//! Every field is optional. An absent value means the provider could not
//! supply it and is never the same thing as zero: scoring skips absent
//! inputs and screening applies the missing-field policy.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub ticker: String,
    pub trailing_pe: Option<f64>,
    pub forward_pe: Option<f64>,
    pub profit_margin: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub market_cap: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub beta: Option<f64>,
    pub price_to_book: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub revenue_growth: Option<f64>,
    /// Percent return over roughly the last three months (10.0 = +10%).
    pub return_3m: Option<f64>,
    /// Percent return over roughly the last six months.
    pub return_6m: Option<f64>,
    /// Current price as a percentage of the 52-week high.
    pub proximity_52w: Option<f64>,
}

impl MetricsSnapshot {
    /// Snapshot with every field absent, used when the provider has nothing.
    pub fn absent(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            ..Self::default()
        }
    }

    /// Trailing P/E when present, otherwise forward P/E.
    pub fn pe_used(&self) -> Option<f64> {
        self.trailing_pe.or(self.forward_pe)
    }

    pub fn is_all_absent(&self) -> bool {
        *self == Self::absent(&self.ticker)
    }

    /// Drops non-finite values so NaN or infinity can never reach scoring.
    pub fn sanitized(self) -> Self {
        let keep = |v: Option<f64>| v.filter(|x| x.is_finite());
        Self {
            ticker: self.ticker,
            trailing_pe: keep(self.trailing_pe),
            forward_pe: keep(self.forward_pe),
            profit_margin: keep(self.profit_margin),
            return_on_equity: keep(self.return_on_equity),
            debt_to_equity: keep(self.debt_to_equity),
            market_cap: keep(self.market_cap),
            dividend_yield: keep(self.dividend_yield),
            beta: keep(self.beta),
            price_to_book: keep(self.price_to_book),
            peg_ratio: keep(self.peg_ratio),
            revenue_growth: keep(self.revenue_growth),
            return_3m: keep(self.return_3m),
            return_6m: keep(self.return_6m),
            proximity_52w: keep(self.proximity_52w),
        }
    }
}
