use crate::stats::{mean, percentile, population_std};
use std::collections::VecDeque;

const BOLLINGER_PERIOD: usize = 20;
const BOLLINGER_MULT: f64 = 2.0;
/// Two trading days of 1-minute widths.
const WIDTH_WINDOW: usize = 2 * 390;
const SQUEEZE_MIN_SAMPLES: usize = 50;
const SQUEEZE_PERCENTILE: f64 = 15.0;
const RSI_PERIOD: usize = 14;

#[derive(Debug, Clone, Copy)]
pub struct BollingerState {
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
    pub width: f64,
    pub squeeze: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TechnicalsState {
    pub vwap: f64,
    /// RSI rescaled to [-1, 1], 0 = neutral.
    pub rsi: f64,
    pub bb: BollingerState,
}

/// Incremental VWAP / Bollinger / RSI accumulator.
///
/// VWAP is session-cumulative and never resets. Bollinger uses the last 20
/// closes with population std; the squeeze flag compares the current band
/// width against the 15th percentile of a rolling two-day width window.
#[derive(Debug, Clone)]
pub struct TechnicalsAccumulator {
    vwap_num: f64,
    vwap_denom: f64,
    closes: VecDeque<f64>,
    widths: VecDeque<f64>,
    gains: VecDeque<f64>,
    losses: VecDeque<f64>,
    prev_close: Option<f64>,
}

impl TechnicalsAccumulator {
    pub fn new() -> Self {
        Self {
            vwap_num: 0.0,
            vwap_denom: 0.0,
            closes: VecDeque::with_capacity(BOLLINGER_PERIOD),
            widths: VecDeque::with_capacity(WIDTH_WINDOW),
            gains: VecDeque::with_capacity(RSI_PERIOD),
            losses: VecDeque::with_capacity(RSI_PERIOD),
            prev_close: None,
        }
    }

    pub fn update(&mut self, price: f64, volume: f64) -> TechnicalsState {
        self.vwap_num += price * volume;
        self.vwap_denom += volume;
        let vwap = if self.vwap_denom > 0.0 {
            self.vwap_num / self.vwap_denom
        } else {
            price
        };

        let bb = self.update_bollinger(price);
        let rsi = self.update_rsi(price);
        self.prev_close = Some(price);

        TechnicalsState { vwap, rsi, bb }
    }

    fn update_bollinger(&mut self, price: f64) -> BollingerState {
        if self.closes.len() == BOLLINGER_PERIOD {
            self.closes.pop_front();
        }
        self.closes.push_back(price);

        let (middle, upper, lower, width) = if self.closes.len() >= BOLLINGER_PERIOD {
            let closes: Vec<f64> = self.closes.iter().copied().collect();
            let mb = mean(&closes);
            let sd = population_std(&closes);
            let ub = mb + BOLLINGER_MULT * sd;
            let lb = mb - BOLLINGER_MULT * sd;
            let w = if mb > 0.0 { (ub - lb) / mb } else { 0.0 };
            (mb, ub, lb, w)
        } else {
            (price, price, price, 0.0)
        };

        if self.widths.len() == WIDTH_WINDOW {
            self.widths.pop_front();
        }
        self.widths.push_back(width);

        let squeeze = self.widths.len() > SQUEEZE_MIN_SAMPLES && {
            let widths: Vec<f64> = self.widths.iter().copied().collect();
            width <= percentile(&widths, SQUEEZE_PERCENTILE)
        };

        BollingerState {
            middle,
            upper,
            lower,
            width,
            squeeze,
        }
    }

    fn update_rsi(&mut self, price: f64) -> f64 {
        let mut rsi = 50.0;
        if let Some(prev) = self.prev_close {
            let change = price - prev;
            if self.gains.len() == RSI_PERIOD {
                self.gains.pop_front();
            }
            if self.losses.len() == RSI_PERIOD {
                self.losses.pop_front();
            }
            self.gains.push_back(change.max(0.0));
            self.losses.push_back((-change).max(0.0));

            if self.gains.len() == RSI_PERIOD && self.losses.len() == RSI_PERIOD {
                let gains: Vec<f64> = self.gains.iter().copied().collect();
                let losses: Vec<f64> = self.losses.iter().copied().collect();
                let avg_gain = mean(&gains);
                let avg_loss = mean(&losses);
                if avg_loss > 0.0 {
                    let rs = avg_gain / avg_loss;
                    rsi = 100.0 - 100.0 / (1.0 + rs);
                } else if avg_gain > 0.0 {
                    rsi = 100.0;
                }
            }
        }
        (rsi - 50.0) / 50.0
    }
}

impl Default for TechnicalsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
