use std::collections::VecDeque;

const TENKAN_PERIOD: usize = 9;
const KIJUN_PERIOD: usize = 26;
const SPAN_B_PERIOD: usize = 52;
const HISTORY_LEN: usize = 60;
/// The cloud in effect now is the span pair projected 26 bars ago.
const CLOUD_SHIFT: usize = 26;

#[derive(Debug, Clone, Copy)]
pub struct IchimokuState {
    pub tenkan: f64,
    pub kijun: f64,
    pub span_a: f64,
    pub span_b: f64,
    /// +1 above the cloud, -1 below, 0 inside.
    pub state: i8,
    pub thick: f64,
}

/// Incremental Ichimoku accumulator over 9/26/52 high-low windows.
#[derive(Debug, Clone)]
pub struct IchimokuAccumulator {
    highs_9: VecDeque<f64>,
    lows_9: VecDeque<f64>,
    highs_26: VecDeque<f64>,
    lows_26: VecDeque<f64>,
    highs_52: VecDeque<f64>,
    lows_52: VecDeque<f64>,
    history: VecDeque<(f64, f64)>,
}

fn push_bounded(queue: &mut VecDeque<f64>, value: f64, cap: usize) {
    if queue.len() == cap {
        queue.pop_front();
    }
    queue.push_back(value);
}

fn window_max(queue: &VecDeque<f64>) -> f64 {
    queue.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn window_min(queue: &VecDeque<f64>) -> f64 {
    queue.iter().copied().fold(f64::INFINITY, f64::min)
}

impl IchimokuAccumulator {
    pub fn new() -> Self {
        Self {
            highs_9: VecDeque::with_capacity(TENKAN_PERIOD),
            lows_9: VecDeque::with_capacity(TENKAN_PERIOD),
            highs_26: VecDeque::with_capacity(KIJUN_PERIOD),
            lows_26: VecDeque::with_capacity(KIJUN_PERIOD),
            highs_52: VecDeque::with_capacity(SPAN_B_PERIOD),
            lows_52: VecDeque::with_capacity(SPAN_B_PERIOD),
            history: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    pub fn update(&mut self, high: f64, low: f64, close: f64) -> IchimokuState {
        push_bounded(&mut self.highs_9, high, TENKAN_PERIOD);
        push_bounded(&mut self.lows_9, low, TENKAN_PERIOD);
        push_bounded(&mut self.highs_26, high, KIJUN_PERIOD);
        push_bounded(&mut self.lows_26, low, KIJUN_PERIOD);
        push_bounded(&mut self.highs_52, high, SPAN_B_PERIOD);
        push_bounded(&mut self.lows_52, low, SPAN_B_PERIOD);

        let tenkan = (window_max(&self.highs_9) + window_min(&self.lows_9)) / 2.0;
        let kijun = (window_max(&self.highs_26) + window_min(&self.lows_26)) / 2.0;
        let span_a_now = (tenkan + kijun) / 2.0;
        let span_b_now = (window_max(&self.highs_52) + window_min(&self.lows_52)) / 2.0;

        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back((span_a_now, span_b_now));

        let (span_a, span_b) = if self.history.len() >= CLOUD_SHIFT {
            self.history[self.history.len() - CLOUD_SHIFT]
        } else {
            (span_a_now, span_b_now)
        };

        let state = if close > span_a.max(span_b) {
            1
        } else if close < span_a.min(span_b) {
            -1
        } else {
            0
        };

        IchimokuState {
            tenkan,
            kijun,
            span_a,
            span_b,
            state,
            thick: (span_a - span_b).abs(),
        }
    }
}

impl Default for IchimokuAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
