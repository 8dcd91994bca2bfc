use std::collections::VecDeque;

/// Number of readings each sensor channel averages over.
pub const SMOOTHING_WINDOW: usize = 10;

/// Pushes `value` into `history`, drops the oldest readings until at most
/// `window` remain, and returns the rounded mean of what is left.
///
/// A window of zero behaves like a window of one.
pub fn smooth(history: &mut VecDeque<f64>, value: f64, window: usize) -> f64 {
    let window = window.max(1);
    history.push_back(value);
    while history.len() > window {
        history.pop_front();
    }
    let sum: f64 = history.iter().sum();
    (sum / history.len() as f64).round()
}
