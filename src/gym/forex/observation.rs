use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::{
    error::{DataError, GymResult},
    sim::feed::TickFeed,
};

// ================================================================================================
// Ring Buffer
// ================================================================================================

/// Fixed-capacity sequence that evicts its oldest element on every push.
///
/// The buffer is always full: it is created with `capacity` copies of a fill value and
/// every [`push`](Self::push) replaces exactly one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingBuffer<T> {
    items: Vec<T>,
    /// Slot holding the oldest element, which is also the next slot written.
    head: usize,
}

impl<T: Clone> RingBuffer<T> {
    pub fn filled(capacity: usize, value: T) -> Self {
        Self {
            items: vec![value; capacity],
            head: 0,
        }
    }
}

impl<T> RingBuffer<T> {
    /// Appends `value` as the newest element and returns the evicted oldest one.
    pub fn push(&mut self, value: T) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let evicted = std::mem::replace(&mut self.items[self.head], value);
        self.head = (self.head + 1) % self.items.len();
        Some(evicted)
    }

    /// Elements from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let (newer, older) = self.items.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    pub fn newest(&self) -> Option<&T> {
        let len = self.items.len();
        (len > 0).then(|| &self.items[(self.head + len - 1) % len])
    }

    pub fn oldest(&self) -> Option<&T> {
        self.items.get(self.head)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.items.len()
    }
}

// ================================================================================================
// Observation Windows
// ================================================================================================

/// Sliding window over the leading `num_features` observation columns of one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationWindow {
    channels: Vec<RingBuffer<f64>>,
}

impl ObservationWindow {
    pub fn new(num_features: usize, window_size: usize) -> Self {
        Self {
            channels: vec![RingBuffer::filled(window_size, 0.0); num_features],
        }
    }

    /// Fills the window with the first `window_size` rows of the feed's observation table.
    pub fn seed(&mut self, feed: &TickFeed) -> GymResult<()> {
        let window_size = self.window_size();
        for index in 0..window_size {
            self.push_row(feed.observation_row(index)?)?;
        }
        Ok(())
    }

    /// Appends one value per channel taken from the leading columns of `row`.
    pub fn push_row(&mut self, row: &[f64]) -> GymResult<()> {
        if row.len() < self.channels.len() {
            return Err(DataError::InsufficientColumns {
                required: self.channels.len(),
                found: row.len(),
                msg: "observation row is narrower than the number of features".to_string(),
            }
            .into());
        }
        for (channel, &value) in self.channels.iter_mut().zip(row) {
            channel.push(value);
        }
        Ok(())
    }

    pub fn channels(&self) -> &[RingBuffer<f64>] {
        &self.channels
    }

    /// Values of one feature, oldest first.
    pub fn channel(&self, feature: usize) -> Option<impl Iterator<Item = f64> + '_> {
        self.channels
            .get(feature)
            .map(|channel| channel.iter().copied())
    }

    /// The most recent value of every channel.
    pub fn latest(&self) -> Vec<f64> {
        self.channels
            .iter()
            .filter_map(|channel| channel.newest().copied())
            .collect()
    }

    pub fn num_features(&self) -> usize {
        self.channels.len()
    }

    pub fn window_size(&self) -> usize {
        self.channels.first().map_or(0, RingBuffer::capacity)
    }
}

/// The state returned to the agent: one [`ObservationWindow`] per symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    windows: Vec<ObservationWindow>,
}

impl Observation {
    pub fn new(num_symbols: usize, num_features: usize, window_size: usize) -> Self {
        Self {
            windows: vec![ObservationWindow::new(num_features, window_size); num_symbols],
        }
    }

    pub fn windows(&self) -> &[ObservationWindow] {
        &self.windows
    }

    pub fn window(&self, symbol: usize) -> Option<&ObservationWindow> {
        self.windows.get(symbol)
    }

    pub(crate) fn windows_mut(&mut self) -> &mut [ObservationWindow] {
        &mut self.windows
    }

    /// Dense tensor of shape `(num_symbols, num_features, window_size)`, oldest value first
    /// along the last axis.
    pub fn to_array(&self) -> Array3<f64> {
        let num_features = self.windows.first().map_or(0, ObservationWindow::num_features);
        let window_size = self.windows.first().map_or(0, ObservationWindow::window_size);

        let mut array = Array3::zeros((self.windows.len(), num_features, window_size));
        for (s, window) in self.windows.iter().enumerate() {
            for (f, channel) in window.channels().iter().enumerate() {
                for (t, value) in channel.iter().enumerate() {
                    array[[s, f, t]] = *value;
                }
            }
        }
        array
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::data::table::{SymbolData, TickTable};

    use super::*;

    #[test]
    fn test_ring_buffer_evicts_oldest() {
        let mut ring = RingBuffer::filled(3, 0);
        assert_eq!(ring.push(1), Some(0));
        assert_eq!(ring.push(2), Some(0));
        assert_eq!(ring.push(3), Some(0));
        assert_eq!(ring.push(4), Some(1));

        assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(ring.oldest(), Some(&2));
        assert_eq!(ring.newest(), Some(&4));
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn test_zero_capacity_ring_ignores_pushes() {
        let mut ring: RingBuffer<f64> = RingBuffer::filled(0, 0.0);
        assert_eq!(ring.push(1.0), None);
        assert!(ring.is_empty());
        assert_eq!(ring.newest(), None);
    }

    #[test]
    fn test_window_seeds_from_first_rows() {
        let action = (0..6)
            .map(|_| vec![1.1, 1.0, 1.05, 1.05, 1.0, 1.0, 1.0, 3.0, 12.0, 0.0])
            .collect();
        let observation = (0..6).map(|i| vec![i as f64, 10.0 * i as f64, -1.0]).collect();
        let data = SymbolData::new(
            TickTable::from_rows(action).expect("action"),
            TickTable::from_rows(observation).expect("observation"),
        )
        .expect("aligned");
        let feed = TickFeed::new(Arc::new(data));

        let mut window = ObservationWindow::new(2, 3);
        window.seed(&feed).expect("seed");
        assert_eq!(
            window.channel(0).expect("channel").collect::<Vec<_>>(),
            vec![0.0, 1.0, 2.0]
        );
        assert_eq!(
            window.channel(1).expect("channel").collect::<Vec<_>>(),
            vec![0.0, 10.0, 20.0]
        );

        window.push_row(&[3.0, 30.0, -1.0]).expect("push");
        assert_eq!(window.latest(), vec![3.0, 30.0]);
        assert_eq!(
            window.channel(0).expect("channel").collect::<Vec<_>>(),
            vec![1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn test_narrow_row_is_rejected() {
        let mut window = ObservationWindow::new(3, 2);
        assert!(window.push_row(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_observation_tensor_layout() {
        let mut obs = Observation::new(2, 2, 3);
        for t in 0..3 {
            let t = t as f64;
            obs.windows_mut()[0].push_row(&[t, t + 100.0]).expect("push");
            obs.windows_mut()[1].push_row(&[-t, -t - 100.0]).expect("push");
        }

        let array = obs.to_array();
        assert_eq!(array.shape(), &[2, 2, 3]);
        assert_eq!(array[[0, 0, 2]], 2.0);
        assert_eq!(array[[0, 1, 0]], 100.0);
        assert_eq!(array[[1, 1, 2]], -102.0);
    }
}
