use std::sync::Arc;

use crate::{
    data::{domain::TickIndex, row::ActionRow, table::SymbolData},
    error::{DataError, GymResult},
};

/// Forward-only cursor over one symbol's aligned action and observation tables.
///
/// The feed never mutates the tables; its only state is the cursor. Clones share the
/// underlying data through an [`Arc`] so that independent environment copies stay cheap.
#[derive(Debug, Clone)]
pub struct TickFeed {
    data: Arc<SymbolData>,
    cursor: TickIndex,
}

impl TickFeed {
    pub fn new(data: Arc<SymbolData>) -> Self {
        Self {
            data,
            cursor: TickIndex(0),
        }
    }

    /// Total number of rows in both tables.
    pub fn num_ticks(&self) -> usize {
        self.data.num_rows()
    }

    pub fn cursor(&self) -> TickIndex {
        self.cursor
    }

    /// Execution row at the cursor.
    pub fn current_row(&self) -> GymResult<ActionRow<'_>> {
        self.data.action_row(self.cursor.0)
    }

    /// Feature row at the cursor, handed to the agent verbatim.
    pub fn current_observation_row(&self) -> GymResult<&[f64]> {
        self.data.observation().row(self.cursor.0)
    }

    /// Feature row at an arbitrary index, used to seed observation windows.
    pub fn observation_row(&self, index: usize) -> GymResult<&[f64]> {
        self.data.observation().row(index)
    }

    pub fn advance(&mut self) {
        self.cursor.0 += 1;
    }

    /// `true` once the cursor sits on (or beyond) the last row.
    pub fn is_exhausted(&self) -> bool {
        self.cursor.0 + 1 >= self.num_ticks()
    }

    /// `true` when the current row is the last one an episode will step on.
    ///
    /// Stepping on it advances the cursor onto the final row, which exhausts the feed.
    pub fn is_final_step(&self) -> bool {
        self.cursor.0 + 2 >= self.num_ticks()
    }

    /// Positions the cursor right after the `window_size` rows that seed an observation.
    ///
    /// # Errors
    /// The tables must hold at least `window_size + 2` rows: the seed rows plus one row to
    /// step on and the final row the episode ends on.
    pub fn rewind(&mut self, window_size: usize) -> GymResult<()> {
        let required = window_size + 2;
        if self.num_ticks() < required {
            return Err(DataError::InsufficientRows {
                required,
                found: self.num_ticks(),
                msg: format!("window of {window_size} seed rows leaves no tick to step on"),
            }
            .into());
        }
        self.cursor = TickIndex(window_size);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::data::{domain::Price, table::TickTable};

    use super::*;

    fn feed(n: usize) -> TickFeed {
        let action = (0..n)
            .map(|i| {
                let px = 1.0 + i as f64;
                vec![px + 0.5, px - 0.5, px, px, 1.0, 1.0, 1.0, 3.0, 12.0, 0.0]
            })
            .collect();
        let observation = (0..n).map(|i| vec![i as f64, -(i as f64)]).collect();
        let data = SymbolData::new(
            TickTable::from_rows(action).expect("action"),
            TickTable::from_rows(observation).expect("observation"),
        )
        .expect("aligned tables");
        TickFeed::new(Arc::new(data))
    }

    #[test]
    fn test_feed_reads_both_tables_at_cursor() {
        let mut feed = feed(6);
        feed.rewind(2).expect("enough rows");

        assert_eq!(feed.cursor(), TickIndex(2));
        assert_eq!(feed.current_row().expect("row").close, Price(3.0));
        assert_eq!(feed.current_observation_row().expect("obs"), &[2.0, -2.0]);

        feed.advance();
        assert_eq!(feed.current_row().expect("row").close, Price(4.0));
        assert_eq!(feed.current_observation_row().expect("obs"), &[3.0, -3.0]);
    }

    #[test]
    fn test_feed_exhaustion_boundaries() {
        let mut feed = feed(5);
        feed.rewind(2).expect("enough rows");

        // cursor 2 of rows 0..5
        assert!(!feed.is_final_step());
        feed.advance();
        // cursor 3: stepping here moves onto the last row
        assert!(feed.is_final_step());
        assert!(!feed.is_exhausted());
        feed.advance();
        assert!(feed.is_exhausted());
    }

    #[test]
    fn test_feed_rewind_requires_room_to_step() {
        let mut feed = feed(3);
        assert!(feed.rewind(1).is_ok());
        assert!(feed.rewind(2).is_err(), "2 seed rows + 2 stepping rows > 3");
    }

    #[test]
    fn test_feed_clones_share_data_but_not_cursor() {
        let mut a = feed(6);
        a.rewind(1).expect("enough rows");
        let b = a.clone();
        a.advance();
        assert_eq!(a.cursor(), TickIndex(2));
        assert_eq!(b.cursor(), TickIndex(1));
    }
}
