use super::error::{SaleError, SaleResult};
use super::window::SaleWindow;
use super::{MAX_BOUNDARIES, MAX_STEPS};

/// Ordered partition of a sale window into numbered steps.
///
/// Step `k` (1-based) ends at `boundaries[k - 1]`; the last step always ends
/// at the closing time. A due date belongs to the step it ends, so a lookup
/// at exactly `boundaries[k - 1]` resolves to step `k`.
#[derive(Debug, Clone)]
pub struct StepTable {
    window: SaleWindow,
    boundaries: Vec<u64>, // strictly increasing, inside (opening, closing)
}

impl StepTable {
    /// A fresh table has a single step covering the whole window.
    pub fn new(window: SaleWindow) -> Self {
        Self {
            window,
            boundaries: Vec::new(),
        }
    }

    pub fn window(&self) -> &SaleWindow {
        &self.window
    }

    pub fn boundaries(&self) -> &[u64] {
        &self.boundaries
    }

    /// Append a due date and return the step number it now ends.
    /// The closing time moves to the step after it.
    pub fn add_step(&mut self, due_date: u64) -> SaleResult<u8> {
        if self.boundaries.len() >= MAX_BOUNDARIES {
            return Err(SaleError::CapacityExceeded { max: MAX_STEPS });
        }
        if due_date <= self.window.opening() {
            return Err(SaleError::InvalidStep("due date must be after opening time"));
        }
        if due_date >= self.window.closing() {
            return Err(SaleError::InvalidStep("due date must be before closing time"));
        }
        if let Some(&last) = self.boundaries.last() {
            if due_date <= last {
                return Err(SaleError::InvalidStep(
                    "due date must be after the previous due date",
                ));
            }
        }

        self.boundaries.push(due_date);
        Ok(self.boundaries.len() as u8)
    }

    /// Number of steps, the closing step included. Always >= 1.
    pub fn step_count(&self) -> u8 {
        (self.boundaries.len() + 1) as u8
    }

    /// Resolve `now` to the step that owns it.
    ///
    /// Anything at or before the first due date (including any time before
    /// opening) is step 1; anything after the last due date, including times
    /// past closing, is the closing step.
    pub fn current_step(&self, now: u64) -> u8 {
        let passed = self.boundaries.partition_point(|&due| due < now);
        (passed + 1) as u8
    }

    /// Step whose due date is exactly `timestamp`.
    pub fn step_of(&self, timestamp: u64) -> Option<u8> {
        if timestamp == self.window.closing() {
            return Some(self.step_count());
        }
        self.boundaries
            .binary_search(&timestamp)
            .ok()
            .map(|idx| (idx + 1) as u8)
    }

    /// Due date of `step`; the closing time for the last step.
    pub fn due_date(&self, step: u8) -> SaleResult<u64> {
        self.ensure_step(step)?;
        Ok(self
            .boundaries
            .get(step as usize - 1)
            .copied()
            .unwrap_or(self.window.closing()))
    }

    /// Range check shared with the rate schedule.
    pub fn ensure_step(&self, step: u8) -> SaleResult<()> {
        if step == 0 || step > self.step_count() {
            return Err(SaleError::InvalidStep("step number out of range"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::StepTable;
    use crate::sale::window::SaleWindow;
    use crate::sale::{MAX_BOUNDARIES, MAX_STEPS, SaleError};

    fn table(opening: u64, closing: u64) -> StepTable {
        StepTable::new(SaleWindow::new(opening, closing, opening).unwrap())
    }

    #[test]
    fn starts_with_one_step() {
        let t = table(1000, 2000);
        assert_eq!(t.step_count(), 1);
        assert_eq!(t.current_step(1500), 1);
        assert_eq!(t.step_of(2000), Some(1));
        assert_eq!(t.due_date(1).unwrap(), 2000);
    }

    #[test]
    fn add_step_assigns_numbers_and_remaps_closing() {
        let mut t = table(1000, 2000);
        assert_eq!(t.add_step(1500).unwrap(), 1);
        assert_eq!(t.step_of(1500), Some(1));
        assert_eq!(t.step_of(2000), Some(2));

        assert_eq!(t.add_step(1800).unwrap(), 2);
        assert_eq!(t.step_of(1800), Some(2));
        assert_eq!(t.step_of(2000), Some(3));
        assert_eq!(t.step_count(), 3);
        assert_eq!(t.step_of(1700), None);
    }

    #[test]
    fn step_count_tracks_successful_inserts() {
        let mut t = table(0, 10_000);
        for (n, due) in (100..=1000).step_by(100).enumerate() {
            t.add_step(due).unwrap();
            assert_eq!(t.step_count() as usize, n + 2);
        }
    }

    #[test]
    fn rejects_out_of_order_due_date_without_mutation() {
        let mut t = table(1000, 2000);
        t.add_step(1500).unwrap();

        assert!(matches!(t.add_step(1500), Err(SaleError::InvalidStep(_))));
        assert!(matches!(t.add_step(1400), Err(SaleError::InvalidStep(_))));
        assert_eq!(t.step_count(), 2);
        assert_eq!(t.boundaries(), &[1500]);
    }

    #[test]
    fn rejects_due_dates_outside_window() {
        let mut t = table(1000, 2000);
        assert!(matches!(t.add_step(1000), Err(SaleError::InvalidStep(_))));
        assert!(matches!(t.add_step(900), Err(SaleError::InvalidStep(_))));
        assert!(matches!(t.add_step(2000), Err(SaleError::InvalidStep(_))));
        assert!(matches!(t.add_step(2500), Err(SaleError::InvalidStep(_))));
        assert_eq!(t.step_count(), 1);
    }

    #[test]
    fn capacity_is_255_steps() {
        let mut t = table(0, 1_000);
        for due in 1..=MAX_BOUNDARIES as u64 {
            t.add_step(due).unwrap();
        }
        assert_eq!(t.step_count() as usize, MAX_STEPS);

        let err = t.add_step(500).unwrap_err();
        assert_eq!(err, SaleError::CapacityExceeded { max: MAX_STEPS });
        assert_eq!(t.step_count() as usize, MAX_STEPS);
        assert_eq!(t.step_of(1_000), Some(255));
    }

    #[test]
    fn full_table_reports_capacity_before_date_checks() {
        let mut t = table(0, 1_000);
        for due in 1..=MAX_BOUNDARIES as u64 {
            t.add_step(due).unwrap();
        }
        let full = SaleError::CapacityExceeded { max: MAX_STEPS };
        // out of order, at opening, at closing: capacity wins every time
        assert_eq!(t.add_step(5).unwrap_err(), full);
        assert_eq!(t.add_step(0).unwrap_err(), full);
        assert_eq!(t.add_step(1_000).unwrap_err(), full);
        assert_eq!(t.boundaries().len(), MAX_BOUNDARIES);
    }

    #[test]
    fn before_opening_resolves_to_first_step() {
        let mut t = table(1000, 2000);
        t.add_step(1500).unwrap();
        assert_eq!(t.current_step(0), 1);
        assert_eq!(t.current_step(1000), 1);
    }

    #[test]
    fn after_closing_resolves_to_closing_step() {
        let mut t = table(1000, 2000);
        t.add_step(1200).unwrap();
        t.add_step(1400).unwrap();
        assert_eq!(t.current_step(2001), t.step_of(2000).unwrap());
        assert_eq!(t.current_step(u64::MAX), 3);
    }

    #[test]
    fn due_date_belongs_to_the_step_it_ends() {
        let mut t = table(1000, 2000);
        t.add_step(1200).unwrap();
        t.add_step(1400).unwrap();

        // first boundary
        assert_eq!(t.current_step(1199), 1);
        assert_eq!(t.current_step(1200), 1);
        assert_eq!(t.current_step(1201), 2);
        // later boundary
        assert_eq!(t.current_step(1400), 2);
        assert_eq!(t.current_step(1401), 3);
        // closing
        assert_eq!(t.current_step(2000), 3);
    }

    #[test]
    fn current_step_is_side_effect_free() {
        let mut t = table(1000, 2000);
        t.add_step(1500).unwrap();
        let first = t.current_step(1700);
        let second = t.current_step(1700);
        assert_eq!(first, second);
        assert_eq!(t.step_count(), 2);
    }

    #[test]
    fn due_date_lookup_checks_range() {
        let mut t = table(1000, 2000);
        t.add_step(1500).unwrap();
        assert_eq!(t.due_date(1).unwrap(), 1500);
        assert_eq!(t.due_date(2).unwrap(), 2000);
        assert!(matches!(t.due_date(0), Err(SaleError::InvalidStep(_))));
        assert!(matches!(t.due_date(3), Err(SaleError::InvalidStep(_))));
    }
}
