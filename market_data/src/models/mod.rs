pub mod bar;
pub mod date_range;

pub use bar::{Bar, BarSeries};
pub use date_range::DateRange;
