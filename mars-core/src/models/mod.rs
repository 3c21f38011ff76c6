pub mod gaussian;
pub mod molecule;
pub mod segment;

// re-export for cleaner imports
pub use self::gaussian::Gaussian;
pub use self::molecule::Molecule;
pub use self::segment::{SEGMENT_COLUMNS, Segment, UID_COLUMN, is_contiguous, segment_table_name};
