mod common;
mod pms1;
mod pms2;
mod unknown;

pub use common::{CanonicalField, ColumnMap};
pub use pms1::{Pms1Format, PMS1_COLUMNS};
pub use pms2::{Pms2Format, PMS2_FUTURE_COLUMNS, PMS2_PAST_COLUMNS};
pub use unknown::UnknownFormat;
