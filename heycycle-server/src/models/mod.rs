mod power_status;
mod step;
mod token;

pub use power_status::{PowerStatus, PowerStatusTable};
pub use step::{CycleGroup, Step};
pub use token::Token;

use time::{OffsetDateTime, PrimitiveDateTime};

pub trait Table {
    /// The name of the table
    fn name(&self) -> &'static str;

    /// The SQL statement to create the table
    fn create(&self) -> String;

    /// The SQL statement to dispose the table
    fn dispose(&self) -> String;
}

/// Local wall clock time at second precision, the way token stamps and status rows are written.
pub fn local_now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let time = now.time().replace_nanosecond(0).unwrap_or(now.time());

    PrimitiveDateTime::new(now.date(), time)
}
