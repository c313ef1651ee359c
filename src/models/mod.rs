pub mod profile;
pub mod progress;
pub mod record;
pub mod week;

pub use profile::{Gender, ProfileSnapshot, UserProfile};
pub use progress::{BmiCategory, ProgressResult, WeightProgress};
pub use record::{WeightRecord, WeightUnit};
pub use week::{DAYS_PER_WEEK, DayCell, DayLabels, DayTrend, WeekGrid, WeekHistory};
