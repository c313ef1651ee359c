pub mod navigation;
pub mod picker;
pub mod progress;
pub mod snapshot;
pub mod week_grid;

pub use navigation::{Navigation, WeekCursor, WeekStep};
pub use picker::{BoundarySignal, DragOutcome, ScaleTick, TargetPicker};
pub use snapshot::{DataOrigin, TrendSnapshot};
