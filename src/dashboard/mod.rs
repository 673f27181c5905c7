pub mod config;
pub mod dashboard;
pub mod layout;
pub mod lifecycle;
pub mod schedule;
pub mod store;
pub mod widgets;

pub use config::{DashboardConfig, WidgetSlotConfig, WidgetWidth};
pub use dashboard::{Dashboard, DashboardContext, LayoutCommand};
pub use layout::{closest_center, place_entries, DashboardLayout, Placement, WidgetEntry};
pub use lifecycle::{FallbackHandling, Feed, FetchTicket, Settled, WidgetLifecycle, WidgetStatus};
pub use schedule::{RefreshScheduler, RefreshSubscription};
pub use store::{DashboardAction, DashboardStore, RedditState, SharedDashboardState};
pub use widgets::{Widget, WidgetAction, WidgetFactory, WidgetRegistry};
