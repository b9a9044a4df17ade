pub mod panel;
pub mod refresh;

pub use panel::{ChartPanel, PanelSource};
pub use refresh::{write_snapshot, Dashboard, RefreshLoop};
