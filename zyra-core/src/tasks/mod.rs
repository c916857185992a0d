pub mod collection_fill;
pub mod panel_refresh;
