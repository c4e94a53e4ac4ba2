mod context;
mod facets;
mod panel;

pub use context::FilterContext;
pub use facets::FacetService;
pub use panel::{FilterPanel, PanelOptions};
