//! Cart and order price reconciliation.
//!
//! Three steps, each usable on its own:
//! - [`Product::resolve`](crate::domain::aggregates::Product::resolve) finds the option for a SKU
//! - [`reconcile`] decides the authoritative unit price of a line
//! - [`aggregate`] folds reconciled lines into cart/order totals
//!
//! [`enrich`] combines them into the item shape returned to the dashboard.

mod enrich;
mod reconcile;
mod totals;

pub use enrich::{enrich_lines, EnrichedItem, EnrichedLines, VariantView};
pub use reconcile::{reconcile, PricedLine, Reconciled};
pub use totals::{aggregate, DisplayPricing, Totals};
