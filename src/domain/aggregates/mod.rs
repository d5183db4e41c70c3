//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;
pub mod category;

pub use product::{Product, ProductError, ProductStatus, Variant, VariantOption};
pub use order::{Order, OrderError, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress};
pub use cart::{Cart, CartError, CartItem, CartStatus, PriceCorrection};
pub use category::Category;
