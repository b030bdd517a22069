//! Database Models
//!
//! Entities and their create/update payloads. Wire format keeps the
//! storefront's Spanish camelCase vocabulary (`numeroPedido`, `estadoPago`).

pub mod category;
pub mod order;
pub mod product;
pub mod user;

pub use category::{Category, CategoryCreate, CategoryDetail, CategoryUpdate};
pub use order::{
    Order, OrderDetail, OrderItem, OrderItemDraft, OrderStatus, OrderUpdate, PaymentStatus,
};
pub use product::{
    Product, ProductCreate, ProductDetail, ProductListItem, ProductUpdate, Variant, VariantCreate,
};
pub use user::{LoginRequest, LoginResponse, ROLE_ADMIN, ROLE_CLIENTE, User, UserPublic};
