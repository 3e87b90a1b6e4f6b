pub mod cart;
pub mod catalog;
pub mod orders;
pub mod ratings;
pub mod recently_viewed;
pub mod wishlist;

pub use cart::{AddToCartInput, CartItemWithProduct, CartService, CartWithItems};
pub use catalog::{CatalogService, PriceRange, ProductFilter, ProductSort};
pub use orders::{OrderItemWithProduct, OrderService, OrderWithItems};
pub use ratings::{ProductRatingSummary, RateResult, RatingService};
pub use recently_viewed::{RecentlyViewedService, RecentlyViewedWithProduct};
pub use wishlist::{WishlistItemWithProduct, WishlistService, WishlistToggle};
