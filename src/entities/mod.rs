pub mod cart;
pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod product;
pub mod rating;
pub mod recently_viewed;
pub mod user;
pub mod wishlist_item;

// Re-export entities
pub use cart::{Entity as Cart, Model as CartModel};
pub use cart_item::{Entity as CartItem, Model as CartItemModel};
pub use order::{Entity as Order, Model as OrderModel, OrderStatus};
pub use order_item::{Entity as OrderItem, Model as OrderItemModel};
pub use product::{Entity as Product, Model as ProductModel};
pub use rating::{Entity as Rating, Model as RatingModel};
pub use recently_viewed::{Entity as RecentlyViewed, Model as RecentlyViewedModel};
pub use user::{Entity as User, Model as UserModel};
pub use wishlist_item::{Entity as WishlistItem, Model as WishlistItemModel};
