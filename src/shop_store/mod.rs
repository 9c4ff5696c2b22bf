mod models;
mod null_store;
mod schema;
mod store;
mod trait_def;

pub use models::{ShopRecord, SmokingStatus};
pub use null_store::NullShopStore;
pub use store::SqliteShopStore;
pub use trait_def::ShopStore;
