pub mod process;
pub mod store_client;

pub use process::TokioProcessSpawner;
pub use store_client::StoreClient;
