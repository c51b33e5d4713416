pub mod dynamo;
pub mod memory;
pub mod repository;
pub mod seed;
pub mod store;

pub use dynamo::DynamoDocumentStore;
pub use memory::MemoryDocumentStore;
pub use repository::{OwnedData, Repository};
pub use seed::{default_seed, SeedData, SeedRecord};
pub use store::{DocumentStore, SortDirection};
