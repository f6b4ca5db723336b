//! Storage adapters for skiff: the in-RAM vector index and chat stores.

pub mod chat_store;
pub mod ram_vec;
pub mod vector;

pub use chat_store::{FileChatStore, InMemoryChatStore};
pub use ram_vec::RamVec;
pub use vector::{cosine_similarity, rank, split_windows};
