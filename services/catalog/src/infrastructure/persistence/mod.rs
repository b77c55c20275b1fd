//! Persistence implementations

pub mod materializer;
mod product_repository;

pub use product_repository::SessionProductRepository;
