//! book-catalog
//!
//! HTTP (axum) <-> application::CatalogService <-> domain::CatalogRepository <-> SQLite

pub mod config;

pub mod domain {
    pub mod error;
    pub mod model {
        pub mod book;
        pub mod id;
    }
    pub mod repository;
}

pub mod application {
    pub mod error;
    pub mod service;
    pub mod view;
}

pub mod infra {
    pub mod sqlite_store;
}

pub mod interface {
    pub mod http;
}
