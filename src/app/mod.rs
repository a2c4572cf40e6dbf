//! Demo service wired from the runtime pieces.
//!
//! # Data Flow
//! ```text
//! REST  GET /users/{id}      → UserDirectory::get      → 200 or NOT_FOUND envelope
//!       POST /users          → UserDirectory::create   → 201 or INVALID_ARGUMENT / ALREADY_EXISTS
//!       GET /peer/users/{id} → HttpClient (registry)   → peer's envelope relayed
//! gRPC  demo.v1.Users/GetUser     → UserDirectory::get      → User or NOT_FOUND status
//!       demo.v1.Users/CreateUser  → UserDirectory::create   → User or INVALID_ARGUMENT / ALREADY_EXISTS
//!       grpc.health.v1.Health/Check                    → SERVING
//! ```

pub mod proto;
pub mod rest;
pub mod rpc;
pub mod users;

pub use rest::{router, AppState};
pub use users::{NewUser, User, UserDirectory};
