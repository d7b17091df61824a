//! Example demonstrating the #[derive(Inject)] macro
//!
//! Run with:
//!   cargo run --example derive --features derive

use named_injector::{Container, Inject, Locals, Value};
use std::sync::Arc;

// Dependencies
struct Database {
    url: String,
}

struct Cache {
    size: usize,
}

// Service with injected dependencies
#[derive(Inject)]
struct UserService {
    #[inject]
    database: Arc<Database>,
    #[inject(name = "cacheClient")]
    cache: Arc<Cache>,
    // Whatever was registered, untyped
    #[inject]
    region: Value,
    // Non-injected field uses Default
    request_count: u64,
}

impl UserService {
    fn describe(&self) -> String {
        let region = self.region.downcast_ref::<&str>().copied().unwrap_or("unknown");
        format!(
            "UserService connected to {} with cache size {} in {} (requests: {})",
            self.database.url, self.cache.size, region, self.request_count
        )
    }
}

// Nested injection example
#[derive(Inject)]
struct ApiController {
    #[inject(name = "userService")]
    users: Arc<UserService>,
}

fn main() {
    println!("=== Named Injector Derive Macro Demo ===\n");

    let container = Container::new();
    container
        .value(
            "database",
            Database {
                url: "postgres://localhost:5432/myapp".into(),
            },
        )
        .value("cacheClient", Cache { size: 1024 })
        .value("region", "eu-west-1")
        .service::<UserService>("userService")
        .service::<ApiController>("api");

    // Each resolution builds a fresh UserService
    println!("Resolving api from container...");
    let api = container
        .resolve_as::<ApiController>("api")
        .expect("Failed to build ApiController");
    println!("  {}", api.users.describe());
    println!();

    // Locals override registrations for a single instantiation
    println!("Instantiating UserService with a local region...");
    let locals = Locals::new().with("region", "us-east-2");
    let local = container
        .instantiate_as::<UserService>(Some(&locals))
        .expect("Failed to build UserService");
    println!("  {}", local.describe());
    println!();

    println!("=== Demo Complete ===");
    println!("\nThe #[derive(Inject)] macro generated a Constructor impl that:");
    println!("  - Declares #[inject] field names as dependencies, in order");
    println!("  - Downcasts Arc<T> fields and hands Value fields over as is");
    println!("  - Uses Default::default() for non-injected fields");
}
