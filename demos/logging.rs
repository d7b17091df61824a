//! Example demonstrating logging capabilities
//!
//! Run with JSON logging (production):
//! ```bash
//! cargo run --example logging --features logging-json
//! ```
//!
//! Run with pretty logging (development):
//! ```bash
//! cargo run --example logging --features logging-pretty
//! ```

use named_injector::{Container, Locals, inject};

fn main() {
    // JSON if logging-json is enabled, pretty if logging-pretty is
    if !named_injector::logging::init() {
        println!("(no subscriber installed - enable logging-json or logging-pretty)");
    }

    println!("=== Named Injector Logging Demo ===\n");

    // Logs: "Creating new root DI container"
    let container = Container::new();

    // Logs: "Registering dependency" with kind = value / factory
    container
        .value("database_url", String::from("postgres://localhost/mydb"))
        .value("request_id", String::from("default"))
        .factory(
            "users",
            inject!(|database_url: String| format!("UserService@{database_url}")),
        );

    // Logs: "Replaced an existing registration"
    container.value("request_id", String::from("boot"));

    // Logs: "Resolving dependency" for users, then database_url
    let users = container.resolve_as::<String>("users").unwrap();
    println!("  [App] resolved {users}");

    // Logs: "Dependency not found in root container"
    assert!(container.try_resolve("metrics").is_none());

    // Logs: "Creating child container"
    let request_scope = container.create_child();
    request_scope.value("request_id", String::from("req-12345"));

    // Shadowed locally, no parent lookup
    let id = request_scope.resolve_as::<String>("request_id").unwrap();
    println!("  [App] request scope sees {id}");

    // Logs: "Dependency found in ancestor container"
    let _users_from_child = request_scope.resolve("users").unwrap();

    // Logs: "Dependency supplied by locals"
    let handle = inject!(|request_id: String, users: String| format!("{request_id} -> {users}"));
    let locals = Locals::new().with("request_id", String::from("req-override"));
    let out = request_scope.invoke(&handle, None, Some(&locals)).unwrap();
    println!("  [App] {}", out.downcast_ref::<String>().unwrap());

    println!("\n=== Demo Complete ===");
    println!("Check the log output above to see structured logging in action!");
    println!("\nTip: Use --features logging-json for production (JSON output)");
    println!("     Use --features logging-pretty for development (colorful output)");
}
