//! OpenAPI Specification Generator Binary
//!
//! Prints the Helperbase OpenAPI document as JSON on stdout.
//!
//! Usage:
//!   cargo run -p helperbase-api --bin generate-openapi > openapi.json

use helperbase_api::ApiDoc;

fn main() {
    match ApiDoc::to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize OpenAPI spec: {}", e);
            std::process::exit(1);
        }
    }
}
