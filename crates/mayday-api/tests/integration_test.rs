// Integration tests for the Mayday API
// Run with: cargo test --test integration_test -- --ignored
// (requires a running server, e.g. `cargo run -p mayday-api` with no DATABASE_URL)

use serde_json::{json, Value};

const API_BASE_URL: &str = "http://localhost:9000";

#[tokio::test]
#[ignore] // Run with: cargo test --test integration_test -- --ignored
async fn test_full_sos_workflow() {
    let client = reqwest::Client::new();

    println!("🧪 Testing full SOS workflow...");

    // Step 1: Station raises an SOS
    println!("\n📝 Step 1: Raising SOS...");
    let create_response = client
        .post(format!("{}/v1/sos", API_BASE_URL))
        .json(&json!({
            "station_id": "ST001",
            "station_name": "Station A"
        }))
        .send()
        .await
        .expect("Failed to create SOS");

    assert_eq!(
        create_response.status(),
        201,
        "Expected 201 Created, got {}",
        create_response.status()
    );

    let created: Value = create_response
        .json()
        .await
        .expect("Failed to parse create response");
    let id = created["id"].as_str().expect("missing id").to_string();
    let room_name = created["room_name"].as_str().expect("missing room_name");
    println!("✅ Created SOS: {} (room {})", id, room_name);
    assert_eq!(room_name, format!("sos-room-{id}"));

    // Step 2: Board shows it pending
    println!("\n📋 Step 2: Checking the board...");
    let board: Value = client
        .get(format!("{}/v1/sos", API_BASE_URL))
        .send()
        .await
        .expect("Failed to list SOS")
        .json()
        .await
        .expect("Failed to parse board");
    let pending = board["pending"].as_array().expect("missing pending");
    assert!(
        pending.iter().any(|e| e["id"] == id.as_str()),
        "new SOS should be pending"
    );
    println!("✅ SOS is pending ({} waiting)", pending.len());

    // Step 3: Two admins race to claim it
    println!("\n🏁 Step 3: Two admins racing to accept...");
    let (first, second) = tokio::join!(
        client
            .post(format!("{}/v1/sos/{}/accept", API_BASE_URL, id))
            .json(&json!({"accepted_by": "admin1"}))
            .send(),
        client
            .post(format!("{}/v1/sos/{}/accept", API_BASE_URL, id))
            .json(&json!({"accepted_by": "admin2"}))
            .send(),
    );
    let statuses = [
        first.expect("accept request failed").status().as_u16(),
        second.expect("accept request failed").status().as_u16(),
    ];
    let wins = statuses.iter().filter(|s| **s == 200).count();
    let conflicts = statuses.iter().filter(|s| **s == 409).count();
    println!("✅ Outcomes: {:?}", statuses);
    assert_eq!(wins, 1, "exactly one admin must win");
    assert_eq!(conflicts, 1, "the loser must see a conflict");

    // Step 4: End the call, twice
    println!("\n📴 Step 4: Ending the call (twice)...");
    for attempt in 1..=2 {
        let end_response = client
            .post(format!("{}/v1/sos/{}/end", API_BASE_URL, id))
            .send()
            .await
            .expect("Failed to end SOS");
        assert_eq!(end_response.status(), 204, "end attempt {attempt}");
    }
    println!("✅ End is idempotent");

    // Step 5: Board shows it in history
    println!("\n🗂  Step 5: Checking history...");
    let board: Value = client
        .get(format!("{}/v1/sos", API_BASE_URL))
        .send()
        .await
        .expect("Failed to list SOS")
        .json()
        .await
        .expect("Failed to parse board");
    let history = board["history"].as_array().expect("missing history");
    let entry = history
        .iter()
        .find(|e| e["id"] == id.as_str())
        .expect("ended SOS should be in history");
    assert_eq!(entry["status"], "ended");
    assert!(entry["accepted_by"].is_string());
    println!("✅ History shows the call, claimed by {}", entry["accepted_by"]);

    println!("\n🎉 Full SOS workflow passed!");
}
