//! The `ropegrade init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("ropegrade.toml").exists() {
        println!("ropegrade.toml already exists, skipping.");
    } else {
        std::fs::write("ropegrade.toml", SAMPLE_CONFIG)?;
        println!("Created ropegrade.toml");
    }

    std::fs::create_dir_all("sheets")?;
    let example_path = std::path::Path::new("sheets/example.toml");
    if example_path.exists() {
        println!("sheets/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_SHEET)?;
        println!("Created sheets/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: ropegrade validate --sheet sheets/example.toml");
    println!("  2. Run: ropegrade submit --sheet sheets");
    println!("  3. Run: ropegrade medals --user trainee-1");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# ropegrade configuration

parallelism = 4
max_retries = 3
retry_delay_ms = 200

[store]
type = "json"
dir = "./ropegrade-data"

[evaluator]
# Enables the comeback and hot-streak medals.
history_rules = false

[evaluator.knots]
ids = [43]
terms = ["čvor", "cvor", "knot"]

[evaluator.systems]
ids = [44]
terms = ["sustav", "kolotur", "system", "pulley"]
"#;

const EXAMPLE_SHEET: &str = r#"[attempt]
user = "trainee-1"
kind = "final-exam"
module = 1
started_at = "2026-03-01T14:00:00+01:00"
submitted_at = "2026-03-01T14:05:00+01:00"

[[answers]]
selected = "A"
correct = "A"

[[answers]]
selected = "C"
correct = "C"

[[answers]]
selected = "B"
correct = "B"

[[answers]]
selected = "D"
correct = "A"

[[answers]]
selected = "B"
correct = "B"
points = 2
"#;
