use std::fs;

fn main() {
    // Validate the compiled-in rule set at compile time
    let rule_set_path = "src/rule_set.toml";
    println!("cargo:rerun-if-changed={}", rule_set_path);

    let content = fs::read_to_string(rule_set_path).expect("Failed to read rule_set.toml");

    let table = match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => panic!("Invalid rule_set.toml: {}", e),
    };

    for section in ["fonts", "sizes", "spacing", "indent", "color", "page"] {
        if !table.contains_key(section) {
            panic!("rule_set.toml is missing the [{}] section", section);
        }
    }
}
