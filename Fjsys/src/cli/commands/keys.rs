//! CLI command for listing registered script keys

use std::path::Path;

use crate::codec::KeyRegistry;

pub fn execute(keys: Option<&Path>) -> anyhow::Result<()> {
    let registry = match keys {
        Some(path) => KeyRegistry::load(path)?,
        None => KeyRegistry::load_default()?,
    };

    if registry.is_empty() {
        match keys.map(Path::to_path_buf).or_else(KeyRegistry::default_path) {
            Some(path) => println!("No script keys registered in {}", path.display()),
            None => println!("No script keys registered"),
        }
        return Ok(());
    }

    for name in registry.names() {
        println!("{name}");
    }
    Ok(())
}
