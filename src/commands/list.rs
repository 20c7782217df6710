//! List command implementation

use crate::ports;

/// List all ports compiled into this binary
pub fn list_ports() {
    let ports = ports::available_ports();

    if ports.is_empty() {
        println!("No ports available (recompile with port features enabled)");
        return;
    }

    println!("Available ports:");
    println!();
    for p in &ports {
        let aliases = if p.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", p.aliases.join(", "))
        };
        println!("  {:10} - {}{}", p.name, p.description, aliases);
    }
}
