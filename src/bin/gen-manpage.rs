//! Writes spishim(1) plus one page per subcommand
//!
//! Usage: gen-manpage [OUT_DIR], default `man/`

use clap::CommandFactory;
use std::path::{Path, PathBuf};

#[path = "../cli.rs"]
#[allow(dead_code)]
mod cli;

/// (file name, command) for the top-level page and every subcommand
fn pages(cmd: &clap::Command) -> Vec<(String, clap::Command)> {
    let name = cmd.get_name().to_string();
    let mut pages = vec![(format!("{}.1", name), cmd.clone())];
    for sub in cmd.get_subcommands() {
        pages.push((format!("{}-{}.1", name, sub.get_name()), sub.clone()));
    }
    pages
}

fn write_page(dir: &Path, file: &str, cmd: clap::Command) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd).render(&mut buffer)?;
    std::fs::write(dir.join(file), buffer)
}

fn main() -> std::io::Result<()> {
    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    std::fs::create_dir_all(&out_dir)?;

    for (file, cmd) in pages(&cli::Cli::command()) {
        write_page(&out_dir, &file, cmd)?;
        println!("{}", out_dir.join(&file).display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_names() {
        let names: Vec<String> = pages(&cli::Cli::command())
            .into_iter()
            .map(|(file, _)| file)
            .collect();
        assert_eq!(names[0], "spishim.1");
        for page in ["spishim-transfer.1", "spishim-loopback.1", "spishim-list-ports.1"] {
            assert!(names.iter().any(|n| n == page), "missing {}", page);
        }
    }
}
