//! Check command implementation.

use crate::error::Result;
use crate::output::Formatter;
use logkeeper_janitor::JanitorConfig;
use std::path::Path;

/// Execute the check command.
///
/// The configuration has already been loaded and validated; this only prints it.
pub fn execute_check(path: &Path, config: &JanitorConfig, formatter: &Formatter) -> Result<()> {
    println!("{}", formatter.format_config(path, config)?);

    for root in config.log_roots() {
        if !root.path.is_dir() {
            println!(
                "{}",
                formatter.warning(&format!("{} does not exist yet", root.path.display()))
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    #[test]
    fn test_check_prints_valid_config() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let config = JanitorConfig::default().with_dirs("/srv/archives", ["/nonexistent/app"]);
        assert!(execute_check(Path::new("config.json"), &config, &formatter).is_ok());
    }
}
