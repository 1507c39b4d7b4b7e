//! Output formatting utilities

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

/// Determine the effective output format based on context
pub fn effective_format(format: OutputFormat) -> OutputFormat {
    match format {
        OutputFormat::Auto => OutputFormat::Table,
        other => other,
    }
}

/// Print a serializable value as JSON or YAML
pub fn print_serialized<T: Serialize + ?Sized>(format: OutputFormat, value: &T) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
        }
        _ => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
        }
    }
    Ok(())
}

/// Render rows as a table or CSV
pub fn print_rows(format: OutputFormat, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(headers).into_diagnostic()?;
            for row in &rows {
                writer.write_record(row).into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
        }
        _ => {
            let mut builder = Builder::default();
            builder.push_record(headers.iter().copied());
            for row in rows {
                builder.push_record(row);
            }
            let mut table = builder.build();
            table.with(Style::sharp());
            println!("{}", table);
        }
    }
    Ok(())
}

/// Placeholder for empty optional cells
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_becomes_table() {
        assert_eq!(effective_format(OutputFormat::Auto), OutputFormat::Table);
        assert_eq!(effective_format(OutputFormat::Csv), OutputFormat::Csv);
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(Some(3)), "3");
        assert_eq!(or_dash(None::<u32>), "-");
    }
}
