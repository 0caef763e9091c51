use anyhow::Result;
use daftar_lib::{MergePlan, Position, Record};
use tabled::builder::Builder;

#[derive(Clone, Debug, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_flag(flag: &str) -> Self {
        match flag {
            "json" => Self::Json,
            "csv" => Self::Csv,
            _ => Self::Table,
        }
    }
}

// -- Row builders --
//
// Registry columns come from the profile at runtime, so tables are
// assembled row-by-row instead of from a derive.

fn header_row(fields: &[String]) -> Vec<String> {
    let mut header = vec!["#".to_string()];
    header.extend(fields.iter().cloned());
    header
}

fn record_rows(fields: &[String], snapshot: &[(Position, Record)]) -> Vec<Vec<String>> {
    snapshot
        .iter()
        .map(|(position, record)| {
            let mut row = vec![position.to_string()];
            row.extend(fields.iter().map(|field| record.get(field).to_string()));
            row
        })
        .collect()
}

// -- Records output --

pub fn print_records(
    fields: &[String],
    snapshot: &[(Position, Record)],
    format: &OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let records: Vec<&Record> = snapshot.iter().map(|(_, record)| record).collect();
            print_json(&records);
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(header_row(fields))?;
            for row in record_rows(fields, snapshot) {
                wtr.write_record(row)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(header_row(fields));
            for row in record_rows(fields, snapshot) {
                builder.push_record(row);
            }
            println!("{}", builder.build());
        }
    }
    Ok(())
}

// -- Plan output --

pub fn print_plan(plan: &MergePlan, format: &OutputFormat) -> Result<()> {
    let summary = plan.summary();
    match format {
        OutputFormat::Json => print_json(&summary),
        _ => {
            let mut builder = Builder::default();
            builder.push_record(["Additions", "Updates", "No-ops", "Skipped", "Ambiguous"]);
            builder.push_record([
                summary.additions.to_string(),
                summary.updates.to_string(),
                summary.noops.to_string(),
                summary.skipped.to_string(),
                summary.ambiguous.to_string(),
            ]);
            println!("{}", builder.build());

            if !summary.log.is_empty() {
                println!();
                for line in &summary.log {
                    println!("  {}", line);
                }
                if summary.log_overflow > 0 {
                    println!("  ... and {} more changes", summary.log_overflow);
                }
            }
        }
    }
    Ok(())
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<String> {
        vec!["اسم".to_string(), "شهر".to_string()]
    }

    fn snapshot() -> Vec<(Position, Record)> {
        vec![
            (2, Record::from_pairs([("اسم", "رضا احمدی"), ("شهر", "کرج")])),
            (3, Record::from_pairs([("اسم", "سارا محمدی")])),
        ]
    }

    #[test]
    fn from_flag_defaults_to_table() {
        assert_eq!(OutputFormat::from_flag("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flag("csv"), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_flag("anything"), OutputFormat::Table);
    }

    #[test]
    fn header_row_leads_with_position_column() {
        assert_eq!(header_row(&fields()), vec!["#", "اسم", "شهر"]);
    }

    #[test]
    fn record_rows_follow_the_field_layout() {
        let rows = record_rows(&fields(), &snapshot());
        assert_eq!(rows[0], vec!["2", "رضا احمدی", "کرج"]);
        assert_eq!(rows[1], vec!["3", "سارا محمدی", ""]);
    }

    #[test]
    fn record_rows_empty_snapshot() {
        assert!(record_rows(&fields(), &[]).is_empty());
    }

    #[test]
    fn plan_summary_serializes_counts_and_log() {
        let mut plan = MergePlan::default();
        plan.additions
            .push(Record::from_pairs([("اسم", "سارا محمدی")]));
        plan.noops = 2;

        let val = serde_json::to_value(plan.summary()).unwrap();
        assert_eq!(val["additions"], 1);
        assert_eq!(val["noops"], 2);
        assert!(val["log"].is_array());
    }
}
