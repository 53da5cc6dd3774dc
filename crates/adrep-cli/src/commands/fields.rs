//! `adrep fields` - list selectable fields per report type

use adrep_ingest::records::ReportType;

pub fn run(report: Option<String>) -> anyhow::Result<()> {
    let types: Vec<ReportType> = match report {
        Some(name) => vec![name.parse()?],
        None => ReportType::ALL.to_vec(),
    };

    for report_type in types {
        println!("{report_type}");
        for field in report_type.selectable_fields()? {
            println!("  {field}");
        }
        println!();
    }
    Ok(())
}
