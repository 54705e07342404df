use std::io::Write;

use anyhow::Result;
use tabwriter::TabWriter;

use crate::sync::AccountReport;

pub fn print_summary<T: std::io::Write>(wr: T, reports: &[AccountReport]) -> Result<()> {
    let mut tw = TabWriter::new(wr);
    writeln!(
        tw,
        "Account\tInserted\tMigrated\tDuplicates\tFailed\tStopped early"
    )?;

    for report in reports.iter() {
        let summary = &report.summary;
        writeln!(
            tw,
            "{}\t{}\t{}\t{}\t{}\t{}",
            report.account,
            summary.inserted,
            summary.migrated,
            summary.duplicates,
            summary.failed,
            if summary.short_circuited { "yes" } else { "no" },
        )?;
    }

    tw.flush()?;

    Ok(())
}
