//! CSV export for tick records.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::GridResult;
use crate::sim::history::TickRecord;

/// Column header for CSV telemetry export.
const HEADER: &str = "time,supply_mw,demand_mw,coal_mw,gas_mw,hydro_mw,solar_mw,wind_mw,\
                      battery_mw,residential_mw,commercial_mw,industrial_mw,frequency_hz,\
                      emissions,cost,score";

/// Exports tick records to a CSV file at the given path.
///
/// Writes a header row followed by one row per record, oldest first.
///
/// # Errors
///
/// Returns [`GridError::Io`](crate::error::GridError::Io) if the file cannot be
/// created and [`GridError::Csv`](crate::error::GridError::Csv) if a row cannot be written.
pub fn export_csv(records: &[TickRecord], path: &Path) -> GridResult<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(records, buf)
}

/// Writes tick records as CSV to any writer.
///
/// # Errors
///
/// Returns an error if the underlying writer fails.
pub fn write_csv(records: &[TickRecord], writer: impl Write) -> GridResult<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in records {
        wtr.write_record(&[
            r.time.to_string(),
            format!("{:.0}", r.supply_mw),
            format!("{:.0}", r.demand_mw),
            format!("{:.0}", r.coal_mw),
            format!("{:.0}", r.gas_mw),
            format!("{:.0}", r.hydro_mw),
            format!("{:.0}", r.solar_mw),
            format!("{:.0}", r.wind_mw),
            format!("{:.0}", r.battery_mw),
            format!("{:.0}", r.residential_mw),
            format!("{:.0}", r.commercial_mw),
            format!("{:.0}", r.industrial_mw),
            format!("{:.3}", r.frequency_hz),
            format!("{:.3}", r.emissions),
            format!("{:.2}", r.cost),
            r.score.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GridError;
    use crate::sim::clock::SimTime;
    use crate::sim::engine::Simulation;
    use crate::sim::types::ControlSettings;

    fn records(n: usize) -> Vec<TickRecord> {
        let mut sim = Simulation::new(ControlSettings::default(), SimTime::new(0, 0));
        sim.run(n)
    }

    #[test]
    fn header_matches_schema() {
        let mut buf = Vec::new();
        write_csv(&records(1), &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let first_line = output.as_deref().unwrap_or("").lines().next().unwrap_or("");
        assert_eq!(
            first_line,
            "time,supply_mw,demand_mw,coal_mw,gas_mw,hydro_mw,solar_mw,wind_mw,\
             battery_mw,residential_mw,commercial_mw,industrial_mw,frequency_hz,\
             emissions,cost,score"
        );
    }

    #[test]
    fn row_count_matches_record_count() {
        let mut buf = Vec::new();
        write_csv(&records(24), &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        // 1 header + 24 data rows
        assert_eq!(output.as_deref().unwrap_or("").lines().count(), 25);
    }

    #[test]
    fn rows_parse_back() {
        let mut buf = Vec::new();
        write_csv(&records(3), &mut buf).ok();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let headers = rdr.headers().cloned().ok();
        assert_eq!(headers.as_ref().map(csv::StringRecord::len), Some(16));

        let times: Vec<String> = rdr
            .records()
            .filter_map(Result::ok)
            .map(|rec| {
                for i in 1..15 {
                    assert!(rec[i].parse::<f64>().is_ok(), "column {i} should be numeric");
                }
                assert!(rec[15].parse::<i32>().is_ok());
                rec[0].to_string()
            })
            .collect();
        assert_eq!(times, vec!["00:15", "00:30", "00:45"]);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn writer_failure_is_reported() {
        let err = write_csv(&records(200), BrokenPipe).unwrap_err();
        assert!(matches!(err, GridError::Csv(_) | GridError::Io(_)));
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = export_csv(&records(1), &path).unwrap_err();
        assert!(matches!(err, GridError::Io(_)));
    }
}
