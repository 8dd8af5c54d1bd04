use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use log::warn;
use crate::scope::error::ScopeError;
use crate::scope::frame::TraceFrame;
/// Number of `;Key,Value` metadata lines at the top of a Scopy export.
pub const METADATA_LINES: usize = 7;
/// Scopy version hashes this tool has been exercised against.
const TESTED_VERSIONS: [(&str, &str); 2] = [
    ("48fb6a9", "v1.06, May 24 2019"),
    ("6fa2c03", "v1.1.0, Sep 10 2019"),
];
/// Metadata block of an ADALM2000 Scopy CSV export.
#[derive(Clone, Debug)]
pub struct ExportInfo {
    pub scopy_version: String,
    pub exported_on: String,
    pub device: String,
    pub nr_of_samples: u64,
    pub sample_rate_hz: f64,
    pub tool: String,
    pub additional_info: String,
}
impl ExportInfo {
    /// Release label for a known Scopy version hash.
    pub fn release_label(&self) -> Option<&'static str> {
        TESTED_VERSIONS
            .iter()
            .find(|(hash, _)| *hash == self.scopy_version)
            .map(|(_, label)| *label)
    }
    /// Lab-report line describing the Scopy version, flagging untested builds.
    pub fn version_note(&self) -> String {
        match self.release_label() {
            Some(label) => format!("Scopy Version ({}): {}", self.scopy_version, label),
            None => format!("Scopy Version ({}): untested", self.scopy_version),
        }
    }
    /// Lab-report line built from the export date, e.g.
    /// `Wednesday July 24/07/2019` -> `CSV data file generated on: Wednesday, July 24 2019`.
    pub fn export_date_note(&self) -> String {
        let words: Vec<&str> = self
            .exported_on
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        if words.len() >= 4 {
            format!(
                "CSV data file generated on: {}, {} {} {}",
                words[0],
                words[1],
                words[2],
                words[words.len() - 1]
            )
        } else {
            format!("CSV data file generated on: {}", self.exported_on.trim())
        }
    }
}
/// A fully parsed Scopy export: metadata plus the channel data frame.
#[derive(Clone, Debug)]
pub struct ScopyExport {
    pub info: ExportInfo,
    pub frame: TraceFrame,
    pub skipped_rows: usize,
}
impl ScopyExport {
    pub fn from_path(path: &Path) -> Result<Self, ScopeError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ScopeError> {
        let mut reader = BufReader::new(reader);
        let info = read_info(&mut reader)?;
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let headings: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect();
        if headings.len() < 3 {
            return Err(ScopeError::MalformedExport(format!(
                "expected at least Sample, time and one channel column, got {headings:?}"
            )));
        }
        let channel_count = headings.len() - 2;
        let mut time_s = Vec::new();
        let mut channels = vec![Vec::new(); channel_count];
        let mut skipped_rows = 0usize;
        for (row_idx, record) in csv_reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    warn!("skipping unreadable data row {}: {err}", row_idx + 1);
                    skipped_rows += 1;
                    continue;
                }
            };
            match parse_row(&record, headings.len()) {
                Some(values) => {
                    time_s.push(values[1]);
                    for (channel, value) in channels.iter_mut().zip(&values[2..]) {
                        channel.push(*value);
                    }
                }
                None => {
                    warn!(
                        "skipping malformed data row {}: {:?}",
                        row_idx + 1,
                        record.iter().collect::<Vec<_>>()
                    );
                    skipped_rows += 1;
                }
            }
        }
        if time_s.is_empty() {
            return Err(ScopeError::MalformedExport(
                "export contains no data rows".into(),
            ));
        }
        let frame = TraceFrame {
            sample_rate_hz: info.sample_rate_hz,
            time_heading: headings[1].clone(),
            time_s,
            channel_labels: headings[2..].to_vec(),
            channels,
        };
        frame.validate()?;
        Ok(Self {
            info,
            frame,
            skipped_rows,
        })
    }
}
fn read_info<R: BufRead>(reader: &mut R) -> Result<ExportInfo, ScopeError> {
    let mut fields = Vec::with_capacity(METADATA_LINES);
    for _ in 0..METADATA_LINES {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(ScopeError::MalformedExport(format!(
                "expected {METADATA_LINES} metadata lines before the heading row"
            )));
        }
        let line = line.trim_end();
        let (key, value) = line.split_once(',').unwrap_or((line, ""));
        fields.push((
            key.trim_start_matches(';').trim().to_owned(),
            value.trim().to_owned(),
        ));
    }
    let lookup = |key: &str| -> Result<String, ScopeError> {
        fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.clone())
            .ok_or_else(|| ScopeError::MalformedExport(format!("missing metadata line {key:?}")))
    };
    let nr_of_samples = lookup("Nr of samples")?
        .parse::<u64>()
        .map_err(|_| ScopeError::MalformedExport("Nr of samples is not an integer".into()))?;
    let sample_rate_hz = lookup("Sample rate")?
        .parse::<f64>()
        .map_err(|_| ScopeError::MalformedExport("Sample rate is not a number".into()))?;
    if sample_rate_hz <= 0.0 {
        return Err(ScopeError::InvalidSampleRate);
    }
    Ok(ExportInfo {
        scopy_version: lookup("Scopy version")?,
        exported_on: lookup("Exported on")?,
        device: lookup("Device")?,
        nr_of_samples,
        sample_rate_hz,
        tool: lookup("Tool")?,
        additional_info: lookup("Additional Information").unwrap_or_default(),
    })
}
fn parse_row(record: &csv::StringRecord, expected: usize) -> Option<Vec<f64>> {
    if record.len() != expected {
        return None;
    }
    record
        .iter()
        .map(|field| field.trim().parse::<f64>().ok())
        .collect()
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    const SAMPLE: &str = "\
;Scopy version,48fb6a9
;Exported on,Wednesday July 24/07/2019
;Device,M2K
;Nr of samples,4
;Sample rate,1.00E+06
;Tool,Oscilloscope
;Additional Information,
Sample,Time(S),CH1(V),CH2(V)
0,-0.000002,0.25,-0.5
1,-0.000001,0.5,-0.25
2,0.000000,0.75,0.0
3,0.000001,1.0,0.25
";
    #[test]
    fn parses_metadata_and_channels() {
        let export = ScopyExport::from_reader(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(export.info.device, "M2K");
        assert_eq!(export.info.nr_of_samples, 4);
        assert!((export.info.sample_rate_hz - 1.0e6).abs() < 1e-3);
        assert_eq!(export.frame.channel_labels, vec!["CH1(V)", "CH2(V)"]);
        assert_eq!(export.frame.samples_per_channel(), 4);
        assert_eq!(export.frame.channel("CH2(V)").unwrap()[3], 0.25);
        assert_eq!(export.skipped_rows, 0);
    }
    #[test]
    fn skips_malformed_rows() {
        let input = SAMPLE.replace("2,0.000000,0.75,0.0", "2,not-a-number,0.75,0.0");
        let export = ScopyExport::from_reader(Cursor::new(input)).unwrap();
        assert_eq!(export.skipped_rows, 1);
        assert_eq!(export.frame.samples_per_channel(), 3);
    }
    #[test]
    fn missing_metadata_is_an_error() {
        let input = "Sample,Time(S),CH1(V)\n0,0.0,1.0\n";
        assert!(matches!(
            ScopyExport::from_reader(Cursor::new(input)),
            Err(ScopeError::MalformedExport(_))
        ));
    }
    #[test]
    fn version_notes() {
        let export = ScopyExport::from_reader(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(
            export.info.version_note(),
            "Scopy Version (48fb6a9): v1.06, May 24 2019"
        );
        assert_eq!(
            export.info.export_date_note(),
            "CSV data file generated on: Wednesday, July 24 2019"
        );
        let mut info = export.info.clone();
        info.scopy_version = "deadbee".into();
        assert_eq!(info.version_note(), "Scopy Version (deadbee): untested");
    }
}
