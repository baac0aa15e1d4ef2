pub mod core;
pub mod corpus;
pub mod errors;
pub mod input;
pub mod output;

pub use crate::corpus::{OverheatingResults, ZoneAssessment};
use crate::corpus::{Corpus, ZoneOutcome};
use crate::errors::OverheatingError;
use crate::input::ingest_for_processing;
use crate::output::Output;
use bitflags::bitflags;
use csv::WriterBuilder;
use itertools::Itertools;
use std::io::Read;
use tracing::{debug, instrument};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct ProjectFlags: u32 {
        /// Write the heat balance behind each zone's risk alongside the category.
        const HEAT_BALANCE = 0b1;
    }
}

const RESULTS_LOCATION_KEY: &str = "results";

#[instrument(skip_all)]
pub fn run_project(
    input: impl Read,
    output: impl Output,
    flags: &ProjectFlags,
) -> Result<OverheatingResults, OverheatingError> {
    let input = ingest_for_processing(input)?;
    let corpus = Corpus::from_input(&input)?;
    debug!(zones = corpus.zones.len(), "corpus built");

    let results = corpus.run();

    if !output.is_noop() {
        write_results_file(&output, &results, flags)
            .map_err(OverheatingError::ErrorWritingOutput)?;
    }

    Ok(results)
}

fn write_results_file(
    output: &impl Output,
    results: &OverheatingResults,
    flags: &ProjectFlags,
) -> anyhow::Result<()> {
    debug!("writing out to {RESULTS_LOCATION_KEY}");
    let writer = output.writer_for_location_key(RESULTS_LOCATION_KEY, "csv")?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);
    let heat_balance = flags.contains(ProjectFlags::HEAT_BALANCE);

    let mut headings = vec!["Zone", "Risk", "Colour"];
    if heat_balance {
        headings.extend([
            "Solar gain [W]",
            "Heat loss [W/K]",
            "Ratio [K]",
            "Air change rate [ach]",
            "Threshold temperature [deg C]",
            "Reference floors",
            "Reference floor area [m2]",
        ]);
    }
    writer.write_record(&headings)?;

    for (zone_name, outcome) in &results.zones {
        writer.write_record(results_row(zone_name, outcome, heat_balance))?;
    }

    writer.flush()?;

    Ok(())
}

fn results_row(zone_name: &str, outcome: &ZoneOutcome, heat_balance: bool) -> Vec<String> {
    match outcome {
        Ok(assessment) => {
            let mut row = vec![
                zone_name.to_owned(),
                assessment.risk.category.to_string(),
                assessment.risk.severity.to_string(),
            ];
            if heat_balance {
                row.extend([
                    assessment.solar_gain.to_string(),
                    assessment.heat_loss.to_string(),
                    assessment.ratio.to_string(),
                    assessment
                        .ventilation
                        .as_ref()
                        .map(|ventilation| ventilation.air_change_rate.to_string())
                        .unwrap_or_default(),
                    assessment.risk.threshold_temperature.to_string(),
                    assessment
                        .reference_floors
                        .iter()
                        .map(|floor| &floor.name)
                        .join(";"),
                    assessment.reference_floor_area().to_string(),
                ]);
            }
            row
        }
        Err(err) => vec![zone_name.to_owned(), "Error".to_owned(), err.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::risk::RiskCategory;
    use crate::output::SinkOutput;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;

    const INPUT: &str = r#"{
        "latitude": 51.5,
        "horizontal_solar_flux": 190.0,
        "external_temperature": 16.0,
        "ventilation": {"opening_type": 2, "building_type": 0},
        "building": {
            "type": "Rooms",
            "zones": {
                "kitchen": {
                    "volume": 50.0,
                    "surfaces": {
                        "south wall": {
                            "type": "Wall",
                            "area": 12.0,
                            "u_value": 0.3,
                            "normal": [0.0, -1.0, 0.0],
                            "apertures": {
                                "window": {"area": 3.0, "u_value": 1.4, "g_value": 0.63, "is_operable": true}
                            }
                        },
                        "floor": {"type": "Floor", "area": 20.0, "boundary_condition": "Ground"}
                    }
                },
                "store": {
                    "volume": 10.0,
                    "opening_type": 5,
                    "surfaces": {
                        "north wall": {
                            "type": "Wall",
                            "area": 6.0,
                            "u_value": 0.3,
                            "normal": [0.0, 1.0, 0.0],
                            "apertures": {
                                "vent": {"area": 0.5, "u_value": 1.4, "g_value": 0.63, "is_operable": true}
                            }
                        }
                    }
                }
            }
        }
    }"#;

    #[derive(Clone, Debug, Default)]
    struct MemoryOutput {
        written: Rc<RefCell<Vec<u8>>>,
    }

    struct MemoryWriter(Rc<RefCell<Vec<u8>>>);

    impl Write for MemoryWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Output for MemoryOutput {
        fn writer_for_location_key(
            &self,
            _location_key: &str,
            _file_extension: &str,
        ) -> anyhow::Result<impl Write> {
            Ok(MemoryWriter(self.written.clone()))
        }
    }

    impl MemoryOutput {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.written.borrow().clone())
                .unwrap()
                .lines()
                .map(str::to_owned)
                .collect()
        }
    }

    #[rstest]
    fn test_run_project_reports_each_zone() {
        let results =
            run_project(INPUT.as_bytes(), SinkOutput, &ProjectFlags::empty()).unwrap();

        assert_eq!(
            results.zones.keys().collect::<Vec<_>>(),
            vec!["kitchen", "store"]
        );
        assert!(results.zones["kitchen"].is_ok());
        assert!(results.zones["store"].is_err());
    }

    #[rstest]
    fn test_results_file_lists_risk_per_zone() {
        let output = MemoryOutput::default();
        run_project(INPUT.as_bytes(), output.clone(), &ProjectFlags::empty()).unwrap();

        let results = run_project(INPUT.as_bytes(), SinkOutput, &ProjectFlags::empty()).unwrap();
        let kitchen = results.zones["kitchen"].as_ref().unwrap();
        assert_eq!(kitchen.risk.category, RiskCategory::NotSignificant);

        let lines = output.lines();
        assert_eq!(lines[0], "Zone,Risk,Colour");
        assert_eq!(lines[1], "kitchen,Not significant,\"3,166,90\"");
        assert!(lines[2].starts_with("store,Error,"));
        assert_eq!(lines.len(), 3);
    }

    #[rstest]
    fn test_heat_balance_flag_adds_columns() {
        let output = MemoryOutput::default();
        run_project(INPUT.as_bytes(), output.clone(), &ProjectFlags::HEAT_BALANCE).unwrap();

        let lines = output.lines();
        assert_eq!(
            lines[0],
            "Zone,Risk,Colour,Solar gain [W],Heat loss [W/K],Ratio [K],Air change rate [ach],Threshold temperature [deg C],Reference floors,Reference floor area [m2]"
        );
        let kitchen = lines[1].split(',').collect::<Vec<_>>();
        assert_eq!(&kitchen[kitchen.len() - 2..], &["floor", "20"]);
        // single-sided ventilation for a single storey zone with windows open half the time
        assert!(lines[1].contains(",2,"));
    }

    #[rstest]
    fn test_invalid_request() {
        let result = run_project("{}".as_bytes(), SinkOutput, &ProjectFlags::empty());
        assert!(matches!(result, Err(OverheatingError::InvalidRequest(_))));
    }
}
