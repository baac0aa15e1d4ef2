use anyhow::anyhow;
use clap::Parser;
use sap_overheating::output::FileOutput;
use sap_overheating::{run_project, ProjectFlags};
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct SapOverheatingArgs {
    input_file: String,
    #[clap(
        long,
        default_value_t = false,
        help = "Output heat balance for each zone"
    )]
    heat_balance: bool,
    #[clap(long, default_value_t = false, help = "Whether to log out spans")]
    log_spans: bool,
    #[clap(
        long,
        short,
        default_value_t = false,
        help = "Log calculation detail for every zone"
    )]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = SapOverheatingArgs::parse();

    // set up basic tracing
    let tracing_subscriber = {
        let max_level = if args.verbose {
            tracing::Level::TRACE
        } else {
            tracing::Level::INFO
        };
        let mut builder = tracing_subscriber::fmt::fmt().with_max_level(max_level);

        if args.log_spans {
            builder = builder.with_span_events(FmtSpan::CLOSE);
        }

        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)?;

    let input_file = args.input_file.as_str();
    let input_file_ext = Path::new(input_file).extension().and_then(OsStr::to_str);
    let input_file_stem = match input_file_ext {
        Some(ext) => &input_file[..(input_file.len() - ext.len() - 1)],
        None => input_file,
    };
    let input_file_stem = PathBuf::from(input_file_stem);

    let output_path = PathBuf::from(format!("{}__results", input_file_stem.display()));
    fs::create_dir_all(&output_path)?;
    let input_file_name = input_file_stem
        .file_name()
        .and_then(OsStr::to_str)
        .ok_or_else(|| anyhow!("Input file path {input_file} has no usable file name"))?;
    let file_output = FileOutput::new(
        output_path.clone(),
        format!("{input_file_name}__{{}}.{{}}"),
    );

    let project_flags = (&args).into();

    let results = run_project(
        BufReader::new(File::open(Path::new(input_file))?),
        &file_output,
        &project_flags,
    )?;

    for (zone, outcome) in &results.zones {
        match outcome {
            Ok(assessment) => info!(
                zone = %zone,
                category = %assessment.risk.category,
                threshold_temperature = assessment.risk.threshold_temperature,
                "zone assessed"
            ),
            Err(err) => info!(zone = %zone, error = %err, "zone not assessed"),
        }
    }
    info!("results written to {}", output_path.display());

    Ok(())
}

impl From<&SapOverheatingArgs> for ProjectFlags {
    fn from(args: &SapOverheatingArgs) -> Self {
        let mut flags = ProjectFlags::empty();
        if args.heat_balance {
            flags.insert(ProjectFlags::HEAT_BALANCE);
        }

        flags
    }
}
