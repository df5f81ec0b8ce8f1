//! Decodes a recording and writes the serializer's JSON to stdout.

use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tibia_replay::{
    decode, guess_format, query_tibia_version, serializer, DataReader, Version, VersionTriplet,
};

#[derive(Parser)]
#[command(about = "Dump a Tibia recording's decoded event stream as JSON")]
struct Args {
    /// Folder holding Tibia.pic, Tibia.spr, and Tibia.dat for the
    /// recording's client version.
    data_folder: PathBuf,

    /// The recording to decode.
    recording: PathBuf,

    /// Client version as `major.minor` or `major.minor.preview`; queried
    /// from the container when omitted.
    version: Option<String>,
}

fn parse_triplet(version: &str) -> anyhow::Result<VersionTriplet> {
    let mut parts = version.split('.');

    let major = parts.next().context("missing major version")?.parse()?;
    let minor = parts.next().context("missing minor version")?.parse()?;
    let preview = parts.next().map(str::parse).transpose()?.unwrap_or(0);

    if parts.next().is_some() {
        bail!("version must be major.minor or major.minor.preview");
    }

    Ok(VersionTriplet::new(major, minor, preview))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let file = std::fs::read(&args.recording)
        .with_context(|| format!("reading {}", args.recording.display()))?;

    let extension = args
        .recording
        .extension()
        .and_then(|extension| extension.to_str());

    let Some(format) = guess_format(extension, &DataReader::new(&file)) else {
        bail!("unrecognized recording format");
    };

    let triplet = match &args.version {
        Some(version) => parse_triplet(version)?,
        None => {
            let triplet = query_tibia_version(format, &file)
                .context("this format doesn't store a version; pass one explicitly")?;

            tracing::warn!(version = %triplet, "no version given, using the container's");
            triplet
        }
    };

    let load = |name: &str| {
        let path = args.data_folder.join(name);
        std::fs::read(&path).with_context(|| format!("reading {}", path.display()))
    };

    let version = Version::load(
        triplet,
        &load("Tibia.pic")?,
        &load("Tibia.spr")?,
        &load("Tibia.dat")?,
    )?;

    let recording = decode(format, &file, &version)?;

    let stdout = std::io::stdout().lock();
    serializer::serialize(&recording, &version, BufWriter::new(stdout))?;

    Ok(())
}
