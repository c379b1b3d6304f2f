//! Binary persistence for [`NtupleGrid`].

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use bincode::Options;
use dyaa_core::{ErrorInfo, GenError, RunProvenance, SchemaVersion};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::bin::BinLimits;
use crate::grid::{GridCell, NtupleGrid};
use crate::lumi::LumiEntry;
use crate::order::Order;

/// Magic bytes leading every persisted grid.
pub const MAGIC: [u8; 8] = *b"DYAAGRID";

/// Schema of the payload written by this version.
pub const SCHEMA_VERSION: SchemaVersion = SchemaVersion::new(1, 0, 0);

// Field order is the wire order; `Header` followed by `Body` must decode it.
#[derive(Serialize)]
struct PayloadRef<'a> {
    magic: [u8; 8],
    schema_version: SchemaVersion,
    provenance: &'a RunProvenance,
    lumi: &'a [LumiEntry],
    orders: &'a [Order],
    bin_limits: &'a BinLimits,
    cells: &'a [GridCell],
}

#[derive(Deserialize)]
struct Header {
    magic: [u8; 8],
    schema_version: SchemaVersion,
}

#[derive(Deserialize)]
struct Body {
    provenance: RunProvenance,
    lumi: Vec<LumiEntry>,
    orders: Vec<Order>,
    bin_limits: BinLimits,
    cells: Vec<GridCell>,
}

/// Serializes a grid into `writer`.
pub fn write_to<W: Write>(grid: &NtupleGrid, writer: W) -> Result<(), GenError> {
    use crate::accumulator::GridAccumulator;

    let payload = PayloadRef {
        magic: MAGIC,
        schema_version: SCHEMA_VERSION,
        provenance: grid.provenance(),
        lumi: grid.channels(),
        orders: grid.orders(),
        bin_limits: grid.bin_limits(),
        cells: grid.cells(),
    };
    bincode::serialize_into(writer, &payload)
        .map_err(|err| GenError::Serde(ErrorInfo::new("bincode-serialize", err.to_string())))
}

// Decodes the next value and advances `bytes` past it. Length prefixes
// larger than the remaining input fail before anything is allocated.
fn decode_next<T: DeserializeOwned>(bytes: &mut &[u8]) -> Result<T, GenError> {
    let limit = bytes.len() as u64;
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(limit)
        .deserialize_from(bytes)
        .map_err(|err| GenError::Serde(ErrorInfo::new("bincode-deserialize", err.to_string())))
}

/// Restores a grid from `reader`.
///
/// The magic bytes and schema version are checked before the rest of the
/// payload is decoded.
pub fn read_from<R: Read>(mut reader: R) -> Result<NtupleGrid, GenError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|err| GenError::Io(ErrorInfo::new("grid-read", err.to_string())))?;

    let mut rest = bytes.as_slice();
    let header: Header = decode_next(&mut rest)?;
    if header.magic != MAGIC {
        return Err(GenError::Serde(
            ErrorInfo::new("grid-magic", "payload is not a dyaa grid")
                .with_hint("the file was not produced by NtupleGrid::write"),
        ));
    }
    if !SCHEMA_VERSION.is_compatible(&header.schema_version) {
        return Err(GenError::Serde(
            ErrorInfo::new("grid-schema", "unsupported grid schema version")
                .with_context(
                    "found",
                    format!(
                        "{}.{}.{}",
                        header.schema_version.major,
                        header.schema_version.minor,
                        header.schema_version.patch
                    ),
                )
                .with_context("expected-major", SCHEMA_VERSION.major.to_string()),
        ));
    }

    let body: Body = decode_next(&mut rest)?;
    let bin_limits = BinLimits::new(body.bin_limits.limits().to_vec())?;
    NtupleGrid::from_parts(
        body.lumi,
        body.orders,
        bin_limits,
        body.cells,
        body.provenance,
    )
}

/// Writes a grid to `path`, creating parent directories as needed.
pub fn write(grid: &NtupleGrid, path: &Path) -> Result<(), GenError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            GenError::Io(
                ErrorInfo::new("grid-mkdir", err.to_string())
                    .with_context("path", parent.display().to_string()),
            )
        })?;
    }
    let file = File::create(path).map_err(|err| {
        GenError::Io(
            ErrorInfo::new("grid-write", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    let mut writer = BufWriter::new(file);
    write_to(grid, &mut writer)?;
    writer.flush().map_err(|err| {
        GenError::Io(
            ErrorInfo::new("grid-write", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    log::debug!("wrote grid with {} entries to {}", grid.entries(), path.display());
    Ok(())
}

/// Reads a grid from `path`.
pub fn read(path: &Path) -> Result<NtupleGrid, GenError> {
    let file = File::open(path).map_err(|err| {
        GenError::Io(
            ErrorInfo::new("grid-read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    read_from(BufReader::new(file))
}
