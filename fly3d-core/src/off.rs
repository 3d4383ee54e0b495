/// OFF (Object File Format) reader and writer
///
/// Layout, one record per line:
///
/// ```text
/// OFF
/// V F C
/// x y z          (V rows)
/// 3 a b c        (F rows, triangles only)
/// 4 a b c d      (C rows, tetrahedra only)
/// ```
///
/// Blank lines and `#` comment lines are skipped.
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use log::{debug, info};
use nalgebra::Point3;
use nom::{
    bytes::complete::tag,
    character::complete::{space0, space1, u32 as index},
    combinator::all_consuming,
    multi::many0,
    number::complete::float,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::error::{MeshError, Result, Section};
use crate::geometry::{Cell, Face, Mesh};

const HEADER: &str = "OFF";

// Upper bound on up-front allocation; a lying counts line must not reserve gigabytes.
const MAX_PREALLOC: usize = 1 << 20;

/// Parse an OFF document held in memory.
pub fn parse_off(input: &str) -> Result<Mesh> {
    let mut lines = input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'));

    let mut next_line = |section: Section| {
        lines
            .next()
            .ok_or_else(|| MeshError::format(section, "unexpected end of input"))
    };

    let line = next_line(Section::Header)?;
    run(Section::Header, line, tag(HEADER))
        .map_err(|_| MeshError::format(Section::Header, format!("expected `{HEADER}`, found `{line}`")))?;

    let line = next_line(Section::Counts)?;
    let (vertex_count, face_count, cell_count) = run(Section::Counts, line, parse_counts)?;
    let (vertex_count, face_count, cell_count) = (
        vertex_count as usize,
        face_count as usize,
        cell_count as usize,
    );
    debug!("OFF header: {vertex_count} vertices, {face_count} faces, {cell_count} cells");

    let mut positions = Vec::with_capacity(vertex_count.min(MAX_PREALLOC));
    for i in 0..vertex_count {
        let section = Section::Vertex(i);
        let (x, y, z) = run(section, next_line(section)?, parse_vector3)?;
        positions.push(Point3::new(x, y, z));
    }

    let mut faces: Vec<Face> = Vec::with_capacity(face_count.min(MAX_PREALLOC));
    for i in 0..face_count {
        let section = Section::Face(i);
        let face = parse_record::<3>(section, next_line(section)?, vertex_count)?;
        faces.push(face);
    }

    let mut cells: Vec<Cell> = Vec::with_capacity(cell_count.min(MAX_PREALLOC));
    for i in 0..cell_count {
        let section = Section::Cell(i);
        let cell = parse_record::<4>(section, next_line(section)?, vertex_count)?;
        cells.push(cell);
    }

    let trailing = lines.count();
    if trailing > 0 {
        debug!("ignoring {trailing} trailing lines after OFF records");
    }

    Ok(Mesh::new(positions, faces, cells))
}

/// Read and parse an OFF document from any reader.
pub fn read_off<R: Read>(mut reader: R) -> Result<Mesh> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_off(&text)
}

/// Load an OFF file from disk.
pub fn load_off<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MeshError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            MeshError::Io(e)
        }
    })?;

    let mesh = read_off(file)?;
    info!(
        "loaded {}: {} vertices, {} faces, {} cells",
        path.display(),
        mesh.vertex_count(),
        mesh.face_count(),
        mesh.cell_count()
    );
    Ok(mesh)
}

/// Serialize a mesh back to OFF text.
pub fn write_off(mesh: &Mesh) -> String {
    let mut out = format!(
        "{HEADER}\n{} {} {}\n",
        mesh.vertex_count(),
        mesh.face_count(),
        mesh.cell_count()
    );
    for p in &mesh.positions {
        out.push_str(&format!("{} {} {}\n", p.x, p.y, p.z));
    }
    for [a, b, c] in &mesh.faces {
        out.push_str(&format!("3 {a} {b} {c}\n"));
    }
    for [a, b, c, d] in &mesh.cells {
        out.push_str(&format!("4 {a} {b} {c} {d}\n"));
    }
    out
}

/// Write a mesh to disk as OFF.
pub fn save_off<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    fs::write(path, write_off(mesh))?;
    Ok(())
}

/// Run a line parser to completion, mapping any failure to a format error.
fn run<'a, O, F>(section: Section, line: &'a str, parser: F) -> Result<O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    all_consuming(delimited(space0, parser, space0))(line)
        .map(|(_, value)| value)
        .map_err(|_| MeshError::format(section, format!("malformed line `{line}`")))
}

fn parse_counts(input: &str) -> IResult<&str, (u32, u32, u32)> {
    tuple((index, preceded(space1, index), preceded(space1, index)))(input)
}

fn parse_vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    tuple((float, preceded(space1, float), preceded(space1, float)))(input)
}

fn parse_indices(input: &str) -> IResult<&str, (u32, Vec<u32>)> {
    pair(index, many0(preceded(space1, index)))(input)
}

/// Parse a `n i0 .. i(n-1)` record where only `n == N` is accepted.
fn parse_record<const N: usize>(
    section: Section,
    line: &str,
    vertex_count: usize,
) -> Result<[u32; N]> {
    let (declared, indices) = run(section, line, parse_indices)?;

    if declared as usize != N {
        return Err(MeshError::UnsupportedTopology {
            section,
            expected: N,
            found: declared as usize,
        });
    }

    let record: [u32; N] = indices.as_slice().try_into().map_err(|_| {
        MeshError::format(
            section,
            format!("declares {N} indices but lists {}", indices.len()),
        )
    })?;

    if let Some(&bad) = record.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(MeshError::format(
            section,
            format!("index {bad} out of range for {vertex_count} vertices"),
        ));
    }

    Ok(record)
}
