use std::collections::HashMap;
use std::convert::TryFrom;
use std::fs::File;
use std::io::Read;
use std::mem;
use std::path::Path;

use crate::error::{AttributeKind, ObjError};
use crate::primitives::face_vertex::FaceVertex;
use crate::primitives::group::{Group, DEFAULT_GROUP_NAME};
use crate::primitives::vertex::{PackedVertex, UP};
use crate::process::normals::generate_normals;

/// A parsed OBJ file, split into groups.
///
/// Group 0 always collects the geometry declared before the first `g`
/// statement, so files with explicit groups usually start at index 1.
#[derive(Debug, Clone)]
pub struct ObjModel {
    groups: Vec<Group>,
}

impl ObjModel {
    pub fn from_path(path: impl AsRef<Path>, generate_normals: bool) -> Result<Self, ObjError> {
        let path = path.as_ref();
        log::info!("loading OBJ model from {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(file, generate_normals)
    }

    pub fn from_reader<R: Read>(mut reader: R, generate_normals: bool) -> Result<Self, ObjError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let source = String::from_utf8(bytes)?;
        Self::parse(&source, generate_normals)
    }

    pub fn parse(source: &str, generate_normals: bool) -> Result<Self, ObjError> {
        let mut parser = Parser::new(generate_normals);
        for (line_no, line) in source.lines().enumerate() {
            parser.parse_line(line_no + 1, line)?;
        }
        let model = parser.finish()?;

        log::debug!(
            "parsed {} groups: {:?}",
            model.groups.len(),
            model
                .groups
                .iter()
                .map(|g| (g.name(), g.vertices().len(), g.triangle_count()))
                .collect::<Vec<_>>()
        );
        Ok(model)
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, index: usize) -> Result<&Group, ObjError> {
        self.groups.get(index).ok_or(ObjError::GroupOutOfRange {
            index,
            count: self.groups.len(),
        })
    }

    pub fn group_named(&self, name: &str) -> Result<&Group, ObjError> {
        self.groups
            .iter()
            .find(|g| g.name() == name)
            .ok_or_else(|| ObjError::GroupNotFound(name.to_string()))
    }

    pub fn first_non_empty(&self) -> Option<&Group> {
        self.groups.iter().find(|g| !g.is_empty())
    }

    pub fn into_groups(self) -> Vec<Group> {
        self.groups
    }
}

/// Working buffers for the group currently being filled.
struct GroupBuilder {
    name: String,
    vertices: Vec<PackedVertex>,
    indices: Vec<u16>,
    index_map: HashMap<FaceVertex, u16>,
}

impl GroupBuilder {
    fn new(name: String) -> Self {
        GroupBuilder {
            name,
            vertices: Vec::new(),
            indices: Vec::new(),
            index_map: HashMap::new(),
        }
    }
}

enum GroupState {
    Idle,
    Open(GroupBuilder),
}

impl GroupState {
    /// Faces before any `g` go to the implicit group, so reading geometry
    /// in the idle state opens one.
    fn builder(&mut self) -> &mut GroupBuilder {
        if let GroupState::Idle = self {
            *self = GroupState::Open(GroupBuilder::new(DEFAULT_GROUP_NAME.to_string()));
        }
        match self {
            GroupState::Open(builder) => builder,
            GroupState::Idle => unreachable!("group opened above"),
        }
    }
}

/// Model-wide attribute lists, shared by every group.
#[derive(Default)]
struct Attributes {
    positions: Vec<[f32; 4]>,
    normals: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
}

impl Attributes {
    /// Indices were bounds-checked when the face was read.
    fn pack(&self, corner: FaceVertex) -> PackedVertex {
        PackedVertex::new(
            self.positions[corner.position as usize],
            corner.normal.map_or(UP, |n| self.normals[n as usize]),
            corner
                .tex_coord
                .map_or([0.0, 0.0], |t| self.tex_coords[t as usize]),
        )
    }
}

struct Parser {
    generate_normals: bool,
    attributes: Attributes,
    groups: Vec<Group>,
    state: GroupState,
}

impl Parser {
    fn new(generate_normals: bool) -> Self {
        Parser {
            generate_normals,
            attributes: Attributes::default(),
            groups: Vec::new(),
            state: GroupState::Open(GroupBuilder::new(DEFAULT_GROUP_NAME.to_string())),
        }
    }

    fn parse_line(&mut self, line_no: usize, line: &str) -> Result<(), ObjError> {
        // `#` starts a comment anywhere on the line
        let line = match line.find('#') {
            Some(start) => &line[..start],
            None => line,
        };
        let line = line.trim();
        let mut tokens = line.split_whitespace();
        let keyword = match tokens.next() {
            Some(keyword) => keyword,
            None => return Ok(()),
        };

        match keyword {
            "v" => {
                let [x, y, z] = parse_floats::<3>(tokens, line_no)?;
                self.attributes.positions.push([x, y, z, 1.0]);
            }
            "vt" => {
                let [u, v] = parse_floats::<2>(tokens, line_no)?;
                self.attributes.tex_coords.push([u, v]);
            }
            "vn" => {
                let [x, y, z] = parse_floats::<3>(tokens, line_no)?;
                self.attributes.normals.push([x, y, z]);
            }
            "f" => {
                let corners = tokens
                    .map(|token| self.parse_face_vertex(token, line_no))
                    .collect::<Result<Vec<_>, _>>()?;
                if corners.len() < 3 {
                    log::warn!(
                        "line {}: face with {} vertices skipped",
                        line_no,
                        corners.len()
                    );
                    return Ok(());
                }
                self.add_face(&corners)?;
            }
            "g" => {
                let name = line[1..].trim();
                let name = if name.is_empty() { DEFAULT_GROUP_NAME } else { name };
                self.begin_group(name.to_string())?;
            }
            _ => {
                log::trace!("line {}: ignoring '{}' record", line_no, keyword);
            }
        }
        Ok(())
    }

    fn parse_face_vertex(&self, token: &str, line_no: usize) -> Result<FaceVertex, ObjError> {
        let mut parts = token.split('/');
        let position = match parts.next() {
            Some(p) if !p.is_empty() => p,
            _ => {
                return Err(ObjError::InvalidIndex {
                    line: line_no,
                    token: token.to_string(),
                })
            }
        };
        let position = resolve_index(
            position,
            self.attributes.positions.len(),
            AttributeKind::Position,
            line_no,
        )?;

        let tex_coord = match parts.next() {
            Some(t) if !t.is_empty() => Some(resolve_index(
                t,
                self.attributes.tex_coords.len(),
                AttributeKind::TexCoord,
                line_no,
            )?),
            _ => None,
        };

        let normal = match parts.next() {
            Some(n) if !n.is_empty() => Some(resolve_index(
                n,
                self.attributes.normals.len(),
                AttributeKind::Normal,
                line_no,
            )?),
            _ => None,
        };

        if parts.next().is_some() {
            return Err(ObjError::InvalidIndex {
                line: line_no,
                token: token.to_string(),
            });
        }

        Ok(FaceVertex::new(position, tex_coord, normal))
    }

    fn add_face(&mut self, corners: &[FaceVertex]) -> Result<(), ObjError> {
        for i in 0..corners.len() - 2 {
            self.add_vertex(corners[0])?;
            self.add_vertex(corners[i + 1])?;
            self.add_vertex(corners[i + 2])?;
        }
        Ok(())
    }

    fn add_vertex(&mut self, corner: FaceVertex) -> Result<(), ObjError> {
        let attributes = &self.attributes;
        let builder = self.state.builder();

        let index = match builder.index_map.get(&corner) {
            Some(&index) => index,
            None => {
                let index = u16::try_from(builder.vertices.len()).map_err(|_| {
                    ObjError::TooManyVertices {
                        group: builder.name.clone(),
                    }
                })?;
                builder.vertices.push(attributes.pack(corner));
                builder.index_map.insert(corner, index);
                index
            }
        };

        builder.indices.push(index);
        Ok(())
    }

    fn begin_group(&mut self, name: String) -> Result<(), ObjError> {
        self.end_group()?;
        log::trace!("opening group '{}'", name);
        self.state = GroupState::Open(GroupBuilder::new(name));
        Ok(())
    }

    fn end_group(&mut self) -> Result<(), ObjError> {
        let mut builder = match mem::replace(&mut self.state, GroupState::Idle) {
            GroupState::Open(builder) => builder,
            GroupState::Idle => return Ok(()),
        };

        if self.generate_normals {
            generate_normals(&mut builder.vertices, &builder.indices);
        }

        self.groups
            .push(Group::new(builder.name, builder.vertices, builder.indices));
        Ok(())
    }

    fn finish(mut self) -> Result<ObjModel, ObjError> {
        self.end_group()?;
        Ok(ObjModel {
            groups: self.groups,
        })
    }
}

/// Reads up to `N` finite floats; missing trailing components are zero and extra
/// ones are ignored.
fn parse_floats<'a, const N: usize>(
    tokens: impl Iterator<Item = &'a str>,
    line_no: usize,
) -> Result<[f32; N], ObjError> {
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(tokens) {
        *slot = token
            .parse::<f32>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| ObjError::InvalidNumber {
                line: line_no,
                token: token.to_string(),
            })?;
    }
    Ok(out)
}

/// Converts a 1-based (or negative, relative) file index into a 0-based
/// index into a list that currently holds `len` entries.
fn resolve_index(
    token: &str,
    len: usize,
    kind: AttributeKind,
    line_no: usize,
) -> Result<u16, ObjError> {
    let raw = token.parse::<i64>().map_err(|_| ObjError::InvalidIndex {
        line: line_no,
        token: token.to_string(),
    })?;

    let resolved = if raw > 0 {
        raw - 1
    } else if raw < 0 {
        len as i64 + raw
    } else {
        -1
    };

    if resolved < 0 || resolved >= len as i64 {
        return Err(ObjError::IndexOutOfRange {
            line: line_no,
            kind,
            index: raw,
            len,
        });
    }

    u16::try_from(resolved).map_err(|_| ObjError::IndexOverflow {
        line: line_no,
        kind,
        index: resolved as usize,
    })
}
