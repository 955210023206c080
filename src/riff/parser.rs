//! The chunk grammar: decodes a whole .vox byte stream into a [`Document`].
//!
//! The children of MAIN must follow the ordering
//!
//! ```text
//! PACK? (SIZE XYZI)* (nTRN|nGRP|nSHP)* LAYR* RGBA MATL*
//! ```
//!
//! enforced by a small state machine. Every chunk decoder runs over its own
//! cursor and must consume exactly the declared content length. Unrecognized
//! tags are skipped with one notice per distinct tag; no chunk other than
//! MAIN may carry children.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use glam::IVec3;
use memmap2::Mmap;
use tracing::{debug, warn};

use crate::document::{Document, Material, MaterialKind, Model, Rgba, Voxel};
use crate::riff::cursor::ByteCursor;
use crate::riff::dict::Dict;
use crate::riff::format::{Tag, MAGIC, PALETTE_LEN, VERSION};
use crate::scene::builder::{GroupRecord, SceneAssembly, ShapeRecord, TransformRecord};
use crate::scene::{Layer, Scene, Transform};
use crate::util::{Error, Result, Rotation};

/// Parse a complete in-memory .vox byte stream.
pub fn parse(data: &[u8]) -> Result<Document> {
    let mut cur = ByteCursor::new(data);
    let magic = cur.read_slice(4);
    let version = cur.read_i32();
    cur.status("header")?;
    if magic != MAGIC {
        return Err(Error::InvalidMagic);
    }
    if version != VERSION {
        return Err(Error::UnsupportedVersion(version));
    }

    let main = read_chunk(&mut cur)?.ok_or(Error::MissingMain)?;
    if main.tag != Tag::MAIN {
        return Err(Error::MissingMain);
    }
    if !main.content.is_empty() {
        return Err(Error::MainNotEmpty);
    }
    cur.require_end("MAIN")?;
    parse_main_children(main.children)
}

/// Parse the file at `path`, memory-mapping its contents.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound(path.to_path_buf())
        } else {
            Error::Io(e)
        }
    })?;
    // Safety: the map is read-only and dropped before this call returns.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
    parse(&mmap)
}

/// One chunk as it sits in the stream; content and children borrow the input.
struct RawChunk<'a> {
    tag: Tag,
    content: &'a [u8],
    children: &'a [u8],
}

/// Read the next chunk wrapper, or `None` at a clean end of input.
fn read_chunk<'a>(cur: &mut ByteCursor<'a>) -> Result<Option<RawChunk<'a>>> {
    if cur.remaining() == 0 {
        return Ok(None);
    }
    let tag_bytes = cur.read_slice(4);
    let content_len = cur.read_i32();
    let children_len = cur.read_i32();
    cur.status("chunk header")?;
    let tag = Tag([tag_bytes[0], tag_bytes[1], tag_bytes[2], tag_bytes[3]]);
    if content_len < 0 || children_len < 0 {
        return Err(Error::ChunkTruncated(tag.to_string()));
    }
    let content = cur.read_slice(content_len as usize);
    let children = cur.read_slice(children_len as usize);
    cur.status(&tag.to_string())?;
    Ok(Some(RawChunk {
        tag,
        content,
        children,
    }))
}

/// Position in the required chunk ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Expecting an optional PACK.
    Pack,
    /// Expecting the next model's SIZE.
    Size,
    /// A SIZE was read; its XYZI must follow immediately.
    Xyzi,
    /// Model chunks are done; scene-graph chunks in any order.
    SceneGraph,
    /// LAYR section.
    Layers,
    /// RGBA was read; only MATL chunks remain.
    Materials,
}

fn parse_main_children(data: &[u8]) -> Result<Document> {
    let mut cur = ByteCursor::new(data);
    let mut state = State::Pack;
    let mut pack: Option<i32> = None;
    let mut models: Vec<Model> = Vec::new();
    let mut pending_size: Option<IVec3> = None;
    let mut palette: Option<Vec<Rgba>> = None;
    let mut materials = vec![Material::default(); PALETTE_LEN];
    let mut assembly = SceneAssembly::default();
    let mut ignored: HashSet<Tag> = HashSet::from([Tag::ROBJ]);

    while let Some(chunk) = read_chunk(&mut cur)? {
        let misplaced = || Error::MisplacedChunk(chunk.tag.to_string());
        match chunk.tag {
            Tag::PACK => {
                if state != State::Pack {
                    return Err(misplaced());
                }
                pack = Some(parse_pack(chunk.content)?);
                state = State::Size;
            }
            Tag::SIZE => {
                if state == State::Pack {
                    state = State::Size;
                }
                if state != State::Size {
                    return Err(misplaced());
                }
                pending_size = Some(parse_size(chunk.content)?);
                state = State::Xyzi;
            }
            Tag::XYZI => {
                let Some(size) = pending_size.take() else {
                    return Err(misplaced());
                };
                if state != State::Xyzi {
                    return Err(misplaced());
                }
                let voxels = parse_xyzi(chunk.content)?;
                models.push(Model { size, voxels });
                state = if pack == Some(models.len() as i32) {
                    State::SceneGraph
                } else {
                    State::Size
                };
            }
            Tag::NTRN => {
                if state == State::Size {
                    if let Some(expected) = pack {
                        return Err(Error::ModelCountMismatch {
                            expected,
                            found: models.len() as i32,
                        });
                    }
                    state = State::SceneGraph;
                }
                if state != State::SceneGraph {
                    return Err(misplaced());
                }
                assembly.insert_transform(parse_ntrn(chunk.content)?)?;
            }
            Tag::NGRP => {
                if state != State::SceneGraph {
                    return Err(misplaced());
                }
                assembly.insert_group(parse_ngrp(chunk.content)?)?;
            }
            Tag::NSHP => {
                if state != State::SceneGraph {
                    return Err(misplaced());
                }
                assembly.insert_shape(parse_nshp(chunk.content, models.len())?)?;
            }
            Tag::LAYR => {
                if state == State::SceneGraph {
                    state = State::Layers;
                }
                if state != State::Layers {
                    return Err(misplaced());
                }
                assembly.insert_layer(parse_layr(chunk.content)?)?;
            }
            Tag::RGBA => {
                if state != State::SceneGraph && state != State::Layers {
                    return Err(misplaced());
                }
                palette = Some(parse_rgba(chunk.content)?);
                state = State::Materials;
            }
            Tag::MATL => {
                if state != State::Materials {
                    return Err(misplaced());
                }
                let (index, material) = parse_matl(chunk.content)?;
                materials[index] = material;
            }
            tag => {
                if ignored.insert(tag) {
                    warn!(%tag, "skipping unrecognized chunk");
                }
            }
        }
        if !chunk.children.is_empty() {
            return Err(Error::UnexpectedChildChunks(chunk.tag.to_string()));
        }
    }

    if let Some(expected) = pack {
        if models.len() as i32 != expected {
            return Err(Error::ModelCountMismatch {
                expected,
                found: models.len() as i32,
            });
        }
    }
    debug!(
        models = models.len(),
        "finished chunk walk, building scene graph"
    );
    let scene = assembly.build()?;
    build_document(models, palette.unwrap_or_default(), materials, scene)
}

/// Attach palette colors to the material table: material i takes palette
/// entry i-1, slot 0 stays reserved.
fn build_document(
    models: Vec<Model>,
    palette: Vec<Rgba>,
    mut materials: Vec<Material>,
    scene: Scene,
) -> Result<Document> {
    if palette.len() != PALETTE_LEN {
        return Err(Error::PaletteSize(palette.len()));
    }
    for i in 1..PALETTE_LEN {
        materials[i].color = palette[i - 1];
    }
    Ok(Document {
        models,
        palette,
        materials,
        scene,
    })
}

fn parse_pack(content: &[u8]) -> Result<i32> {
    let mut cur = ByteCursor::new(content);
    let count = cur.read_i32();
    cur.require_end("PACK")?;
    Ok(count)
}

fn parse_size(content: &[u8]) -> Result<IVec3> {
    let mut cur = ByteCursor::new(content);
    let x = cur.read_i32();
    let y = cur.read_i32();
    let z = cur.read_i32();
    cur.require_end("SIZE")?;
    Ok(IVec3::new(x, y, z))
}

fn parse_xyzi(content: &[u8]) -> Result<Vec<Voxel>> {
    let mut cur = ByteCursor::new(content);
    let count = cur.read_i32();
    let mut voxels = Vec::new();
    for _ in 0..count {
        if !cur.ok() {
            break;
        }
        voxels.push(Voxel {
            x: cur.read_u8(),
            y: cur.read_u8(),
            z: cur.read_u8(),
            color_index: cur.read_u8(),
        });
    }
    cur.require_end("XYZI")?;
    Ok(voxels)
}

fn parse_rgba(content: &[u8]) -> Result<Vec<Rgba>> {
    let mut cur = ByteCursor::new(content);
    let mut palette = Vec::with_capacity(PALETTE_LEN);
    for _ in 0..PALETTE_LEN {
        palette.push(Rgba::new(
            cur.read_u8(),
            cur.read_u8(),
            cur.read_u8(),
            cur.read_u8(),
        ));
    }
    cur.require_end("RGBA")?;
    Ok(palette)
}

fn parse_ntrn(content: &[u8]) -> Result<TransformRecord> {
    let mut cur = ByteCursor::new(content);
    let id = cur.read_i32();
    let mut attrs = Dict::parse(&mut cur);
    let child = cur.read_i32();
    let reserved = cur.read_i32();
    let layer = cur.read_i32();
    let frame_count = cur.read_i32();
    let mut frames = Vec::new();
    for _ in 0..frame_count {
        if !cur.ok() {
            break;
        }
        frames.push(Dict::parse(&mut cur));
    }
    cur.status("nTRN")?;

    if reserved != -1 {
        return Err(Error::ReservedField {
            chunk: "nTRN",
            value: reserved,
        });
    }
    if frame_count != 1 {
        return Err(Error::UnsupportedFrameCount(frame_count));
    }

    let name = attrs.read_str("_name", "");
    let hidden = attrs.read_bool("_hidden", false);
    attrs.check("nTRN")?;
    attrs.expect_no_unread("nTRN")?;

    let frame = &mut frames[0];
    let rotation = frame.read_rotation("_r", Rotation::IDENTITY);
    let translation = frame.read_vec3("_t", IVec3::ZERO);
    frame.check("nTRN frame")?;
    frame.expect_no_unread("nTRN frame")?;

    cur.require_end("nTRN")?;
    Ok(TransformRecord {
        id,
        name,
        hidden,
        child,
        layer,
        transform: Transform {
            rotation,
            translation,
        },
    })
}

fn parse_ngrp(content: &[u8]) -> Result<GroupRecord> {
    let mut cur = ByteCursor::new(content);
    let id = cur.read_i32();
    let mut attrs = Dict::parse(&mut cur);
    let child_count = cur.read_i32();
    let mut children = Vec::new();
    for _ in 0..child_count {
        if !cur.ok() {
            break;
        }
        children.push(cur.read_i32());
    }
    cur.status("nGRP")?;

    let name = attrs.read_str("_name", "");
    let hidden = attrs.read_bool("_hidden", false);
    attrs.check("nGRP")?;
    attrs.expect_no_unread("nGRP")?;

    cur.require_end("nGRP")?;
    Ok(GroupRecord {
        id,
        name,
        hidden,
        children,
    })
}

fn parse_nshp(content: &[u8], model_count: usize) -> Result<ShapeRecord> {
    let mut cur = ByteCursor::new(content);
    let id = cur.read_i32();
    let mut attrs = Dict::parse(&mut cur);
    let count = cur.read_i32();
    let mut models = Vec::new();
    for _ in 0..count {
        if !cur.ok() {
            break;
        }
        let model_id = cur.read_i32();
        // Per-instance attributes are reserved; parse and discard.
        let _ = Dict::parse(&mut cur);
        models.push(model_id);
    }
    cur.status("nSHP")?;

    let name = attrs.read_str("_name", "");
    let hidden = attrs.read_bool("_hidden", false);
    attrs.check("nSHP")?;
    attrs.expect_no_unread("nSHP")?;

    cur.require_end("nSHP")?;
    let models = models
        .into_iter()
        .map(|model_id| {
            if model_id < 0 || model_id as usize >= model_count {
                return Err(Error::MissingModel(model_id));
            }
            Ok(model_id as usize)
        })
        .collect::<Result<_>>()?;
    Ok(ShapeRecord {
        id,
        name,
        hidden,
        models,
    })
}

fn parse_layr(content: &[u8]) -> Result<Layer> {
    let mut cur = ByteCursor::new(content);
    let id = cur.read_i32();
    let mut attrs = Dict::parse(&mut cur);
    let reserved = cur.read_i32();
    cur.status("LAYR")?;

    if reserved != -1 {
        return Err(Error::ReservedField {
            chunk: "LAYR",
            value: reserved,
        });
    }

    let name = attrs.read_str("_name", "");
    let hidden = attrs.read_bool("_hidden", false);
    attrs.check("LAYR")?;
    attrs.expect_no_unread("LAYR")?;

    cur.require_end("LAYR")?;
    Ok(Layer {
        index: id,
        name,
        hidden,
    })
}

fn parse_matl(content: &[u8]) -> Result<(usize, Material)> {
    let mut cur = ByteCursor::new(content);
    let id = cur.read_i32();
    if !(0..=255).contains(&id) {
        return Err(Error::MaterialIdOutOfRange(id));
    }
    let mut dict = Dict::parse(&mut cur);
    cur.require_end("MATL")?;

    let kind_label = dict.read_str("_type", "<missing>");
    let weight = dict.read_f32("_weight", 1.0) * 100.0;
    let roughness = dict.read_f32("_rough", 0.0) * 100.0;
    let specular = dict.read_f32("_spec", 0.0) * 100.0;
    let ior = dict.read_f32("_ior", 0.0) + 1.0;
    let attenuation = dict.read_f32("_att", 0.0) * 100.0;
    let flux = dict.read_f32("_flux", 0.0) * 100.0;
    let plastic = dict.read_bool("_plastic", false);
    // Not in the published format notes, but present in real files.
    let ldr = dict.read_f32("_ldr", 0.0) * 100.0;
    dict.check("MATL")?;
    dict.expect_no_unread("MATL")?;

    let kind = MaterialKind::from_label(&kind_label)?;
    Ok((
        id as usize,
        Material {
            kind,
            color: Rgba::default(),
            weight,
            roughness,
            specular,
            ior,
            attenuation,
            flux,
            plastic,
            ldr,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_chunk_wrapper() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"SIZE");
        buf.extend_from_slice(&12i32.to_le_bytes());
        buf.extend_from_slice(&0i32.to_le_bytes());
        for v in [30i32, 20, 10] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        let mut cur = ByteCursor::new(&buf);
        let chunk = read_chunk(&mut cur).unwrap().unwrap();
        assert_eq!(chunk.tag, Tag::SIZE);
        assert_eq!(chunk.content.len(), 12);
        assert!(chunk.children.is_empty());
        assert!(read_chunk(&mut cur).unwrap().is_none());
        assert_eq!(parse_size(chunk.content).unwrap(), IVec3::new(30, 20, 10));
    }

    #[test]
    fn test_read_chunk_truncated() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"XYZI");
        buf.extend_from_slice(&100i32.to_le_bytes());
        buf.extend_from_slice(&0i32.to_le_bytes());
        buf.extend_from_slice(&[0u8; 4]);
        let mut cur = ByteCursor::new(&buf);
        assert!(matches!(
            read_chunk(&mut cur),
            Err(Error::ChunkTruncated(tag)) if tag == "XYZI"
        ));
    }

    #[test]
    fn test_parse_pack_rejects_trailing_bytes() {
        let mut content = 2i32.to_le_bytes().to_vec();
        content.push(0);
        assert!(matches!(
            parse_pack(&content),
            Err(Error::TrailingBytes(tag)) if tag == "PACK"
        ));
    }

    #[test]
    fn test_parse_xyzi() {
        let mut content = 2i32.to_le_bytes().to_vec();
        content.extend_from_slice(&[1, 2, 3, 9]);
        content.extend_from_slice(&[4, 5, 6, 7]);
        let voxels = parse_xyzi(&content).unwrap();
        assert_eq!(voxels.len(), 2);
        assert_eq!(
            voxels[0],
            Voxel {
                x: 1,
                y: 2,
                z: 3,
                color_index: 9
            }
        );
    }

    #[test]
    fn test_parse_matl_id_out_of_range() {
        let content = 256i32.to_le_bytes().to_vec();
        assert!(matches!(
            parse_matl(&content),
            Err(Error::MaterialIdOutOfRange(256))
        ));
    }
}
