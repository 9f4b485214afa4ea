//! Hierarchical embedding archive format.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{NeuralPlanError, Result};

const MAGIC: [u8; 4] = *b"NPEM";
const VERSION: u32 = 1;

/// Archive mapping scene name -> object name -> embedding vector.
///
/// Keys are stored sorted, so writing the same contents twice produces
/// byte-identical files. Downstream planning code re-keys embeddings by the
/// exact scene/object names the test accessor used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingArchive {
    groups: BTreeMap<String, BTreeMap<String, Vec<f32>>>,
}

impl EmbeddingArchive {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one embedding under (scene, name).
    pub fn insert(&mut self, scene: &str, name: &str, embedding: Vec<f32>) {
        self.groups
            .entry(scene.to_string())
            .or_default()
            .insert(name.to_string(), embedding);
    }

    /// Look up one embedding.
    pub fn get(&self, scene: &str, name: &str) -> Option<&[f32]> {
        self.groups
            .get(scene)
            .and_then(|entries| entries.get(name))
            .map(Vec::as_slice)
    }

    /// All entries of one scene.
    pub fn group(&self, scene: &str) -> Option<&BTreeMap<String, Vec<f32>>> {
        self.groups.get(scene)
    }

    /// Scene names in sorted order.
    pub fn scenes(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Number of scenes.
    pub fn num_scenes(&self) -> usize {
        self.groups.len()
    }

    /// Total number of leaf embeddings.
    pub fn num_entries(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }

    /// Whether the archive holds no entries.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Write the archive to a file.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);

        w.write_all(&MAGIC)?;
        w.write_all(&VERSION.to_le_bytes())?;
        w.write_all(&(self.groups.len() as u32).to_le_bytes())?;

        for (scene, entries) in &self.groups {
            write_str(&mut w, scene)?;
            w.write_all(&(entries.len() as u32).to_le_bytes())?;
            for (name, embedding) in entries {
                write_str(&mut w, name)?;
                w.write_all(&(embedding.len() as u32).to_le_bytes())?;
                for value in embedding {
                    w.write_all(&value.to_le_bytes())?;
                }
            }
        }

        w.flush()?;
        Ok(())
    }

    /// Read an archive back from a file.
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut r = BufReader::new(File::open(path)?);

        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(NeuralPlanError::InvalidData(
                "not an embedding archive (bad magic)".to_string(),
            ));
        }
        let version = read_u32(&mut r)?;
        if version != VERSION {
            return Err(NeuralPlanError::InvalidData(format!(
                "unsupported embedding archive version {version}"
            )));
        }

        let mut groups = BTreeMap::new();
        let num_groups = read_u32(&mut r)?;
        for _ in 0..num_groups {
            let scene = read_str(&mut r)?;
            let mut entries = BTreeMap::new();
            let num_entries = read_u32(&mut r)?;
            for _ in 0..num_entries {
                let name = read_str(&mut r)?;
                let len = read_u32(&mut r)? as usize;
                let mut bytes = vec![0u8; len * 4];
                r.read_exact(&mut bytes)?;
                let embedding = bytes
                    .chunks_exact(4)
                    .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect();
                entries.insert(name, embedding);
            }
            groups.insert(scene, entries);
        }

        Ok(Self { groups })
    }
}

fn write_str<W: Write>(w: &mut W, s: &str) -> Result<()> {
    w.write_all(&(s.len() as u32).to_le_bytes())?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

fn read_u32<R: Read>(r: &mut R) -> Result<u32> {
    let mut bytes = [0u8; 4];
    r.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_str<R: Read>(r: &mut R) -> Result<String> {
    let len = read_u32(r)? as usize;
    let mut bytes = vec![0u8; len];
    r.read_exact(&mut bytes)?;
    String::from_utf8(bytes)
        .map_err(|e| NeuralPlanError::InvalidData(format!("invalid archive key: {e}")))
}
