//! Read-only pack access: per-pack `.idx`/`.pack` pairs plus an optional multi-pack-index spanning
//! all of them. This crate never writes packs.
mod data;
mod delta;
pub mod index;
pub mod multi_index;

use std::path::Path;

use git_hash::{oid, Kind as HashKind};
use git_object::Kind;

pub use data::File as Data;
pub use index::Index;
pub use multi_index::File as MultiIndex;

/// The error returned while reading from a pack.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Index(#[from] index::Error),
    #[error(transparent)]
    MultiIndex(#[from] multi_index::Error),
    #[error(transparent)]
    Data(#[from] data::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One pack's index paired with its data file, opened together.
pub struct Pack {
    pub(crate) index: Index,
    pub(crate) data: Data,
    pub(crate) path: std::path::PathBuf,
}

impl Pack {
    /// Open the `.idx`/`.pack` pair sharing `idx_path`'s stem.
    pub fn at(idx_path: &Path, hash_kind: HashKind) -> Result<Self, Error> {
        let index = Index::at(idx_path, hash_kind)?;
        let pack_path = idx_path.with_extension("pack");
        let data = Data::at(&pack_path, hash_kind)?;
        Ok(Pack {
            index,
            data,
            path: pack_path,
        })
    }

    /// The `.pack` file's path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// This pack's `.idx`.
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Resolve the entry at `offset` directly, as found through a multi-pack-index lookup.
    pub fn find_at_offset(
        &self,
        offset: u64,
        resolve_ref_delta: impl Fn(&oid) -> Option<(Kind, Vec<u8>)> + Copy,
    ) -> Result<(Kind, Vec<u8>), Error> {
        Ok(self.data.entry_at(offset, resolve_ref_delta)?)
    }

    /// Resolve `id` against this pack alone, given a callback to resolve ref-delta bases that may
    /// live in another pack or the loose store.
    pub fn find(
        &self,
        id: &oid,
        resolve_ref_delta: impl Fn(&oid) -> Option<(Kind, Vec<u8>)> + Copy,
    ) -> Result<Option<(Kind, Vec<u8>)>, Error> {
        match self.index.lookup(id) {
            Some(position) => {
                let offset = self.index.pack_offset_at(position);
                Ok(Some(self.data.entry_at(offset, resolve_ref_delta)?))
            }
            None => Ok(None),
        }
    }
}
