use std::{
    cell::RefCell,
    path::{Path, PathBuf},
    sync::Arc,
};

use git_hash::{oid, Kind as HashKind, ObjectId, Prefix};
use git_object::Kind;

use crate::{
    cache::ObjectCache,
    loose,
    pack::{self, Pack},
    Data, Error, Find, Format, Write as WriteTrait,
};

fn file_stem(name: &str) -> &str {
    name.trim_end_matches(".pack").trim_end_matches(".idx")
}

fn pack_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("")
}

/// An opened object database: one loose store, every pack found under `objects/pack/`, and an
/// optional multi-pack-index spanning them.
pub struct Store {
    objects_dir: PathBuf,
    loose: loose::Store,
    packs: Vec<Pack>,
    midx: Option<(pack::MultiIndex, Vec<Option<usize>>)>,
    hash_kind: HashKind,
}

impl Store {
    /// Open the object database rooted at `objects_dir`, discovering every `.idx`/`.pack` pair
    /// under `objects_dir/pack` and, if present, `objects_dir/info/multi-pack-index`.
    ///
    /// `hash_kind` is the repository's object format, as detected from its config.
    pub fn at(objects_dir: impl Into<PathBuf>, hash_kind: HashKind) -> Result<Self, Error> {
        let objects_dir = objects_dir.into();
        let loose = loose::Store::at(objects_dir.clone());

        let pack_dir = objects_dir.join("pack");
        let mut packs = Vec::new();
        if pack_dir.is_dir() {
            let mut idx_paths: Vec<PathBuf> = std::fs::read_dir(&pack_dir)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.extension().map(|ext| ext == "idx").unwrap_or(false))
                .collect();
            idx_paths.sort();
            for idx_path in idx_paths {
                packs.push(Pack::at(&idx_path, hash_kind)?);
            }
        }

        let midx_path = objects_dir.join("info").join("multi-pack-index");
        let midx = if midx_path.is_file() {
            let midx = pack::MultiIndex::at(&midx_path, hash_kind)?;
            let pack_slots = midx
                .pack_names()
                .iter()
                .map(|name| packs.iter().position(|pack| pack_stem(pack.path()) == file_stem(name)))
                .collect();
            Some((midx, pack_slots))
        } else {
            None
        };

        Ok(Store {
            objects_dir,
            loose,
            packs,
            midx,
            hash_kind,
        })
    }

    /// The repository's object format.
    pub fn hash_kind(&self) -> HashKind {
        self.hash_kind
    }

    /// The `objects/` directory this store was opened at.
    pub fn path(&self) -> &Path {
        &self.objects_dir
    }

    fn resolve_ref_delta(&self, id: &oid) -> Option<(Kind, Vec<u8>)> {
        if let Some((kind, content)) = self.loose.read(id).ok().flatten() {
            return Some((kind, content));
        }
        for pack in &self.packs {
            if let Ok(Some(found)) = pack.find(id, |other| self.resolve_ref_delta(other)) {
                return Some(found);
            }
        }
        None
    }

    fn find_in_packs(&self, id: &oid) -> Result<Option<(Kind, Vec<u8>)>, Error> {
        if let Some((midx, pack_slots)) = &self.midx {
            if let Some((pack_index, offset)) = midx.lookup(id) {
                if let Some(Some(slot)) = pack_slots.get(pack_index as usize) {
                    let pack = &self.packs[*slot];
                    return Ok(Some(pack.find_at_offset(offset, |other| self.resolve_ref_delta(other))?));
                }
            }
        }
        for pack in &self.packs {
            if let Some(found) = pack.find(id, |other| self.resolve_ref_delta(other))? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Every object id known to this store, across the loose store and all packs, without
    /// deduplication.
    pub fn all_object_ids(&self) -> Result<Vec<ObjectId>, Error> {
        let mut out: Vec<ObjectId> = self.loose.iter()?.collect();
        for pack in &self.packs {
            out.extend(pack.index().iter().cloned());
        }
        Ok(out)
    }
}

/// A cheap-to-clone handle onto a [`Store`], owning the object cache used to memoize
/// `content`-format reads for its lifetime.
#[derive(Clone)]
pub struct Handle {
    store: Arc<Store>,
    cache: Arc<RefCell<ObjectCache>>,
}

impl Handle {
    /// Wrap `store` in a handle with a fresh, empty object cache.
    pub fn new(store: Arc<Store>) -> Self {
        Handle {
            store,
            cache: Arc::new(RefCell::new(ObjectCache::default())),
        }
    }

    /// Confirms `content`, wrapped and hashed with `id`'s own hash kind, reproduces `id` - the
    /// invariant every loose and packed read must uphold.
    fn verify_checksum(&self, id: &oid, kind: Kind, content: &[u8]) -> Result<(), Error> {
        let wrapped = git_hash::wrap(std::str::from_utf8(kind.as_bytes()).expect("ascii"), content);
        let actual = git_hash::hash(id.kind(), &wrapped);
        if actual == *id {
            Ok(())
        } else {
            Err(Error::InternalError {
                expected: id.to_owned(),
                actual,
            })
        }
    }

    fn materialize(&self, id: &oid, kind: Kind, content: Vec<u8>, format: Format) -> Data {
        let bytes = match format {
            Format::Content => content,
            Format::Wrapped => git_hash::wrap(std::str::from_utf8(kind.as_bytes()).expect("ascii"), &content),
            Format::Deflated => {
                use std::io::Write as _;
                let wrapped = git_hash::wrap(std::str::from_utf8(kind.as_bytes()).expect("ascii"), &content);
                let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
                encoder.write_all(&wrapped).expect("writing to a Vec never fails");
                encoder.finish().expect("writing to a Vec never fails")
            }
        };
        Data {
            id: id.to_owned(),
            kind,
            bytes,
        }
    }
}

impl Find for Handle {
    fn try_find(&self, id: &oid, format: Format) -> Result<Option<Data>, Error> {
        if ObjectId::empty_tree(self.store.hash_kind()) == *id {
            return Ok(Some(self.materialize(id, Kind::Tree, Vec::new(), format)));
        }

        if let Some((kind, content)) = self.cache.borrow().get(&id.to_owned()) {
            return Ok(Some(self.materialize(id, kind, content, format)));
        }

        if let Some((kind, content)) = self.store.loose.read(id)? {
            self.verify_checksum(id, kind, &content)?;
            self.cache.borrow_mut().insert(id.to_owned(), kind, content.clone());
            return Ok(Some(self.materialize(id, kind, content, format)));
        }

        if let Some((kind, content)) = self.store.find_in_packs(id)? {
            self.verify_checksum(id, kind, &content)?;
            self.cache.borrow_mut().insert(id.to_owned(), kind, content.clone());
            return Ok(Some(self.materialize(id, kind, content, format)));
        }

        Ok(None)
    }

    fn expand_oid(&self, short_hex: &str) -> Result<ObjectId, Error> {
        let hash_kind = self.store.hash_kind();
        if short_hex.len() == hash_kind.len_in_hex() {
            return ObjectId::from_hex(short_hex.as_bytes()).map_err(|_| Error::InvalidShortId(short_hex.to_owned()));
        }
        let prefix = match Prefix::from_hex(short_hex) {
            Ok(prefix) => prefix,
            // A prefix below the minimum hex length is too short to ever disambiguate to a single
            // object, not malformed - treat it the same as a prefix matching nothing.
            Err(git_hash::prefix::from_hex::Error::TooShort { .. }) if short_hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
                return Err(Error::NotFound(ObjectId::null(hash_kind)));
            }
            Err(_) => return Err(Error::InvalidShortId(short_hex.to_owned())),
        };

        let mut matches: Vec<ObjectId> = self
            .store
            .all_object_ids()?
            .into_iter()
            .filter(|candidate| prefix.cmp_oid(candidate.as_oid()) == std::cmp::Ordering::Equal)
            .collect();
        matches.sort();
        matches.dedup();

        match matches.len() {
            0 => Err(Error::NotFound(prefix.as_oid().to_owned())),
            1 => Ok(matches.remove(0)),
            _ => Err(Error::Ambiguous),
        }
    }
}

impl WriteTrait for Handle {
    fn write_buf(&self, kind: Kind, bytes: &[u8]) -> Result<ObjectId, Error> {
        Ok(self.store.loose.write(kind, bytes, self.store.hash_kind())?)
    }
}
