//! Opaque handles to media owned by the external resource manager
//!
//! A handle packs the resource kind in its top byte and a slot index in the
//! low 24 bits. The core only ever passes handles through to the renderer;
//! it never loads or frees textures, fonts or sounds itself.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Maximum slots per resource kind
pub const MAX_RESOURCES: u32 = 32;

const INDEX_MASK: u32 = 0x00ff_ffff;
const KIND_SHIFT: u32 = 24;

/// Resource kind stored in the handle's top byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ResKind {
    Invalid = 0,
    Sound = 1,
    Font = 2,
    Texture = 3,
}

impl ResKind {
    fn from_bits(bits: u32) -> Self {
        match bits {
            1 => ResKind::Sound,
            2 => ResKind::Font,
            3 => ResKind::Texture,
            _ => ResKind::Invalid,
        }
    }
}

/// Type-tagged resource slot reference
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct ResHandle(u32);

impl ResHandle {
    pub const INVALID: ResHandle = ResHandle(0);

    pub const fn new(index: u32, kind: ResKind) -> Self {
        ResHandle(((kind as u32) << KIND_SHIFT) | (index & INDEX_MASK))
    }

    #[inline]
    pub fn kind(self) -> ResKind {
        ResKind::from_bits((self.0 >> KIND_SHIFT) & 0xff)
    }

    #[inline]
    pub fn index(self) -> u32 {
        self.0 & INDEX_MASK
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.kind() != ResKind::Invalid
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Name to handle table filled in by whoever loads the media
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    next_index: HashMap<ResKind, u32>,
    handles: HashMap<String, ResHandle>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next free slot of `kind` to `name`.
    ///
    /// Registering a name twice with the same kind returns the original
    /// handle.
    pub fn register(&mut self, name: &str, kind: ResKind) -> ResHandle {
        assert!(kind != ResKind::Invalid, "cannot register '{}' as an invalid resource", name);

        if let Some(&existing) = self.handles.get(name) {
            if existing.kind() == kind {
                return existing;
            }
        }

        let slot = self.next_index.entry(kind).or_insert(0);
        assert!(
            *slot < MAX_RESOURCES,
            "resource table for {:?} is full ({} slots)",
            kind,
            MAX_RESOURCES
        );
        let handle = ResHandle::new(*slot, kind);
        *slot += 1;

        log::debug!("Registered {:?} '{}' at slot {}", kind, name, handle.index());
        self.handles.insert(name.to_owned(), handle);
        handle
    }

    /// Handle for `name`, or `ResHandle::INVALID` when it was never registered
    pub fn handle(&self, name: &str) -> ResHandle {
        self.handles.get(name).copied().unwrap_or(ResHandle::INVALID)
    }

    /// Slot index behind a handle. Passing an invalid handle is a bug.
    pub fn acquire(&self, handle: ResHandle) -> u32 {
        assert!(handle.is_valid(), "acquire called with an invalid handle");
        let index = handle.index();
        assert!(index < MAX_RESOURCES, "resource index {} out of range", index);
        index
    }

    /// Slot index for a name, `None` when the name is unknown
    pub fn acquire_by_name(&self, name: &str) -> Option<u32> {
        let handle = self.handle(name);
        handle.is_valid().then(|| self.acquire(handle))
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
