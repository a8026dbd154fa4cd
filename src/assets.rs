//! Asset collaborator: textures, sounds, and fonts by handle.
//!
//! The engine never decodes files. Configuration yields [`TextureSpec`]s
//! and names; the host's [`AssetLoader`] turns them into copyable handles.
//! A missing named texture is never an error: the loader answers with a
//! placeholder (a 100x100 fill of [`Color::PLACEHOLDER`] pink) and logs a
//! warning, so a broken skin shows up on screen instead of crashing.

use log::warn;
use rustc_hash::FxHashMap;

use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle(pub u32);

/// How a texture was named in configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureSpec {
    /// Load by asset name.
    Named(String),
    /// A 1x1 solid color, generated rather than loaded.
    Solid(Color),
}

impl TextureSpec {
    /// `#`-prefixed or comma-separated values are color specs; anything
    /// else is an asset name. A malformed color spec falls back to a name
    /// so the missing-asset path reports it.
    pub fn parse(raw: &str) -> TextureSpec {
        if raw.starts_with('#') || raw.contains(',') {
            if let Some(color) = Color::parse(raw) {
                return TextureSpec::Solid(color);
            }
        }
        TextureSpec::Named(raw.to_string())
    }
}

pub trait AssetLoader {
    /// Resolves a spec to a texture handle. Never fails; missing assets
    /// come back as the placeholder.
    fn texture(&mut self, spec: &TextureSpec) -> TextureHandle;
    /// Dimensions of a previously returned handle.
    fn texture_size(&self, texture: TextureHandle) -> (u32, u32);
    /// Missing sounds are a plain miss, not a placeholder.
    fn sound(&mut self, name: &str) -> Option<SoundHandle>;
    fn font(&mut self, name: &str, size: u32) -> FontHandle;
}

/// The placeholder every missing named texture maps to.
pub const PLACEHOLDER_TEXTURE: TextureHandle = TextureHandle(0);

const PLACEHOLDER_SIZE: (u32, u32) = (100, 100);

/// In-memory loader for tests and demos.
///
/// Nothing exists unless preloaded with [`NullAssets::with_texture`] /
/// [`NullAssets::with_sound`]; unknown named textures take the placeholder
/// path. Solid color specs always succeed and are deduplicated per color.
pub struct NullAssets {
    textures: FxHashMap<String, (TextureHandle, (u32, u32))>,
    solids: FxHashMap<Color, TextureHandle>,
    sounds: FxHashMap<String, SoundHandle>,
    fonts: FxHashMap<(String, u32), FontHandle>,
    next_texture: u32,
    next_sound: u32,
    next_font: u32,
}

impl NullAssets {
    pub fn new() -> Self {
        NullAssets {
            textures: FxHashMap::default(),
            solids: FxHashMap::default(),
            sounds: FxHashMap::default(),
            fonts: FxHashMap::default(),
            // Handle 0 is the placeholder.
            next_texture: 1,
            next_sound: 0,
            next_font: 0,
        }
    }

    pub fn with_texture(mut self, name: &str, size: (u32, u32)) -> Self {
        let handle = TextureHandle(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(name.to_string(), (handle, size));
        self
    }

    pub fn with_sound(mut self, name: &str) -> Self {
        let handle = SoundHandle(self.next_sound);
        self.next_sound += 1;
        self.sounds.insert(name.to_string(), handle);
        self
    }

    /// The handle a preloaded texture resolves to.
    pub fn texture_handle(&self, name: &str) -> Option<TextureHandle> {
        self.textures.get(name).map(|(handle, _)| *handle)
    }

    pub fn sound_handle(&self, name: &str) -> Option<SoundHandle> {
        self.sounds.get(name).copied()
    }
}

impl Default for NullAssets {
    fn default() -> Self {
        NullAssets::new()
    }
}

impl AssetLoader for NullAssets {
    fn texture(&mut self, spec: &TextureSpec) -> TextureHandle {
        match spec {
            TextureSpec::Named(name) => match self.textures.get(name) {
                Some((handle, _)) => *handle,
                None => {
                    warn!("texture '{name}' not found, using placeholder");
                    PLACEHOLDER_TEXTURE
                }
            },
            TextureSpec::Solid(color) => match self.solids.get(color) {
                Some(handle) => *handle,
                None => {
                    let handle = TextureHandle(self.next_texture);
                    self.next_texture += 1;
                    self.solids.insert(*color, handle);
                    handle
                }
            },
        }
    }

    fn texture_size(&self, texture: TextureHandle) -> (u32, u32) {
        if texture == PLACEHOLDER_TEXTURE {
            return PLACEHOLDER_SIZE;
        }
        for (handle, size) in self.textures.values() {
            if *handle == texture {
                return *size;
            }
        }
        // Solid color textures are generated at 1x1.
        (1, 1)
    }

    fn sound(&mut self, name: &str) -> Option<SoundHandle> {
        let found = self.sounds.get(name).copied();
        if found.is_none() {
            warn!("sound '{name}' not found");
        }
        found
    }

    fn font(&mut self, name: &str, size: u32) -> FontHandle {
        let key = (name.to_string(), size);
        match self.fonts.get(&key) {
            Some(handle) => *handle,
            None => {
                let handle = FontHandle(self.next_font);
                self.next_font += 1;
                self.fonts.insert(key, handle);
                handle
            }
        }
    }
}
