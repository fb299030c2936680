//! Register allocation.
//!
//! Each [`RegisterClass`] has its own `(space, slot)` cursor. Bindings are
//! handed out in request order; an unbounded array takes a whole register
//! space so nothing can be placed after it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// HLSL register class.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub enum RegisterClass {
    /// Shader resource view (`t`).
    #[serde(rename = "SRV")]
    Srv,
    /// Sampler (`s`).
    #[serde(rename = "Sampler")]
    Sampler,
    /// Unordered access view (`u`).
    #[serde(rename = "UAV")]
    Uav,
    /// Constant buffer view (`b`).
    #[serde(rename = "CBV")]
    Cbv,
}

impl RegisterClass {
    pub const ALL: [RegisterClass; 4] = [
        RegisterClass::Srv,
        RegisterClass::Sampler,
        RegisterClass::Uav,
        RegisterClass::Cbv,
    ];

    /// Register letter in `register(<letter><slot>, ...)`.
    pub fn letter(self) -> char {
        match self {
            RegisterClass::Srv => 't',
            RegisterClass::Sampler => 's',
            RegisterClass::Uav => 'u',
            RegisterClass::Cbv => 'b',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RegisterClass::Srv => "SRV",
            RegisterClass::Sampler => "Sampler",
            RegisterClass::Uav => "UAV",
            RegisterClass::Cbv => "CBV",
        }
    }

    fn index(self) -> usize {
        match self {
            RegisterClass::Srv => 0,
            RegisterClass::Sampler => 1,
            RegisterClass::Uav => 2,
            RegisterClass::Cbv => 3,
        }
    }
}

impl fmt::Display for RegisterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One allocated register range.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct Binding {
    #[serde(rename = "register_class")]
    pub class: RegisterClass,
    pub space: u32,
    pub slot: u32,
    /// Number of registers; `None` for an unbounded array.
    pub count: Option<u32>,
}

/// Renders the HLSL register annotation, e.g. `register(t3, space1)`.
impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "register({}{}, space{})",
            self.class.letter(),
            self.slot,
            self.space
        )
    }
}

#[derive(Copy, Clone, Default, Debug)]
struct Cursor {
    space: u32,
    slot: u32,
}

/// Four independent `(space, slot)` cursors, one per [`RegisterClass`].
#[derive(Clone, Default, Debug)]
pub struct RegisterAllocator {
    cursors: [Cursor; 4],
}

impl RegisterAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `count` consecutive registers in the current space.
    pub fn bind(&mut self, class: RegisterClass, count: u32) -> Binding {
        let cursor = &mut self.cursors[class.index()];
        let binding = Binding {
            class,
            space: cursor.space,
            slot: cursor.slot,
            count: Some(count),
        };
        cursor.slot = cursor.slot.saturating_add(count);
        binding
    }

    /// Bind an unbounded array at slot 0 of its own space.
    ///
    /// On a fresh space this is the current `(space, 0)`. A partly used
    /// space is skipped instead, so the array cannot overlap earlier
    /// bindings (see "Other decisions" in `DESIGN.md`). Either way the next
    /// binding of `class` starts in a fresh space.
    pub fn bind_unsized(&mut self, class: RegisterClass) -> Binding {
        let cursor = &mut self.cursors[class.index()];
        if cursor.slot != 0 {
            cursor.space += 1;
        }
        let binding = Binding {
            class,
            space: cursor.space,
            slot: 0,
            count: None,
        };
        cursor.space += 1;
        cursor.slot = 0;
        binding
    }

    /// Next `(space, slot)` `class` would hand out.
    pub fn peek(&self, class: RegisterClass) -> (u32, u32) {
        let cursor = self.cursors[class.index()];
        (cursor.space, cursor.slot)
    }
}
