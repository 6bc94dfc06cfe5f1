//! Rule-based prompt parsing.
//!
//! The prompt is lowercased and split into words. Rules run in [`RULES`]
//! order against a default descriptor (unit cube); every matching rule
//! applies its effect, so later rules override earlier ones.

use std::fmt;

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Cube,
    Box,
    Cylinder,
    Capsule,
    Cone,
    Sphere,
}

impl ShapeKind {
    /// Keyword search order for the primitive rule.
    pub const ALL: [ShapeKind; 6] = [
        ShapeKind::Cube,
        ShapeKind::Box,
        ShapeKind::Cylinder,
        ShapeKind::Capsule,
        ShapeKind::Cone,
        ShapeKind::Sphere,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            ShapeKind::Cube => "cube",
            ShapeKind::Box => "box",
            ShapeKind::Cylinder => "cylinder",
            ShapeKind::Capsule => "capsule",
            ShapeKind::Cone => "cone",
            ShapeKind::Sphere => "sphere",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Composite objects built from several primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomObject {
    Car,
}

/// Parsed shape request. Unset dimensions fall back to per-kind defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDescriptor {
    pub kind: ShapeKind,
    pub scale: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub depth: Option<f32>,
    pub radius: Option<f32>,
    pub custom: Option<CustomObject>,
}

impl Default for ShapeDescriptor {
    fn default() -> Self {
        Self {
            kind: ShapeKind::Cube,
            scale: 1.0,
            width: None,
            height: None,
            depth: None,
            radius: None,
            custom: None,
        }
    }
}

impl ShapeDescriptor {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    fn reset_dimensions(&mut self) {
        self.width = None;
        self.height = None;
        self.depth = None;
        self.radius = None;
        self.custom = None;
    }
}

pub struct PromptRule {
    pub name: &'static str,
    pub matches: fn(&[String]) -> bool,
    pub apply: fn(&[String], &mut ShapeDescriptor),
}

const SMALL_WORDS: [&str; 3] = ["small", "tiny", "little"];
const LARGE_WORDS: [&str; 3] = ["large", "big", "huge"];

const SMALL_SCALE: f32 = 0.5;
const LARGE_SCALE: f32 = 2.0;

fn has_any(words: &[String], candidates: &[&str]) -> bool {
    words.iter().any(|w| candidates.contains(&w.as_str()))
}

/// Ordered rule list. Size: "small" beats "large" by coming later. Objects:
/// car beats ball/sphere beats bottle.
pub const RULES: &[PromptRule] = &[
    PromptRule {
        name: "primitive",
        matches: |words| ShapeKind::ALL.iter().any(|k| has_any(words, &[k.keyword()])),
        apply: |words, shape| {
            if let Some(kind) = ShapeKind::ALL.iter().find(|k| has_any(words, &[k.keyword()])) {
                shape.kind = *kind;
            }
        },
    },
    PromptRule {
        name: "large",
        matches: |words| has_any(words, &LARGE_WORDS),
        apply: |_, shape| shape.scale = LARGE_SCALE,
    },
    PromptRule {
        name: "small",
        matches: |words| has_any(words, &SMALL_WORDS),
        apply: |_, shape| shape.scale = SMALL_SCALE,
    },
    PromptRule {
        name: "bottle",
        matches: |words| has_any(words, &["bottle"]),
        apply: |_, shape| {
            shape.reset_dimensions();
            shape.kind = ShapeKind::Cylinder;
            shape.height = Some(2.0);
            shape.radius = Some(0.5);
        },
    },
    PromptRule {
        name: "ball",
        matches: |words| has_any(words, &["ball", "sphere"]),
        apply: |_, shape| {
            shape.reset_dimensions();
            shape.kind = ShapeKind::Sphere;
        },
    },
    PromptRule {
        name: "car",
        matches: |words| has_any(words, &["car"]),
        apply: |_, shape| {
            shape.reset_dimensions();
            shape.kind = ShapeKind::Capsule;
            shape.custom = Some(CustomObject::Car);
        },
    },
];

/// Lowercase alphanumeric words of `prompt`.
pub fn tokenize(prompt: &str) -> Vec<String> {
    prompt
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

pub fn parse_prompt(prompt: &str) -> ShapeDescriptor {
    let words = tokenize(prompt);
    let mut shape = ShapeDescriptor::default();

    for rule in RULES {
        if (rule.matches)(&words) {
            (rule.apply)(&words, &mut shape);
            debug!("Prompt rule '{}' matched", rule.name);
        }
    }

    debug!("Parsed prompt '{}' as {:?}", prompt, shape);
    shape
}
