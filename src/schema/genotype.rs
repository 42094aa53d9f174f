//! Genotype types: the heritable parameters of one creature.
//!
//! A [`Genotype`] is a fixed tuple of six loci. Each locus is addressable by a
//! [`LocusIndex`] so that crossover and mutation can operate generically,
//! while [`Locus`] keeps the value of each position strongly typed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Body shape of a creature.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Shape {
    Sphere,
    Disc,
    Torus,
}

impl Shape {
    /// All shape variants, in declaration order.
    pub const ALL: [Shape; 3] = [Shape::Sphere, Shape::Disc, Shape::Torus];
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shape::Sphere => "Sphere",
            Shape::Disc => "Disc",
            Shape::Torus => "Torus",
        };
        f.write_str(name)
    }
}

/// A three-component vector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// Index of one of the six loci of a [`Genotype`].
///
/// Construction is the only place an index can be out of range, so every
/// operator taking a `LocusIndex` is total.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LocusIndex {
    Shape = 0,
    Mass = 1,
    Size = 2,
    Angle = 3,
    Position = 4,
    Force = 5,
}

impl LocusIndex {
    /// Number of loci in a genotype.
    pub const COUNT: usize = 6;

    /// All loci in index order.
    pub const ALL: [LocusIndex; Self::COUNT] = [
        LocusIndex::Shape,
        LocusIndex::Mass,
        LocusIndex::Size,
        LocusIndex::Angle,
        LocusIndex::Position,
        LocusIndex::Force,
    ];

    /// Map a raw index in `0..6` to a locus.
    pub fn new(index: usize) -> Result<Self, GenotypeError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(GenotypeError::LocusOutOfRange { index })
    }

    /// Raw index of this locus.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The value kind stored at this locus.
    pub fn kind(self) -> LocusKind {
        match self {
            LocusIndex::Shape => LocusKind::Shape,
            LocusIndex::Mass => LocusKind::Scalar,
            LocusIndex::Size | LocusIndex::Angle | LocusIndex::Position | LocusIndex::Force => {
                LocusKind::Vector
            }
        }
    }
}

impl fmt::Display for LocusIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LocusIndex::Shape => "shape",
            LocusIndex::Mass => "mass",
            LocusIndex::Size => "size",
            LocusIndex::Angle => "initial_angle",
            LocusIndex::Position => "initial_position",
            LocusIndex::Force => "initial_force",
        };
        f.write_str(name)
    }
}

/// Type tag of a locus value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocusKind {
    Shape,
    Scalar,
    Vector,
}

impl fmt::Display for LocusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LocusKind::Shape => "shape",
            LocusKind::Scalar => "scalar",
            LocusKind::Vector => "vector3",
        };
        f.write_str(name)
    }
}

/// The value held at a single locus.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value")]
pub enum Locus {
    Shape(Shape),
    Scalar(f32),
    Vector(Vec3),
}

impl Locus {
    pub fn kind(&self) -> LocusKind {
        match self {
            Locus::Shape(_) => LocusKind::Shape,
            Locus::Scalar(_) => LocusKind::Scalar,
            Locus::Vector(_) => LocusKind::Vector,
        }
    }
}

/// Errors raised by locus access.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenotypeError {
    #[error("Locus index {index} is out of range (expected 0..6)")]
    LocusOutOfRange { index: usize },
    #[error("Locus {locus} holds a {expected} value, got {found}")]
    LocusTypeMismatch {
        locus: LocusIndex,
        expected: LocusKind,
        found: LocusKind,
    },
}

/// Heritable parameters of one creature.
///
/// Equality is exact field-wise equality; it is what duplicate rejection
/// during mutation relies on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genotype {
    pub shape: Shape,
    pub mass: f32,
    pub size: Vec3,
    pub initial_angle: Vec3,
    pub initial_position: Vec3,
    pub initial_force: Vec3,
}

impl Genotype {
    /// Read the value at a locus.
    pub fn locus(&self, index: LocusIndex) -> Locus {
        match index {
            LocusIndex::Shape => Locus::Shape(self.shape),
            LocusIndex::Mass => Locus::Scalar(self.mass),
            LocusIndex::Size => Locus::Vector(self.size),
            LocusIndex::Angle => Locus::Vector(self.initial_angle),
            LocusIndex::Position => Locus::Vector(self.initial_position),
            LocusIndex::Force => Locus::Vector(self.initial_force),
        }
    }

    /// Overwrite the value at a locus.
    ///
    /// The value must be of the locus's declared kind; nothing is coerced.
    pub fn set_locus(&mut self, index: LocusIndex, value: Locus) -> Result<(), GenotypeError> {
        match (index, value) {
            (LocusIndex::Shape, Locus::Shape(shape)) => self.shape = shape,
            (LocusIndex::Mass, Locus::Scalar(mass)) => self.mass = mass,
            (LocusIndex::Size, Locus::Vector(v)) => self.size = v,
            (LocusIndex::Angle, Locus::Vector(v)) => self.initial_angle = v,
            (LocusIndex::Position, Locus::Vector(v)) => self.initial_position = v,
            (LocusIndex::Force, Locus::Vector(v)) => self.initial_force = v,
            (locus, value) => {
                return Err(GenotypeError::LocusTypeMismatch {
                    locus,
                    expected: locus.kind(),
                    found: value.kind(),
                });
            }
        }
        Ok(())
    }

    /// Exchange the value at one locus with another genotype.
    pub fn swap_locus(&mut self, other: &mut Genotype, index: LocusIndex) {
        use std::mem::swap;

        match index {
            LocusIndex::Shape => swap(&mut self.shape, &mut other.shape),
            LocusIndex::Mass => swap(&mut self.mass, &mut other.mass),
            LocusIndex::Size => swap(&mut self.size, &mut other.size),
            LocusIndex::Angle => swap(&mut self.initial_angle, &mut other.initial_angle),
            LocusIndex::Position => swap(&mut self.initial_position, &mut other.initial_position),
            LocusIndex::Force => swap(&mut self.initial_force, &mut other.initial_force),
        }
    }

    /// All six loci in index order.
    pub fn loci(&self) -> [Locus; LocusIndex::COUNT] {
        LocusIndex::ALL.map(|index| self.locus(index))
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shape: {}, mass: {:.3}, size: {}",
            self.shape, self.mass, self.size
        )
    }
}
